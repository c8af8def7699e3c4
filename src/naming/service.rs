//! Bundles a [`NamingNode`] with its two listening interfaces.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::rpc::{Listener, ListenerDecision, ListenerHandle};

use super::{ClientDispatch, NamingNode, RegistrationDispatch};

/// A running naming node: the namespace plus its client and registration
/// listeners (`spec.md` §6 "the naming node binds two loopback ports").
pub struct NamingService {
    node: Arc<NamingNode>,
    client: ListenerHandle,
    registration: ListenerHandle,
}

impl NamingService {
    pub async fn start(service_addr: SocketAddr, registration_addr: SocketAddr) -> std::io::Result<NamingService> {
        let node = Arc::new(NamingNode::new());

        let client = Listener::new(Arc::new(ClientDispatch::new(node.clone())))
            .on_listener_error(|e| {
                tracing::error!(error = %e, "client listener accept error");
                ListenerDecision::Continue
            })
            .start(Some(service_addr))
            .await?;
        let registration = Listener::new(Arc::new(RegistrationDispatch::new(node.clone())))
            .on_listener_error(|e| {
                tracing::error!(error = %e, "registration listener accept error");
                ListenerDecision::Continue
            })
            .start(Some(registration_addr))
            .await?;

        Ok(NamingService { node, client, registration })
    }

    pub fn node(&self) -> &Arc<NamingNode> {
        &self.node
    }

    pub fn client_addr(&self) -> SocketAddr {
        self.client.local_addr()
    }

    pub fn registration_addr(&self) -> SocketAddr {
        self.registration.local_addr()
    }

    pub async fn stop(self) {
        self.client.stop().await;
        self.registration.stop().await;
    }
}
