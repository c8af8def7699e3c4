//! The storage node's startup/shutdown sequence (`spec.md` §4.2), bundling
//! a [`StorageNode`] with its two listening interfaces.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;

use crate::naming::{self, RegistrationProxy};
use crate::rpc::{Listener, ListenerHandle};

use super::{ControlDispatch, ControlProxy, DataDispatch, DataProxy, StorageNode};

#[derive(Debug)]
pub enum ServiceError {
    Io(std::io::Error),
    Registration(naming::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Io(e) => write!(f, "{e}"),
            ServiceError::Registration(e) => write!(f, "registration failed: {e}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> ServiceError {
        ServiceError::Io(e)
    }
}

impl From<naming::Error> for ServiceError {
    fn from(e: naming::Error) -> ServiceError {
        ServiceError::Registration(e)
    }
}

/// A running storage node: the local tree plus its two listening sockets.
pub struct StorageService {
    node: Arc<StorageNode>,
    data: ListenerHandle,
    control: ListenerHandle,
}

impl StorageService {
    /// Runs the full startup sequence (`spec.md` §4.2):
    /// 1. verify the root exists and is a directory,
    /// 2. start both transport servers,
    /// 3. enumerate local files,
    /// 4. register with the naming node,
    /// 5. delete any path the naming node already had,
    /// 6. prune directories that are now empty.
    pub async fn start(
        root: impl Into<PathBuf>,
        data_addr: SocketAddr,
        control_addr: SocketAddr,
        naming_registration_addr: SocketAddr,
    ) -> Result<StorageService, ServiceError> {
        let node = StorageNode::new(root)?;

        let data = Listener::new(Arc::new(DataDispatch::new(node.clone())))
            .on_listener_error(|e| {
                tracing::error!(error = %e, "data listener accept error");
                crate::rpc::ListenerDecision::Continue
            })
            .start(Some(data_addr))
            .await?;
        let control = Listener::new(Arc::new(ControlDispatch::new(node.clone())))
            .on_listener_error(|e| {
                tracing::error!(error = %e, "control listener accept error");
                crate::rpc::ListenerDecision::Continue
            })
            .start(Some(control_addr))
            .await?;

        let data_proxy = DataProxy::new(data.local_addr());
        let control_proxy = ControlProxy::new(control.local_addr());

        let files = node.list_files()?;
        let registration = RegistrationProxy::new(naming_registration_addr);
        let duplicates = registration
            .register(data_proxy, control_proxy, files)
            .instrument(tracing::info_span!("register", addr = %naming_registration_addr))
            .await?;

        for path in &duplicates {
            // The naming node already has this file elsewhere; this node's
            // copy is redundant (`spec.md` §2 "the storage node deletes
            // those locally").
            let _ = node.delete(path).await;
        }
        node.prune_empty_dirs()?;

        Ok(StorageService { node, data, control })
    }

    pub fn node(&self) -> &Arc<StorageNode> {
        &self.node
    }

    pub fn data_addr(&self) -> SocketAddr {
        self.data.local_addr()
    }

    pub fn control_addr(&self) -> SocketAddr {
        self.control.local_addr()
    }

    /// Stops both transport servers. In-flight handlers run to completion;
    /// no drain wait beyond that is promised (`spec.md` §4.2 "Shutdown").
    pub async fn stop(self) {
        self.data.stop().await;
        self.control.stop().await;
    }
}
