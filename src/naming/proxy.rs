//! Caller-side proxies for the naming node's two interfaces.

use std::net::SocketAddr;

use crate::path::Path;
use crate::rpc::{self, InterfaceTag, Value};
use crate::storage::{ControlProxy, DataProxy};

use super::Error;

/// A proxy to the naming node's client interface (`spec.md` §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientProxy {
    inner: rpc::Proxy,
}

impl ClientProxy {
    pub fn new(addr: SocketAddr) -> ClientProxy {
        ClientProxy { inner: rpc::Proxy::new(InterfaceTag::NamingClient, addr) }
    }

    pub async fn is_directory(&self, path: &Path) -> Result<bool, Error> {
        let reply = self.inner.call("isDirectory", vec![Value::Path(path.clone())]).await?;
        reply.as_bool().ok_or_else(unexpected_shape)
    }

    pub async fn list(&self, path: &Path) -> Result<Vec<String>, Error> {
        let reply = self.inner.call("list", vec![Value::Path(path.clone())]).await?;
        reply
            .as_list()
            .ok_or_else(unexpected_shape)?
            .iter()
            .map(|v| v.as_str().map(str::to_owned))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(unexpected_shape)
    }

    pub async fn create_file(&self, path: &Path) -> Result<bool, Error> {
        let reply = self.inner.call("createFile", vec![Value::Path(path.clone())]).await?;
        reply.as_bool().ok_or_else(unexpected_shape)
    }

    pub async fn create_directory(&self, path: &Path) -> Result<bool, Error> {
        let reply = self.inner.call("createDirectory", vec![Value::Path(path.clone())]).await?;
        reply.as_bool().ok_or_else(unexpected_shape)
    }

    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        let reply = self.inner.call("delete", vec![Value::Path(path.clone())]).await?;
        reply.as_bool().ok_or_else(unexpected_shape)
    }

    pub async fn get_storage(&self, path: &Path) -> Result<DataProxy, Error> {
        let reply = self.inner.call("getStorage", vec![Value::Path(path.clone())]).await?;
        DataProxy::try_from(reply).map_err(|_| unexpected_shape())
    }
}

/// A proxy to the naming node's registration interface (`spec.md` §4.3).
/// Used by a storage node at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationProxy {
    inner: rpc::Proxy,
}

impl RegistrationProxy {
    pub fn new(addr: SocketAddr) -> RegistrationProxy {
        RegistrationProxy { inner: rpc::Proxy::new(InterfaceTag::Registration, addr) }
    }

    pub async fn register(
        &self,
        data: DataProxy,
        control: ControlProxy,
        paths: Vec<Path>,
    ) -> Result<Vec<Path>, Error> {
        let args = vec![
            Value::from(data),
            Value::from(control),
            Value::List(paths.into_iter().map(Value::Path).collect()),
        ];
        let reply = self.inner.call("register", args).await?;
        reply
            .as_list()
            .ok_or_else(unexpected_shape)?
            .iter()
            .map(|v| v.as_path().cloned())
            .collect::<Option<Vec<Path>>>()
            .ok_or_else(unexpected_shape)
    }
}

fn unexpected_shape() -> Error {
    Error::Transport(rpc::Error::Transport(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        "reply had an unexpected shape",
    )))
}
