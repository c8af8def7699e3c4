//! Caller-side proxies for the storage node's two interfaces.

use std::net::SocketAddr;

use crate::path::Path;
use crate::rpc::{self, InterfaceTag, Value};

use super::Error;

/// A proxy to one storage node's data interface (`size`/`read`/`write`).
///
/// Equality, hashing and the debug string fall out of the wrapped
/// [`rpc::Proxy`] (`spec.md` §4.1): two `DataProxy`s are equal iff they
/// address the same node. The naming node uses this as the map key for
/// `primary`/`replicas`/`storageCommand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataProxy {
    inner: rpc::Proxy,
}

impl DataProxy {
    pub fn new(addr: SocketAddr) -> DataProxy {
        DataProxy { inner: rpc::Proxy::new(InterfaceTag::Data, addr) }
    }

    pub fn addr(&self) -> SocketAddr {
        self.inner.addr()
    }

    pub async fn size(&self, path: &Path) -> Result<u64, Error> {
        let reply = self.inner.call("size", vec![Value::Path(path.clone())]).await?;
        reply.as_u64().ok_or_else(unexpected_shape_err)
    }

    pub async fn read(&self, path: &Path, offset: i64, length: i64) -> Result<Vec<u8>, Error> {
        let reply = self
            .inner
            .call("read", vec![Value::Path(path.clone()), Value::I64(offset), Value::I64(length)])
            .await?;
        reply.as_bytes().map(<[u8]>::to_vec).ok_or_else(unexpected_shape_err)
    }

    pub async fn write(&self, path: &Path, offset: i64, data: &[u8]) -> Result<(), Error> {
        self.inner
            .call("write", vec![Value::Path(path.clone()), Value::I64(offset), Value::Bytes(data.to_vec())])
            .await?;
        Ok(())
    }
}

impl From<DataProxy> for Value {
    fn from(p: DataProxy) -> Value {
        p.inner.into()
    }
}

impl TryFrom<Value> for DataProxy {
    type Error = ();

    fn try_from(v: Value) -> Result<DataProxy, ()> {
        rpc::Proxy::try_from(v).map(|inner| DataProxy { inner })
    }
}

/// A proxy to one storage node's control interface (`create`/`delete`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlProxy {
    inner: rpc::Proxy,
}

impl ControlProxy {
    pub fn new(addr: SocketAddr) -> ControlProxy {
        ControlProxy { inner: rpc::Proxy::new(InterfaceTag::Control, addr) }
    }

    pub fn addr(&self) -> SocketAddr {
        self.inner.addr()
    }

    pub async fn create(&self, path: &Path) -> Result<bool, Error> {
        let reply = self.inner.call("create", vec![Value::Path(path.clone())]).await?;
        reply.as_bool().ok_or_else(unexpected_shape_err)
    }

    pub async fn delete(&self, path: &Path) -> Result<bool, Error> {
        let reply = self.inner.call("delete", vec![Value::Path(path.clone())]).await?;
        reply.as_bool().ok_or_else(unexpected_shape_err)
    }
}

impl From<ControlProxy> for Value {
    fn from(p: ControlProxy) -> Value {
        p.inner.into()
    }
}

impl TryFrom<Value> for ControlProxy {
    type Error = ();

    fn try_from(v: Value) -> Result<ControlProxy, ()> {
        rpc::Proxy::try_from(v).map(|inner| ControlProxy { inner })
    }
}

fn unexpected_shape_err() -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, "reply had an unexpected shape"))
}
