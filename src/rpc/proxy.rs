//! The generic proxy: a caller-side handle that invokes one named method on
//! a remote interface by opening a fresh TCP connection (`spec.md` §4.1
//! "Proxy").
//!
//! Per-interface proxies (`storage::DataProxy`, `naming::ClientProxy`, ...)
//! are thin typed wrappers around this struct: each of their methods
//! marshals its arguments into [`Value`]s, calls [`Proxy::call`], and
//! unmarshals the result, mapping [`Error::Remote`] into the domain's own
//! error enum by [`RemoteFailure::kind`].

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::codec;
use super::error::Error;
use super::value::{InterfaceTag, Value};

/// A caller-side handle to one remote interface at one address.
///
/// Two proxies are equal iff they carry the same interface and the same
/// address (`spec.md` §4.1); this falls out of the derived `PartialEq` since
/// both fields participate. Serializable as a [`Value::Proxy`] so it can be
/// returned from a remote method, e.g. the naming node handing a storage
/// proxy back to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Proxy {
    interface: InterfaceTag,
    addr: SocketAddr,
}

impl Proxy {
    pub fn new(interface: InterfaceTag, addr: SocketAddr) -> Proxy {
        Proxy { interface, addr }
    }

    pub fn interface(&self) -> InterfaceTag {
        self.interface
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Opens a connection, writes the call frame, reads back one reply
    /// value, and closes the connection (`spec.md` §4.1 steps 1-6).
    ///
    /// Any socket or codec failure is reported as [`Error::Transport`]; a
    /// remote-failure reply is unwrapped into [`Error::Remote`] so the
    /// caller sees the original error kind, not a transport error.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, Error> {
        let mut stream = TcpStream::connect(self.addr).await.map_err(Error::transport)?;

        let mut buf = Vec::new();
        codec::write_call(&mut buf, method, &args).map_err(Error::transport)?;
        stream.write_all(&buf).await.map_err(Error::transport)?;
        stream.shutdown().await.map_err(Error::transport)?;

        let mut reply_buf = Vec::new();
        stream.read_to_end(&mut reply_buf).await.map_err(Error::transport)?;
        let frame = codec::read_reply(&mut reply_buf.as_slice()).map_err(Error::transport)?;

        match frame {
            codec::ReplyFrame::Ok(v) => Ok(v),
            codec::ReplyFrame::RemoteFailure(f) => Err(Error::Remote(f)),
        }
    }
}

impl From<Proxy> for Value {
    fn from(p: Proxy) -> Value {
        Value::Proxy(p.interface, p.addr)
    }
}

impl TryFrom<Value> for Proxy {
    type Error = ();

    fn try_from(v: Value) -> Result<Proxy, ()> {
        v.as_proxy().map(|(interface, addr)| Proxy { interface, addr }).ok_or(())
    }
}

impl std::fmt::Display for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{}", self.interface, self.addr)
    }
}
