//! The custom RPC transport (`spec.md` §4.1): a listener/proxy pair that
//! carries typed method calls over a fresh TCP connection per call.
//!
//! Submodules:
//! - [`value`] — the wire value type and the interface/type tags.
//! - [`codec`] — the length-prefixed, tagged-value framing built on it.
//! - [`failure`] — the remote-exception envelope.
//! - [`error`] — the transport member of the crate's error taxonomy.
//! - [`listener`] — the callee side (`Dispatch`, `Listener`, `ListenerHandle`).
//! - [`proxy`] — the caller side (`Proxy`).

pub mod codec;
pub mod error;
pub mod failure;
pub mod listener;
pub mod proxy;
pub mod value;

pub use error::Error;
pub use failure::{FailureKind, RemoteFailure};
pub use listener::{Dispatch, Listener, ListenerDecision, ListenerHandle};
pub use proxy::Proxy;
pub use value::{InterfaceTag, TypeTag, Value};
