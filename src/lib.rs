//! FileStack — a small distributed file system: a custom RPC transport, a
//! naming node holding the authoritative directory tree, and storage nodes
//! owning the on-disk bytes of registered files.
//!
//! - [`rpc`] — the transport: [`rpc::Listener`]/[`rpc::Proxy`] and the wire
//!   codec carrying typed method calls over a fresh TCP connection per call.
//! - [`path`] — the immutable, ordered path data type shared by every
//!   interface.
//! - [`storage`] — the storage node: local-filesystem file I/O plus
//!   namespace mutation, reachable over two RPC interfaces.
//! - [`naming`] — the naming node: the directory tree, storage
//!   registration, and client metadata operations.
//! - [`config`] — the well-known ports and the two nodes' configuration
//!   types.

pub mod config;
pub mod naming;
pub mod path;
pub mod rpc;
pub mod storage;
