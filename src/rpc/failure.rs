//! The remote-failure envelope carried on the wire in place of a successful
//! reply value (`spec.md` §4.1, §6, §9 redesign note "serialized remote
//! exception passthrough").
//!
//! A listener never ships an arbitrary host exception type across the wire;
//! it maps whatever the bound server object raised onto this small tagged
//! union, and the proxy on the other end reconstructs a domain [`Error`] from
//! it rather than re-instantiating the original type.
//!
//! [`Error`]: std::error::Error

use std::fmt;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// The §7 error taxonomy, minus *transport* (the proxy distinguishes a
/// transport failure by never receiving a reply at all, rather than by a
/// `FailureKind` value — see [`crate::rpc::Error`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u8)]
pub enum FailureKind {
    NotFound = 0,
    Bounds = 1,
    Io = 2,
    AlreadyExists = 3,
    AlreadyRegistered = 4,
    ProgrammerError = 5,
}

impl FailureKind {
    pub fn from_u8(b: u8) -> Option<FailureKind> {
        <FailureKind as FromPrimitive>::from_u8(b)
    }
}

/// A remote exception, as carried over the wire.
///
/// `cause_chain` preserves the original error's `source()` chain as display
/// strings — enough for a human or a log line to see what actually failed
/// without attempting to reconstruct an arbitrary `std::error::Error` on the
/// other side of the connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFailure {
    pub kind: FailureKind,
    pub message: String,
    pub cause_chain: Vec<String>,
}

impl RemoteFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> RemoteFailure {
        RemoteFailure { kind, message: message.into(), cause_chain: Vec::new() }
    }

    pub fn with_cause(kind: FailureKind, message: impl Into<String>, cause: impl fmt::Display) -> RemoteFailure {
        RemoteFailure { kind, message: message.into(), cause_chain: vec![cause.to_string()] }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        for cause in &self.cause_chain {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteFailure {}
