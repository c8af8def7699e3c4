//! Naming-node error taxonomy (`spec.md` §4.3, §7): *not-found*,
//! *already-registered*, plus the *transport* member every interface must
//! carry.
//!
//! *Already-exists* is conflated with a `false` return from `createFile`/
//! `createDirectory` (§7); no error variant is needed for it. Programmer
//! errors (null path, deleting root via the namespace's own notion of
//! illegality) are raised as `panic!` at call sites that would otherwise be
//! unreachable from a well-behaved client, not modeled as `Error` variants.

use std::fmt;
use std::io;

use crate::rpc;
use crate::storage;

#[derive(Debug)]
pub enum Error {
    /// The named path does not exist, or is not the kind the operation
    /// expects (file vs. directory).
    NotFound,
    /// `register` was called with a data proxy that is already known.
    AlreadyRegistered,
    /// A call to a storage node's control proxy could not be completed.
    Transport(rpc::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "path not found"),
            Error::AlreadyRegistered => write!(f, "storage node is already registered"),
            Error::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rpc::Error> for Error {
    fn from(e: rpc::Error) -> Error {
        match e {
            rpc::Error::Remote(f) => match f.kind {
                rpc::FailureKind::NotFound => Error::NotFound,
                rpc::FailureKind::AlreadyRegistered => Error::AlreadyRegistered,
                _ => Error::Transport(rpc::Error::Remote(f)),
            },
            transport @ rpc::Error::Transport(_) => Error::Transport(transport),
        }
    }
}

/// A storage call made during a namespace mutation (`createFile`'s
/// `control.create`) failed. Only a genuine [`rpc::Error::Transport`] inside
/// it is distinguished by kind; every other storage-side failure has no
/// meaning in the naming node's own taxonomy, so it is reported as a
/// transport error the same way `delete_file`/`delete_directory` treat a
/// failed replica call.
impl From<storage::Error> for Error {
    fn from(e: storage::Error) -> Error {
        match e {
            storage::Error::Transport(t) => Error::from(t),
            other => Error::Transport(rpc::Error::Transport(io::Error::new(io::ErrorKind::Other, other.to_string()))),
        }
    }
}

impl Error {
    pub fn into_remote_failure(self) -> rpc::RemoteFailure {
        match self {
            Error::NotFound => rpc::RemoteFailure::new(rpc::FailureKind::NotFound, "path not found"),
            Error::AlreadyRegistered => {
                rpc::RemoteFailure::new(rpc::FailureKind::AlreadyRegistered, "storage node is already registered")
            }
            Error::Transport(e) => rpc::RemoteFailure::with_cause(
                rpc::FailureKind::Io,
                "storage call failed during namespace mutation",
                e,
            ),
        }
    }
}
