//! Storage-node error taxonomy (`spec.md` §4.2, §7): *not-found*, *bounds*,
//! *I/O*, plus the *transport* member every interface must carry.

use std::fmt;
use std::io;

use crate::rpc;

#[derive(Debug)]
pub enum Error {
    /// `p` does not exist, or exists with the wrong kind (file vs directory).
    NotFound,
    /// An `offset`/`length` constraint was violated on `read`/`write`.
    Bounds,
    /// A local filesystem operation failed.
    Io(io::Error),
    /// The RPC call to a storage node could not be completed end-to-end.
    Transport(rpc::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "path not found"),
            Error::Bounds => write!(f, "offset/length out of bounds"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<rpc::Error> for Error {
    /// A [`rpc::Error::Remote`] means the call reached the remote storage
    /// node and it raised a domain error; unwrap it by [`rpc::FailureKind`]
    /// rather than treating it as a transport failure. Only
    /// [`rpc::Error::Transport`] is a genuine transport error.
    fn from(e: rpc::Error) -> Error {
        match e {
            rpc::Error::Remote(f) => Error::from(f),
            transport @ rpc::Error::Transport(_) => Error::Transport(transport),
        }
    }
}

/// Maps a [`rpc::RemoteFailure`] carried back from a storage proxy call onto
/// this module's taxonomy, by `FailureKind`.
impl From<rpc::RemoteFailure> for Error {
    fn from(f: rpc::RemoteFailure) -> Error {
        match f.kind {
            rpc::FailureKind::NotFound => Error::NotFound,
            rpc::FailureKind::Bounds => Error::Bounds,
            rpc::FailureKind::Io => Error::Io(io::Error::new(io::ErrorKind::Other, f.message)),
            _ => Error::Io(io::Error::new(io::ErrorKind::Other, f.to_string())),
        }
    }
}

impl Error {
    /// Converts to the wire's remote-failure envelope (callee side).
    pub fn into_remote_failure(self) -> rpc::RemoteFailure {
        match self {
            Error::NotFound => rpc::RemoteFailure::new(rpc::FailureKind::NotFound, "path not found"),
            Error::Bounds => rpc::RemoteFailure::new(rpc::FailureKind::Bounds, "offset/length out of bounds"),
            Error::Io(e) => rpc::RemoteFailure::with_cause(rpc::FailureKind::Io, "I/O error", e),
            Error::Transport(e) => {
                rpc::RemoteFailure::with_cause(rpc::FailureKind::Io, "upstream transport error", e)
            }
        }
    }
}
