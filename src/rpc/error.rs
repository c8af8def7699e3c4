//! The *transport* member of the crate's error taxonomy (`spec.md` §7).
//!
//! Every interface requires a distinguished transport error among its
//! thrown errors (§4.1); this is that error for every interface in this
//! crate. Domain modules (`storage`, `naming`) wrap it as one variant of
//! their own small `Error` enum rather than making callers match on it
//! directly.

use std::fmt;
use std::io;

use super::failure::RemoteFailure;

/// Raised when an RPC call could not be completed end-to-end: connection
/// refused, a malformed or truncated reply, or any other failure of the
/// network path itself rather than the remote implementation.
#[derive(Debug)]
pub enum Error {
    /// The socket or the wire codec failed.
    Transport(io::Error),
    /// The remote method raised an exception, unwrapped from its
    /// [`RemoteFailure`] envelope. Not a transport failure — the call
    /// reached the remote object and it chose to fail.
    Remote(RemoteFailure),
}

impl Error {
    pub fn transport(cause: io::Error) -> Error {
        Error::Transport(cause)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {e}"),
            Error::Remote(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Remote(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Transport(e)
    }
}
