//! Infrastructure error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by finale's fallible operations.
///
/// Application-level failures (bad input, invalid tokens, etc.) are expressed
/// as [`StructuredError`](crate::StructuredError) values recorded on the
/// request [`Context`](crate::Context), not as `Error`s. This type surfaces
/// host failures: parsing the bind address or binding the listener.
#[derive(Debug)]
pub enum Error {
    Addr(AddrParseError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(e) => write!(f, "invalid socket address: {e}"),
            Self::Io(e)   => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Addr(e) => Some(e),
            Self::Io(e)   => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}
