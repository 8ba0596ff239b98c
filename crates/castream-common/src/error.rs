//! Common error types used throughout castream.
//!
//! Invalid arguments signal caller bugs and should fail fast. I/O failures
//! end the affected connection only. Unsupported operations flag calls the
//! stream contract deliberately refuses.

use std::io;

/// Common error type for castream.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument was outside the accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The operation is not supported by this stream.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a new InvalidArgument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new Unsupported error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Io error of the given kind.
    pub fn io<S: Into<String>>(kind: io::ErrorKind, msg: S) -> Self {
        Self::Io(io::Error::new(kind, msg.into()))
    }

    /// Error returned by any read attempted on a closed stream.
    pub fn closed() -> Self {
        Self::io(io::ErrorKind::BrokenPipe, "stream closed")
    }

    /// Whether this is an I/O failure (the only class that ends a connection
    /// rather than indicating a caller bug).
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::InvalidArgument(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
            Error::Unsupported(msg) => io::Error::new(io::ErrorKind::Unsupported, msg),
            Error::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
