//! Error types for the collection server.

use humandb_core::CoreError;
use humandb_protocol::ProtocolError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the collection server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Envelope or transport failure on a connection.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Snapshot load or save failed.
    #[error("storage error: {0}")]
    Core(#[from] CoreError),

    /// `save` was requested but no snapshot file is configured.
    #[error("no storage file configured")]
    NoStoragePath,

    /// I/O error on the listener or the console.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if the error only means a peer went away.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ServerError::Protocol(err) => err.is_disconnect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::from(ProtocolError::Closed).is_disconnect());
        assert!(!ServerError::NoStoragePath.is_disconnect());
        assert!(!ServerError::from(ProtocolError::decode("bad")).is_disconnect());
    }

    #[test]
    fn error_display() {
        let err = ServerError::from(CoreError::UnknownId(4));
        assert_eq!(err.to_string(), "storage error: no record with id 4");
    }
}
