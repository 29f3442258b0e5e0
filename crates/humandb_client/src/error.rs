//! Error types for the shell client.

use std::path::PathBuf;

use humandb_protocol::ProtocolError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the shell client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The command got the wrong number of inline arguments.
    #[error("wrong number of arguments: expected {expected}, got {actual}")]
    CommandArgument {
        /// Arguments the command takes.
        expected: usize,
        /// Arguments given.
        actual: usize,
    },

    /// An argument or field value failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The command name is not registered.
    #[error("unknown command {0:?}, type 'help' for the list of commands")]
    UnknownCommand(String),

    /// A script could not be opened or contained a bad line.
    #[error("script {}: {reason}", path.display())]
    Script {
        /// Script path as given or resolved.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A script runs itself, directly or through other scripts.
    #[error("script {} calls itself recursively", .0.display())]
    ScriptRecursion(PathBuf),

    /// The server stayed unreachable.
    #[error("server unreachable after {attempts} attempts")]
    ReconnectExhausted {
        /// Consecutive failed attempts.
        attempts: u32,
    },

    /// Standard input ended.
    #[error("console input closed")]
    ConsoleClosed,

    /// Envelope or transport failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Console or terminal I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create an invalid input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns true if the error ends the client with a non-zero status.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::ScriptRecursion(_)
                | ClientError::ReconnectExhausted { .. }
                | ClientError::ConsoleClosed
                | ClientError::Io(_)
        )
    }

    /// Returns true if the connection to the server is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ClientError::Protocol(err) if err.is_disconnect())
    }
}
