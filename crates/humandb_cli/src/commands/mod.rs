//! CLI command implementations.

pub mod connect;
pub mod serve;

use humandb_client::ClientError;
use humandb_server::ServerError;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that end the process with a failure status.
#[derive(Error, Debug)]
pub enum CliError {
    /// The server could not start or stopped on an error.
    #[error("{0}")]
    Server(#[from] ServerError),

    /// The client stopped on a fatal error.
    #[error("{0}")]
    Client(#[from] ClientError),
}
