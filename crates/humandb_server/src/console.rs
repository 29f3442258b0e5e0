//! The operator console.
//!
//! Reads `save` and `exit` from the server's own standard input. It is
//! separate from the network command set and never reachable by clients.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use crate::context::ServerContext;
use crate::error::{ServerError, ServerResult};

/// Why the console stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// The operator typed `exit`.
    Shutdown,
    /// Input ended; the server keeps running.
    InputClosed,
}

/// Read operator commands until `exit` or end of input.
///
/// # Errors
///
/// Returns an error if reading the input or writing the output fails.
pub async fn run_console<R, W>(
    input: R,
    mut output: W,
    context: Arc<ServerContext>,
) -> ServerResult<ConsoleExit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let reply = match line.trim().to_lowercase().as_str() {
            "" => continue,
            "save" => match context.save() {
                Ok(count) => format!("Collection saved ({count} elements)."),
                Err(ServerError::NoStoragePath) => {
                    "No storage file configured, nothing saved.".to_string()
                }
                Err(err) => {
                    error!(error = %err, "failed to save collection");
                    format!("Save failed: {err}")
                }
            },
            "exit" => {
                output.write_all(b"Server stopped.\n").await?;
                output.flush().await?;
                info!("shutdown requested from console");
                return Ok(ConsoleExit::Shutdown);
            }
            _ => "Unknown command. Type 'save' or 'exit'.".to_string(),
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    info!("console input closed, server keeps running");
    Ok(ConsoleExit::InputClosed)
}
