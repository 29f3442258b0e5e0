//! Connecting, and reconnecting after the server goes away.

use std::io::Write;

use humandb_protocol::Channel;
use tokio::io::AsyncBufRead;
use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::shell::Shell;

/// Open a channel to the configured server.
///
/// # Errors
///
/// Returns the connection error.
pub async fn connect(config: &ClientConfig) -> ClientResult<Channel<TcpStream>> {
    let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
    stream.set_nodelay(true)?;
    Ok(Channel::with_read_chunk(stream, config.read_chunk))
}

/// Run `shell` against the server, reconnecting whenever the connection
/// is lost.
///
/// Failed connection attempts are counted; a successful one resets the
/// count. Running scripts are dropped on every reconnect.
///
/// # Errors
///
/// Returns [`ClientError::ReconnectExhausted`] after
/// `config.retry.max_attempts` consecutive failures, or the fatal error
/// that ended the shell.
pub async fn run_client<R, W>(config: &ClientConfig, shell: &mut Shell<R, W>) -> ClientResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut failures = 0u32;
    loop {
        match connect(config).await {
            Ok(mut channel) => {
                failures = 0;
                info!(host = %config.host, port = config.port, "connected to server");
                match shell.run(&mut channel).await {
                    Ok(()) => return Ok(()),
                    Err(err) if err.is_disconnect() => {
                        warn!(error = %err, "connection lost");
                        shell.clear_scripts();
                        shell.notice("Connection to the server lost, reconnecting.")?;
                    }
                    Err(err) => return Err(err),
                }
            }
            Err(err) => {
                failures += 1;
                warn!(
                    attempt = failures,
                    max_attempts = config.retry.max_attempts,
                    error = %err,
                    "cannot reach server"
                );
                if failures >= config.retry.max_attempts {
                    return Err(ClientError::ReconnectExhausted { attempts: failures });
                }
                shell.notice(&format!(
                    "Server unreachable, retrying in {} s ({failures}/{}).",
                    config.retry.delay.as_secs(),
                    config.retry.max_attempts
                ))?;
            }
        }
        tokio::time::sleep(config.retry.delay).await;
    }
}
