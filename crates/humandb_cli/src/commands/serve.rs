//! Serve command implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use humandb_server::{run_console, ConsoleExit, Server, ServerConfig, ServerContext};
use tokio::io::BufReader;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::CliResult;

/// Runs the server until `exit` on the console or Ctrl-C.
pub async fn run(
    bind: IpAddr,
    port: u16,
    storage: Option<PathBuf>,
    idle_timeout: Option<u64>,
) -> CliResult<()> {
    let mut config = ServerConfig::new(SocketAddr::new(bind, port));
    if let Some(path) = storage {
        config = config.with_storage_path(path);
    }
    if let Some(secs) = idle_timeout {
        config = config.with_idle_timeout(Duration::from_secs(secs));
    }

    let context = ServerContext::load(config)?;
    info!(
        elements = context.with_store(|s| s.len()),
        "collection loaded"
    );
    let server = Server::bind(context).await?;

    let (stop, stopped) = oneshot::channel::<()>();
    let console_context = server.context();
    tokio::spawn(async move {
        let input = BufReader::new(tokio::io::stdin());
        match run_console(input, tokio::io::stdout(), console_context).await {
            Ok(ConsoleExit::Shutdown) => {
                let _ = stop.send(());
            }
            Ok(ConsoleExit::InputClosed) => {}
            Err(err) => error!(error = %err, "operator console failed"),
        }
    });

    server
        .run_until(async {
            // A dropped sender means the console is gone, not a shutdown.
            let console_exit = async {
                if stopped.await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let ctrl_c = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!(error = ?err, "failed to install ctrl-c handler");
                    std::future::pending::<()>().await;
                }
                info!("ctrl-c received");
            };
            tokio::select! {
                _ = console_exit => {}
                _ = ctrl_c => {}
            }
        })
        .await?;
    Ok(())
}
