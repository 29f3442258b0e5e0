//! Connect command implementation.

use humandb_client::{run_client, ClientConfig, Shell};
use tokio::io::BufReader;

use super::CliResult;

/// Runs an interactive shell against the server at `host:port`.
pub async fn run(host: String, port: u16) -> CliResult<()> {
    let config = ClientConfig::new(host, port);
    let mut shell = Shell::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    run_client(&config, &mut shell).await?;
    Ok(())
}
