//! humandb CLI
//!
//! Runs the collection server or connects a shell to one.
//!
//! # Commands
//!
//! - `serve` - Serve the collection, with an operator console on stdin
//! - `connect` - Open an interactive shell to a server
//! - `version` - Show version information

mod commands;

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::CliResult;
use humandb_protocol::DEFAULT_PORT;
use tokio::runtime::{Builder, Runtime};
use tracing_subscriber::EnvFilter;

/// humandb collection server and client.
#[derive(Parser)]
#[command(name = "humandb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the collection to shell clients
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: IpAddr,

        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Snapshot file loaded at startup and written by `save`
        #[arg(short, long, env = "STORAGE_FILE")]
        storage: Option<PathBuf>,

        /// Close connections idle for this many seconds
        #[arg(long)]
        idle_timeout: Option<u64>,
    },

    /// Connect an interactive shell to a server
    Connect {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match runtime_for(&cli.command) {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: cannot start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// The shell handles one request at a time; only the server needs workers.
fn runtime_for(command: &Commands) -> std::io::Result<Runtime> {
    let mut builder = match command {
        Commands::Serve { .. } => Builder::new_multi_thread(),
        _ => Builder::new_current_thread(),
    };
    builder.enable_all().build()
}

async fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Serve {
            bind,
            port,
            storage,
            idle_timeout,
        } => commands::serve::run(bind, port, storage, idle_timeout).await,
        Commands::Connect { host, port } => commands::connect::run(host, port).await,
        Commands::Version => {
            println!("humandb v{}", env!("CARGO_PKG_VERSION"));
            println!("default port {DEFAULT_PORT}");
            Ok(())
        }
    }
}
