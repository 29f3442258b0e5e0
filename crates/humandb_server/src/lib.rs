//! # humandb server
//!
//! Serves one shared collection to any number of TCP clients.
//!
//! This crate provides:
//! - [`Server`], the accept loop, spawning one task per connection
//! - [`serve_connection`], the request loop of a single connection
//! - [`ServerContext`], the store, registry and configuration every task
//!   shares, with the store behind a single lock
//! - [`run_console`], the operator console (`save`, `exit`)
//!
//! # Protocol
//!
//! Each connection alternates strictly: one request in, one response out.
//! `exit` closes the connection without a reply. Unknown commands and
//! malformed requests are answered with a message and the connection stays
//! open. A client that vanishes only ends its own task.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod commands;
mod config;
mod connection;
mod console;
mod context;
mod error;
mod server;

pub use commands::{execute, EMPTY_COLLECTION};
pub use config::ServerConfig;
pub use connection::serve_connection;
pub use console::{run_console, ConsoleExit};
pub use context::{Dispatch, ServerContext};
pub use error::{ServerError, ServerResult};
pub use server::Server;
