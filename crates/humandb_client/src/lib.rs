//! # humandb client
//!
//! Line-oriented shell for a humandb server.
//!
//! Commands are read from the console, or from script files started with
//! `execute_script`. Records and keys are entered field by field; inside a
//! script every field is one line and a bad value aborts the script. When
//! the server goes away the client retries with a fixed delay, and gives up
//! after a number of consecutive failures.
//!
//! ```no_run
//! use humandb_client::{run_client, ClientConfig, Shell};
//! use tokio::io::BufReader;
//!
//! # async fn example() -> humandb_client::ClientResult<()> {
//! let config = ClientConfig::default();
//! let mut shell = Shell::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
//! run_client(&config, &mut shell).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod connector;
mod error;
pub mod form;
mod input;
mod request;
mod shell;

pub use config::{ClientConfig, RetryConfig};
pub use connector::{connect, run_client};
pub use error::{ClientError, ClientResult};
pub use form::{Form, FIELD_PROMPT};
pub use input::InputStack;
pub use request::{build_request, split_line};
pub use shell::{Shell, COMMAND_PROMPT};
