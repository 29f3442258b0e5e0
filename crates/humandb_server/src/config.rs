//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use humandb_protocol::{DEFAULT_PORT, DEFAULT_READ_CHUNK};

/// Configuration for the collection server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Snapshot file loaded at startup and written by `save`.
    pub storage_path: Option<PathBuf>,
    /// Close a connection that sends nothing for this long.
    pub idle_timeout: Option<Duration>,
    /// Bytes requested per socket read.
    pub read_chunk: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            storage_path: None,
            idle_timeout: None,
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }

    /// Sets the snapshot file.
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Sets the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Sets the read chunk size.
    pub fn with_read_chunk(mut self, bytes: usize) -> Self {
        self.read_chunk = bytes;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
    }
}
