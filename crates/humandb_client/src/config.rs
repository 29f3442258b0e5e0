//! Client configuration.

use std::time::Duration;

use humandb_protocol::{DEFAULT_PORT, DEFAULT_READ_CHUNK};

/// How the client retries a server it cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Consecutive failed attempts before giving up.
    pub max_attempts: u32,
    /// Pause before each reconnection attempt.
    pub delay: Duration,
}

impl RetryConfig {
    /// Sets the attempt limit.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Configuration for the shell client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Reconnection policy.
    pub retry: RetryConfig,
    /// Bytes requested per socket read.
    pub read_chunk: usize,
}

impl ClientConfig {
    /// Creates a configuration for the given server.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            retry: RetryConfig::default(),
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }

    /// Sets the reconnection policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the read chunk size.
    pub fn with_read_chunk(mut self, bytes: usize) -> Self {
        self.read_chunk = bytes;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 52052);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay, Duration::from_secs(5));
    }

    #[test]
    fn config_builder() {
        let retry = RetryConfig::default()
            .with_max_attempts(2)
            .with_delay(Duration::from_millis(10));
        let config = ClientConfig::new("db.local", 7000)
            .with_retry(retry)
            .with_read_chunk(256);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.read_chunk, 256);
        assert_eq!(config.host, "db.local");
    }
}
