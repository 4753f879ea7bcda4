//! Raw HTTP client configuration
//!
//! Wire-level knobs (port, read buffer size, timeouts) are injected into the
//! client through this structure instead of being read from globals.

use std::time::Duration;

use crate::constants::http;
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the socket-level HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Port used when a URL does not name one
    pub default_port: u16,
    /// Bytes requested per socket read
    pub buffer_size: usize,
    /// A read that stalls this long ends the response
    pub read_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_port: http::DEFAULT_PORT,
            buffer_size: http::READ_BUFFER_SIZE,
            read_timeout: http::READ_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            tcp_nodelay: true,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.buffer_size < http::MIN_READ_BUFFER_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "client.buffer_size".to_string(),
                value: self.buffer_size.to_string(),
                reason: format!("Must be at least {} bytes", http::MIN_READ_BUFFER_SIZE),
            });
        }

        if self.read_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "client.read_timeout".to_string(),
                value: "0s".to_string(),
                reason: "Read timeout must be greater than zero".to_string(),
            });
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "client.connect_timeout".to_string(),
                value: "0s".to_string(),
                reason: "Connect timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Set the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the port used for URLs without an explicit port
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }
}
