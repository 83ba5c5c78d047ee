/// HTTP server configuration.
///
/// Defaults are compile-time constants; `CHAT_HOST` and `CHAT_PORT` override
/// them at startup (a local `.env` file is loaded first, if present).
use std::env;

use thiserror::Error;

/// Default interface the HTTP server binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port the HTTP server listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Outbound messages a WebSocket session can buffer before deliveries fail.
pub const SESSION_MAILBOX_CAPACITY: usize = 256;

/// Largest single WebSocket frame accepted from a client (16 MiB), enough for photos and voice notes.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Largest message reassembled from continuation frames.
pub const MAX_MESSAGE_SIZE: usize = MAX_FRAME_SIZE;

pub const HOST_VAR: &str = "CHAT_HOST";
pub const PORT_VAR: &str = "CHAT_PORT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} value {value:?}: expected a port number")]
    InvalidPort { var: &'static str, value: String },
}

/// Resolved bind address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup(HOST_VAR).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: PORT_VAR,
                value: port.clone(),
            })?;
        }
        Ok(config)
    }
}
