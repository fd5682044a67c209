//! Configuration management for the chat relay server
//!
//! Loads settings from an optional `config.toml` with environment overrides
//! and validates them before the server starts.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address or hostname to bind the WebSocket listener
    pub host: String,

    /// Port for the WebSocket listener
    pub port: u16,

    /// Maximum concurrent client connections
    pub max_clients: usize,

    /// Largest text payload relayed, in bytes
    pub max_message_bytes: usize,

    /// Outbound frames queued per connection before sends to it fail
    pub outbound_queue_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            max_clients: 64,
            max_message_bytes: 64 * 1024,
            outbound_queue_size: 32,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment
    /// overrides, e.g. `CHAT_RELAY_PORT=9000`.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_RELAY"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get bind address and port as a socket address string
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Message("host cannot be empty".into()));
        }

        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_message_bytes == 0 {
            return Err(ConfigError::Message(
                "max_message_bytes must be greater than 0".into(),
            ));
        }

        if self.outbound_queue_size == 0 {
            return Err(ConfigError::Message(
                "outbound_queue_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_endpoint() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:8765");
        assert!(config.max_clients > 0);
        assert!(config.outbound_queue_size > 0);
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = ServerConfig {
            max_clients: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            outbound_queue_size: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(ServerConfig::default().validate().is_ok());
    }
}
