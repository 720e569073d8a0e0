//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads an optional `.env` file first.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address the server binds to
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub max_connections: u32,

    /// Default log filter, overridden by RUST_LOG
    pub log_level: String,

    /// Largest accepted upload body in bytes (default: 5MB)
    pub max_upload_bytes: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            host: env::var("TALLY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: parsed("TALLY_PORT", "8080")?,

            database_path: env::var("TALLY_DATABASE_PATH")
                .unwrap_or_else(|_| "./data/tally.db".to_string()),

            max_connections: parsed("TALLY_MAX_CONNECTIONS", "5")?,

            log_level: env::var("TALLY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            max_upload_bytes: parsed("TALLY_MAX_UPLOAD_BYTES", "5242880")?, // 5MB
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TALLY_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "./data/tally.db".to_string(),
            max_connections: 5,
            log_level: "info".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

fn parsed<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_values() {
        assert_eq!(parsed::<u16>("TALLY_TEST_UNSET_PORT", "8080").unwrap(), 8080);

        env::set_var("TALLY_TEST_BAD_PORT", "eighty");
        assert!(matches!(
            parsed::<u16>("TALLY_TEST_BAD_PORT", "8080"),
            Err(ConfigError::InvalidValue(name)) if name == "TALLY_TEST_BAD_PORT"
        ));
    }

    #[test]
    fn test_bind_address() {
        let config = ApiConfig {
            port: 9000,
            ..ApiConfig::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }
}
