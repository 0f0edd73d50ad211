//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Cover lookup (RAWG) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoversConfig {
    /// Base URL of the RAWG API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// RAWG API key
    #[serde(default)]
    pub api_key: String,

    /// Delay between lookup calls during a bulk scan
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Timeout in seconds for a single lookup
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://api.rawg.io/api".to_string()
}

fn default_rate_limit() -> u64 {
    500
}

fn default_timeout() -> u64 {
    10
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            rate_limit_ms: default_rate_limit(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Admin authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Hex-encoded SHA-256 digest of the admin password
    #[serde(default = "default_password_sha256")]
    pub password_sha256: String,
}

// Digest of "admin", a placeholder meant to be overridden in config.toml.
fn default_password_sha256() -> String {
    "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password_sha256: default_password_sha256(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub covers: CoversConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./ludoteca.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            covers: CoversConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = if std::path::Path::new(path).exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database_path must not be empty".to_string(),
            ));
        }

        if self.covers.rate_limit_ms == 0 {
            return Err(ConfigError::ValidationError(
                "covers.rate_limit_ms must be greater than 0".to_string(),
            ));
        }

        if url::Url::parse(&self.covers.api_base).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "covers.api_base is not a valid URL: {}",
                self.covers.api_base
            )));
        }

        let digest = &self.admin.password_sha256;
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::ValidationError(
                "admin.password_sha256 must be a 64-char hex digest".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.covers.rate_limit_ms, 500);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            database_path = "/tmp/games.db"

            [server]
            port = 9090

            [covers]
            api_key = "abc123"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/games.db"));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.covers.api_key, "abc123");
        assert_eq!(config.covers.api_base, "https://api.rawg.io/api");
    }

    #[test]
    fn test_validate_rejects_bad_digest() {
        let mut config = AppConfig::default();
        config.admin.password_sha256 = "not-a-digest".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_rate_limit() {
        let mut config = AppConfig::default();
        config.covers.rate_limit_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_api_base() {
        let mut config = AppConfig::default();
        config.covers.api_base = "non-un-url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/config.toml").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
