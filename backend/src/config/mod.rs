//! # Configuration Module
//!
//! This module handles loading and validating configuration from
//! environment variables. All settings are centralized here.
//!
//! ## Usage
//!
//! ```rust,ignore
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("Listening on {}:{}", config.server_host, config.server_port);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `STORE_BACKEND` | `postgres` or `memory` | `postgres` |
//! | `DATABASE_URL` | PostgreSQL connection string (required for `postgres`) | - |
//! | `SERVER_HOST` | HTTP server host | `127.0.0.1` |
//! | `SERVER_PORT` | HTTP server port | `8080` |
//! | `UPLOAD_DIR` | Where uploaded images are written | `uploads` |
//! | `UPLOAD_URL_PREFIX` | URL prefix returned for uploads | `/uploads` |
//! | `MAX_UPLOAD_BYTES` | Largest accepted image | `5242880` |
//! | `CORS_ALLOWED_ORIGIN` | Origin allowed to call the API (`*` for any) | `*` |
//! | `STATS_BROADCAST_INTERVAL` | Seconds between `total_collected` pushes | `30` |
//! | `RUST_LOG` | Log filter | `info` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Failed to parse a value
    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// Which [`DocumentStore`](crate::db::DocumentStore) backend to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at the given URL.
    Postgres { database_url: String },
    /// Process-local maps; data is lost on restart.
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // ==========================================
    // STORAGE SETTINGS
    // ==========================================

    pub store: StoreBackend,

    // ==========================================
    // SERVER SETTINGS
    // ==========================================

    /// Use `127.0.0.1` for localhost only, `0.0.0.0` for all interfaces.
    pub server_host: String,

    pub server_port: u16,

    /// Allowed CORS origin. `*` allows any origin.
    pub cors_allowed_origin: String,

    // ==========================================
    // UPLOAD SETTINGS
    // ==========================================

    /// Directory uploaded images are written to. Created on startup.
    pub upload_dir: PathBuf,

    /// Prefix of the URLs handed back to the admin panel, e.g. `/uploads`.
    pub upload_url_prefix: String,

    /// Uploads larger than this are rejected.
    pub max_upload_bytes: usize,

    // ==========================================
    // LIVE UPDATES
    // ==========================================

    /// How often the total-collected counter is pushed to WebSocket clients (seconds).
    pub stats_broadcast_interval: u64,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store = match get_env_or_default("STORE_BACKEND", "postgres")
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StoreBackend::Postgres {
                database_url: get_env("DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND".to_string(),
                    format!("expected 'postgres' or 'memory', got '{}'", other),
                ))
            }
        };

        let upload_url_prefix = get_env_or_default("UPLOAD_URL_PREFIX", "/uploads")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            store,
            server_host: get_env_or_default("SERVER_HOST", "127.0.0.1"),
            server_port: parse_env("SERVER_PORT", "8080")?,
            cors_allowed_origin: get_env_or_default("CORS_ALLOWED_ORIGIN", "*"),
            upload_dir: PathBuf::from(get_env_or_default("UPLOAD_DIR", "uploads")),
            upload_url_prefix,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", "5242880")?,
            stats_broadcast_interval: parse_env("STATS_BROADCAST_INTERVAL", "30")?,
        })
    }

    /// Configuration for tests and local demos: in-memory store, uploads
    /// under `upload_dir`.
    pub fn in_memory(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreBackend::Memory,
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            cors_allowed_origin: "*".to_string(),
            upload_dir: upload_dir.into(),
            upload_url_prefix: "/uploads".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            stats_broadcast_interval: 30,
        }
    }
}

/// Get a required environment variable.
fn get_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_or_default() {
        let value = get_env_or_default("NONEXISTENT_VAR_12345", "default_value");
        assert_eq!(value, "default_value");
    }

    #[test]
    fn test_parse_env_uses_default() {
        let port: u16 = parse_env("NONEXISTENT_PORT_12345", "9090").unwrap();
        assert_eq!(port, 9090);
        let bad: Result<u16, _> = parse_env("NONEXISTENT_PORT_12345", "not-a-port");
        assert!(matches!(bad, Err(ConfigError::ParseError(_, _))));
    }

    #[test]
    fn test_in_memory_config() {
        let config = AppConfig::in_memory("/tmp/uploads");
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.upload_url_prefix, "/uploads");
    }
}
