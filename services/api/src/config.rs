//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use book_exchange_core::AuthScheme;
use chrono::Duration;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub data_dir: PathBuf,
    pub log_level: Level,
    pub auth_mode: AuthScheme,
    pub session_ttl: Duration,
    pub cors_origin: String,
    pub cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server and Storage Settings ---
        let bind_address_str = var("BIND_ADDRESS", "0.0.0.0:8080");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let data_dir = PathBuf::from(var("DATA_DIR", "./data"));

        let log_level_str = var("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Identity Settings ---
        let auth_mode = match var("AUTH_MODE", "session").to_lowercase().as_str() {
            "session" => AuthScheme::Session,
            "basic" => AuthScheme::Basic,
            other => {
                return Err(ConfigError::InvalidValue(
                    "AUTH_MODE".to_string(),
                    format!("'{}' is not one of 'session' or 'basic'", other),
                ))
            }
        };

        let ttl_str = var("SESSION_TTL_HOURS", "24");
        let session_ttl = ttl_str
            .parse::<i64>()
            .ok()
            .filter(|hours| (1..=MAX_SESSION_TTL_HOURS).contains(hours))
            .map(Duration::hours)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_TTL_HOURS".to_string(),
                    format!(
                        "'{}' is not a number of hours between 1 and {}",
                        ttl_str, MAX_SESSION_TTL_HOURS
                    ),
                )
            })?;

        // --- Browser Settings ---
        let cors_origin = var("CORS_ORIGIN", "http://localhost:3000");

        let cookie_secure_str = var("COOKIE_SECURE", "false");
        let cookie_secure = cookie_secure_str.parse::<bool>().map_err(|_| {
            ConfigError::InvalidValue(
                "COOKIE_SECURE".to_string(),
                format!("'{}' is not 'true' or 'false'", cookie_secure_str),
            )
        })?;

        Ok(Self {
            bind_address,
            data_dir,
            log_level,
            auth_mode,
            session_ttl,
            cors_origin,
            cookie_secure,
        })
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join("books.json")
    }
}
