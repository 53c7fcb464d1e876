//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// `true` when `APP_ENV=production`; session cookies are then marked `Secure`.
    pub production: bool,
    pub allowed_origin: String,
    pub owner_jwt_secret: String,
    pub admin_jwt_secret: String,
    pub teacher_jwt_secret: Option<String>,
    pub firebase_api_key: Option<String>,
    pub firebase_project_id: Option<String>,
    pub firebase_auth_url: String,
    pub firestore_url: String,
    pub live_query_poll_interval: Duration,
    pub live_query_timeout: Duration,
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("production", &self.production)
            .field("allowed_origin", &self.allowed_origin)
            .field("teacher_sessions", &self.teacher_jwt_secret.is_some())
            .field("firebase_project_id", &self.firebase_project_id)
            .field("firebase_auth_url", &self.firebase_auth_url)
            .field("firestore_url", &self.firestore_url)
            .field("live_query_poll_interval", &self.live_query_poll_interval)
            .field("live_query_timeout", &self.live_query_timeout)
            .finish_non_exhaustive()
    }
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

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let production = lookup("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let allowed_origin =
            lookup("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Signing Secrets ---
        let owner_jwt_secret = required(&lookup, "OWNER_JWT_SECRET")?;
        let admin_jwt_secret = required(&lookup, "ADMIN_JWT_SECRET")?;
        if owner_jwt_secret == admin_jwt_secret {
            return Err(ConfigError::InvalidValue(
                "ADMIN_JWT_SECRET".to_string(),
                "must differ from OWNER_JWT_SECRET".to_string(),
            ));
        }
        let teacher_jwt_secret = lookup("TEACHER_JWT_SECRET").filter(|s| !s.is_empty());

        // --- Firebase Settings (as optional) ---
        let firebase_api_key = lookup("FIREBASE_API_KEY").filter(|s| !s.is_empty());
        let firebase_project_id = lookup("FIREBASE_PROJECT_ID").filter(|s| !s.is_empty());
        let firebase_auth_url =
            lookup("FIREBASE_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let firestore_url =
            lookup("FIRESTORE_URL").unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string());

        let live_query_poll_interval = seconds(&lookup, "LIVE_QUERY_POLL_SECS", 5)?;
        let live_query_timeout = seconds(&lookup, "LIVE_QUERY_TIMEOUT_SECS", 3)?;

        Ok(Self {
            bind_address,
            log_level,
            production,
            allowed_origin,
            owner_jwt_secret,
            admin_jwt_secret,
            teacher_jwt_secret,
            firebase_api_key,
            firebase_project_id,
            firebase_auth_url,
            firestore_url,
            live_query_poll_interval,
            live_query_timeout,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn seconds<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                format!("'{}' is not a positive number of seconds", raw),
            )),
        },
    }
}
