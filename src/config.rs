//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The database URL is either given whole
//! in `DATABASE_URL` or composed from the `DB_*` parts.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::persistence::PoolOptions;

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR `{value}`: {source}")]
    ListenAddr {
        /// The rejected value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// The database URL scheme is not supported.
    #[error("unsupported database scheme `{0}` (expected mysql or sqlite)")]
    UnsupportedDatabase(String),

    /// `LOG_FORMAT` is neither `text` nor `json`.
    #[error("invalid LOG_FORMAT `{0}` (expected text or json)")]
    LogFormat(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::LogFormat(s.to_string())),
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Database connection URL (`mysql://…` or `sqlite:…`).
    pub database_url: String,

    /// Maximum number of concurrently checked-out connections.
    pub database_max_connections: u32,

    /// Seconds to wait for a free connection; 0 waits indefinitely.
    pub database_acquire_timeout_secs: u64,

    /// Whether to create the service's table at startup.
    pub database_bootstrap_schema: bool,

    /// Log output format.
    pub log_format: LogFormat,
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LISTEN_ADDR` or `LOG_FORMAT` is set
    /// but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let listen_value =
            std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let listen_addr = listen_value
            .parse()
            .map_err(|source| ConfigError::ListenAddr {
                value: listen_value.clone(),
                source,
            })?;

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            database_url_from_parts(&DatabaseParts {
                host: env_or("DB_HOST", "localhost"),
                port: parse_env("DB_PORT", 3306),
                user: env_or("DB_USER", "root"),
                password: env_or("DB_PASSWORD", ""),
                database: env_or("DB_NAME", "directory"),
            })
        });

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
            database_acquire_timeout_secs: parse_env("DATABASE_ACQUIRE_TIMEOUT_SECS", 0),
            database_bootstrap_schema: parse_env_bool("DATABASE_BOOTSTRAP_SCHEMA", false),
            log_format,
        })
    }

    /// Pool sizing derived from this configuration.
    #[must_use]
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_connections: self.database_max_connections,
            acquire_timeout: match self.database_acquire_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

/// Connection parameters used when `DATABASE_URL` is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseParts {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login user.
    pub user: String,
    /// Login password; empty means none.
    pub password: String,
    /// Database (schema) name.
    pub database: String,
}

/// Builds a `mysql://` URL from its parts.
///
/// User and password are percent-encoded.
#[must_use]
pub fn database_url_from_parts(parts: &DatabaseParts) -> String {
    let user = urlencoding::encode(&parts.user);
    let credentials = if parts.password.is_empty() {
        user.into_owned()
    } else {
        format!("{user}:{}", urlencoding::encode(&parts.password))
    };
    format!(
        "mysql://{credentials}@{}:{}/{}",
        parts.host, parts.port, parts.database
    )
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}
