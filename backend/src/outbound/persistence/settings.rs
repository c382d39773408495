//! Document store connection settings loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_MAX_POOL_SIZE: u32 = 10;
const DEFAULT_MIN_POOL_SIZE: u32 = 0;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 45_000;
const DEFAULT_APP_NAME: &str = "dashboard";

/// Raised when the settings cannot produce a usable connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A required value was absent or blank.
    #[error("missing required setting {name}")]
    Missing {
        /// Environment variable name.
        name: &'static str,
    },
    /// A value was present but unusable.
    #[error("invalid setting {name}: {reason}")]
    Invalid {
        /// Environment variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Loading the configuration layers failed.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Raw `MONGODB_*` settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MONGODB")]
pub struct MongoSettings {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub uri: Option<String>,
    /// Database name.
    pub db: Option<String>,
    /// Upper bound on pooled connections.
    pub max_pool_size: Option<u32>,
    /// Connections kept open while idle.
    pub min_pool_size: Option<u32>,
    /// Time allowed to open a connection, in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Time allowed to select a server for an operation, in milliseconds.
    pub socket_timeout_ms: Option<u64>,
    /// Retry reads once on transient failure.
    #[ortho_config(default = true)]
    pub retry_reads: bool,
    /// Retry writes once on transient failure.
    #[ortho_config(default = true)]
    pub retry_writes: bool,
    /// Application name reported to the server.
    pub app_name: Option<String>,
}

/// Validated connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Connection string.
    pub uri: String,
    /// Database name.
    pub database: String,
    /// Upper bound on pooled connections.
    pub max_pool_size: u32,
    /// Connections kept open while idle.
    pub min_pool_size: u32,
    /// Time allowed to open a connection.
    pub connect_timeout: Duration,
    /// Time allowed to select a server.
    pub socket_timeout: Duration,
    /// Retry reads once on transient failure.
    pub retry_reads: bool,
    /// Retry writes once on transient failure.
    pub retry_writes: bool,
    /// Application name reported to the server.
    pub app_name: String,
}

impl ConnectionSettings {
    /// Settings for `uri`/`database` with every other value defaulted.
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            min_pool_size: DEFAULT_MIN_POOL_SIZE,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            socket_timeout: Duration::from_millis(DEFAULT_SOCKET_TIMEOUT_MS),
            retry_reads: true,
            retry_writes: true,
            app_name: DEFAULT_APP_NAME.to_owned(),
        }
    }
}

fn required(value: Option<&String>, name: &'static str) -> Result<String, ConfigurationError> {
    value
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .map(str::to_owned)
        .ok_or(ConfigurationError::Missing { name })
}

impl MongoSettings {
    /// Load settings from the environment and configuration files.
    pub fn load_from_env() -> Result<Self, ConfigurationError> {
        Self::load_from_iter([std::ffi::OsString::from("dashboard")])
            .map_err(|err| ConfigurationError::Load(err.to_string()))
    }

    /// Validate and fill defaults.
    pub fn resolve(&self) -> Result<ConnectionSettings, ConfigurationError> {
        let uri = required(self.uri.as_ref(), "MONGODB_URI")?;
        let database = required(self.db.as_ref(), "MONGODB_DB")?;

        let max_pool_size = self.max_pool_size.unwrap_or(DEFAULT_MAX_POOL_SIZE);
        if max_pool_size == 0 {
            return Err(ConfigurationError::Invalid {
                name: "MONGODB_MAX_POOL_SIZE",
                reason: "must be greater than zero".to_owned(),
            });
        }
        let min_pool_size = self.min_pool_size.unwrap_or(DEFAULT_MIN_POOL_SIZE);
        if min_pool_size > max_pool_size {
            return Err(ConfigurationError::Invalid {
                name: "MONGODB_MIN_POOL_SIZE",
                reason: format!("{min_pool_size} exceeds the maximum of {max_pool_size}"),
            });
        }

        Ok(ConnectionSettings {
            uri,
            database,
            max_pool_size,
            min_pool_size,
            connect_timeout: Duration::from_millis(
                self.connect_timeout_ms
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),
            socket_timeout: Duration::from_millis(
                self.socket_timeout_ms.unwrap_or(DEFAULT_SOCKET_TIMEOUT_MS),
            ),
            retry_reads: self.retry_reads,
            retry_writes: self.retry_writes,
            app_name: self
                .app_name
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_owned()),
        })
    }
}
