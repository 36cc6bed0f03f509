//! Application configuration management.
//!
//! Handles loading, saving, and accessing the client configuration: API
//! endpoint and credentials, asynchronous job settings, and logging.
//! Configuration is persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{HcError, HcResult};
use crate::platform::Platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API endpoint settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Asynchronous job settings.
    #[serde(default)]
    pub jobs: JobConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How responses with a non-2xx status are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Non-2xx responses become `HcError::Api`.
    #[default]
    Strict,
    /// Non-2xx responses are logged and decoded like successes.
    Permissive,
}

/// API endpoint configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the API (e.g., "https://api.example.com/api/v1").
    #[serde(default)]
    pub endpoint: String,

    /// API key. Stored for completeness; requests are not signed.
    #[serde(default)]
    pub api_key: String,

    /// Secret key. Stored for completeness; requests are not signed.
    #[serde(default)]
    pub secret_key: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Collection segment used by the list/add/delete endpoints.
    #[serde(default = "default_resource_path")]
    pub resource_path: String,

    /// Treatment of non-2xx responses.
    #[serde(default)]
    pub status_policy: StatusPolicy,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("resource_path", &self.resource_path)
            .field("status_policy", &self.status_policy)
            .finish()
    }
}

/// Asynchronous job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Wait for add/delete jobs to finish before returning.
    #[serde(default)]
    pub async_mode: bool,

    /// Overall budget for waiting on one job, in seconds.
    #[serde(default = "default_job_timeout")]
    pub timeout_secs: u64,

    /// Delay between job status fetches, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_request_timeout() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_resource_path() -> String {
    constants::DEFAULT_RESOURCE_PATH.to_string()
}

fn default_job_timeout() -> u64 {
    constants::DEFAULT_JOB_TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    constants::DEFAULT_POLL_INTERVAL_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            secret_key: String::new(),
            request_timeout_ms: default_request_timeout(),
            resource_path: default_resource_path(),
            status_policy: StatusPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Per-request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            async_mode: false,
            timeout_secs: default_job_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl JobConfig {
    /// Overall job wait budget as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Poll spacing as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> HcResult<Self> {
        Self::load_or_default(&Self::default_config_path()?)
    }

    /// Load configuration from `path`, or the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> HcResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> HcResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.server.endpoint = Self::sanitize_endpoint(&config.server.endpoint);
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> HcResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| HcError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> HcResult<PathBuf> {
        let config_dir = Platform::config_dir()?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> HcResult<PathBuf> {
        if self.logging.directory.is_empty() {
            let data_dir = Platform::data_dir()?;
            Ok(data_dir.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Check whether an endpoint has been configured.
    pub fn is_endpoint_configured(&self) -> bool {
        !self.server.endpoint.is_empty()
    }

    /// Sanitize and normalize an endpoint URL.
    ///
    /// Strips surrounding whitespace and quotes, adds `http://` when no
    /// scheme is present, and drops trailing slashes.
    pub fn sanitize_endpoint(endpoint: &str) -> String {
        let trimmed = endpoint.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}

/// Thread-safe configuration holder for shared access across commands.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }

    /// Save the current configuration to the given path.
    pub async fn save_to(&self, path: &Path) -> HcResult<()> {
        let config = self.inner.read().await;
        config.save_to_file(path)
    }
}
