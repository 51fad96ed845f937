//! Configuration loading for the soletrack sync service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `SOLETRACK_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration derived from `SOLETRACK_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub stockx: StockxConfig,
    #[serde(default)]
    pub alias: AliasConfig,
}

/// Batch-worker configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WorkerConfig {
    /// Maximum number of jobs claimed per batch run.
    #[serde(default = "default_worker_batch_limit")]
    pub batch_limit: u64,
    /// Attempt ceiling stamped onto newly enqueued jobs.
    #[serde(default = "default_worker_max_attempts")]
    pub max_attempts: i32,
    /// Fixed inter-job delay, rate-limit courtesy to the providers.
    #[serde(default = "default_worker_pacing_ms")]
    pub pacing_ms: u64,
    /// Per-job ceiling on the adapter call before it is failed as transient.
    #[serde(default = "default_worker_job_timeout_seconds")]
    pub job_timeout_seconds: u64,
}

/// StockX adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StockxConfig {
    #[serde(default = "default_stockx_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Alias/GOAT adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AliasConfig {
    #[serde(default = "default_alias_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost:5432/soletrack".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_worker_batch_limit() -> u64 {
    20
}

fn default_worker_max_attempts() -> i32 {
    5
}

fn default_worker_pacing_ms() -> u64 {
    1_500
}

fn default_worker_job_timeout_seconds() -> u64 {
    120
}

fn default_stockx_api_base() -> String {
    "https://api.stockx.com".to_string()
}

fn default_alias_api_base() -> String {
    "https://api.alias.org".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            worker: WorkerConfig::default(),
            stockx: StockxConfig::default(),
            alias: AliasConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_limit: default_worker_batch_limit(),
            max_attempts: default_worker_max_attempts(),
            pacing_ms: default_worker_pacing_ms(),
            job_timeout_seconds: default_worker_job_timeout_seconds(),
        }
    }
}

impl Default for StockxConfig {
    fn default() -> Self {
        Self {
            api_base: default_stockx_api_base(),
            api_key: None,
        }
    }
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            api_base: default_alias_api_base(),
            api_key: None,
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("database url must not be empty")]
    EmptyDatabaseUrl,
    #[error("worker batch limit must be at least 1")]
    InvalidBatchLimit,
    #[error("worker max attempts must be at least 1, got {value}")]
    InvalidMaxAttempts { value: i32 },
    #[error("worker job timeout must be at least 1 second")]
    InvalidJobTimeout,
}

impl AppConfig {
    /// Resolve the configured API bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.api_bind_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: self.api_bind_addr.clone(),
                source,
            })
    }

    /// Serialize the configuration with provider API keys redacted.
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut redacted = self.clone();
        if redacted.stockx.api_key.is_some() {
            redacted.stockx.api_key = Some("***".to_string());
        }
        if redacted.alias.api_key.is_some() {
            redacted.alias.api_key = Some("***".to_string());
        }
        serde_json::to_string(&redacted)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if self.worker.batch_limit == 0 {
            return Err(ConfigError::InvalidBatchLimit);
        }
        if self.worker.max_attempts < 1 {
            return Err(ConfigError::InvalidMaxAttempts {
                value: self.worker.max_attempts,
            });
        }
        if self.worker.job_timeout_seconds == 0 {
            return Err(ConfigError::InvalidJobTimeout);
        }
        Ok(())
    }
}

/// Loads [`AppConfig`] from layered `.env` files and process environment.
///
/// Precedence, lowest to highest: `.env`, `.env.local`, `.env.<profile>`,
/// `.env.<profile>.local`, process environment.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("SOLETRACK_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);

        let worker = WorkerConfig {
            batch_limit: layered
                .remove("WORKER_BATCH_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_worker_batch_limit),
            max_attempts: layered
                .remove("WORKER_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_worker_max_attempts),
            pacing_ms: layered
                .remove("WORKER_PACING_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_worker_pacing_ms),
            job_timeout_seconds: layered
                .remove("WORKER_JOB_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_worker_job_timeout_seconds),
        };

        let stockx = StockxConfig {
            api_base: layered
                .remove("STOCKX_API_BASE")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_stockx_api_base),
            api_key: layered.remove("STOCKX_API_KEY").filter(|v| !v.is_empty()),
        };

        let alias = AliasConfig {
            api_base: layered
                .remove("ALIAS_API_BASE")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_alias_api_base),
            api_key: layered.remove("ALIAS_API_KEY").filter(|v| !v.is_empty()),
        };

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            worker,
            stockx,
            alias,
        };

        config.validate()?;
        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("SOLETRACK_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("SOLETRACK_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
