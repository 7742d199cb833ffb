//! Service configuration loaded from `WATCH_*` environment variables.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {prefix}* variables: {source}")]
    Env {
        prefix: &'static str,
        #[source]
        source: envy::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub quota: QuotaConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of streams a single user may watch at once.
    #[serde(default = "default_quota_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_keep_alive_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "watching".to_string()
}

fn default_command_timeout_ms() -> u64 {
    1000
}

fn default_quota_limit() -> usize {
    3
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl RedisConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let config = Self {
            server: section("WATCH_SERVER_", &vars)?,
            redis: section("WATCH_REDIS_", &vars)?,
            quota: section("WATCH_QUOTA_", &vars)?,
            log: section("WATCH_LOG_", &vars)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.quota.limit == 0 {
            return Err(ConfigError::Invalid(
                "WATCH_QUOTA_LIMIT must be at least 1".to_string(),
            ));
        }
        if self.redis.command_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "WATCH_REDIS_COMMAND_TIMEOUT_MS must be positive".to_string(),
            ));
        }
        if self.redis.key_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "WATCH_REDIS_KEY_PREFIX must not be empty".to_string(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::Invalid(
                "WATCH_SERVER_WORKERS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn section<T>(prefix: &'static str, vars: &[(String, String)]) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
{
    envy::prefixed(prefix)
        .from_iter(vars.iter().cloned())
        .map_err(|source| ConfigError::Env { prefix, source })
}
