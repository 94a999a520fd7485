use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::constants::defaults;
use crate::error::ConfigError;

#[derive(Debug, Clone, Validate)]
pub struct Config {
    #[validate(length(min = 1))]
    pub environment: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(range(min = 1))]
    pub metrics_port: u16,
    /// Seconds a data-source call may take before it counts as failed.
    #[validate(range(min = 1))]
    pub request_timeout: u64,
    pub log_level: String,
    pub log_format: LogFormat,
    #[validate(nested)]
    pub database: DatabaseConfig,
    #[validate(nested)]
    pub counters: CounterConfig,
}

/// Connection settings for the `test` table's database.
#[derive(Debug, Clone, Validate)]
pub struct DatabaseConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub user: String,
    pub password: String,
    #[validate(length(min = 1))]
    pub charset: String,
    #[validate(range(min = 1))]
    pub max_connections: u32,
    #[validate(range(min = 1))]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CounterConfig {
    pub file: PathBuf,
    pub mode: CounterMode,
    #[validate(range(min = 1))]
    pub flush_interval_secs: u64,
    /// Page-listener path that answers with bare metrics lines.
    #[validate(custom(function = "validate_route_path"))]
    pub metrics_path: String,
}

impl CounterConfig {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    /// Re-read and overwrite the counter file on every request.
    File,
    /// Atomic in-process counters flushed to the file in the background.
    Shared,
}

impl FromStr for CounterMode {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(CounterMode::File),
            "shared" => Ok(CounterMode::Shared),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

fn validate_route_path(path: &str) -> std::result::Result<(), ValidationError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ValidationError::new("route_path_must_start_with_slash"))
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Self::from_vars(|key| env::var(key).ok())?)
    }

    /// Build the config from any variable lookup, then validate it.
    pub fn from_vars<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| defaults::ENVIRONMENT.to_string()),
            port: parsed(&lookup, "PORT", defaults::PORT)?,
            metrics_port: parsed(&lookup, "METRICS_PORT", defaults::METRICS_PORT)?,
            request_timeout: parsed(&lookup, "REQUEST_TIMEOUT", defaults::REQUEST_TIMEOUT_SECS)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| defaults::LOG_LEVEL.to_string()),
            log_format: parsed(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            database: DatabaseConfig {
                host: required(&lookup, "DB_HOST")?,
                port: parsed(&lookup, "DB_PORT", defaults::DB_PORT)?,
                name: required(&lookup, "DB_NAME")?,
                user: required(&lookup, "DB_USER")?,
                password: lookup("DB_PASS").unwrap_or_default(),
                charset: lookup("DB_CHARSET").unwrap_or_else(|| defaults::DB_CHARSET.to_string()),
                max_connections: parsed(
                    &lookup,
                    "DB_MAX_CONNECTIONS",
                    defaults::DB_MAX_CONNECTIONS,
                )?,
                acquire_timeout_secs: parsed(
                    &lookup,
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    defaults::DB_ACQUIRE_TIMEOUT_SECS,
                )?,
            },
            counters: CounterConfig {
                file: lookup("METRICS_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(defaults::METRICS_FILE)),
                mode: parsed(&lookup, "COUNTER_MODE", CounterMode::File)?,
                flush_interval_secs: parsed(
                    &lookup,
                    "COUNTER_FLUSH_INTERVAL_SECS",
                    defaults::COUNTER_FLUSH_INTERVAL_SECS,
                )?,
                metrics_path: lookup("METRICS_PATH")
                    .unwrap_or_else(|| defaults::METRICS_PATH.to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn required<F>(lookup: &F, key: &'static str) -> std::result::Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> std::result::Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
