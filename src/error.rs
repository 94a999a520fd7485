use std::path::PathBuf;
use thiserror::Error;

/// The only failure the page surfaces to callers: the table could not be read.
#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    #[error("{message}")]
    Unavailable { message: String },
}

impl DataSourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        DataSourceError::Unavailable {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DataSourceError::Unavailable { message } => message,
        }
    }
}

impl From<sqlx::Error> for DataSourceError {
    fn from(err: sqlx::Error) -> Self {
        DataSourceError::unavailable(err.to_string())
    }
}

/// Counter file persistence failure. Always logged, never returned to clients.
#[derive(Debug, Error)]
pub enum CounterStoreError {
    #[error("Counter file path has no parent directory: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to write counter file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace counter file {path}: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
