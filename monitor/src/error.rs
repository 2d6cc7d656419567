//! Error handling for Hostwatch
//!
//! Errors are grouped by the unit of work they interrupt: storage failures end
//! the current tick or report run, parse failures end a log read, provider
//! failures are absorbed by the sampler, configuration failures stop startup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for the monitor library
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Sample log I/O errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed stored records
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A metric could not be read from the operating system
    #[error("Provider unavailable: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Chart backend errors
    #[error("Chart rendering error: {0}")]
    Chart(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Sample log I/O errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Directory creation failed: {}: {}", .path.display(), .source)]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("Failed to open {}: {}", .path.display(), .source)]
    OpenFailed { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {}", .path.display(), .source)]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("Failed to read {}: {}", .path.display(), .source)]
    ReadFailed { path: PathBuf, source: io::Error },
}

/// Stored record decoding errors
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{}:{line}: malformed record: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
}

/// Metrics provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("No mounted disk contains {}", .mount.display())]
    MountNotFound { mount: PathBuf },

    #[error("Metric unavailable: {metric}")]
    MetricUnavailable { metric: String },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration loading failed: {reason}")]
    Load { reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MonitorError>;

/// A specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl MonitorError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MonitorError::Storage(_) => "storage",
            MonitorError::Parse(_) => "parse",
            MonitorError::Provider(_) => "provider",
            MonitorError::Config(_) => "config",
            MonitorError::Chart(_) => "chart",
            MonitorError::Serialization(_) => "serialization",
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load {
            reason: err.to_string(),
        }
    }
}
