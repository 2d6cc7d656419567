use hostwatch_monitor::error::{ConfigError, MonitorError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Monitor(#[from] MonitorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File already exists: {path}")]
    FileExists { path: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 1,
            CliError::Monitor(MonitorError::Config(_)) => 1,
            CliError::Io(_) => 2,
            CliError::Monitor(MonitorError::Storage(_)) => 2,
            CliError::Monitor(MonitorError::Parse(_)) => 3,
            CliError::InvalidArgument(_) => 64,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Format error for user-friendly display
pub fn format_error(error: &CliError) -> String {
    match error {
        CliError::Config(e) | CliError::Monitor(MonitorError::Config(e)) => {
            format!("Configuration Error: {}\n\nTry running 'hostwatch config show' to check your configuration.", e)
        }
        CliError::Monitor(MonitorError::Parse(e)) => {
            format!("Log Parse Error: {}\n\nThe log is read up to the first malformed line; fix or remove that line and retry.", e)
        }
        CliError::Monitor(MonitorError::Storage(e)) => {
            format!("Storage Error: {}\n\nPlease check that the directory exists and is writable.", e)
        }
        CliError::InvalidArgument(msg) => {
            format!("Invalid Argument: {}\n\nUse 'hostwatch --help' for usage.", msg)
        }
        CliError::FileExists { path } => {
            format!("File Exists: {}\n\nPass --force to overwrite it.", path)
        }
        _ => error.to_string(),
    }
}
