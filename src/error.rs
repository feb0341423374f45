use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced at the program boundary. The simulation itself never fails.
#[derive(Error, Debug)]
pub enum ShowError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid hex color: {0} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("{0}")]
    Usage(String),

    #[error("cannot set up logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, ShowError>;
