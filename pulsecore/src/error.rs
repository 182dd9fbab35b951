//! Errors raised while loading startup configuration.
//!
//! The scheduler itself never fails; bad values are clamped.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
