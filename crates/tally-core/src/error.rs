//! Error types for Tally
//!
//! Nothing in the budget session is allowed to halt it. These errors surface
//! at component boundaries (loading config, touching the data directory) and
//! the session converts them into log lines or safe defaults.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to parse stored {key}: {message}")]
    Parse { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
