//! Error types for Spilliste.

use thiserror::Error;

/// Library-level error type for Spilliste operations.
#[derive(Error, Debug)]
pub enum SpillisteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YouTube API error: {0}")]
    Upstream(String),

    #[error("Caption fetch failed: {0}")]
    Captions(String),

    #[error("Summary generation failed: {0}")]
    Summary(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Spilliste operations.
pub type Result<T> = std::result::Result<T, SpillisteError>;
