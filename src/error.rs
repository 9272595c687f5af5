// Error types for skybar.
// Covers provider errors, cache errors, configuration and location errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkybarError {
    #[error("HTTP error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Unreadable cache entry {}: {reason}", path.display())]
    CacheRead { path: PathBuf, reason: String },

    #[error("Failed to write cache entry {}: {reason}", path.display())]
    CacheWrite { path: PathBuf, reason: String },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Missing {0} in configuration")]
    MissingConfig(&'static str),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SkybarError>;
