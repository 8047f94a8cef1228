//! Kattrack: a cached tracker for solved judge-site problems
//!
//! This crate keeps a local cache of a user's solved problems on an online
//! judge fresh by periodically walking the site's paginated solved-problems
//! listing and enriching each problem with runtime statistics. It crawls
//! politely (one shared pacing budget for every outbound request), renews
//! its session cookie when the site logs it out, and serves the last
//! committed snapshot while a background refresh is running.

pub mod config;
pub mod model;
pub mod notify;
pub mod refresh;
pub mod scrape;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Main error type for kattrack operations
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request to {url} returned status {status}")]
    Fetch { url: String, status: u16 },

    #[error("Failed to parse page {url}: {message}")]
    Parse { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Persist(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Enrichment task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for kattrack operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{ProblemRecord, ProblemStub, TopPlacement};
pub use refresh::{RefreshCoordinator, TrackerView};
