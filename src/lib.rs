//! Komitana: an incremental comic catalog harvester
//!
//! This crate crawls comic catalogs (comics → chapters → image links) from
//! paginated web sources and reconciles what it finds into a previously
//! persisted dataset, resuming safely across runs.

pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod extract;
pub mod harvest;
pub mod model;
pub mod output;
pub mod remote;

use thiserror::Error;

/// Main error type for komitana operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog file {path} unreadable: {message}")]
    Catalog { path: String, message: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Remote store error: {0}")]
    Remote(#[from] remote::RemoteError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

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

/// Errors produced by retry-wrapped network operations
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("rate limited (HTTP {status}) at {url}")]
    RateLimited { url: String, status: u16 },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("giving up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },
}

impl FetchError {
    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::RateLimited { .. } | Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Exhausted { .. } => false,
        }
    }

    /// Returns true if the retry should wait out a randomized backoff first
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Errors produced by site extractors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no {what} found at {url}")]
    NoContent { url: String, what: &'static str },

    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Result type alias for komitana operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for network fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use catalog::{slugify, SeedEntry};
pub use checkpoint::{CheckpointState, CheckpointStore};
pub use config::Config;
pub use model::{ChapterRecord, ChapterSet, ComicMetadata, ComicRecord};
pub use remote::{LocalStore, ObjectStore, RemoteError, SupabaseStore};
