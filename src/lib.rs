//! Daily Saints: a cached "saint of the day" API
//!
//! This crate scrapes the saint-of-the-day pages of a fixed origin site,
//! turns them into structured records, and serves them over HTTP behind a
//! date-aware cache that a daily job clears and pre-warms.

pub mod api;
pub mod cache;
pub mod config;
pub mod pipeline;
pub mod record;
pub mod service;

use thiserror::Error;

/// Main error type for service setup and operation
#[derive(Debug, Error)]
pub enum SaintsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to retrieve a page from the origin
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Transport { url, .. } | Self::Status { url, .. } => url,
        }
    }
}

/// Failure to turn a fetched page into a saint record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Page has no saint name element")]
    MissingName,

    #[error("Page has no text body element")]
    MissingBody,

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
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

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, SaintsError>;

// Re-export commonly used types
pub use cache::{CacheKey, CacheStore};
pub use config::Config;
pub use pipeline::{
    FetchOrchestrator, PageFetcher, RecordExtractor, RefreshSchedule, RefreshScheduler,
};
pub use record::SaintRecord;
pub use service::{CacheStatus, Lookup, SaintQuery, SaintService};
