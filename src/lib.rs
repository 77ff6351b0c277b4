//! Baks: a bookmark store with full-text search
//!
//! This crate fetches web pages, extracts their title and description, and keeps
//! them in a SQLite database with a synchronized FTS5 index. Pages can be
//! auto-tagged by host suffix and browsed from the command line or a small
//! read-only HTTP API.

pub mod collector;
pub mod config;
pub mod fetch;
pub mod output;
pub mod server;
pub mod storage;
pub mod tags;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Baks operations
#[derive(Debug, Error)]
pub enum BaksError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error("extract {source_name}: {message}")]
    Anchors {
        source_name: String,
        message: String,
    },

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

    #[error("Cannot determine a default database location")]
    NoDataDir,
}

/// Failures of a single fetch, each carrying the URL that was asked for
///
/// The display form is `visit: <url>: <cause>`; the underlying error stays
/// reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("visit: {url}: invalid url: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: ::url::ParseError,
    },

    #[error("visit: {url}: network: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("visit: {url}: deadline of {}ms exceeded", timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("visit: {url}: HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("visit: {url}: redirection to host root {location}")]
    RedirectToRoot { url: String, location: String },

    #[error("visit: {url}: read failed: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("visit: {url}: failed to extract page content: {source}")]
    Extraction {
        url: String,
        #[source]
        source: ExtractError,
    },
}

impl FetchError {
    /// The URL the failed fetch was asked for
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Network { url, .. }
            | Self::Timeout { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::RedirectToRoot { url, .. }
            | Self::Body { url, .. }
            | Self::Extraction { url, .. } => url,
        }
    }

    /// Returns true if trying the same URL again later could succeed
    ///
    /// Decided on the innermost cause: deadline expiry, connection and
    /// transport failures, HTTP 429 and 5xx are transient; everything else
    /// (bad URL, 4xx, redirect anomaly, extraction) is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Network { source, .. } | Self::Body { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request() || source.is_body()
            }
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Extraction { source, .. } => matches!(source, ExtractError::DeadlineExceeded),
            Self::InvalidUrl { .. } | Self::RedirectToRoot { .. } => false,
        }
    }
}

/// Failures of HTML metadata extraction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("deadline exceeded before the document was parsed")]
    DeadlineExceeded,

    #[error("extraction task ended without a result")]
    TaskAborted,

    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Result type alias for Baks operations
pub type Result<T> = std::result::Result<T, BaksError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use collector::{AddOptions, AddSummary, Collector};
pub use config::Config;
pub use fetch::{FetchOutcome, Fetcher};
pub use storage::{Page, SqliteStorage, Storage, StorageError, TagCount};
pub use tags::{TagResolver, TagRule};
