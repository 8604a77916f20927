//! Sitemirror: an incremental sitemap-driven site mirror
//!
//! This crate resolves XML sitemap trees (and paginated JSON feeds) into a
//! flat set of page URLs, then fetches and extracts content only for pages
//! that are new or have changed, bounding outbound concurrency throughout.

pub mod config;
pub mod output;
pub mod sitemap;
pub mod storage;
pub mod sync;

use thiserror::Error;

/// Main error type for Sitemirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] sync::FetchError),

    #[error("URL is not a sitemap or sitemapindex: {url}")]
    NotASitemap { url: String },

    #[error("Sitemap parse error for {url}: {message}")]
    SitemapParse { url: String, message: String },

    #[error("Content extraction failed for {url}: {message}")]
    Extract { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
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

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Sitemirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use sitemap::{FeedDiscovery, FeedSource, SitemapResolver, Source};
pub use storage::{ContentRecord, SqliteStorage, Store, UrlRecord};
pub use sync::{ContentSync, SyncOutcome, SyncScheduler, WorkerPool};
