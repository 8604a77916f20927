//! Configuration module for Sitemirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Syncing {} sitemaps", config.sitemap.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractConfig, FeedEntry, GatePolicy, OutputConfig, SitemapEntry, SyncConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

use crate::sitemap::{FeedSource, Source};

impl Config {
    /// Entry points for source sync, sitemaps first, in file order
    pub fn sources(&self) -> Vec<Source> {
        let sitemaps = self.sitemap.iter().map(|entry| Source::Sitemap {
            url: entry.url.clone(),
        });

        let feeds = self.feed.iter().map(|entry| {
            Source::Feed(FeedSource {
                url: entry.url.clone(),
                per_page: entry.per_page,
                user_agent: entry.user_agent.clone(),
            })
        });

        sitemaps.chain(feeds).collect()
    }
}
