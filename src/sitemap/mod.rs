//! URL discovery
//!
//! This module turns configured entry points into URL records:
//! - XML sitemaps and one level of sitemap index (`resolver`, `xml`)
//! - Paginated JSON feeds (`feed`)

mod feed;
mod resolver;
mod xml;

pub use feed::{date_token, page_url, FeedDiscovery, FeedSource, MAX_PAGES};
pub use resolver::{dedup_by_loc, SitemapResolver, DEFAULT_POLITENESS_DELAY};
pub use xml::{normalize_last_mod, parse_index, parse_urlset, IndexEntry};

use std::fmt;

/// One entry point handed to source sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A sitemap or sitemap index URL
    Sitemap { url: String },
    /// A paginated JSON feed
    Feed(FeedSource),
}

impl Source {
    pub fn sitemap(url: impl Into<String>) -> Self {
        Self::Sitemap { url: url.into() }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Sitemap { url } => url,
            Self::Feed(feed) => &feed.url,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sitemap { url } => write!(f, "sitemap {}", url),
            Self::Feed(feed) => write!(f, "feed {}", feed.url),
        }
    }
}
