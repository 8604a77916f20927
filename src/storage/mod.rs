//! Storage module for persisting mirror data
//!
//! This module handles all database operations for the mirror, including:
//! - SQLite database initialization and schema management
//! - URL record persistence (one row per discovered page)
//! - Content record persistence (one row per extracted page)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{StorageError, StorageResult, Store};

use crate::MirrorError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(MirrorError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, MirrorError> {
    Ok(SqliteStorage::new(path)?)
}

/// A page discovered through a sitemap or feed
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// Canonical page URL (unique key)
    pub loc: String,
    /// The sitemap or feed that listed this page
    pub sitemap_url: String,
    /// Normalized change marker; `None` when the source gave nothing usable
    pub last_mod: Option<String>,
    pub change_freq: Option<String>,
    pub priority: Option<f32>,
}

impl UrlRecord {
    pub fn new(loc: impl Into<String>, sitemap_url: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            sitemap_url: sitemap_url.into(),
            last_mod: None,
            change_freq: None,
            priority: None,
        }
    }

    pub fn with_last_mod(mut self, last_mod: impl Into<String>) -> Self {
        self.last_mod = Some(last_mod.into());
        self
    }
}

/// Extracted content of a single page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRecord {
    /// Page URL (unique key, matches `UrlRecord::loc`)
    pub url: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    /// Raw HTML of the page
    pub body: Option<String>,
    /// `UrlRecord::last_mod` at the time this content was captured
    pub last_modified: Option<String>,
}

impl ContentRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}
