//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{ContentRecord, UrlRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The sync engine shares one store across all pool workers, so
/// implementations must tolerate concurrent reads and writes. Uniqueness of
/// `UrlRecord::loc` and `ContentRecord::url` is enforced here, not by callers:
/// a create that loses a race reports `false` instead of failing.
pub trait Store: Send + Sync {
    // ===== URL Records =====

    /// Loads every URL record
    fn find_all_url_records(&self) -> StorageResult<Vec<UrlRecord>>;

    /// Loads up to `limit` URL records, most recently modified first.
    /// Records with an unknown `last_mod` sort last.
    fn find_recent_url_records(&self, limit: usize) -> StorageResult<Vec<UrlRecord>>;

    /// Checks whether a URL record with this `loc` exists
    fn url_record_exists(&self, loc: &str) -> StorageResult<bool>;

    /// Inserts a URL record
    ///
    /// # Returns
    ///
    /// `true` if the row was inserted, `false` if `loc` was already present
    fn create_url_record(&self, record: &UrlRecord) -> StorageResult<bool>;

    /// Replaces the change marker of an existing URL record
    ///
    /// # Returns
    ///
    /// `true` if the stored marker was different and has been replaced
    fn update_url_last_mod(&self, loc: &str, last_mod: Option<&str>) -> StorageResult<bool>;

    // ===== Content Records =====

    /// Looks up content by page URL; a missing row is `Ok(None)`
    fn find_content_by_url(&self, url: &str) -> StorageResult<Option<ContentRecord>>;

    /// Inserts a content record
    ///
    /// # Returns
    ///
    /// `true` if the row was inserted, `false` if `url` was already present
    fn create_content_record(&self, record: &ContentRecord) -> StorageResult<bool>;

    /// Overwrites the stored fields of the record keyed by `record.url`
    fn update_content_record(&self, record: &ContentRecord) -> StorageResult<()>;

    /// Replaces only the stored change marker of a content record
    fn touch_content_last_modified(&self, url: &str, last_mod: Option<&str>)
        -> StorageResult<()>;

    // ===== Statistics =====

    /// Gets total URL record count
    fn count_url_records(&self) -> StorageResult<u64>;

    /// Gets total content record count
    fn count_content_records(&self) -> StorageResult<u64>;
}
