//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use crate::storage::{ContentRecord, UrlRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
///
/// The connection sits behind a mutex so one instance can be shared by every
/// worker in the sync pool.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }
}

const URL_COLUMNS: &str = "loc, sitemap_url, last_mod, change_freq, priority";

/// Dated markers first, opaque tokens next, unknown markers last
const MARKER_RANK: &str = "CASE
                 WHEN last_mod GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]*' THEN 0
                 WHEN last_mod IS NOT NULL THEN 1
                 ELSE 2
             END";

const CONTENT_COLUMNS: &str = "url, title, content, summary, body, last_modified";

fn url_record_from_row(row: &Row<'_>) -> rusqlite::Result<UrlRecord> {
    Ok(UrlRecord {
        loc: row.get(0)?,
        sitemap_url: row.get(1)?,
        last_mod: row.get(2)?,
        change_freq: row.get(3)?,
        priority: row.get::<_, Option<f64>>(4)?.map(|p| p as f32),
    })
}

fn content_record_from_row(row: &Row<'_>) -> rusqlite::Result<ContentRecord> {
    Ok(ContentRecord {
        url: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        summary: row.get(3)?,
        body: row.get(4)?,
        last_modified: row.get(5)?,
    })
}

impl Store for SqliteStorage {
    // ===== URL Records =====

    fn find_all_url_records(&self) -> StorageResult<Vec<UrlRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM url_records ORDER BY id",
            URL_COLUMNS
        ))?;

        let records = stmt
            .query_map([], url_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn find_recent_url_records(&self, limit: usize) -> StorageResult<Vec<UrlRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM url_records
             ORDER BY {}, last_mod DESC, id
             LIMIT ?1",
            URL_COLUMNS, MARKER_RANK
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![limit], url_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn url_record_exists(&self, loc: &str) -> StorageResult<bool> {
        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM url_records WHERE loc = ?1",
                params![loc],
                |row| row.get(0),
            )
            .optional()?;
        Ok(existing.is_some())
    }

    fn create_url_record(&self, record: &UrlRecord) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO url_records
             (loc, sitemap_url, last_mod, change_freq, priority, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(loc) DO NOTHING",
            params![
                record.loc,
                record.sitemap_url,
                record.last_mod,
                record.change_freq,
                record.priority.map(f64::from),
                now
            ],
        )?;
        Ok(inserted > 0)
    }

    fn update_url_last_mod(&self, loc: &str, last_mod: Option<&str>) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE url_records SET last_mod = ?1, updated_at = ?2
             WHERE loc = ?3 AND last_mod IS NOT ?1",
            params![last_mod, now, loc],
        )?;
        Ok(changed > 0)
    }

    // ===== Content Records =====

    fn find_content_by_url(&self, url: &str) -> StorageResult<Option<ContentRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM content_records WHERE url = ?1",
            CONTENT_COLUMNS
        ))?;

        let record = stmt
            .query_row(params![url], content_record_from_row)
            .optional()?;

        Ok(record)
    }

    fn create_content_record(&self, record: &ContentRecord) -> StorageResult<bool> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO content_records
             (url, title, content, summary, body, last_modified, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(url) DO NOTHING",
            params![
                record.url,
                record.title,
                record.content,
                record.summary,
                record.body,
                record.last_modified,
                now
            ],
        )?;
        Ok(inserted > 0)
    }

    fn update_content_record(&self, record: &ContentRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE content_records
             SET title = ?1, content = ?2, summary = ?3, body = ?4, last_modified = ?5,
                 updated_at = ?6
             WHERE url = ?7",
            params![
                record.title,
                record.content,
                record.summary,
                record.body,
                record.last_modified,
                now,
                record.url
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::ConstraintViolation(format!(
                "no content record for {}",
                record.url
            )));
        }
        Ok(())
    }

    fn touch_content_last_modified(
        &self,
        url: &str,
        last_mod: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "UPDATE content_records SET last_modified = ?1, updated_at = ?2 WHERE url = ?3",
            params![last_mod, now, url],
        )?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_url_records(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM url_records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_content_records(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM content_records", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
