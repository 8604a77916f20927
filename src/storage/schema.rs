//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sitemirror database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Pages discovered through sitemaps and feeds
CREATE TABLE IF NOT EXISTS url_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    loc TEXT NOT NULL UNIQUE,
    sitemap_url TEXT NOT NULL,
    last_mod TEXT,
    change_freq TEXT,
    priority REAL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_url_records_sitemap ON url_records(sitemap_url);
CREATE INDEX IF NOT EXISTS idx_url_records_last_mod ON url_records(last_mod);

-- Extracted page content, one row per page URL
CREATE TABLE IF NOT EXISTS content_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT,
    content TEXT,
    summary TEXT,
    body TEXT,
    last_modified TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
