//! Statistics generation from the mirror database
//!
//! This module provides functionality for extracting and displaying
//! mirror statistics from the storage layer.

use crate::storage::Store;
use crate::sync::RunSummary;
use crate::MirrorError;

/// Mirror statistics summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStatistics {
    /// Total number of URL records discovered
    pub url_records: u64,

    /// Total number of pages with stored content
    pub content_records: u64,
}

impl MirrorStatistics {
    /// Share of discovered URLs that have content, in percent
    pub fn coverage(&self) -> f64 {
        if self.url_records > 0 {
            (self.content_records as f64 / self.url_records as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The storage backend to query
///
/// # Returns
///
/// * `Ok(MirrorStatistics)` - Successfully loaded statistics
/// * `Err(MirrorError)` - Failed to query statistics
pub fn load_statistics(store: &dyn Store) -> Result<MirrorStatistics, MirrorError> {
    Ok(MirrorStatistics {
        url_records: store.count_url_records()?,
        content_records: store.count_content_records()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &MirrorStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Overview:");
    println!("  URL records: {}", stats.url_records);
    println!("  Content records: {}", stats.content_records);
    println!();

    println!(
        "Coverage: {:.1}% ({} / {} URLs have content)",
        stats.coverage(),
        stats.content_records,
        stats.url_records
    );
}

/// Prints the outcome of a run to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    if !summary.source_failures.is_empty() {
        println!("Failed Sources ({}):", summary.source_failures.len());
        for failure in &summary.source_failures {
            println!("  - {}: {}", failure.source, failure.error);
        }
        println!();
    }

    let contents = &summary.contents;
    println!("Contents:");
    println!("  Working set: {}", contents.total);
    println!("  Skipped (unchanged marker): {}", contents.gated);
    println!("  Created: {}", contents.created);
    println!("  Updated: {}", contents.updated);
    println!("  Identical: {}", contents.identical);
    println!("  Marker refreshed: {}", contents.gate_refreshed);
    println!("  Failed: {}", contents.failed());

    if !contents.failures.is_empty() {
        println!();
        println!("Failed URLs:");
        for failure in &contents.failures {
            println!("  - {}: {}", failure.url, failure.error);
        }
    }
}
