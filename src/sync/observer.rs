//! Sync progress observation
//!
//! The scheduler reports what happens during a run through a `SyncObserver`
//! handed to it at construction. `TracingObserver` forwards every event to
//! `tracing`, which is what the binary uses.

use crate::sitemap::Source;
use crate::MirrorError;

/// Receives progress and failure events from the sync scheduler
///
/// Methods are called from pool workers, possibly concurrently.
pub trait SyncObserver: Send + Sync {
    /// A source finished syncing; `created` counts newly stored URL records
    fn on_source_synced(&self, source: &Source, discovered: usize, created: usize);

    /// A source could not be synced
    fn on_source_failed(&self, source: &Source, error: &MirrorError);

    /// Content sync of one URL failed
    fn on_item_failed(&self, url: &str, error: &MirrorError);

    /// `completed` of `total` content syncs have finished
    fn on_progress(&self, completed: usize, total: usize);
}

/// Logs sync events with `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn on_source_synced(&self, source: &Source, discovered: usize, created: usize) {
        tracing::info!(%source, discovered, created, "Completed syncing source");
    }

    fn on_source_failed(&self, source: &Source, error: &MirrorError) {
        tracing::error!(%source, error = %error, "Failed to sync source");
    }

    fn on_item_failed(&self, url: &str, error: &MirrorError) {
        tracing::error!(url, error = %error, "Failed to sync content");
    }

    fn on_progress(&self, completed: usize, total: usize) {
        tracing::info!("Completed {} out of {}", completed, total);
    }
}
