//! Change detection and per-URL content upsert
//!
//! `ContentSync::sync_one` decides, for one URL record, whether the page has
//! to be fetched at all, and if so whether the stored content needs to be
//! created, updated field by field, or left alone.

use crate::config::GatePolicy;
use crate::storage::{ContentRecord, Store, UrlRecord};
use crate::sync::extractor::ContentExtractor;
use crate::sync::fetcher::Fetcher;
use crate::MirrorError;
use std::sync::Arc;

/// What `sync_one` did for a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Change markers matched; nothing was fetched or written
    Unchanged,
    /// No content existed; the extracted record was stored
    Created,
    /// Stored content differed; only the listed fields were rewritten
    Updated { fields: Vec<&'static str> },
    /// Extracted content equals the stored content, or another worker stored
    /// it first; nothing was written
    Identical,
    /// Extracted content equals the stored content; only the stored change
    /// marker was advanced
    GateRefreshed,
}

/// Per-URL content synchronizer shared by all pool workers
#[derive(Clone)]
pub struct ContentSync {
    store: Arc<dyn Store>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn ContentExtractor>,
    gate_policy: GatePolicy,
}

impl ContentSync {
    pub fn new(
        store: Arc<dyn Store>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn ContentExtractor>,
    ) -> Self {
        Self {
            store,
            fetcher,
            extractor,
            gate_policy: GatePolicy::default(),
        }
    }

    pub fn with_gate_policy(mut self, gate_policy: GatePolicy) -> Self {
        self.gate_policy = gate_policy;
        self
    }

    /// Brings the stored content of `record` up to date
    ///
    /// # Steps
    ///
    /// 1. Look up existing content for `record.loc`
    /// 2. If it exists and both change markers are known and equal, stop
    /// 3. Fetch the page and extract a candidate record
    /// 4. Create the candidate when nothing was stored
    /// 5. Otherwise rewrite only the fields that differ, or apply the gate
    ///    policy when none do
    ///
    /// # Returns
    ///
    /// * `Ok(SyncOutcome)` - What was done
    /// * `Err(MirrorError)` - Storage, fetch, or extraction failed
    pub async fn sync_one(&self, record: &UrlRecord) -> Result<SyncOutcome, MirrorError> {
        let existing = self.store.find_content_by_url(&record.loc)?;

        if let Some(stored) = &existing {
            if markers_match(stored.last_modified.as_deref(), record.last_mod.as_deref()) {
                tracing::trace!(url = %record.loc, "Change marker unchanged, skipping");
                return Ok(SyncOutcome::Unchanged);
            }
        }

        let html = self.fetcher.fetch(&record.loc).await?;
        let mut candidate = self.extractor.extract(&record.loc, &html)?;
        candidate.url = record.loc.clone();
        candidate.last_modified = record.last_mod.clone();

        let Some(mut stored) = existing else {
            if !self.store.create_content_record(&candidate)? {
                tracing::debug!(url = %record.loc, "Content was created concurrently");
                return Ok(SyncOutcome::Identical);
            }
            return Ok(SyncOutcome::Created);
        };

        let fields = merge_changed_fields(&mut stored, candidate);
        if fields.is_empty() {
            return self.apply_gate_policy(&stored, record);
        }

        stored.last_modified = record.last_mod.clone();
        self.store.update_content_record(&stored)?;
        tracing::debug!(url = %record.loc, ?fields, "Updated content");

        Ok(SyncOutcome::Updated { fields })
    }

    fn apply_gate_policy(
        &self,
        stored: &ContentRecord,
        record: &UrlRecord,
    ) -> Result<SyncOutcome, MirrorError> {
        if self.gate_policy == GatePolicy::Keep || stored.last_modified == record.last_mod {
            return Ok(SyncOutcome::Identical);
        }

        self.store
            .touch_content_last_modified(&record.loc, record.last_mod.as_deref())?;
        Ok(SyncOutcome::GateRefreshed)
    }
}

/// The cheap gate: only two known, equal markers prove nothing changed
fn markers_match(stored: Option<&str>, current: Option<&str>) -> bool {
    matches!((stored, current), (Some(a), Some(b)) if a == b)
}

/// Copies every extracted field that differs onto `stored` and returns the
/// names of the fields that changed
fn merge_changed_fields(stored: &mut ContentRecord, candidate: ContentRecord) -> Vec<&'static str> {
    let mut changed = Vec::new();

    for (name, current, fresh) in [
        ("title", &mut stored.title, candidate.title),
        ("content", &mut stored.content, candidate.content),
        ("summary", &mut stored.summary, candidate.summary),
        ("body", &mut stored.body, candidate.body),
    ] {
        if *current != fresh {
            *current = fresh;
            changed.push(name);
        }
    }

    changed
}
