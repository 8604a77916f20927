//! Sync scheduler - two-phase orchestration
//!
//! A run has two phases, each fanned out on the same bounded `WorkerPool`:
//! - Source sync: resolve every sitemap or feed and store URL records not
//!   seen before
//! - Content sync: bring the stored content of every (or the most recent)
//!   URL record up to date
//!
//! Failures are isolated per source and per URL. They are reported to the
//! observer and collected, never propagated across siblings.

use crate::config::{GatePolicy, SyncConfig};
use crate::sitemap::{FeedDiscovery, SitemapResolver, Source};
use crate::storage::{Store, UrlRecord};
use crate::sync::change::{ContentSync, SyncOutcome};
use crate::sync::extractor::ContentExtractor;
use crate::sync::fetcher::Fetcher;
use crate::sync::observer::{SyncObserver, TracingObserver};
use crate::sync::pool::WorkerPool;
use crate::MirrorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tunables of the scheduler
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub max_concurrent: usize,
    pub politeness_delay: Duration,
    /// Sync content for only this many of the most recent URL records
    pub content_limit: Option<usize>,
    pub progress_interval: usize,
    pub refresh_last_mod: bool,
    pub gate_policy: GatePolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            max_concurrent: config.max_concurrent_operations as usize,
            politeness_delay: Duration::from_millis(config.politeness_delay),
            content_limit: config.content_limit,
            progress_interval: config.progress_interval,
            refresh_last_mod: config.refresh_last_mod,
            gate_policy: config.gate_policy,
        }
    }
}

/// A source that could not be synced
#[derive(Debug)]
pub struct SourceFailure {
    pub source: Source,
    pub error: MirrorError,
}

/// A URL whose content could not be synced
#[derive(Debug)]
pub struct ItemFailure {
    pub url: String,
    pub error: MirrorError,
}

/// Tally of one content sync phase
#[derive(Debug, Default)]
pub struct ContentSyncReport {
    /// Size of the working set
    pub total: usize,
    /// Skipped by the change-marker gate without a fetch
    pub gated: usize,
    pub created: usize,
    pub updated: usize,
    /// Fetched, but content matched what was stored
    pub identical: usize,
    /// Fetched, content matched, stored change marker advanced
    pub gate_refreshed: usize,
    pub failures: Vec<ItemFailure>,
    /// Workers that panicked
    pub panicked: usize,
}

impl ContentSyncReport {
    fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Unchanged => self.gated += 1,
            SyncOutcome::Created => self.created += 1,
            SyncOutcome::Updated { .. } => self.updated += 1,
            SyncOutcome::Identical => self.identical += 1,
            SyncOutcome::GateRefreshed => self.gate_refreshed += 1,
        }
    }

    /// Items that did not complete successfully
    pub fn failed(&self) -> usize {
        self.failures.len() + self.panicked
    }
}

/// Result of a full run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub source_failures: Vec<SourceFailure>,
    pub contents: ContentSyncReport,
}

/// Resolves sources and records the URLs they list
#[derive(Clone)]
struct SourceSyncer {
    store: Arc<dyn Store>,
    resolver: SitemapResolver,
    feeds: FeedDiscovery,
    refresh_last_mod: bool,
}

impl SourceSyncer {
    /// Returns `(discovered, created)` counts
    async fn sync(&self, source: &Source) -> Result<(usize, usize), MirrorError> {
        tracing::info!(%source, "Syncing source");

        let records = match source {
            Source::Sitemap { url } => self.resolver.resolve(url).await?,
            Source::Feed(feed) => self.feeds.discover(feed).await?,
        };

        let created = self.store_records(&records)?;
        Ok((records.len(), created))
    }

    fn store_records(&self, records: &[UrlRecord]) -> Result<usize, MirrorError> {
        let mut created = 0;

        for record in records {
            if self.store.url_record_exists(&record.loc)? {
                if self.refresh_last_mod && record.last_mod.is_some() {
                    self.store
                        .update_url_last_mod(&record.loc, record.last_mod.as_deref())?;
                }
                continue;
            }

            if self.store.create_url_record(record)? {
                created += 1;
            }
        }

        Ok(created)
    }
}

/// Runs source and content sync on a shared bounded pool
pub struct SyncScheduler {
    store: Arc<dyn Store>,
    sources: SourceSyncer,
    content: ContentSync,
    pool: WorkerPool,
    observer: Arc<dyn SyncObserver>,
    options: SyncOptions,
}

impl SyncScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn ContentExtractor>,
        options: SyncOptions,
    ) -> Self {
        let sources = SourceSyncer {
            store: Arc::clone(&store),
            resolver: SitemapResolver::new(Arc::clone(&fetcher))
                .with_politeness_delay(options.politeness_delay),
            feeds: FeedDiscovery::new(Arc::clone(&fetcher)),
            refresh_last_mod: options.refresh_last_mod,
        };

        let content = ContentSync::new(Arc::clone(&store), fetcher, extractor)
            .with_gate_policy(options.gate_policy);

        Self {
            store,
            sources,
            content,
            pool: WorkerPool::new(options.max_concurrent),
            observer: Arc::new(TracingObserver),
            options,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Syncs every source concurrently and returns the ones that failed
    ///
    /// Every source is attempted. A failure (fetch, parse, or storage)
    /// aborts only the source it happened in.
    pub async fn sync_sources(&self, sources: &[Source]) -> Vec<SourceFailure> {
        tracing::info!("Syncing {} sources", sources.len());

        let syncer = self.sources.clone();
        let observer = Arc::clone(&self.observer);

        let outcome = self
            .pool
            .run(sources.to_vec(), move |source| {
                let syncer = syncer.clone();
                let observer = Arc::clone(&observer);
                async move {
                    let result = syncer.sync(&source).await;
                    match result {
                        Ok((discovered, created)) => {
                            observer.on_source_synced(&source, discovered, created);
                            Ok(())
                        }
                        Err(error) => {
                            observer.on_source_failed(&source, &error);
                            Err(SourceFailure { source, error })
                        }
                    }
                }
            })
            .await;

        if outcome.panicked > 0 {
            tracing::error!("{} source workers panicked", outcome.panicked);
        }

        outcome.failures
    }

    /// Convenience wrapper syncing plain sitemap URLs
    pub async fn sync_sitemaps(&self, urls: &[String]) -> Vec<SourceFailure> {
        let sources: Vec<Source> = urls.iter().map(Source::sitemap).collect();
        self.sync_sources(&sources).await
    }

    /// Syncs content for the working set of stored URL records
    ///
    /// # Returns
    ///
    /// * `Ok(ContentSyncReport)` - Per-outcome counts and per-URL failures
    /// * `Err(MirrorError)` - The working set could not be loaded
    pub async fn sync_contents(&self) -> Result<ContentSyncReport, MirrorError> {
        let records = match self.options.content_limit {
            Some(limit) => self.store.find_recent_url_records(limit)?,
            None => self.store.find_all_url_records()?,
        };

        let total = records.len();
        tracing::info!("Total urls to sync: {}", total);

        let content = self.content.clone();
        let observer = Arc::clone(&self.observer);
        let completed = Arc::new(AtomicUsize::new(0));
        let interval = self.options.progress_interval.max(1);

        let outcome = self
            .pool
            .run(records, move |record: UrlRecord| {
                let content = content.clone();
                let observer = Arc::clone(&observer);
                let completed = Arc::clone(&completed);
                async move {
                    let result = content.sync_one(&record).await;
                    if let Err(error) = &result {
                        observer.on_item_failed(&record.loc, error);
                    }

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    if done % interval == 0 {
                        observer.on_progress(done, total);
                    }

                    result.map_err(|error| ItemFailure {
                        url: record.loc,
                        error,
                    })
                }
            })
            .await;

        let mut report = ContentSyncReport {
            total,
            ..ContentSyncReport::default()
        };
        for result in &outcome.results {
            report.record(result);
        }
        report.failures = outcome.failures;
        report.panicked = outcome.panicked;

        tracing::info!(
            total = report.total,
            gated = report.gated,
            created = report.created,
            updated = report.updated,
            identical = report.identical,
            gate_refreshed = report.gate_refreshed,
            failed = report.failed(),
            "Content sync finished"
        );

        Ok(report)
    }

    /// Runs source sync to completion, then content sync
    pub async fn run(&self, sources: &[Source]) -> Result<RunSummary, MirrorError> {
        let source_failures = self.sync_sources(sources).await;
        let contents = self.sync_contents().await?;

        Ok(RunSummary {
            source_failures,
            contents,
        })
    }
}
