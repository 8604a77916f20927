//! Sync engine
//!
//! This module contains everything that talks to the network or decides what
//! to write:
//! - The HTTP fetcher (`fetcher`)
//! - The bounded worker pool (`pool`)
//! - Change detection and per-URL upsert (`change`)
//! - HTML field extraction (`extractor`)
//! - The two-phase scheduler and its observer (`scheduler`, `observer`)

mod change;
mod extractor;
mod fetcher;
mod observer;
mod pool;
mod scheduler;

pub use change::{ContentSync, SyncOutcome};
pub use extractor::{ContentExtractor, HtmlExtractor};
pub use fetcher::{
    build_http_client, FetchError, Fetcher, HttpFetcher, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use observer::{SyncObserver, TracingObserver};
pub use pool::{PoolOutcome, WorkerPool};
pub use scheduler::{
    ContentSyncReport, ItemFailure, RunSummary, SourceFailure, SyncOptions, SyncScheduler,
};
