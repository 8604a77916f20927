//! Output module for reporting mirror state
//!
//! This module handles:
//! - Loading record counts from the store
//! - Printing store statistics and run summaries to stdout

pub mod stats;

pub use stats::{load_statistics, print_run_summary, print_statistics, MirrorStatistics};
