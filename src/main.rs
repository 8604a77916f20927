//! Sitemirror main entry point
//!
//! This is the command-line interface for the Sitemirror incremental site mirror.

use clap::Parser;
use sitemirror::config::{load_config_with_hash, Config};
use sitemirror::output::{load_statistics, print_run_summary, print_statistics};
use sitemirror::storage::open_storage;
use sitemirror::sync::{
    ContentExtractor, Fetcher, HtmlExtractor, HttpFetcher, RunSummary, SyncOptions, SyncScheduler,
};
use sitemirror::Store;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Sitemirror: an incremental sitemap-driven site mirror
///
/// Sitemirror resolves sitemaps and paginated feeds into page URLs, then
/// fetches and stores the content of pages that are new or have changed.
#[derive(Parser, Debug)]
#[command(name = "sitemirror")]
#[command(version = "1.0.0")]
#[command(about = "An incremental sitemap-driven site mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only sync sitemaps and feeds into URL records
    #[arg(long, conflicts_with = "contents_only")]
    sources_only: bool,

    /// Only sync content for already known URL records
    #[arg(long, conflicts_with = "sources_only")]
    contents_only: bool,

    /// Validate config and show what would be synced without syncing
    #[arg(long, conflicts_with_all = ["stats", "sources_only", "contents_only"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "sources_only", "contents_only"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = load_config_with_hash(&cli.config);

    // The error log location lives in the config, so logging starts after loading it
    let error_log = loaded
        .as_ref()
        .ok()
        .and_then(|(config, _)| config.output.error_log.clone());
    setup_logging(cli.verbose, cli.quiet, error_log.as_deref())?;

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match loaded {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_sync(&config, cli.sources_only, cli.contents_only).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// When `error_log` is given, warnings and errors are also written to that
/// file, which is truncated first.
fn setup_logging(verbose: u8, quiet: bool, error_log: Option<&str>) -> std::io::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemirror=info,warn"),
            1 => EnvFilter::new("sitemirror=debug,info"),
            2 => EnvFilter::new("sitemirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(filter);

    let error_file = match error_log {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Arc::new(file))
                    .with_filter(LevelFilter::WARN),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(error_file)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be synced
fn handle_dry_run(config: &Config) {
    println!("=== Sitemirror Dry Run ===\n");

    println!("Sync Configuration:");
    println!(
        "  Max concurrent operations: {}",
        config.sync.max_concurrent_operations
    );
    println!("  Politeness delay: {}ms", config.sync.politeness_delay);
    println!("  Request timeout: {}s", config.sync.request_timeout);
    match config.sync.content_limit {
        Some(limit) => println!("  Content limit: {} most recent URLs", limit),
        None => println!("  Content limit: none"),
    }
    println!("  Progress interval: {}", config.sync.progress_interval);
    println!("  Refresh lastmod: {}", config.sync.refresh_last_mod);
    println!("  Gate policy: {:?}", config.sync.gate_policy);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(error_log) = &config.output.error_log {
        println!("  Error log: {}", error_log);
    }

    println!("\nSitemaps ({}):", config.sitemap.len());
    for entry in &config.sitemap {
        println!("  - {}", entry.url);
    }

    println!("\nFeeds ({}):", config.feed.len());
    for entry in &config.feed {
        match entry.per_page {
            Some(per_page) => println!("  - {} ({} per page)", entry.url, per_page),
            None => println!("  - {}", entry.url),
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would sync {} sources",
        config.sitemap.len() + config.feed.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the sync run, either both phases or just one of them
async fn handle_sync(
    config: &Config,
    sources_only: bool,
    contents_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn Store> = Arc::new(open_storage(Path::new(&config.output.database_path))?);
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_settings(
        config.user_agent.header_value(),
        Duration::from_secs(config.sync.request_timeout),
    )?);
    let extractor: Arc<dyn ContentExtractor> = Arc::new(HtmlExtractor::new(&config.extract)?);

    let scheduler = SyncScheduler::new(store, fetcher, extractor, SyncOptions::from(&config.sync));
    let sources = config.sources();

    tracing::info!(
        "Sitemaps: {}, Feeds: {}, Max concurrent operations: {}",
        config.sitemap.len(),
        config.feed.len(),
        scheduler.pool().limit()
    );

    let summary = if sources_only {
        RunSummary {
            source_failures: scheduler.sync_sources(&sources).await,
            ..RunSummary::default()
        }
    } else if contents_only {
        RunSummary {
            contents: scheduler.sync_contents().await?,
            ..RunSummary::default()
        }
    } else {
        match scheduler.run(&sources).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Sync failed: {}", e);
                return Err(e.into());
            }
        }
    };

    for failure in &summary.source_failures {
        tracing::warn!("Source {} was not synced: {}", failure.source, failure.error);
    }

    if !sources_only {
        print_run_summary(&summary);
    }
    tracing::info!("Sync completed");

    Ok(())
}
