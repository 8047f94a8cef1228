//! Kattrack main entry point
//!
//! Command-line interface for the solved-problems tracker.

use clap::Parser;
use kattrack::config::load_config;
use kattrack::notify::log_notifier;
use kattrack::refresh::RefreshCoordinator;
use kattrack::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Kattrack: a cached solved-problems tracker
///
/// Kattrack crawls the judge site's solved-problems listing and statistics
/// pages, politely paced, and keeps the results in a local cache. By
/// default it runs one crawl cycle and prints a short summary.
#[derive(Parser, Debug)]
#[command(name = "kattrack")]
#[command(version = "1.0.0")]
#[command(about = "A cached solved-problems tracker", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "show")]
    dry_run: bool,

    /// Print the cached snapshot and exit, without crawling
    #[arg(long, conflicts_with = "dry_run")]
    show: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let storage = SqliteStorage::new(Path::new(&config.cache.database_path))?;
    let coordinator = Arc::new(RefreshCoordinator::new(config, storage, log_notifier())?);

    if cli.show {
        handle_show(&coordinator)?;
        return Ok(());
    }

    handle_crawl(&coordinator).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kattrack=info,warn"),
            1 => EnvFilter::new("kattrack=debug,info"),
            2 => EnvFilter::new("kattrack=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &kattrack::config::Config) {
    println!("=== Kattrack Dry Run ===\n");

    println!("Judge site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nUser:");
    println!("  Username: {}", config.user.username);
    println!("  Full name: {}", config.user.full_name);

    println!("\nPacing:");
    println!("  Listing delay: {}ms", config.pacing.listing_delay_ms);
    println!(
        "  Enrichment delay: {}-{}ms",
        config.pacing.enrich_delay_min_ms, config.pacing.enrich_delay_max_ms
    );

    println!("\nCache:");
    println!("  Database: {}", config.cache.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --show mode: prints the cached snapshot without crawling
fn handle_show(coordinator: &Arc<RefreshCoordinator>) -> anyhow::Result<()> {
    let view = coordinator.current_view()?;

    if view.records.is_empty() {
        println!("No cached snapshot yet. Run without --show to crawl.");
        return Ok(());
    }

    let freshness = if view.stale { "stale" } else { "fresh" };
    println!("{} solved problems ({}):\n", view.records.len(), freshness);

    for record in &view.records {
        let mine = if record.mine.is_empty() {
            "-"
        } else {
            &record.mine
        };
        let fastest = if record.fastest_global.is_empty() {
            "-"
        } else {
            &record.fastest_global
        };
        match &record.top {
            Some(top) => println!(
                "  {:<40} mine {:>8}  fastest {:>8}  rank {}",
                record.name, mine, fastest, top.rank
            ),
            None => println!(
                "  {:<40} mine {:>8}  fastest {:>8}",
                record.name, mine, fastest
            ),
        }
    }

    Ok(())
}

/// Handles the default mode: one crawl cycle now
async fn handle_crawl(coordinator: &Arc<RefreshCoordinator>) -> anyhow::Result<()> {
    match coordinator.run_once().await {
        Ok(true) => {
            let view = coordinator.current_view()?;
            tracing::info!("Crawl completed successfully");
            println!("{} solved problems cached", view.records.len());
            Ok(())
        }
        Ok(false) => {
            println!("A refresh is already running");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
