//! Komitana main entry point
//!
//! This is the command-line interface for the komitana comic catalog
//! harvester.

use clap::Parser;
use komitana::config::{load_config_with_hash, HarvestMode};
use komitana::harvest::{build_http_client, build_store, run_harvest, Fetcher, RetryPolicy};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Komitana: an incremental comic catalog harvester
///
/// Komitana crawls comic catalogs (comics, chapters, image links) from
/// paginated web sources and reconciles the results into a persisted
/// dataset, resuming safely across runs.
#[derive(Parser, Debug)]
#[command(name = "komitana")]
#[command(version)]
#[command(about = "An incremental comic catalog harvester", long_about = None)]
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

    /// Force staleness-rescan mode for this run
    #[arg(long)]
    rescan: bool,

    /// Keep documents local even if remote upload is enabled
    #[arg(long)]
    no_upload: bool,

    /// Validate config and show what would be harvested without harvesting
    #[arg(long, conflicts_with_all = ["build_catalog", "manifest", "aggregate"])]
    dry_run: bool,

    /// Scrape the paginated site listing into a fresh seed catalog and exit
    #[arg(long, conflicts_with_all = ["dry_run", "manifest", "aggregate"])]
    build_catalog: bool,

    /// Rebuild comics-list.json from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "build_catalog", "aggregate"])]
    manifest: bool,

    /// Rebuild all-manhwa-metadata.json from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "build_catalog", "manifest"])]
    aggregate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // CLI overrides
    if cli.rescan {
        config.harvest.mode = HarvestMode::Rescan;
    }
    if cli.no_upload {
        config.remote.enabled = false;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.build_catalog {
        handle_build_catalog(config).await?;
    } else if cli.manifest {
        handle_manifest(config).await?;
    } else if cli.aggregate {
        handle_aggregate(config).await?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("komitana=info,warn"),
            1 => EnvFilter::new("komitana=debug,info"),
            2 => EnvFilter::new("komitana=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the run plan
fn handle_dry_run(config: &komitana::config::Config) {
    println!("=== Komitana Dry Run ===\n");

    println!("Harvest:");
    println!("  Mode: {:?}", config.harvest.mode);
    println!("  Batch size: {}", config.harvest.batch_size);
    println!("  Max scan: {}", config.harvest.max_scan);
    println!("  Comic workers: {}", config.harvest.comic_workers);
    println!("  Chapter workers: {}", config.harvest.chapter_workers);
    println!(
        "  Delays: {}ms per comic, {}ms per chapter",
        config.harvest.comic_delay_ms, config.harvest.chapter_delay_ms
    );

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.request_timeout_secs);
    println!("  Max retries: {}", config.http.max_retries);
    println!(
        "  Rate-limit backoff: {}..{}ms",
        config.http.backoff_min_ms, config.http.backoff_max_ms
    );

    println!("\nSource:");
    println!("  Site: {}", config.source.site);
    println!("  Listing: {}", config.source.listing_url);

    println!("\nStorage:");
    if config.remote.enabled {
        println!("  Remote: {} (bucket {})", config.remote.endpoint, config.remote.bucket);
    } else {
        println!("  Local: {}", config.output.store_dir);
    }
    println!("  Catalog: {}", config.output.catalog_path);
    println!("  Results: {}", config.output.results_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    println!("\n✓ Configuration is valid");
}

/// Handles --build-catalog: walks the site listing into a seed catalog
async fn handle_build_catalog(
    config: komitana::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Building Seed Catalog ===\n");

    let client = build_http_client(&config.http)?;
    let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.http));
    let extractor = komitana::extract::select(&config.source.site)
        .ok_or_else(|| format!("unknown source site '{}'", config.source.site))?;

    let catalog = komitana::catalog::build_catalog(
        &fetcher,
        extractor.as_ref(),
        &config.source.listing_url,
        config.source.max_listing_pages,
        Duration::from_millis(config.harvest.chapter_delay_ms),
    )
    .await?;

    if catalog.is_empty() {
        println!("No comics found in the listing.");
        return Ok(());
    }

    let path = std::path::Path::new(&config.output.catalog_path);
    komitana::catalog::save_catalog(path, &catalog)?;

    println!("✓ {} comics written to {}", catalog.len(), path.display());
    println!("\nSample:");
    for entry in catalog.iter().take(5) {
        println!("  - {} ({})", entry.title, entry.kind.as_deref().unwrap_or("?"));
    }

    Ok(())
}

/// Handles --manifest: rebuilds comics-list.json from the store
async fn handle_manifest(
    config: komitana::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Rebuilding Manifest ===\n");

    let client = build_http_client(&config.http)?;
    let store = build_store(&config, client);

    let slugs = komitana::output::build_manifest(store.as_ref()).await?;

    println!("✓ Manifest written with {} comics", slugs.len());
    for slug in slugs.iter().take(10) {
        println!("  - {}", slug);
    }
    if slugs.len() > 10 {
        println!("  ... and {} more", slugs.len() - 10);
    }

    Ok(())
}

/// Handles --aggregate: rebuilds all-manhwa-metadata.json from the store
async fn handle_aggregate(
    config: komitana::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Rebuilding Aggregate Metadata ===\n");

    let client = build_http_client(&config.http)?;
    let store = build_store(&config, client);

    let count = komitana::output::build_aggregate(store.as_ref()).await?;

    println!("✓ Aggregate written for {} comics", count);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: komitana::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting harvest in {:?} mode", config.harvest.mode);

    match run_harvest(config).await {
        Ok(summary) => {
            komitana::output::print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
