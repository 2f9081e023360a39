//! Harvest module: the incremental crawl-and-reconcile engine
//!
//! This module contains the core pipeline, including:
//! - Frontier computation (positional and rescan modes)
//! - Retry-wrapped HTTP fetching
//! - Nested bounded-concurrency scheduling of comics and chapters
//! - Key-based reconciliation into the stored collections
//! - Completion classification and run coordination

mod classify;
mod coordinator;
pub(crate) mod fetcher;
mod frontier;
mod reconcile;
pub(crate) mod retry;
mod scheduler;

pub use classify::{is_finished_status, is_terminally_complete};
pub use coordinator::{build_store, run_harvest, Coordinator};
pub use fetcher::{build_http_client, Fetcher};
pub use frontier::{positional, rescan, FrontierItem, ScanReport};
pub use reconcile::merge;
pub use retry::RetryPolicy;
pub use scheduler::{ComicOutcome, ComicStats, Scheduler, SkipReason};

use crate::config::Config;
use crate::output::RunSummary;
use crate::Result;

/// Runs a complete harvest operation
///
/// This is the main entry point for a harvest. It will:
/// 1. Load the seed catalog and checkpoint
/// 2. Compute the frontier for the configured mode
/// 3. Fetch, reconcile, and persist every frontier comic
/// 4. Return the run summary
pub async fn harvest(config: Config) -> Result<RunSummary> {
    run_harvest(config).await
}
