//! Harvest coordinator - main run orchestration
//!
//! This module contains the run loop that coordinates all aspects of a
//! harvest, including:
//! - Loading the catalog, checkpoint, and accumulated results
//! - Computing the frontier (positional or rescan)
//! - Fanning comics out to workers under the entry-level bound
//! - Serializing all shared-state writes (results file, checkpoint)
//! - Producing the end-of-run summary

use crate::catalog::{load_catalog, SeedEntry};
use crate::checkpoint::CheckpointStore;
use crate::config::{Config, HarvestMode};
use crate::extract::{self, SiteExtractor};
use crate::harvest::fetcher::{build_http_client, Fetcher};
use crate::harvest::frontier::{self, FrontierItem};
use crate::harvest::retry::RetryPolicy;
use crate::harvest::scheduler::{ComicOutcome, Scheduler};
use crate::output::{load_results, save_results, RunSummary};
use crate::remote::{LocalStore, ObjectStore, SupabaseStore};
use crate::{ConfigError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Builds the object store the configuration asks for
///
/// Remote disabled means documents land in a local directory with the same
/// layout the bucket would have.
pub fn build_store(config: &Config, client: Client) -> Arc<dyn ObjectStore> {
    if config.remote.enabled {
        Arc::new(SupabaseStore::new(
            client,
            &config.remote.endpoint,
            &config.remote.bucket,
            &config.remote.api_key,
            RetryPolicy::from_config(&config.http),
        ))
    } else {
        Arc::new(LocalStore::new(&config.output.store_dir))
    }
}

/// Main harvest coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    catalog: Vec<SeedEntry>,
    checkpoint: CheckpointStore,
    results_path: PathBuf,
    store: Arc<dyn ObjectStore>,
    fetcher: Fetcher,
    extractor: Arc<dyn SiteExtractor>,
    scheduler: Arc<Scheduler>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Loads the seed catalog (the one fatal input) and wires the client,
    /// store, and extractor every component shares.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = load_catalog(Path::new(&config.output.catalog_path))?;
        tracing::info!(
            "Catalog loaded: {} comics from {}",
            catalog.len(),
            config.output.catalog_path
        );

        let client = build_http_client(&config.http)?;
        let retry = RetryPolicy::from_config(&config.http);
        let fetcher = Fetcher::new(client.clone(), retry);

        let extractor: Arc<dyn SiteExtractor> = Arc::from(
            extract::select(&config.source.site).ok_or_else(|| {
                ConfigError::Validation(format!("unknown source site '{}'", config.source.site))
            })?,
        );

        let store = build_store(&config, client);
        let checkpoint = CheckpointStore::new(&config.output.checkpoint_path);
        let results_path = PathBuf::from(&config.output.results_path);

        let config = Arc::new(config);
        let scheduler = Arc::new(Scheduler::new(
            config.clone(),
            fetcher.clone(),
            extractor.clone(),
            store.clone(),
        ));

        Ok(Self {
            config,
            catalog,
            checkpoint,
            results_path,
            store,
            fetcher,
            extractor,
            scheduler,
        })
    }

    /// Runs the harvest
    ///
    /// 1. Load the checkpoint and compute the frontier
    /// 2. Fan comics out to workers (entry-level concurrency bound)
    /// 3. Receive outcomes on a channel; this task alone touches the
    ///    results file and the checkpoint
    /// 4. Return the run summary
    pub async fn run(&self) -> Result<RunSummary> {
        let state = self.checkpoint.load();
        tracing::info!(
            "Checkpoint: last processed index {}, {} comics recorded",
            state.last_processed_index,
            state.scraped_comics.len()
        );

        let mut summary = RunSummary::default();

        let frontier = match self.config.harvest.mode {
            HarvestMode::Batch => frontier::positional(
                &self.catalog,
                state.last_processed_index,
                self.config.harvest.batch_size,
            ),
            HarvestMode::Rescan => {
                let (frontier, report) = frontier::rescan(
                    &self.catalog,
                    self.store.as_ref(),
                    &self.fetcher,
                    self.extractor.as_ref(),
                    self.config.harvest.max_scan,
                    Duration::from_millis(self.config.harvest.chapter_delay_ms),
                )
                .await;
                summary.record_scan(&report);
                frontier
            }
        };

        if frontier.is_empty() {
            tracing::info!("Frontier is empty, nothing to harvest");
            return Ok(summary);
        }
        tracing::info!(
            "Frontier: {} comics (indices {}..{})",
            frontier.len(),
            frontier.first().map(|f| f.index).unwrap_or(0),
            frontier.last().map(|f| f.index).unwrap_or(0)
        );

        // Rescan interleaves its own store reads with worker writes, so
        // comics must go one at a time there
        let workers = match self.config.harvest.mode {
            HarvestMode::Batch => self.config.harvest.comic_workers,
            HarvestMode::Rescan => {
                if self.config.harvest.comic_workers > 1 {
                    tracing::info!("Rescan mode runs comics sequentially, ignoring comic-workers");
                }
                1
            }
        };

        let mut results = load_results(&self.results_path);
        let mut scraped = state.scraped_comics.clone();
        let total = self.catalog.len();

        let semaphore = Arc::new(Semaphore::new(workers));
        let (tx, mut rx) = mpsc::channel::<ComicOutcome>(frontier.len());
        let mut join_set = JoinSet::new();

        let comic_delay = Duration::from_millis(self.config.harvest.comic_delay_ms);
        for item in frontier {
            let semaphore = semaphore.clone();
            let scheduler = self.scheduler.clone();
            let tx = tx.clone();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };

                let FrontierItem { index, seed } = item;
                let outcome = scheduler.process_comic(index, &seed).await;
                let _ = tx.send(outcome).await;

                // Courtesy delay before the worker slot frees up
                tokio::time::sleep(comic_delay).await;
            });
        }
        drop(tx);

        // Single-writer discipline: only this loop touches the results file
        // and the checkpoint, so workers can finish in any order
        while let Some(outcome) = rx.recv().await {
            summary.record_outcome(&outcome);

            match outcome {
                ComicOutcome::Completed { index, record, .. } => {
                    scraped.push(record.title.clone());
                    results.push(record);

                    if let Err(e) = save_results(&self.results_path, &results) {
                        tracing::error!("Failed to rewrite results file: {}", e);
                    }
                    match self.checkpoint.save(index as i64, &scraped) {
                        Ok(persisted) => tracing::info!(
                            "Progress saved: {}/{} (checkpoint at {})",
                            index + 1,
                            total,
                            persisted.last_processed_index
                        ),
                        Err(e) => tracing::error!("Failed to save checkpoint: {}", e),
                    }
                }
                ComicOutcome::Skipped { index, title, .. } => {
                    tracing::info!("[{}] {} skipped (already complete)", index, title);
                }
                ComicOutcome::Failed {
                    index,
                    title,
                    error,
                } => {
                    tracing::error!("[{}] {} failed: {}", index, title, error);
                }
            }
        }

        while join_set.join_next().await.is_some() {}

        tracing::info!(
            "Harvest finished: {} completed, {} skipped, {} failed",
            summary.comics_completed,
            summary.comics_skipped,
            summary.comics_failed
        );

        Ok(summary)
    }
}

/// Runs a complete harvest with the given configuration
pub async fn run_harvest(config: Config) -> Result<RunSummary> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
