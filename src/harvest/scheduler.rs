//! Per-comic processing under bounded concurrency
//!
//! The scheduler owns the inner of the two concurrency levels: within one
//! comic, at most `chapter_workers` chapter pages are fetched at a time.
//! Chapters whose slug is already stored are never re-fetched; a chapter
//! that yields no images fails for this run and stays a candidate for the
//! next one, because its slug never reaches the stored collection.
//!
//! Nothing here touches shared run state. Each comic is processed to a
//! self-contained outcome; the coordinator serializes checkpoint and output
//! updates.

use crate::catalog::SeedEntry;
use crate::config::Config;
use crate::extract::SiteExtractor;
use crate::harvest::fetcher::Fetcher;
use crate::harvest::{classify, reconcile};
use crate::model::{ChapterRecord, ChapterSet, ChapterStub, ComicMetadata, ComicRecord};
use crate::remote::{self, ObjectStore};
use crate::{HarvestError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Chapter-level counters for one processed comic
#[derive(Debug, Clone, Copy, Default)]
pub struct ComicStats {
    /// Chapters newly fetched this run
    pub fetched: usize,

    /// Chapters skipped because their slug was already stored
    pub skipped: usize,

    /// Chapters that failed to fetch or had no images
    pub failed: usize,
}

/// Why a comic produced no write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Finished status and every observed chapter already stored
    TerminallyComplete,
}

/// The result of processing one frontier item
#[derive(Debug)]
pub enum ComicOutcome {
    /// Remote write succeeded; the checkpoint may advance past `index`
    Completed {
        index: usize,
        record: ComicRecord,
        stats: ComicStats,
    },

    /// Nothing to do, nothing written
    Skipped {
        index: usize,
        title: String,
        reason: SkipReason,
    },

    /// The comic failed before anything was written; the run continues
    Failed {
        index: usize,
        title: String,
        error: String,
    },
}

/// Processes frontier items into outcomes
pub struct Scheduler {
    config: Arc<Config>,
    fetcher: Fetcher,
    extractor: Arc<dyn SiteExtractor>,
    store: Arc<dyn ObjectStore>,
}

impl Scheduler {
    pub fn new(
        config: Arc<Config>,
        fetcher: Fetcher,
        extractor: Arc<dyn SiteExtractor>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            store,
        }
    }

    /// Processes one comic end to end
    ///
    /// Every failure is folded into the outcome; this never aborts the run.
    pub async fn process_comic(&self, index: usize, seed: &SeedEntry) -> ComicOutcome {
        match self.try_process(index, seed).await {
            Ok(outcome) => outcome,
            Err(e) => ComicOutcome::Failed {
                index,
                title: seed.title.clone(),
                error: e.to_string(),
            },
        }
    }

    async fn try_process(&self, index: usize, seed: &SeedEntry) -> Result<ComicOutcome> {
        let slug = seed.key();
        tracing::info!("[{}] Processing: {}", index, seed.title);

        // Full detail first: metadata and the chapter listing
        let html = self.fetcher.get_text(&seed.link).await?;
        let detail = self.extractor.parse_detail(&html, &seed.link)?;

        let observed_total = detail.chapters.len();
        let status = detail.attributes.get("Status").map(String::as_str);
        tracing::info!(
            "[{}] {}: status={}, chapters={}",
            index,
            detail.title,
            status.unwrap_or("unknown"),
            observed_total
        );

        // Stored collection; absent means empty baseline
        let existing: Option<ChapterSet> =
            remote::get_json(self.store.as_ref(), &ChapterSet::path_for(&slug)).await?;
        let stored_count = existing.as_ref().map(|s| s.chapters.len()).unwrap_or(0);

        // Fully and terminally satisfied comics produce no fetch and no write
        if classify::is_terminally_complete(status, stored_count, observed_total) {
            tracing::info!("[{}] {} is complete with all chapters stored, skipping", index, detail.title);
            return Ok(ComicOutcome::Skipped {
                index,
                title: detail.title,
                reason: SkipReason::TerminallyComplete,
            });
        }

        // Stored chapters are immutable: only absent slugs are fetched.
        // The listing is newest-first; reverse it so chapter 1 lands first.
        let present = existing
            .as_ref()
            .map(|s| s.chapter_slugs())
            .unwrap_or_default();
        let mut pending: Vec<ChapterStub> = Vec::new();
        let mut skipped = 0usize;
        for stub in detail.chapters.iter().rev() {
            if present.contains(&stub.slug()) {
                skipped += 1;
            } else {
                pending.push(stub.clone());
            }
        }

        tracing::info!(
            "[{}] {}: {} stored, {} to fetch",
            index,
            detail.title,
            skipped,
            pending.len()
        );

        let (fetched, failed) = self.fetch_chapters(pending).await;

        let stats = ComicStats {
            fetched: fetched.len(),
            skipped,
            failed,
        };

        // Merge and persist: metadata first, then the chapter collection.
        // The checkpoint only moves once both writes have succeeded.
        let merged = reconcile::merge(existing.as_ref(), &slug, &detail.title, &fetched);

        let record = ComicRecord {
            slug: slug.clone(),
            title: detail.title,
            url: seed.link.clone(),
            cover_url: detail.cover_url,
            genres: detail.genres,
            synopsis: detail.synopsis,
            metadata: detail.attributes,
            total_chapters: observed_total,
            chapters: fetched,
        };

        remote::put_json(
            self.store.as_ref(),
            &ComicMetadata::path_for(&slug),
            &record.metadata_doc(),
        )
        .await?;
        remote::put_json(self.store.as_ref(), &ChapterSet::path_for(&slug), &merged).await?;

        tracing::info!(
            "[{}] {} written: {} chapters total ({} new, {} failed)",
            index,
            record.title,
            merged.total_chapters,
            stats.fetched,
            stats.failed
        );

        Ok(ComicOutcome::Completed {
            index,
            record,
            stats,
        })
    }

    /// Fetches pending chapters under the chapter-level concurrency bound
    ///
    /// Returns the successfully fetched records and the failure count.
    /// Completion order is irrelevant: the merge is commutative per slug.
    async fn fetch_chapters(&self, pending: Vec<ChapterStub>) -> (Vec<ChapterRecord>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.config.harvest.chapter_workers));
        let delay = Duration::from_millis(self.config.harvest.chapter_delay_ms);
        let mut join_set: JoinSet<Option<ChapterRecord>> = JoinSet::new();

        let total = pending.len();
        for stub in pending {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let extractor = self.extractor.clone();

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };

                let result = fetch_one_chapter(&fetcher, extractor.as_ref(), &stub).await;

                // Courtesy delay while still holding the worker slot
                tokio::time::sleep(delay).await;

                match result {
                    Ok(record) => {
                        tracing::debug!("Chapter {}: {} images", record.slug, record.total_images);
                        Some(record)
                    }
                    Err(e) => {
                        tracing::warn!("Chapter {} failed: {}", stub.title, e);
                        None
                    }
                }
            });
        }

        let mut fetched = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Some(record)) => fetched.push(record),
                Ok(None) => {}
                Err(e) => tracing::error!("Chapter task panicked: {}", e),
            }
        }

        let failed = total - fetched.len();
        (fetched, failed)
    }
}

/// Fetches and extracts a single chapter
///
/// A page that parses but contains no images is an error here, so a
/// zero-image chapter can never become a success record.
async fn fetch_one_chapter(
    fetcher: &Fetcher,
    extractor: &dyn SiteExtractor,
    stub: &ChapterStub,
) -> Result<ChapterRecord> {
    let html = fetcher.get_text(&stub.url).await?;
    let images = extractor
        .parse_chapter_images(&html, &stub.url)
        .map_err(HarvestError::Extract)?;

    Ok(ChapterRecord {
        slug: stub.slug(),
        title: stub.title.clone(),
        url: stub.url.clone(),
        published_at: stub.published_at,
        total_images: images.len(),
        images,
    })
}
