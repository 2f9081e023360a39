//! Frontier computation: which comics need work this run
//!
//! Two mutually exclusive strategies:
//! - positional: a contiguous index range continuing from the checkpoint,
//!   with no network traffic at all
//! - rescan: walk the catalog looking for comics whose source offers more
//!   chapters than we have stored, skipping terminally complete comics on
//!   the strength of one metadata read

use crate::catalog::SeedEntry;
use crate::extract::SiteExtractor;
use crate::harvest::classify;
use crate::harvest::fetcher::Fetcher;
use crate::model::{ChapterSet, ComicMetadata};
use crate::remote::{self, ObjectStore};
use std::time::Duration;

/// One comic selected for processing, with its catalog position
#[derive(Debug, Clone)]
pub struct FrontierItem {
    pub index: usize,
    pub seed: SeedEntry,
}

/// What the rescan saw, for the end-of-run report
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Comics actually examined against the source
    pub checked: usize,

    /// Comics skipped as terminally complete without touching the source
    pub skipped_terminal: usize,

    /// Comics excluded because their check failed: (index, title, error).
    /// A failed check is reported, never treated as "no update".
    pub failures: Vec<(usize, String, String)>,
}

/// Computes the positional frontier: `[p+1, min(p+1+batch_size, N))`
///
/// Deterministic and offline; `last_processed_index = -1` starts from the
/// top of the catalog.
pub fn positional(
    catalog: &[SeedEntry],
    last_processed_index: i64,
    batch_size: usize,
) -> Vec<FrontierItem> {
    let start = (last_processed_index + 1).max(0) as usize;
    let end = start.saturating_add(batch_size).min(catalog.len());

    catalog[start.min(catalog.len())..end]
        .iter()
        .enumerate()
        .map(|(offset, seed)| FrontierItem {
            index: start + offset,
            seed: seed.clone(),
        })
        .collect()
}

/// Computes the staleness-scan frontier
///
/// Walks the catalog in order, examining at most `max_scan` comics. A comic
/// enters the frontier iff the source offers more chapters than its stored
/// collection holds. Terminal comics are skipped without a source fetch and
/// do not count against the scan budget.
pub async fn rescan(
    catalog: &[SeedEntry],
    store: &dyn ObjectStore,
    fetcher: &Fetcher,
    extractor: &dyn SiteExtractor,
    max_scan: usize,
    delay: Duration,
) -> (Vec<FrontierItem>, ScanReport) {
    let mut frontier = Vec::new();
    let mut report = ScanReport::default();

    for (index, seed) in catalog.iter().enumerate() {
        if report.checked >= max_scan {
            break;
        }

        let slug = seed.key();

        // Store reads alone decide whether the source needs touching at all
        let stored_count = match stored_state(store, &slug).await {
            Ok((metadata, count)) => {
                let status = metadata.as_ref().and_then(|m| m.status().map(str::to_string));
                let observed = metadata.map(|m| m.total_chapters).unwrap_or(0);
                if classify::is_terminally_complete(status.as_deref(), count, observed) {
                    tracing::debug!("{}: terminally complete, skipping", slug);
                    report.skipped_terminal += 1;
                    continue;
                }
                count
            }
            Err(e) => {
                tracing::warn!("{}: store read failed during scan: {}", slug, e);
                report.failures.push((index, seed.title.clone(), e.to_string()));
                continue;
            }
        };

        report.checked += 1;

        // Count what the source offers right now
        let available = match count_available(fetcher, extractor, &seed.link).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("{}: source check failed: {}", seed.title, e);
                report.failures.push((index, seed.title.clone(), e));
                tokio::time::sleep(delay).await;
                continue;
            }
        };

        if available > stored_count {
            tracing::info!(
                "{}: {} new chapters ({} -> {})",
                seed.title,
                available - stored_count,
                stored_count,
                available
            );
            frontier.push(FrontierItem {
                index,
                seed: seed.clone(),
            });
        } else {
            tracing::debug!("{}: no update ({} chapters)", seed.title, stored_count);
        }

        tokio::time::sleep(delay).await;
    }

    (frontier, report)
}

/// Reads a comic's stored metadata and chapter count; absent documents are
/// the empty baseline
async fn stored_state(
    store: &dyn ObjectStore,
    slug: &str,
) -> Result<(Option<ComicMetadata>, usize), crate::remote::RemoteError> {
    let metadata: Option<ComicMetadata> =
        remote::get_json(store, &ComicMetadata::path_for(slug)).await?;
    let chapters: Option<ChapterSet> = remote::get_json(store, &ChapterSet::path_for(slug)).await?;
    let count = chapters.map(|c| c.chapters.len()).unwrap_or(0);
    Ok((metadata, count))
}

async fn count_available(
    fetcher: &Fetcher,
    extractor: &dyn SiteExtractor,
    url: &str,
) -> Result<usize, String> {
    let html = fetcher.get_text(url).await.map_err(|e| e.to_string())?;
    let detail = extractor
        .parse_detail(&html, url)
        .map_err(|e| e.to_string())?;
    Ok(detail.chapters.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(n: usize) -> Vec<SeedEntry> {
        (0..n)
            .map(|i| SeedEntry {
                title: format!("Comic {}", i),
                link: format!("https://example.com/komik/comic-{}/", i),
                slug: None,
                image: None,
                kind: None,
                rating: None,
            })
            .collect()
    }

    #[test]
    fn test_positional_fresh_start() {
        let catalog = seeds(10);
        let frontier = positional(&catalog, -1, 3);

        let indices: Vec<_> = frontier.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_positional_continues_after_checkpoint() {
        let catalog = seeds(10);
        let frontier = positional(&catalog, 4, 3);

        let indices: Vec<_> = frontier.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![5, 6, 7]);
    }

    #[test]
    fn test_positional_clamps_to_catalog_end() {
        let catalog = seeds(10);
        let frontier = positional(&catalog, 8, 5);

        let indices: Vec<_> = frontier.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![9]);
    }

    #[test]
    fn test_positional_exhausted_catalog_is_empty() {
        let catalog = seeds(10);
        assert!(positional(&catalog, 9, 5).is_empty());
        assert!(positional(&catalog, 42, 5).is_empty());
    }

    #[test]
    fn test_positional_preserves_order() {
        let catalog = seeds(6);
        let frontier = positional(&catalog, 1, 4);
        let titles: Vec<_> = frontier.iter().map(|f| f.seed.title.as_str()).collect();
        assert_eq!(titles, vec!["Comic 2", "Comic 3", "Comic 4", "Comic 5"]);
    }
}
