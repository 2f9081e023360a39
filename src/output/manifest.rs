//! Store-wide index documents
//!
//! Two derived documents are rebuilt from the store on demand: the manifest
//! (`comics-list.json`, the list of comic slugs a frontend can enumerate)
//! and the aggregate (`all-manhwa-metadata.json`, one summary entry per
//! comic with its latest chapters and an update timestamp for sorting).

use crate::model::{ChapterSet, ComicMetadata};
use crate::remote::{self, ObjectStore, RemoteResult};
use serde::{Deserialize, Serialize};

/// Store path of the manifest document
pub const COMICS_LIST_PATH: &str = "comics-list.json";

/// Store path of the aggregate metadata document
pub const AGGREGATE_PATH: &str = "all-manhwa-metadata.json";

/// One of a comic's newest chapters, as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestChapter {
    pub title: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub slug: String,
}

/// One comic's aggregate entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub slug: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    /// Comma-joined genre list, kept alongside the array for consumers that
    /// want a display string
    pub genre: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub rating: String,
    pub total_chapters: usize,
    /// Newest chapters first, at most two
    #[serde(rename = "latestChapters")]
    pub latest_chapters: Vec<LatestChapter>,
    /// Epoch milliseconds of the newest chapter, for sorting
    #[serde(rename = "lastUpdateTime")]
    pub last_update_time: i64,
}

/// Rebuilds and uploads the manifest from the store's top-level folders
///
/// Returns the slugs that were written.
pub async fn build_manifest(store: &dyn ObjectStore) -> RemoteResult<Vec<String>> {
    let entries = store.list("").await?;

    let mut slugs: Vec<String> = entries
        .into_iter()
        .filter(|e| e.is_prefix)
        .map(|e| e.name)
        .collect();
    slugs.sort();

    tracing::info!("Manifest: {} comics", slugs.len());
    remote::put_json(store, COMICS_LIST_PATH, &slugs).await?;

    Ok(slugs)
}

/// Rebuilds and uploads the aggregate metadata document
///
/// Walks the manifest (rebuilding it first if absent), reads each comic's
/// metadata and chapter set, and assembles one summary entry per comic.
/// Comics with missing documents are skipped with a warning, matching the
/// store's eventually-consistent reality.
///
/// Returns the number of comics aggregated.
pub async fn build_aggregate(store: &dyn ObjectStore) -> RemoteResult<usize> {
    let slugs: Vec<String> = match remote::get_json(store, COMICS_LIST_PATH).await? {
        Some(list) => list,
        None => {
            tracing::info!("No manifest found, rebuilding it first");
            build_manifest(store).await?
        }
    };

    let mut aggregate = Vec::new();

    for (i, slug) in slugs.iter().enumerate() {
        tracing::debug!("Aggregating ({}/{}): {}", i + 1, slugs.len(), slug);

        let metadata: ComicMetadata =
            match remote::get_json(store, &ComicMetadata::path_for(slug)).await? {
                Some(m) => m,
                None => {
                    tracing::warn!("{}: metadata.json missing, skipping", slug);
                    continue;
                }
            };

        let chapters: ChapterSet = match remote::get_json::<ChapterSet>(store, &ChapterSet::path_for(slug)).await?
        {
            Some(c) if !c.chapters.is_empty() => c,
            _ => {
                tracing::warn!("{}: chapters.json missing or empty, skipping", slug);
                continue;
            }
        };

        let latest_chapters: Vec<LatestChapter> = chapters
            .chapters
            .iter()
            .rev()
            .take(2)
            .map(|c| LatestChapter {
                title: c.title.clone(),
                published_at: c.published_at,
                slug: c.slug.clone(),
            })
            .collect();

        let last_update_time = chapters
            .chapters
            .last()
            .map(|c| c.published_at.timestamp_millis())
            .unwrap_or(0);

        let kind = metadata
            .metadata
            .get("Type")
            .cloned()
            .unwrap_or_else(|| "manhwa".to_string());
        let status = metadata
            .status()
            .unwrap_or("Ongoing")
            .to_string();
        let rating = metadata
            .metadata
            .get("Rating")
            .cloned()
            .unwrap_or_else(|| "9.0".to_string());

        aggregate.push(AggregateEntry {
            slug: slug.clone(),
            title: metadata.title.clone(),
            cover_url: metadata.cover_url.clone(),
            genre: metadata.genres.join(", "),
            genres: metadata.genres,
            kind,
            status,
            rating,
            total_chapters: metadata.total_chapters,
            latest_chapters,
            last_update_time,
        });
    }

    tracing::info!("Aggregate: {} comics", aggregate.len());
    remote::put_json(store, AGGREGATE_PATH, &aggregate).await?;

    Ok(aggregate.len())
}
