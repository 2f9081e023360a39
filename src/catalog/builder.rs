//! Catalog builder: walks the paginated site listing into a seed catalog
//!
//! Pages are fetched in order until one comes back empty, contributes no
//! new slug, or the configured page limit is hit. Entries are deduplicated
//! by key across pages, since the sites repeat pinned comics.

use crate::catalog::seed::SeedEntry;
use crate::extract::SiteExtractor;
use crate::harvest::Fetcher;
use crate::Result;
use std::collections::HashSet;
use std::time::Duration;

/// Scrapes the full listing into an ordered, deduplicated seed catalog
///
/// `max_pages = 0` walks until the pagination runs out.
pub async fn build_catalog(
    fetcher: &Fetcher,
    extractor: &dyn SiteExtractor,
    listing_url: &str,
    max_pages: usize,
    delay: Duration,
) -> Result<Vec<SeedEntry>> {
    let mut catalog: Vec<SeedEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page = 1usize;

    loop {
        if max_pages > 0 && page > max_pages {
            tracing::info!("Reached page limit of {}, stopping", max_pages);
            break;
        }

        let url = listing_url.replace("{page}", &page.to_string());
        tracing::info!("Listing page {}: {}", page, url);

        let html = match fetcher.get_text(&url).await {
            Ok(html) => html,
            Err(e) => {
                // A dead pagination tail is the normal end of some sites;
                // anything else still ends the walk but loudly
                tracing::warn!("Listing page {} failed ({}), stopping", page, e);
                break;
            }
        };

        let entries = extractor.parse_listing(&html, &url)?;
        if entries.is_empty() {
            tracing::info!("Page {} has no entries, listing exhausted", page);
            break;
        }

        let mut added = 0usize;
        for entry in entries {
            if seen.insert(entry.key()) {
                catalog.push(entry);
                added += 1;
            }
        }

        if added == 0 {
            tracing::info!("Page {} repeated known comics only, listing exhausted", page);
            break;
        }

        tracing::info!("  +{} comics (total: {})", added, catalog.len());
        page += 1;
        tokio::time::sleep(delay).await;
    }

    Ok(catalog)
}
