//! Seed catalog loading
//!
//! The seed catalog is the ordered list of comics a run may process. It is
//! produced by the catalog builder (or an earlier scrape) and read once at
//! run start. A missing or unreadable catalog aborts the run: without it
//! there is no frontier to compute.

use crate::catalog::slug::slugify;
use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of the seed catalog
///
/// Field names are capitalized on the wire to match the listing scraper's
/// output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedEntry {
    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Link")]
    pub link: String,

    #[serde(rename = "Slug", default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(rename = "Image", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "Rating", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

impl SeedEntry {
    /// Returns the stable key for this comic: the recorded slug when the
    /// listing provided one, otherwise derived from the title
    pub fn key(&self) -> String {
        match &self.slug {
            Some(s) if !s.is_empty() => s.clone(),
            _ => slugify(&self.title),
        }
    }
}

/// Loads the seed catalog from a JSON file
///
/// This is the one fatal failure of a run: every other input degrades to a
/// default, but an absent catalog means there is nothing to do.
pub fn load_catalog(path: &Path) -> Result<Vec<SeedEntry>, HarvestError> {
    let content = std::fs::read_to_string(path).map_err(|e| HarvestError::Catalog {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let entries: Vec<SeedEntry> =
        serde_json::from_str(&content).map_err(|e| HarvestError::Catalog {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(entries)
}

/// Writes the seed catalog atomically (temp file + rename)
pub fn save_catalog(path: &Path, entries: &[SeedEntry]) -> Result<(), HarvestError> {
    let json = serde_json::to_vec_pretty(entries)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, &json)?;
    tmp.persist(path).map_err(|e| HarvestError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_catalog() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"Title": "Solo Leveling", "Link": "https://example.com/komik/solo-leveling/", "Type": "Manhwa"},
                {"Title": "The Gamer", "Link": "https://example.com/komik/the-gamer/", "Slug": "the-gamer"}
            ]"#,
        )
        .unwrap();
        file.flush().unwrap();

        let entries = load_catalog(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Solo Leveling");
        assert_eq!(entries[0].key(), "solo-leveling");
        assert_eq!(entries[1].key(), "the-gamer");
    }

    #[test]
    fn test_missing_catalog_is_fatal() {
        let result = load_catalog(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(HarvestError::Catalog { .. })));
    }

    #[test]
    fn test_malformed_catalog_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not a list }").unwrap();
        file.flush().unwrap();

        let result = load_catalog(file.path());
        assert!(matches!(result, Err(HarvestError::Catalog { .. })));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let entries = vec![SeedEntry {
            title: "Foo".to_string(),
            link: "https://example.com/komik/foo/".to_string(),
            slug: Some("foo".to_string()),
            image: None,
            kind: Some("Manhwa".to_string()),
            rating: None,
        }];

        save_catalog(&path, &entries).unwrap();
        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key(), "foo");
    }
}
