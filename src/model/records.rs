use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What an extractor reads off a comic detail page
#[derive(Debug, Clone)]
pub struct ComicDetail {
    pub title: String,
    pub genres: Vec<String>,
    pub synopsis: String,
    /// Free-form attributes from the detail page (Status, Type, Author, ...)
    pub attributes: IndexMap<String, String>,
    pub cover_url: Option<String>,
    /// Chapter listing in page order (newest first on the source sites)
    pub chapters: Vec<ChapterStub>,
}

/// One chapter as listed on a detail page, before its images are fetched
#[derive(Debug, Clone)]
pub struct ChapterStub {
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
}

impl ChapterStub {
    /// Stable key of this chapter within its comic
    pub fn slug(&self) -> String {
        crate::catalog::slugify(&self.title)
    }
}

/// A fully fetched chapter: the unit of persisted content
///
/// Immutable once written; re-fetching the same slug replaces the whole
/// record (last write wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub total_images: usize,
    pub images: Vec<String>,
}

/// The persisted chapter collection of one comic (`{slug}/chapters.json`)
///
/// Invariants: chapter slugs are unique, and `total_chapters` equals
/// `chapters.len()` after every successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSet {
    pub slug: String,
    pub title: String,
    pub total_chapters: usize,
    pub chapters: Vec<ChapterRecord>,
}

impl ChapterSet {
    /// An empty collection for a comic with nothing stored yet
    pub fn empty(slug: &str, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            total_chapters: 0,
            chapters: Vec::new(),
        }
    }

    /// The store path of a comic's chapter collection
    pub fn path_for(slug: &str) -> String {
        format!("{}/chapters.json", slug)
    }

    /// The set of chapter slugs already persisted
    pub fn chapter_slugs(&self) -> HashSet<String> {
        self.chapters.iter().map(|c| c.slug.clone()).collect()
    }
}

/// The persisted comic metadata document (`{slug}/metadata.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComicMetadata {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub synopsis: String,
    /// Attribute map from the detail page; the classifier reads "Status"
    pub metadata: IndexMap<String, String>,
    pub total_chapters: usize,
}

impl ComicMetadata {
    /// The store path of a comic's metadata document
    pub fn path_for(slug: &str) -> String {
        format!("{}/metadata.json", slug)
    }

    /// The publication status attribute, if the detail page had one
    pub fn status(&self) -> Option<&str> {
        self.metadata.get("Status").map(String::as_str)
    }
}

/// One element of the run output: a comic plus the chapters fetched this run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComicRecord {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub cover_url: Option<String>,
    pub genres: Vec<String>,
    pub synopsis: String,
    pub metadata: IndexMap<String, String>,
    pub total_chapters: usize,
    pub chapters: Vec<ChapterRecord>,
}

impl ComicRecord {
    /// The metadata document for this comic (everything but the chapters)
    pub fn metadata_doc(&self) -> ComicMetadata {
        ComicMetadata {
            slug: self.slug.clone(),
            title: self.title.clone(),
            url: self.url.clone(),
            cover_url: self.cover_url.clone(),
            genres: self.genres.clone(),
            synopsis: self.synopsis.clone(),
            metadata: self.metadata.clone(),
            total_chapters: self.total_chapters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn chapter(slug: &str) -> ChapterRecord {
        ChapterRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            url: format!("https://example.com/{}/", slug),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            total_images: 2,
            images: vec![
                "https://img.example.com/1.jpg".to_string(),
                "https://img.example.com/2.jpg".to_string(),
            ],
        }
    }

    #[test]
    fn test_store_paths() {
        assert_eq!(ChapterSet::path_for("solo-leveling"), "solo-leveling/chapters.json");
        assert_eq!(
            ComicMetadata::path_for("solo-leveling"),
            "solo-leveling/metadata.json"
        );
    }

    #[test]
    fn test_chapter_slugs() {
        let set = ChapterSet {
            slug: "foo".to_string(),
            title: "Foo".to_string(),
            total_chapters: 2,
            chapters: vec![chapter("chapter-1"), chapter("chapter-2")],
        };
        let slugs = set.chapter_slugs();
        assert!(slugs.contains("chapter-1"));
        assert!(slugs.contains("chapter-2"));
        assert_eq!(slugs.len(), 2);
    }

    #[test]
    fn test_chapter_set_wire_format() {
        let set = ChapterSet {
            slug: "foo".to_string(),
            title: "Foo".to_string(),
            total_chapters: 1,
            chapters: vec![chapter("chapter-1")],
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["slug"], "foo");
        assert_eq!(json["total_chapters"], 1);
        assert_eq!(json["chapters"][0]["slug"], "chapter-1");
        assert_eq!(json["chapters"][0]["total_images"], 2);
    }

    #[test]
    fn test_metadata_status() {
        let mut attributes = IndexMap::new();
        attributes.insert("Status".to_string(), "Ongoing".to_string());
        let meta = ComicMetadata {
            slug: "foo".to_string(),
            title: "Foo".to_string(),
            url: "https://example.com/komik/foo/".to_string(),
            cover_url: None,
            genres: vec![],
            synopsis: String::new(),
            metadata: attributes,
            total_chapters: 0,
        };
        assert_eq!(meta.status(), Some("Ongoing"));
    }
}
