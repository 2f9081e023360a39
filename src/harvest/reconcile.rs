//! Chapter reconciliation
//!
//! Freshly fetched chapters merge into the stored collection by slug: the
//! stored chapters keep their order, fresh records overwrite on slug
//! collision (re-fetching is the refresh path) or append otherwise. The
//! merge is idempotent and commutative per slug, so chapter fetch order
//! never affects the final collection.

use crate::model::{ChapterRecord, ChapterSet};
use indexmap::IndexMap;

/// Merges fresh chapters into an existing collection
///
/// `existing = None` is the empty baseline of a comic nobody has stored
/// yet. `total_chapters` is recomputed from the merged map, keeping the
/// count invariant regardless of what the inputs claimed.
pub fn merge(
    existing: Option<&ChapterSet>,
    slug: &str,
    title: &str,
    fresh: &[ChapterRecord],
) -> ChapterSet {
    let mut by_slug: IndexMap<String, ChapterRecord> = IndexMap::new();

    if let Some(set) = existing {
        for chapter in &set.chapters {
            by_slug.insert(chapter.slug.clone(), chapter.clone());
        }
    }

    // New data wins on collision
    for chapter in fresh {
        by_slug.insert(chapter.slug.clone(), chapter.clone());
    }

    let chapters: Vec<ChapterRecord> = by_slug.into_values().collect();

    ChapterSet {
        slug: slug.to_string(),
        title: title.to_string(),
        total_chapters: chapters.len(),
        chapters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn chapter(slug: &str, image: &str) -> ChapterRecord {
        ChapterRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            url: format!("https://example.com/{}/", slug),
            published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            total_images: 1,
            images: vec![image.to_string()],
        }
    }

    fn existing_set() -> ChapterSet {
        ChapterSet {
            slug: "foo".to_string(),
            title: "Foo".to_string(),
            total_chapters: 2,
            chapters: vec![chapter("chapter-1", "a.jpg"), chapter("chapter-2", "b.jpg")],
        }
    }

    #[test]
    fn test_merge_into_empty_baseline() {
        let fresh = vec![chapter("chapter-1", "a.jpg")];
        let merged = merge(None, "foo", "Foo", &fresh);

        assert_eq!(merged.slug, "foo");
        assert_eq!(merged.total_chapters, 1);
        assert_eq!(merged.chapters.len(), 1);
    }

    #[test]
    fn test_merge_appends_new_chapters() {
        let existing = existing_set();
        let fresh = vec![chapter("chapter-3", "c.jpg")];
        let merged = merge(Some(&existing), "foo", "Foo", &fresh);

        assert_eq!(merged.total_chapters, 3);
        // Existing order preserved, new chapters after
        let slugs: Vec<_> = merged.chapters.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["chapter-1", "chapter-2", "chapter-3"]);
    }

    #[test]
    fn test_merge_overwrites_on_collision() {
        let existing = existing_set();
        let fresh = vec![chapter("chapter-2", "b-fixed.jpg")];
        let merged = merge(Some(&existing), "foo", "Foo", &fresh);

        assert_eq!(merged.total_chapters, 2);
        assert_eq!(merged.chapters[1].images, vec!["b-fixed.jpg"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = existing_set();
        let fresh = vec![chapter("chapter-2", "b-fixed.jpg"), chapter("chapter-3", "c.jpg")];

        let once = merge(Some(&existing), "foo", "Foo", &fresh);
        let twice = merge(Some(&once), "foo", "Foo", &fresh);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keys_are_unique() {
        let existing = existing_set();
        let fresh = vec![
            chapter("chapter-1", "x.jpg"),
            chapter("chapter-2", "y.jpg"),
            chapter("chapter-3", "z.jpg"),
        ];
        let merged = merge(Some(&existing), "foo", "Foo", &fresh);

        let mut slugs: Vec<_> = merged.chapters.iter().map(|c| c.slug.clone()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), merged.chapters.len());
    }

    #[test]
    fn test_count_invariant_ignores_stale_input_count() {
        // A stored document with a wrong count gets repaired on merge
        let mut existing = existing_set();
        existing.total_chapters = 99;

        let merged = merge(Some(&existing), "foo", "Foo", &[]);
        assert_eq!(merged.total_chapters, merged.chapters.len());
    }
}
