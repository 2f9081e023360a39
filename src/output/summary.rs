//! Run output document and end-of-run summary
//!
//! The results file accumulates every comic completed across runs and is
//! atomically rewritten after each completion, so partial progress survives
//! a crash. The summary is the run's report card: every failure a worker
//! swallowed shows up here.

use crate::harvest::{ComicOutcome, ScanReport};
use crate::model::ComicRecord;
use std::path::Path;

/// Counters reported at the end of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub comics_completed: usize,
    pub comics_skipped: usize,
    pub comics_failed: usize,
    pub chapters_fetched: usize,
    pub chapters_skipped: usize,
    pub chapters_failed: usize,
    pub images_collected: usize,

    /// Rescan-mode counters; zero in batch mode
    pub scan_checked: usize,
    pub scan_skipped_terminal: usize,
    pub scan_failures: Vec<String>,
}

impl RunSummary {
    /// Folds one comic outcome into the counters
    pub fn record_outcome(&mut self, outcome: &ComicOutcome) {
        match outcome {
            ComicOutcome::Completed { record, stats, .. } => {
                self.comics_completed += 1;
                self.chapters_fetched += stats.fetched;
                self.chapters_skipped += stats.skipped;
                self.chapters_failed += stats.failed;
                self.images_collected +=
                    record.chapters.iter().map(|c| c.total_images).sum::<usize>();
            }
            ComicOutcome::Skipped { .. } => self.comics_skipped += 1,
            ComicOutcome::Failed { .. } => self.comics_failed += 1,
        }
    }

    /// Folds the rescan report into the counters
    pub fn record_scan(&mut self, report: &ScanReport) {
        self.scan_checked = report.checked;
        self.scan_skipped_terminal = report.skipped_terminal;
        self.scan_failures = report
            .failures
            .iter()
            .map(|(index, title, error)| format!("[{}] {}: {}", index, title, error))
            .collect();
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Comics:");
    println!("  Completed: {}", summary.comics_completed);
    println!("  Skipped (complete): {}", summary.comics_skipped);
    println!("  Failed: {}", summary.comics_failed);
    println!();

    println!("Chapters:");
    println!("  Fetched: {}", summary.chapters_fetched);
    println!("  Already stored: {}", summary.chapters_skipped);
    println!("  Failed: {}", summary.chapters_failed);
    println!("  Image links collected: {}", summary.images_collected);

    if summary.scan_checked > 0 || summary.scan_skipped_terminal > 0 {
        println!();
        println!("Rescan:");
        println!("  Comics checked: {}", summary.scan_checked);
        println!("  Terminal (skipped): {}", summary.scan_skipped_terminal);
    }

    if !summary.scan_failures.is_empty() {
        println!();
        println!("Scan failures ({}):", summary.scan_failures.len());
        for failure in &summary.scan_failures {
            println!("  - {}", failure);
        }
    }
}

/// Loads the accumulated results; missing or malformed files are an empty
/// accumulator, never an error
pub fn load_results(path: &Path) -> Vec<ComicRecord> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Results file {} unreadable ({}), starting empty", path.display(), e);
            }
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!("Results file {} malformed ({}), starting empty", path.display(), e);
            Vec::new()
        }
    }
}

/// Atomically rewrites the accumulated results
pub fn save_results(path: &Path, results: &[ComicRecord]) -> std::io::Result<()> {
    let json = serde_json::to_vec_pretty(results)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, &json)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::ComicStats;
    use indexmap::IndexMap;

    fn record(slug: &str) -> ComicRecord {
        ComicRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            url: format!("https://example.com/komik/{}/", slug),
            cover_url: None,
            genres: vec![],
            synopsis: String::new(),
            metadata: IndexMap::new(),
            total_chapters: 0,
            chapters: vec![],
        }
    }

    #[test]
    fn test_load_results_missing_is_empty() {
        assert!(load_results(Path::new("/nonexistent/results.json")).is_empty());
    }

    #[test]
    fn test_load_results_malformed_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "[{ truncated").unwrap();

        assert!(load_results(&path).is_empty());
    }

    #[test]
    fn test_save_and_reload_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        save_results(&path, &[record("foo"), record("bar")]).unwrap();
        let loaded = load_results(&path);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].slug, "foo");
    }

    #[test]
    fn test_record_outcome_counters() {
        let mut summary = RunSummary::default();

        summary.record_outcome(&ComicOutcome::Completed {
            index: 0,
            record: record("foo"),
            stats: ComicStats {
                fetched: 3,
                skipped: 2,
                failed: 1,
            },
        });
        summary.record_outcome(&ComicOutcome::Failed {
            index: 1,
            title: "Bar".to_string(),
            error: "boom".to_string(),
        });

        assert_eq!(summary.comics_completed, 1);
        assert_eq!(summary.comics_failed, 1);
        assert_eq!(summary.chapters_fetched, 3);
        assert_eq!(summary.chapters_skipped, 2);
        assert_eq!(summary.chapters_failed, 1);
    }
}
