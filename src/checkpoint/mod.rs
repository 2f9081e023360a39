//! Durable run progress
//!
//! The checkpoint records the last fully processed catalog position and the
//! titles processed so far. It only ever advances after a comic's remote
//! write has fully succeeded, so a crash mid-comic leaves the checkpoint at
//! the previous comic and the interrupted one is safely redone.
//!
//! Writes are atomic (temp file + rename): a reader sees either the old or
//! the new content, never a torn file. Saves arriving out of position order
//! (workers finish in any order) are reconciled by keeping the maximum
//! position, so the persisted index never decreases.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resumable progress of the harvest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Index of the last fully processed catalog entry; -1 means none
    pub last_processed_index: i64,

    /// Titles of comics processed so far, in completion order
    pub scraped_comics: Vec<String>,
}

impl Default for CheckpointState {
    fn default() -> Self {
        Self {
            last_processed_index: -1,
            scraped_comics: Vec::new(),
        }
    }
}

/// Atomically updated checkpoint file
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint; a missing or malformed file is treated as a
    /// fresh start, never as a fatal error
    pub fn load(&self) -> CheckpointState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Checkpoint {} unreadable ({}), starting from scratch",
                        self.path.display(),
                        e
                    );
                }
                return CheckpointState::default();
            }
        };

        match serde_json::from_str::<CheckpointState>(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "Checkpoint {} malformed ({}), starting from scratch",
                    self.path.display(),
                    e
                );
                CheckpointState::default()
            }
        }
    }

    /// Persists progress after a comic completed
    ///
    /// The stored index becomes `max(on disk, position)`: with several
    /// comics in flight, position 7 may finish before position 5, and the
    /// checkpoint must not move backwards when the slower save lands.
    ///
    /// Returns the state that was persisted.
    pub fn save(
        &self,
        position: i64,
        scraped_comics: &[String],
    ) -> std::io::Result<CheckpointState> {
        let existing = self.load();

        let state = CheckpointState {
            last_processed_index: existing.last_processed_index.max(position),
            scraped_comics: scraped_comics.to_vec(),
        };

        let json = serde_json::to_vec_pretty(&state)?;
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
        std::io::Write::write_all(&mut tmp, &json)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        Ok(state)
    }
}
