//! Persistent top-ten high-score table.
//!
//! Stored as pretty JSON. A missing file is an empty table; a file that
//! exists but cannot be parsed is reported rather than silently replaced.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Number of entries kept.
pub const MAX_HIGH_SCORES: usize = 10;

/// High-score persistence errors.
#[derive(Error, Debug)]
pub enum HighScoreError {
    /// Reading or writing the file failed.
    #[error("High score file error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid score table.
    #[error("Failed to parse high scores: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    /// Player 1 name.
    pub player1: String,
    /// Player 2 name.
    pub player2: String,
    /// Final total score.
    pub score: u64,
    /// When the game finished.
    pub date: DateTime<Utc>,
}

/// Top scores, highest first, backed by a file.
#[derive(Debug, Clone)]
pub struct HighScoreTable {
    path: PathBuf,
    entries: Vec<HighScore>,
}

impl HighScoreTable {
    /// Open the table at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HighScoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No high score file yet");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        let mut table = Self { path, entries };
        table.normalize();
        Ok(table)
    }

    /// Entries, highest first.
    #[must_use]
    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `score` would make the table.
    #[must_use]
    pub fn qualifies(&self, score: u64) -> bool {
        self.entries.len() < MAX_HIGH_SCORES
            || self.entries.last().is_some_and(|last| score > last.score)
    }

    /// Insert an entry; returns its 1-based rank if it was kept.
    ///
    /// Ties rank below entries already in the table.
    pub fn submit(&mut self, entry: HighScore) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let index = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    /// Submit a game finishing now and save the table if it changed.
    pub fn record(
        &mut self,
        player1: &str,
        player2: &str,
        score: u64,
    ) -> Result<Option<usize>, HighScoreError> {
        let rank = self.submit(HighScore {
            player1: player1.to_string(),
            player2: player2.to_string(),
            score,
            date: Utc::now(),
        });
        if let Some(rank) = rank {
            info!(player1, player2, score, rank, "New high score");
            self.save()?;
        }
        Ok(rank)
    }

    /// Write the table to its file.
    pub fn save(&self) -> Result<(), HighScoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn normalize(&mut self) {
        // stable, so equal scores keep file order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u64) -> HighScore {
        HighScore {
            player1: name.to_string(),
            player2: "Bo".to_string(),
            score,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = HighScoreTable::open(dir.path().join("scores.json")).unwrap();
        assert!(table.entries().is_empty());
        assert!(table.qualifies(0));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            HighScoreTable::open(&path),
            Err(HighScoreError::Parse(_))
        ));
    }

    #[test]
    fn test_submit_keeps_descending_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = HighScoreTable::open(dir.path().join("s.json")).unwrap();
        assert_eq!(table.submit(entry("a", 100)), Some(1));
        assert_eq!(table.submit(entry("b", 300)), Some(1));
        assert_eq!(table.submit(entry("c", 200)), Some(2));
        assert_eq!(table.submit(entry("d", 200)), Some(3));

        let scores: Vec<u64> = table.entries().iter().map(|e| e.score).collect();
        assert_eq!(scores, [300, 200, 200, 100]);
        assert_eq!(table.entries()[1].player1, "c");
    }

    #[test]
    fn test_table_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = HighScoreTable::open(dir.path().join("s.json")).unwrap();
        for score in 1..=12 {
            table.submit(entry("p", score * 10));
        }
        assert_eq!(table.entries().len(), MAX_HIGH_SCORES);
        assert_eq!(table.entries().last().map(|e| e.score), Some(30));
        assert!(!table.qualifies(30));
        assert!(table.qualifies(31));
        assert_eq!(table.submit(entry("low", 5)), None);
    }

    #[test]
    fn test_record_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");

        let mut table = HighScoreTable::open(&path).unwrap();
        assert_eq!(table.record("Ada", "Bo", 450).unwrap(), Some(1));
        assert!(path.exists());

        let reloaded = HighScoreTable::open(&path).unwrap();
        assert_eq!(reloaded.entries(), table.entries());
        assert_eq!(reloaded.entries()[0].player1, "Ada");
    }
}
