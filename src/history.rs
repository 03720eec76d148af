//! Persisted result history and the insights derived from it.
//!
//! An append-only record of past analysis results, truncated to a bounded
//! recent window. The history is caller-owned plumbing: the aggregator
//! hands results over and never reads them back.

use anyhow::{Context, Result};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::{AggregateResult, Tier};
use crate::classify::Label;

/// One recorded analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub label: Label,
    pub score: f32,
    pub tier: Tier,
    pub recorded_at: DateTime<Utc>,
    /// Local hour of day at record time, for the time-of-day summary
    pub hour: u32,
}

impl HistoryEntry {
    pub fn from_result(result: &AggregateResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: result.label,
            score: result.score,
            tier: result.tier,
            recorded_at: Utc::now(),
            hour: chrono::Local::now().hour(),
        }
    }
}

/// Aggregated view over the stored window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    /// Most frequent label; ties resolve to the lowest label index
    pub most_frequent: Option<Label>,
    /// Entries recorded before 12:00 local
    pub morning: usize,
    /// Entries recorded 12:00-17:59 local
    pub afternoon: usize,
    /// Entries recorded from 18:00 local
    pub evening: usize,
}

/// Bounded, persisted history of analysis results
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    limit: usize,
}

impl HistoryLog {
    /// Default number of entries retained.
    pub const DEFAULT_LIMIT: usize = 200;

    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Load from a JSON file, or start empty when the file is absent.
    /// The stored window is trimmed to `limit` on load.
    pub fn load(path: &Path, limit: usize) -> Result<Self> {
        let mut log = Self::new(limit);
        if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read history file")?;
            log.entries =
                serde_json::from_str(&content).context("Failed to parse history file")?;
            log.trim();
            debug!("Loaded {} history entries from {:?}", log.entries.len(), path);
        }
        Ok(log)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create history directory")?;
        }
        let content =
            serde_json::to_string_pretty(&self.entries).context("Failed to serialize history")?;
        std::fs::write(path, content).context("Failed to write history file")?;
        info!("Saved {} history entries to {:?}", self.entries.len(), path);
        Ok(())
    }

    /// Default location: `~/.emotion-cli/history.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".emotion-cli").join("history.json"))
    }

    /// Append an entry, dropping the oldest when over the window limit.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        self.trim();
    }

    fn trim(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn insights(&self) -> Insights {
        let mut counts = [0usize; Label::COUNT];
        let mut morning = 0;
        let mut afternoon = 0;
        let mut evening = 0;

        for entry in &self.entries {
            counts[entry.label.index()] += 1;
            if entry.hour < 12 {
                morning += 1;
            } else if entry.hour < 18 {
                afternoon += 1;
            } else {
                evening += 1;
            }
        }

        let mut most_frequent = None;
        let mut best = 0;
        for (index, &count) in counts.iter().enumerate() {
            if count > best {
                best = count;
                most_frequent = Label::from_index(index);
            }
        }

        Insights {
            most_frequent,
            morning,
            afternoon,
            evening,
        }
    }
}
