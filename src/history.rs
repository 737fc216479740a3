use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::enums::{StabilityLevel, Subsystem};
use crate::scoring::types::StabilityScoreResult;

pub const DEFAULT_HISTORY_CAPACITY: usize = 90;

fn default_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Snapshot of one scoring pass kept for trend charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityScoreHistoryEntry {
    pub score: f64,
    pub level: StabilityLevel,
    pub timestamp: DateTime<Utc>,
    /// Stability per subsystem that reported data.
    pub subsystem_scores: BTreeMap<Subsystem, f64>,
}

impl StabilityScoreHistoryEntry {
    pub fn from_result(result: &StabilityScoreResult) -> Self {
        Self {
            score: result.score,
            level: result.level,
            timestamp: result.computed_at,
            subsystem_scores: result
                .contributions
                .iter()
                .filter(|c| c.has_data)
                .map(|c| (c.subsystem, c.stability_score))
                .collect(),
        }
    }
}

/// Bounded FIFO of history entries, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistory {
    entries: VecDeque<StabilityScoreHistoryEntry>,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

impl ScoreHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the cap, dropping the oldest entries if now over it.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.trim();
    }

    /// Append, dropping the oldest entries beyond capacity.
    pub fn push(&mut self, entry: StabilityScoreHistoryEntry) {
        self.entries.push_back(entry);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&StabilityScoreHistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StabilityScoreHistoryEntry> {
        self.entries.iter()
    }

    /// Mean score of entries at or after `since`. None when there are none.
    pub fn average_score_since(&self, since: DateTime<Utc>) -> Option<f64> {
        let (sum, count) = self
            .entries
            .iter()
            .filter(|e| e.timestamp >= since)
            .fold((0.0, 0usize), |(sum, count), e| (sum + e.score, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Mean score over the trailing `days` ending at `now`.
    pub fn average_score(&self, days: i64, now: DateTime<Utc>) -> Option<f64> {
        self.average_score_since(now - Duration::days(days))
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
