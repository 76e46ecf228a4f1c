use serde::{Deserialize, Serialize};

use super::store::ScoreStore;
use crate::error::Result;
use crate::problem::MAX_INTERVAL;

/// Storage key for the persisted scores.
pub const SCORE_KEY: &str = "scores";

/// Number of slots in each counter vector. Index 0 is unused.
pub const SCORE_SLOTS: usize = MAX_INTERVAL as usize + 1;

/// Right/wrong counters per interval size, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    right: Vec<u32>,
    wrong: Vec<u32>,
}

impl Default for Scores {
    fn default() -> Self {
        Self {
            right: vec![0; SCORE_SLOTS],
            wrong: vec![0; SCORE_SLOTS],
        }
    }
}

impl Scores {
    /// Parse a persisted record. Anything that is not exactly two 13-slot
    /// counter vectors with an empty slot 0 is rejected.
    pub fn from_json(content: &str) -> Option<Self> {
        let scores: Scores = match serde_json::from_str(content) {
            Ok(scores) => scores,
            Err(e) => {
                log::debug!("Discarding unreadable scores: {}", e);
                return None;
            }
        };

        let well_formed = scores.right.len() == SCORE_SLOTS
            && scores.wrong.len() == SCORE_SLOTS
            && scores.right[0] == 0
            && scores.wrong[0] == 0;
        if !well_formed {
            log::debug!("Discarding scores with unexpected shape");
            return None;
        }

        Some(scores)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Counters with one more right or wrong answer for `size`.
    ///
    /// Returns `None` for sizes outside 1-12.
    pub fn with_outcome(&self, size: u8, mistake: bool) -> Option<Self> {
        let index = Self::index(size)?;
        let mut next = self.clone();
        let counter = if mistake {
            &mut next.wrong[index]
        } else {
            &mut next.right[index]
        };
        *counter = counter.saturating_add(1);
        Some(next)
    }

    fn index(size: u8) -> Option<usize> {
        (1..=MAX_INTERVAL).contains(&size).then_some(size as usize)
    }

    pub fn right(&self, size: u8) -> u32 {
        Self::index(size).map_or(0, |i| self.right[i])
    }

    pub fn wrong(&self, size: u8) -> u32 {
        Self::index(size).map_or(0, |i| self.wrong[i])
    }

    pub fn right_counts(&self) -> &[u32] {
        &self.right
    }

    pub fn wrong_counts(&self) -> &[u32] {
        &self.wrong
    }

    pub fn attempts(&self, size: u8) -> u32 {
        self.right(size).saturating_add(self.wrong(size))
    }

    /// Share of right answers for `size`, or `None` if it was never asked.
    pub fn accuracy(&self, size: u8) -> Option<f64> {
        let attempts = self.attempts(size);
        (attempts > 0).then(|| self.right(size) as f64 / attempts as f64)
    }

    pub fn total_right(&self) -> u32 {
        self.right.iter().copied().fold(0, u32::saturating_add)
    }

    pub fn total_wrong(&self) -> u32 {
        self.wrong.iter().copied().fold(0, u32::saturating_add)
    }
}

/// Per-interval statistics, kept in sync with durable storage.
///
/// Every change is written through immediately; there is no buffering and
/// nothing to flush on shutdown.
pub struct ScoreLedger<T> {
    scores: Scores,
    store: T,
}

impl<T: ScoreStore> ScoreLedger<T> {
    /// Restore scores from `store`, falling back to zeros if the slot is
    /// empty or unreadable.
    pub fn load(store: T) -> Self {
        let scores = store
            .read(SCORE_KEY)
            .and_then(|content| Scores::from_json(&content))
            .unwrap_or_default();

        log::info!(
            "Loaded scores: {} right, {} wrong",
            scores.total_right(),
            scores.total_wrong()
        );

        Self { scores, store }
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    /// Count one completed round and persist the result.
    ///
    /// The in-memory counters are updated even if the write fails.
    pub fn record_outcome(&mut self, size: u8, mistake: bool) -> Result<()> {
        let Some(next) = self.scores.with_outcome(size, mistake) else {
            log::warn!("Ignoring outcome for invalid interval size {}", size);
            return Ok(());
        };
        self.scores = next;
        self.persist()
    }

    /// Zero every counter and persist.
    pub fn reset(&mut self) -> Result<()> {
        self.scores = Scores::default();
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let content = self.scores.to_json()?;
        self.store.write(SCORE_KEY, &content)
    }
}
