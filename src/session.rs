use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::grade::{grade_for, Grade};
use crate::round::Phase;

/// Number of rounds in every session
pub const TOTAL_ROUNDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub difficulty: DifficultyTier,
    pub total_rounds: usize,
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn new(difficulty: DifficultyTier) -> Self {
        Self {
            difficulty,
            total_rounds: TOTAL_ROUNDS,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DifficultyTier::default())
    }
}

/// Snapshot of a running session, as rendered by the game screen
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub round_index: usize,
    pub hits: Vec<u64>,
    pub total_clicks: u32,
    pub phase: Phase,
}

/// Finalized outcome of a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub mean_reaction_ms: u64,
    pub accuracy_percent: f64,
    pub difficulty: DifficultyTier,
    pub target_hits: u32,
    pub total_targets: u32,
}

impl SessionResult {
    pub fn grade(&self) -> Grade {
        grade_for(self.mean_reaction_ms)
    }
}

/// Hand-off of the most recent result from the game screen to the result
/// screen. Last write wins.
#[derive(Debug, Default)]
pub struct ResultSlot {
    latest: Option<SessionResult>,
}

impl ResultSlot {
    pub fn put(&mut self, result: SessionResult) {
        self.latest = Some(result);
    }

    pub fn latest(&self) -> Option<&SessionResult> {
        self.latest.as_ref()
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}
