use crate::error::StoreError;
use crate::store::{HistoryEntry, ReflexDb, PROFILE_HISTORY_LIMIT};
use crate::util::mean;

/// Recent performance of one player
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileStats {
    /// Latest sessions, oldest first
    pub recent: Vec<HistoryEntry>,
    /// Rounded mean over `recent`, 0 when empty
    pub average_ms: u64,
    /// Fastest of `recent`, 0 when empty
    pub best_ms: u64,
    pub total_tests: u32,
}

impl ProfileStats {
    pub fn load(db: &ReflexDb, user_id: i64) -> Result<Self, StoreError> {
        let recent = db.recent_results(user_id, PROFILE_HISTORY_LIMIT)?;
        let total_tests = db.count_results(user_id)?;
        Ok(Self::from_history(recent, total_tests))
    }

    pub fn from_history(recent: Vec<HistoryEntry>, total_tests: u32) -> Self {
        let times: Vec<f64> = recent.iter().map(|e| e.reaction_ms as f64).collect();
        let average_ms = mean(&times).map_or(0, |m| m.round() as u64);
        let best_ms = recent.iter().map(|e| e.reaction_ms).min().unwrap_or(0);

        Self {
            recent,
            average_ms,
            best_ms,
            total_tests,
        }
    }

    /// (game number, reaction ms) points for the trend chart
    pub fn trend(&self) -> Vec<(f64, f64)> {
        self.recent
            .iter()
            .enumerate()
            .map(|(i, e)| ((i + 1) as f64, e.reaction_ms as f64))
            .collect()
    }
}
