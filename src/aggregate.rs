use crate::difficulty::DifficultyTier;
use crate::round::RoundOutcome;
use crate::session::SessionResult;
use crate::util::round_to;

/// Integer-rounded mean over the full session length
pub fn mean_reaction_ms(hits: &[u64], total_rounds: usize) -> u64 {
    if total_rounds == 0 {
        return 0;
    }
    let sum: u64 = hits.iter().sum();
    (sum as f64 / total_rounds as f64).round() as u64
}

/// Hits as a share of every registered click, rounded to two decimals.
/// No clicks means 0.
pub fn accuracy_percent(hits: usize, total_clicks: u32) -> f64 {
    if total_clicks == 0 {
        return 0.0;
    }
    round_to(100.0 * hits as f64 / total_clicks as f64, 2)
}

/// Accumulates round outcomes and produces the session result once
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    total_rounds: usize,
    hits: Vec<u64>,
    total_clicks: u32,
    finalized: bool,
}

impl SessionAggregator {
    pub fn new(total_rounds: usize) -> Self {
        Self {
            total_rounds,
            hits: Vec::with_capacity(total_rounds),
            total_clicks: 0,
            finalized: false,
        }
    }

    pub fn record(&mut self, outcome: RoundOutcome) {
        if self.finalized {
            return;
        }
        if let RoundOutcome::Hit { reaction_ms } = outcome {
            self.hits.push(reaction_ms);
        }
        self.total_clicks += 1;
    }

    pub fn hits(&self) -> &[u64] {
        &self.hits
    }

    pub fn total_clicks(&self) -> u32 {
        self.total_clicks
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    pub fn is_complete(&self) -> bool {
        self.hits.len() >= self.total_rounds
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Yields the result the first time the session is complete, `None` otherwise
    pub fn finalize(&mut self, difficulty: DifficultyTier) -> Option<SessionResult> {
        if self.finalized || !self.is_complete() {
            return None;
        }
        self.finalized = true;

        Some(SessionResult {
            mean_reaction_ms: mean_reaction_ms(&self.hits, self.total_rounds),
            accuracy_percent: accuracy_percent(self.hits.len(), self.total_clicks),
            difficulty,
            target_hits: self.hits.len() as u32,
            total_targets: self.total_rounds as u32,
        })
    }
}
