use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;

pub const DELAY_MIN_MS: u64 = 1000;
pub const DELAY_MAX_MS: u64 = 3000;

/// Gap kept between the target and every edge of the play area
pub const PADDING: f64 = 50.0;
/// Height reserved at the top for the HUD
pub const CHROME_HEIGHT: f64 = 60.0;

/// Play area in logical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Square target placed in logical units; (x, y) is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetGeometry {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl TargetGeometry {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.size && y >= self.y && y < self.y + self.size
    }
}

pub fn size_for(tier: DifficultyTier) -> f64 {
    match tier {
        DifficultyTier::Easy => 80.0,
        DifficultyTier::Normal => 60.0,
        DifficultyTier::Hard => 40.0,
    }
}

/// Randomized inter-round delays and target placements
#[derive(Debug, Clone)]
pub struct TargetGenerator {
    rng: StdRng,
    seed: Option<u64>,
}

impl TargetGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Reproducible generator: the same seed yields the same delays and placements
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Uniform in [DELAY_MIN_MS, DELAY_MAX_MS)
    pub fn next_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.gen_range(DELAY_MIN_MS..DELAY_MAX_MS))
    }

    pub fn next_position(&mut self, tier: DifficultyTier, viewport: Viewport) -> TargetGeometry {
        let size = size_for(tier);
        let x = self.uniform(PADDING, viewport.width - size - PADDING);
        let y = self.uniform(PADDING + CHROME_HEIGHT, viewport.height - size - PADDING);
        TargetGeometry { x, y, size }
    }

    // A viewport too small for the target collapses the range onto its lower bound.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(high > low) {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

impl Default for TargetGenerator {
    fn default() -> Self {
        Self::new()
    }
}
