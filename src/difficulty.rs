use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Difficulty tier, selected once before a session starts
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DifficultyTier {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Normal,
        DifficultyTier::Hard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Normal => "Normal",
            DifficultyTier::Hard => "Hard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "large targets",
            DifficultyTier::Normal => "standard target size",
            DifficultyTier::Hard => "tiny targets",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            DifficultyTier::Easy => DifficultyTier::Normal,
            DifficultyTier::Normal => DifficultyTier::Hard,
            DifficultyTier::Hard => DifficultyTier::Easy,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            DifficultyTier::Easy => DifficultyTier::Hard,
            DifficultyTier::Normal => DifficultyTier::Easy,
            DifficultyTier::Hard => DifficultyTier::Normal,
        }
    }
}
