//! Error types for harmonization

use chorale_rhythm::RhythmError;
use thiserror::Error;

use crate::chord::Pitch;

#[derive(Debug, Error)]
pub enum HarmonyError {
    #[error("unknown tonality: {0}")]
    UnknownTonality(String),
    #[error("pitch {pitch} is not in {key}")]
    NoteOutsideTonality { pitch: Pitch, key: String },
    #[error("composition tree exceeded {limit} nodes")]
    TreeTooLarge { limit: usize },
    #[error("path search gave up after {limit} steps")]
    SearchExhausted { limit: usize },
    #[error("no rule-valid harmonization exists for this bass line")]
    NoHarmonization,
    #[error("driving string contains no symbol of the alphabet")]
    EmptyDriver,
    #[error("unknown selection strategy: {0}")]
    UnknownStrategy(String),
    #[error("no bass lines to choose from")]
    EmptyBassLine,
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("rhythm error: {0}")]
    Rhythm(#[from] RhythmError),
}

pub type Result<T> = std::result::Result<T, HarmonyError>;
