//! Error types for rhythm generation

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RhythmError {
    #[error("symbol '{symbol}' has more than one production")]
    DuplicateProduction { symbol: char },
    #[error("production base must be a single symbol, got {base:?}")]
    InvalidSymbol { base: String },
    #[error("unknown rhythm preset: {0}")]
    UnknownPreset(String),
    #[error("unknown duration decoder: {0}")]
    UnknownDecoder(String),
    #[error("rewritten string exceeded {limit} symbols at iteration {iteration}")]
    LengthLimit { limit: usize, iteration: usize },
}

pub type Result<T> = std::result::Result<T, RhythmError>;
