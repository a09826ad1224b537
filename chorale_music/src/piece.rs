// Multi-section pieces.
//
// A piece is several harmonized bass lines in a row. Each section's bass line
// is drawn at random from a pool, and each section starts from the chord the
// previous one ended on, so consecutive sections join smoothly. A line's first
// note stands for that starting chord and is not harmonized again, which also
// keeps the junction chord from appearing twice.

use chorale_prng::SeededRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::chord::{Chord, Pitch};
use crate::error::{HarmonyError, Result};
use crate::harmonizer::{Harmonizer, Selection};
use crate::path::DrivingSymbols;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Build every section's tree and walk it at random.
    #[default]
    Tree,
    /// Build the tree and let the rhythm string choose the path.
    Driven,
    /// Backtracking search without building the tree.
    Lazy,
}

impl FromStr for Strategy {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tree" => Ok(Strategy::Tree),
            "driven" => Ok(Strategy::Driven),
            "lazy" => Ok(Strategy::Lazy),
            _ => Err(HarmonyError::UnknownStrategy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiecePlan {
    pub start: Chord,
    pub bass_lines: Vec<Vec<Pitch>>,
    pub sections: usize,
    pub strategy: Strategy,
}

/// Harmonize `plan.sections` sections back to back.
///
/// `symbols` is required for `Strategy::Driven` and continues across
/// sections.
pub fn compose_piece(
    plan: &PiecePlan,
    harmonizer: &mut Harmonizer,
    rng: &mut SeededRng,
    mut symbols: Option<&mut DrivingSymbols>,
) -> Result<Vec<Chord>> {
    let mut piece = vec![plan.start];
    let mut current = plan.start;
    for section in 0..plan.sections {
        let line = rng
            .choose(&plan.bass_lines)
            .filter(|line| !line.is_empty())
            .ok_or(HarmonyError::EmptyBassLine)?;
        let remaining = &line[1..];
        let selection = match plan.strategy {
            Strategy::Tree => Selection::Random(&mut *rng),
            Strategy::Lazy => Selection::Lazy(&mut *rng),
            Strategy::Driven => {
                Selection::Driven(symbols.as_deref_mut().ok_or(HarmonyError::EmptyDriver)?)
            }
        };
        let path = harmonizer.harmonize(current, remaining, selection)?;
        info!(
            section,
            bass_notes = line.len(),
            chords = path.len() - 1,
            "section harmonized"
        );
        piece.extend_from_slice(&path[1..]);
        if let Some(&last) = path.last() {
            current = last;
        }
    }
    Ok(piece)
}
