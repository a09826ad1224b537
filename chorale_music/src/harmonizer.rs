// One tonality, one config, one transition cache.
//
// `Harmonizer` is the entry point most callers want: it owns the cache so
// repeated harmonizations in the same key share transitions, and it picks
// between the eager tree (`compose` + a selector) and the lazy sampler.

use chorale_prng::SeededRng;
use std::sync::Arc;

use crate::chord::{Chord, Pitch};
use crate::compose::compose;
use crate::config::HarmonyConfig;
use crate::error::{HarmonyError, Result};
use crate::path::{DrivingSymbols, sample_path, select_path, select_path_driven};
use crate::tonality::{Key, Tonality};
use crate::transition::TransitionCache;
use crate::tree::ChordTree;

/// How to pick one harmonization.
pub enum Selection<'a> {
    /// Build the tree, walk it at random.
    Random(&'a mut SeededRng),
    /// Build the tree, walk it as the symbols dictate.
    Driven(&'a mut DrivingSymbols),
    /// Search lazily without building the tree.
    Lazy(&'a mut SeededRng),
}

#[derive(Debug)]
pub struct Harmonizer {
    tonality: Tonality,
    config: HarmonyConfig,
    cache: TransitionCache,
}

impl Harmonizer {
    pub fn new(key: Key, config: HarmonyConfig) -> Self {
        Harmonizer {
            tonality: key.tonality(),
            config,
            cache: TransitionCache::new(),
        }
    }

    pub fn tonality(&self) -> &Tonality {
        &self.tonality
    }

    pub fn config(&self) -> &HarmonyConfig {
        &self.config
    }

    pub fn cache(&self) -> &TransitionCache {
        &self.cache
    }

    pub fn next_chords(
        &mut self,
        current: &Chord,
        next_bass: Pitch,
        lookahead: Option<Pitch>,
        cadence: bool,
    ) -> Result<Arc<[Chord]>> {
        self.cache
            .next_chords(current, next_bass, lookahead, cadence, &self.tonality, &self.config)
    }

    /// Full tree over the notes after `start`.
    pub fn compose(&mut self, start: Chord, remaining: &[Pitch]) -> Result<ChordTree> {
        compose(start, remaining, &self.tonality, &self.config, &mut self.cache)
    }

    /// One path `start, c1, .., cn` over the notes after `start`.
    ///
    /// Fails with `NoHarmonization` when no complete path exists.
    pub fn harmonize(
        &mut self,
        start: Chord,
        remaining: &[Pitch],
        selection: Selection<'_>,
    ) -> Result<Vec<Chord>> {
        match selection {
            Selection::Random(rng) => {
                let tree = self.complete_tree(start, remaining)?;
                Ok(select_path(&tree, remaining.len(), rng))
            }
            Selection::Driven(symbols) => {
                let tree = self.complete_tree(start, remaining)?;
                Ok(select_path_driven(&tree, remaining.len(), symbols))
            }
            Selection::Lazy(rng) => sample_path(
                start,
                remaining,
                &self.tonality,
                &self.config,
                &mut self.cache,
                rng,
            ),
        }
    }

    fn complete_tree(&mut self, start: Chord, remaining: &[Pitch]) -> Result<ChordTree> {
        let tree = self.compose(start, remaining)?;
        if !remaining.is_empty() && tree.level() == 0 {
            return Err(HarmonyError::NoHarmonization);
        }
        Ok(tree)
    }
}
