// Memoized chord transitions.
//
// `next_chords` is candidate completion followed by rule filtering. The same
// (chord, next bass) pair comes up many times while a tree is built, so results
// are cached. The key also carries the key signature, the cadence flag
// (rules 0 and 11) and the look-ahead degree (rule 7). The cache remembers the
// `HarmonyConfig` its entries were computed under and drops them all when a
// lookup arrives with a different one, so a cache can be reused across bass
// lines, keys and configs without ever returning a stale answer.
//
// Cached values are shared slices in the candidates' sorted order.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

use crate::candidates::candidate_chords;
use crate::chord::{Chord, Pitch};
use crate::config::HarmonyConfig;
use crate::error::Result;
use crate::rules::{TransitionContext, degree_in, filter_with_rules};
use crate::tonality::{Degree, Key, Tonality};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    pub chord: Chord,
    pub next_bass: Pitch,
    pub lookahead: Option<Degree>,
    pub cadence: bool,
    pub key: Key,
}

#[derive(Debug, Default)]
pub struct TransitionCache {
    entries: FxHashMap<TransitionKey, Arc<[Chord]>>,
    /// Config the current entries were computed under.
    config: Option<HarmonyConfig>,
    hits: u64,
    misses: u64,
}

impl TransitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn get(&self, key: &TransitionKey) -> Option<&Arc<[Chord]>> {
        self.entries.get(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.config = None;
        self.hits = 0;
        self.misses = 0;
    }

    /// Valid successors of `current` over `next_bass`, computed once per key.
    ///
    /// `lookahead` is the bass pitch after `next_bass`, if any; `cadence`
    /// marks `next_bass` as the last note of the line.
    pub fn next_chords(
        &mut self,
        current: &Chord,
        next_bass: Pitch,
        lookahead: Option<Pitch>,
        cadence: bool,
        tonality: &Tonality,
        config: &HarmonyConfig,
    ) -> Result<Arc<[Chord]>> {
        let lookahead = lookahead.map(|p| degree_in(tonality, p)).transpose()?;
        if self.config.as_ref() != Some(config) {
            if !self.entries.is_empty() {
                debug!(dropped = self.entries.len(), "harmony config changed, clearing transitions");
                self.entries.clear();
            }
            self.config = Some(config.clone());
        }
        let key = TransitionKey {
            chord: *current,
            next_bass,
            lookahead,
            cadence,
            key: tonality.key(),
        };
        if let Some(found) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(found));
        }
        self.misses += 1;

        let ctx = TransitionContext::new(tonality, config, current, next_bass, lookahead, cadence)?;
        let candidates = candidate_chords(current, next_bass, &ctx);
        let valid: Arc<[Chord]> = filter_with_rules(current, candidates, &ctx)
            .into_iter()
            .collect();
        self.entries.insert(key, Arc::clone(&valid));
        Ok(valid)
    }
}
