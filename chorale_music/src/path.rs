// Choosing one harmonization.
//
// Three selectors, all returning the chord path starting with the root chord:
//
// - `select_path`: random walk down a built tree. At each step the children
//   are shuffled and the first one whose subtree still reaches the target
//   depth is taken; if none does, the last child in shuffled order is taken
//   anyway, so a tree with dead branches still yields a (shorter) path.
// - `select_path_driven`: same walk, but the choice among the viable
//   children is the next symbol's alphabet position modulo their count, so a
//   rhythm string steers the harmony deterministically. Dead branches are
//   skipped before indexing; only when every child is dead does the index
//   run over all children.
// - `sample_path`: randomized depth-first search with backtracking straight
//   over the transition cache. It never builds the tree and only fails when
//   no complete harmonization exists or the step budget runs out.

use chorale_prng::SeededRng;
use rustc_hash::FxHashSet;

use crate::chord::{Chord, Pitch};
use crate::compose::validate_bass_line;
use crate::config::HarmonyConfig;
use crate::error::{HarmonyError, Result};
use crate::tonality::Tonality;
use crate::transition::TransitionCache;
use crate::tree::ChordTree;

/// Random root-to-leaf walk of at most `steps` steps.
pub fn select_path(tree: &ChordTree, steps: usize, rng: &mut SeededRng) -> Vec<Chord> {
    let target = tree.depth() + steps;
    let mut path = vec![tree.chord()];
    let mut node = tree;
    for _ in 0..steps {
        let children = node.children();
        let mut order: Vec<usize> = (0..children.len()).collect();
        rng.shuffle(&mut order);
        let pick = order
            .iter()
            .copied()
            .find(|&i| children[i].total_depth() == target)
            .or_else(|| order.last().copied());
        let Some(pick) = pick else {
            break;
        };
        node = &children[pick];
        path.push(node.chord());
    }
    path
}

/// Alphabet positions of a driving string's in-alphabet symbols, consumed
/// cyclically.
#[derive(Debug, Clone)]
pub struct DrivingSymbols {
    ordinals: Vec<usize>,
    cursor: usize,
}

impl DrivingSymbols {
    pub fn new(driver: &str, alphabet: &[char]) -> Result<Self> {
        let ordinals: Vec<usize> = driver
            .chars()
            .filter_map(|c| alphabet.iter().position(|&a| a == c))
            .collect();
        if ordinals.is_empty() {
            return Err(HarmonyError::EmptyDriver);
        }
        Ok(DrivingSymbols {
            ordinals,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }

    /// Symbols consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    fn next_ordinal(&mut self) -> usize {
        let ordinal = self.ordinals[self.cursor % self.ordinals.len()];
        self.cursor += 1;
        ordinal
    }
}

/// Walk of at most `steps` steps where each choice is read from `symbols`.
pub fn select_path_driven(
    tree: &ChordTree,
    steps: usize,
    symbols: &mut DrivingSymbols,
) -> Vec<Chord> {
    let target = tree.depth() + steps;
    let mut path = vec![tree.chord()];
    let mut node = tree;
    for _ in 0..steps {
        let children = node.children();
        if children.is_empty() {
            break;
        }
        let viable: Vec<&ChordTree> = children
            .iter()
            .filter(|c| c.total_depth() == target)
            .collect();
        let pool: Vec<&ChordTree> = if viable.is_empty() {
            children.iter().collect()
        } else {
            viable
        };
        node = pool[symbols.next_ordinal() % pool.len()];
        path.push(node.chord());
    }
    path
}

struct Frame {
    chord: Chord,
    options: Vec<Chord>,
    next: usize,
}

/// One complete harmonization of `bass_line` after `start`, found lazily.
///
/// As with `compose`, `bass_line` excludes the starting chord's own note.
pub fn sample_path(
    start: Chord,
    bass_line: &[Pitch],
    tonality: &Tonality,
    config: &HarmonyConfig,
    cache: &mut TransitionCache,
    rng: &mut SeededRng,
) -> Result<Vec<Chord>> {
    validate_bass_line(&start, bass_line, tonality, config)?;
    let limit = config.max_search_steps;

    // Successors of `chord` over bass note `position`, in random order.
    let mut expand = |chord: &Chord, position: usize, rng: &mut SeededRng| -> Result<Vec<Chord>> {
        let Some(&next_bass) = bass_line.get(position) else {
            return Ok(Vec::new());
        };
        let cadence = position + 1 == bass_line.len();
        let lookahead = bass_line.get(position + 1).copied();
        let mut options = cache
            .next_chords(chord, next_bass, lookahead, cadence, tonality, config)?
            .to_vec();
        rng.shuffle(&mut options);
        Ok(options)
    };

    let mut stack = vec![Frame {
        chord: start,
        options: expand(&start, 0, rng)?,
        next: 0,
    }];
    // (chord, path position) pairs known to have no complete continuation.
    let mut dead: FxHashSet<(Chord, usize)> = FxHashSet::default();
    let mut steps = 0usize;

    loop {
        if stack.len() == bass_line.len() + 1 {
            return Ok(stack.iter().map(|f| f.chord).collect());
        }
        let position = stack.len();
        let Some(top) = stack.last_mut() else {
            return Err(HarmonyError::NoHarmonization);
        };
        if top.next >= top.options.len() {
            if let Some(exhausted) = stack.pop() {
                dead.insert((exhausted.chord, position - 1));
            }
            if stack.is_empty() {
                return Err(HarmonyError::NoHarmonization);
            }
            continue;
        }
        let chord = top.options[top.next];
        top.next += 1;
        if dead.contains(&(chord, position)) {
            continue;
        }
        steps += 1;
        if steps > limit {
            return Err(HarmonyError::SearchExhausted { limit });
        }
        let options = expand(&chord, position, rng)?;
        stack.push(Frame {
            chord,
            options,
            next: 0,
        });
    }
}
