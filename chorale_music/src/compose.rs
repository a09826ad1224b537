// Eager construction of the composition tree.
//
// `compose` expands a starting chord over the remaining bass notes: every
// valid successor over the next note becomes a child, recursively, and the
// successors over the last note become leaves (the final cadence). The
// expansion uses an explicit work stack over a flat arena instead of
// recursion, then assembles the owned tree bottom-up. Children of a node are
// pushed to the arena together, so each node's children are a contiguous
// index range.
//
// Input is validated up front: every bass note must be diatonic in the
// tonality. Tree size is bounded by `HarmonyConfig::max_tree_nodes`.

use std::ops::Range;
use tracing::{debug, warn};

use crate::chord::{Chord, Pitch};
use crate::config::HarmonyConfig;
use crate::error::{HarmonyError, Result};
use crate::rules::{Rule, degree_in};
use crate::tonality::Tonality;
use crate::transition::TransitionCache;
use crate::tree::ChordTree;

struct ArenaNode {
    chord: Chord,
    depth: usize,
    /// Index of the next bass note to harmonize below this node.
    position: usize,
    leaf: bool,
    children: Range<usize>,
}

/// Reject a starting chord or bass line with notes outside the tonality.
///
/// A starting chord outside the configured voice ranges is only logged.
pub fn validate_bass_line(
    start: &Chord,
    bass_line: &[Pitch],
    tonality: &Tonality,
    config: &HarmonyConfig,
) -> Result<()> {
    degree_in(tonality, start.bass())?;
    for &pitch in bass_line {
        degree_in(tonality, pitch)?;
    }
    if !start_in_ranges(start, config) {
        warn!(%start, "starting chord is outside the configured voice ranges");
    }
    Ok(())
}

fn start_in_ranges(start: &Chord, config: &HarmonyConfig) -> bool {
    start.check_ranges_in(&config.ranges)
}

/// Build the tree of every valid harmonization of `bass_line` after `start`.
///
/// `bass_line` holds only the notes still to be harmonized; the starting
/// chord's own bass note is not part of it.
pub fn compose(
    start: Chord,
    bass_line: &[Pitch],
    tonality: &Tonality,
    config: &HarmonyConfig,
    cache: &mut TransitionCache,
) -> Result<ChordTree> {
    validate_bass_line(&start, bass_line, tonality, config)?;
    let limit = config.max_tree_nodes;

    let mut arena = vec![ArenaNode {
        chord: start,
        depth: 1,
        position: 0,
        leaf: false,
        children: 0..0,
    }];
    let mut work = vec![0];
    let mut leaves = 0usize;

    while let Some(idx) = work.pop() {
        let position = arena[idx].position;
        let Some(&next_bass) = bass_line.get(position) else {
            continue;
        };
        let cadence = position + 1 == bass_line.len();
        let lookahead = bass_line.get(position + 1).copied();
        let successors = cache.next_chords(
            &arena[idx].chord,
            next_bass,
            lookahead,
            cadence,
            tonality,
            config,
        )?;
        if arena.len() + successors.len() > limit {
            return Err(HarmonyError::TreeTooLarge { limit });
        }

        let depth = arena[idx].depth + 1;
        let first = arena.len();
        for &chord in successors.iter() {
            debug_assert!(
                !config.rules.is_active(Rule::VoiceRanges) || chord.check_ranges_in(&config.ranges),
                "out-of-range chord {chord} passed the range rule"
            );
            arena.push(ArenaNode {
                chord,
                depth,
                position: position + 1,
                leaf: cadence,
                children: 0..0,
            });
        }
        arena[idx].children = first..arena.len();
        if cadence {
            leaves += successors.len();
        } else {
            work.extend((first..arena.len()).rev());
        }
    }

    debug!(
        nodes = arena.len(),
        leaves,
        cache_hits = cache.hits(),
        cache_misses = cache.misses(),
        "composition tree built"
    );

    // Children always sit after their parent, so a reverse sweep sees every
    // subtree complete before its root.
    let mut built: Vec<ChordTree> = (0..arena.len()).map(|_| ChordTree::empty(0)).collect();
    for idx in (0..arena.len()).rev() {
        let node = &arena[idx];
        let tree = if node.leaf {
            ChordTree::leaf(node.chord, node.depth)
        } else {
            let children = node
                .children
                .clone()
                .map(|c| std::mem::replace(&mut built[c], ChordTree::empty(0)))
                .collect();
            ChordTree::node(node.chord, node.depth, children)
        };
        built[idx] = tree;
    }
    Ok(built.swap_remove(0))
}
