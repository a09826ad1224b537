// Chorale harmonizer
//
// Generates four-voice (SATB) chorales: given a bass line and a key, it finds
// upper voices that obey classical voice-leading rules, then times the chords
// with a rhythm grown by an L-system. The search is exhaustive over a bounded
// window around each voice, so the result is always rule-valid; which valid
// harmonization comes out is decided by a seeded random walk, by the rhythm's
// symbol string, or by a lazy backtracking sampler.
//
// Architecture:
// - tonality.rs: Keys (30 signatures, English + solfege names), degree tables
// - chord.rs: Pitch, Voice, Chord (b/t/a/s), SimplifiedChord, range checks
// - config.rs: HarmonyConfig, RuleSet switches, VoiceRanges
// - rules.rs: The twelve voice-leading predicates and the filter pass
// - candidates.rs: Next-chord enumeration (epsilon window, common tones)
// - transition.rs: next_chords + the transition cache
// - tree.rs: ChordTree (Node / Leaf / Empty) with cached level and depth
// - compose.rs: Iterative tree construction with a node budget
// - path.rs: Random, symbol-driven and lazy path selection
// - harmonizer.rs: Harmonizer (tonality + config + cache) facade
// - voices.rs: VoiceLines and NoteEvent materialization
// - piece.rs: Multi-section pieces chained chord to chord
// - job.rs: JobConfig (JSON) and the end-to-end run
//
// Deterministic given a seed: all randomness comes from chorale_prng, all
// candidate sets are ordered, and the cache is keyed on every input the rules
// read.

pub mod candidates;
pub mod chord;
pub mod compose;
pub mod config;
pub mod error;
pub mod harmonizer;
pub mod job;
pub mod path;
pub mod piece;
pub mod rules;
pub mod tonality;
pub mod transition;
pub mod tree;
pub mod voices;

pub use chord::{Chord, Pitch, SimplifiedChord, Voice, pitch_name};
pub use config::{HarmonyConfig, RuleSet, VoiceRanges};
pub use error::{HarmonyError, Result};
pub use harmonizer::{Harmonizer, Selection};
pub use tonality::{Degree, Key, KeyMode, Tonality};
pub use tree::{ChordTree, TreeKind};
