// Rhythm generation for the chorale composer.
//
// Rhythms come from string rewriting: an L-system grows a symbol string from
// a short axiom, and a decoder reads that string as a sequence of signed
// durations. The symbol string is useful on its own as well: the harmonizer
// can use it to steer which chord path it takes, coupling the surface rhythm
// to the harmonic choices.
//
// Architecture:
// - `ratio.rs`: `Ratio`, exact signed durations in quarter notes
// - `lsystem.rs`: `LSystem` (one production per symbol) and `StochasticLSystem`
// - `decoder.rs`: `Decoder`, the named symbol alphabets and modifier semantics
// - `presets.rs`: rule set + axiom + decoder bundles, looked up by name
//
// No I/O and no global state. The only randomness is the stochastic
// L-system, which draws from a caller-supplied `chorale_prng::SeededRng`.

pub mod decoder;
pub mod error;
pub mod lsystem;
pub mod presets;
pub mod ratio;

pub use decoder::Decoder;
pub use error::{Result, RhythmError};
pub use lsystem::{LSystem, Production, StochasticLSystem};
pub use presets::{PRESETS, RhythmPreset, preset};
pub use ratio::Ratio;
