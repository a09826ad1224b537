// Symbol strings to duration sequences.
//
// Each rhythmic sub-style reads L-system output with its own alphabet. The
// alphabets disagree on what a letter is worth (D is a sixteenth in one and a
// dotted eighth in another) and on what the modifier symbols do, so each one
// stays a separate named `Decoder` variant with its own routine rather than
// a shared table with switches.
//
// Common conventions:
// - Durations are in quarter notes; negative means a rest.
// - A modifier with no preceding duration is a no-op.
// - Symbols outside a decoder's alphabet and modifier set are skipped.
//
// The "merge" form (`+X` in the complex decoders) reads two symbols: it
// appends X, then replaces the last two durations by |a| + |b| carrying the
// sign of a. When X is not a duration letter both symbols are consumed and
// nothing happens.

use crate::error::RhythmError;
use crate::ratio::Ratio;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoder {
    /// A=2 B=1 C=1/2 D=1/4 E=1/3; `+` extends by half, `-` halves.
    Abcde,
    /// A=2 B=1 C=1/2 D=3/4; `[` extends, `-` rests, `+X` merges.
    Complex,
    /// A=2 B=1 C=1/2 D=1/4 E=1/3; `[` extends, `]` halves, `-` rests, `+X` merges.
    ComplexOrig,
    /// A=2 B=1 D=3/4; `[` extends, `-` rests.
    Slow,
    /// A=2 B=3/2; `[` extends, `-` rests.
    SlowTwo,
    /// Fixed lookup, no modifiers; W and Z are rests.
    Bolero,
}

/// Halving in `ComplexOrig` stops at this floor.
fn halving_floor() -> Ratio {
    Ratio::new(1, 1024)
}

impl Decoder {
    pub const ALL: [Decoder; 6] = [
        Decoder::Abcde,
        Decoder::Complex,
        Decoder::ComplexOrig,
        Decoder::Slow,
        Decoder::SlowTwo,
        Decoder::Bolero,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Decoder::Abcde => "abcde",
            Decoder::Complex => "complex",
            Decoder::ComplexOrig => "complex_orig",
            Decoder::Slow => "slow",
            Decoder::SlowTwo => "slow_2",
            Decoder::Bolero => "bolero",
        }
    }

    /// The symbols that stand for a duration, in alphabet order. This is also
    /// the alphabet the symbol-driven path selector indexes by.
    pub fn alphabet(self) -> &'static [char] {
        match self {
            Decoder::Abcde | Decoder::ComplexOrig => &['A', 'B', 'C', 'D', 'E'],
            Decoder::Complex => &['A', 'B', 'C', 'D'],
            Decoder::Slow => &['A', 'B', 'D'],
            Decoder::SlowTwo => &['A', 'B'],
            Decoder::Bolero => &['A', 'B', 'C', 'E', 'S', 'T', 'W', 'X', 'Y', 'Z'],
        }
    }

    /// Literal value of a duration symbol under this decoder.
    pub fn duration_of(self, symbol: char) -> Option<Ratio> {
        let (num, den) = match (self, symbol) {
            (_, 'A') if self != Decoder::Bolero => (2, 1),

            (Decoder::Abcde | Decoder::Complex | Decoder::ComplexOrig | Decoder::Slow, 'B') => (1, 1),
            (Decoder::SlowTwo, 'B') => (3, 2),

            (Decoder::Abcde | Decoder::Complex | Decoder::ComplexOrig, 'C') => (1, 2),

            (Decoder::Abcde | Decoder::ComplexOrig, 'D') => (1, 4),
            (Decoder::Complex | Decoder::Slow, 'D') => (3, 4),

            (Decoder::Abcde | Decoder::ComplexOrig, 'E') => (1, 3),

            (Decoder::Bolero, 'E') => (1, 2),
            (Decoder::Bolero, 'S') => (1, 4),
            (Decoder::Bolero, 'T') => (1, 8),
            (Decoder::Bolero, 'A') => (1, 3),
            (Decoder::Bolero, 'B') => (2, 3),
            (Decoder::Bolero, 'C') => (3, 4),
            (Decoder::Bolero, 'W') => (-1, 4),
            (Decoder::Bolero, 'X') => (1, 5),
            (Decoder::Bolero, 'Y') => (2, 5),
            (Decoder::Bolero, 'Z') => (-1, 2),

            _ => return None,
        };
        Some(Ratio::new(num, den))
    }

    /// Decode a whole symbol string.
    pub fn decode(self, symbols: &str) -> Vec<Ratio> {
        match self {
            Decoder::Abcde => self.decode_abcde(symbols),
            Decoder::Complex | Decoder::ComplexOrig => self.decode_merging(symbols),
            Decoder::Slow | Decoder::SlowTwo => self.decode_unary(symbols),
            Decoder::Bolero => symbols.chars().filter_map(|c| self.duration_of(c)).collect(),
        }
    }

    fn decode_abcde(self, symbols: &str) -> Vec<Ratio> {
        let mut out = Durations::default();
        for c in symbols.chars() {
            match c {
                '+' => out.extend_last(),
                '-' => out.scale_last(Ratio::new(1, 2)),
                _ => out.push_symbol(self, c),
            }
        }
        out.0
    }

    fn decode_unary(self, symbols: &str) -> Vec<Ratio> {
        let mut out = Durations::default();
        for c in symbols.chars() {
            out.apply_unary(self, c);
        }
        out.0
    }

    fn decode_merging(self, symbols: &str) -> Vec<Ratio> {
        let chars: Vec<char> = symbols.chars().collect();
        let mut out = Durations::default();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '+' && i + 1 < chars.len() {
                let operand = chars[i + 1];
                if !out.0.is_empty() {
                    if let Some(d) = self.duration_of(operand) {
                        out.0.push(d);
                        out.merge_last_two();
                    }
                }
                i += 2;
            } else {
                out.apply_unary(self, chars[i]);
                i += 1;
            }
        }
        out.0
    }
}

impl FromStr for Decoder {
    type Err = RhythmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decoder::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RhythmError::UnknownDecoder(s.to_string()))
    }
}

/// Accumulator shared by the decoding routines.
#[derive(Default)]
struct Durations(Vec<Ratio>);

impl Durations {
    fn push_symbol(&mut self, decoder: Decoder, c: char) {
        if let Some(d) = decoder.duration_of(c) {
            self.0.push(d);
        }
    }

    /// Scale the last duration; it stays as is once the result would
    /// overflow.
    fn scale_last(&mut self, factor: Ratio) {
        if let Some(last) = self.0.last_mut() {
            if let Some(scaled) = last.checked_mul(factor) {
                *last = scaled;
            }
        }
    }

    fn extend_last(&mut self) {
        self.scale_last(Ratio::new(3, 2));
    }

    fn negate_last(&mut self) {
        if let Some(last) = self.0.last_mut() {
            *last = -*last;
        }
    }

    /// `[`, `]`, `-` and plain duration letters for the bracket-style decoders.
    fn apply_unary(&mut self, decoder: Decoder, c: char) {
        match c {
            '[' => self.extend_last(),
            '-' => self.negate_last(),
            ']' if decoder == Decoder::ComplexOrig => {
                if self.0.last().is_some_and(|&d| d > halving_floor()) {
                    self.scale_last(Ratio::new(1, 2));
                }
            }
            _ => self.push_symbol(decoder, c),
        }
    }

    fn merge_last_two(&mut self) {
        if let (Some(b), Some(a)) = (self.0.pop(), self.0.pop()) {
            match a.abs().checked_add(b.abs()) {
                Some(sum) => self.0.push(if a.is_negative() { -sum } else { sum }),
                None => self.0.extend([a, b]),
            }
        }
    }
}
