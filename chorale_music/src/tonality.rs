// Keys, scale degrees and the diatonic degree table.
//
// A tonality is seven pitch classes in degree order (tonic through leading
// tone). Major keys use the major scale; minor keys use harmonic minor, so the
// leading tone sits a semitone under the tonic in both modes, which the
// voice-leading rules depend on.
//
// The key catalogue is generated, not tabulated: starting from C major and
// A minor, each step toward the sharp side transposes every degree up a
// perfect fifth and each step toward the flat side up a perfect fourth. That
// gives 15 signatures per mode (7 flats through 7 sharps); the three
// enharmonic pairs at the ends (e.g. F# / Gb major) share a degree table, so
// 24 distinct tables remain.
//
// Key names parse from English spellings ("Bb major", "f#-minor", "c") and
// from fixed-do solfege ("sol major", "fa_s_minor", "si_f_major"), where a
// trailing `s` / `f` marks sharp / flat.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chord::{Pitch, SimplifiedChord, pitch_class};
use crate::error::HarmonyError;

pub const PERFECT_FOURTH: u8 = 5;
pub const PERFECT_FIFTH: u8 = 7;
pub const MAJOR_THIRD: u8 = 4;

const C_MAJOR: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const A_MINOR: [u8; 7] = [9, 11, 0, 2, 4, 5, 8];

const MAJOR_NAMES: [&str; 15] = [
    "Cb", "Gb", "Db", "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#",
];
const MINOR_NAMES: [&str; 15] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "F#", "C#", "G#", "D#", "A#",
];

const SOLFEGE: [(&str, char); 9] = [
    ("sol", 'G'),
    ("do", 'C'),
    ("re", 'D'),
    ("mi", 'E'),
    ("fa", 'F'),
    ("so", 'G'),
    ("la", 'A'),
    ("si", 'B'),
    ("ti", 'B'),
];

/// Scale degree, tonic = 0 through leading tone = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Degree {
    Tonic = 0,
    Supertonic = 1,
    Mediant = 2,
    Subdominant = 3,
    Dominant = 4,
    Submediant = 5,
    LeadingTone = 6,
}

impl Degree {
    pub const ALL: [Degree; 7] = [
        Degree::Tonic,
        Degree::Supertonic,
        Degree::Mediant,
        Degree::Subdominant,
        Degree::Dominant,
        Degree::Submediant,
        Degree::LeadingTone,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Degree at `index` modulo 7.
    pub fn from_index(index: usize) -> Degree {
        Degree::ALL[index % 7]
    }

    /// The degree `steps` diatonic steps above this one.
    pub fn up(self, steps: usize) -> Degree {
        Degree::from_index(self.index() + steps)
    }

    pub fn roman(self) -> &'static str {
        match self {
            Degree::Tonic => "I",
            Degree::Supertonic => "II",
            Degree::Mediant => "III",
            Degree::Subdominant => "IV",
            Degree::Dominant => "V",
            Degree::Submediant => "VI",
            Degree::LeadingTone => "VII",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    Minor,
}

/// A key signature: position on the circle of fifths (-7 flats ..= 7 sharps)
/// plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key {
    fifths: i8,
    mode: KeyMode,
}

impl Key {
    pub const C_MAJOR: Key = Key {
        fifths: 0,
        mode: KeyMode::Major,
    };
    pub const A_MINOR: Key = Key {
        fifths: 0,
        mode: KeyMode::Minor,
    };

    /// `None` outside the -7..=7 signature range.
    pub fn new(fifths: i8, mode: KeyMode) -> Option<Key> {
        (-7..=7).contains(&fifths).then_some(Key { fifths, mode })
    }

    /// All 30 signatures, majors first, each mode from 7 flats to 7 sharps.
    pub fn all() -> impl Iterator<Item = Key> {
        [KeyMode::Major, KeyMode::Minor]
            .into_iter()
            .flat_map(|mode| (-7..=7).map(move |fifths| Key { fifths, mode }))
    }

    pub fn fifths(self) -> i8 {
        self.fifths
    }

    pub fn mode(self) -> KeyMode {
        self.mode
    }

    pub fn tonic_name(self) -> &'static str {
        let slot = (self.fifths + 7) as usize;
        match self.mode {
            KeyMode::Major => MAJOR_NAMES[slot],
            KeyMode::Minor => MINOR_NAMES[slot],
        }
    }

    pub fn tonality(self) -> Tonality {
        Tonality::new(self)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            KeyMode::Major => "major",
            KeyMode::Minor => "minor",
        };
        write!(f, "{} {}", self.tonic_name(), mode)
    }
}

impl FromStr for Key {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key(s).ok_or_else(|| HarmonyError::UnknownTonality(s.to_string()))
    }
}

impl TryFrom<String> for Key {
    type Error = HarmonyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> String {
        key.to_string()
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::C_MAJOR
    }
}

fn parse_key(s: &str) -> Option<Key> {
    let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mode = match tokens.last().copied() {
        Some("major" | "maj") => {
            tokens.pop();
            KeyMode::Major
        }
        Some("minor" | "min") => {
            tokens.pop();
            KeyMode::Minor
        }
        _ => KeyMode::Major,
    };
    let spelled = spell_tonic(&tokens.concat())?;
    let names = match mode {
        KeyMode::Major => &MAJOR_NAMES,
        KeyMode::Minor => &MINOR_NAMES,
    };
    let slot = names.iter().position(|&n| n == spelled)?;
    Key::new(slot as i8 - 7, mode)
}

/// Canonical English spelling ("C", "F#", "Bb") of a lowercase tonic token.
fn spell_tonic(token: &str) -> Option<String> {
    for (syllable, letter) in SOLFEGE {
        if let Some(accidental) = token.strip_prefix(syllable).and_then(parse_accidental) {
            return Some(format!("{letter}{accidental}"));
        }
    }
    let mut chars = token.chars();
    let letter = chars.next().filter(|c| ('a'..='g').contains(c))?;
    let accidental = parse_accidental(chars.as_str())?;
    Some(format!("{}{accidental}", letter.to_ascii_uppercase()))
}

fn parse_accidental(rest: &str) -> Option<&'static str> {
    match rest {
        "" => Some(""),
        "#" | "s" | "sharp" => Some("#"),
        "b" | "f" | "flat" => Some("b"),
        _ => None,
    }
}

/// Shift every degree by `interval` semitones, modulo the octave.
pub fn transpose_degrees(degrees: &[u8; 7], interval: u8) -> [u8; 7] {
    degrees.map(|pc| (pc + interval) % 12)
}

/// A key together with its degree table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tonality {
    key: Key,
    degrees: [u8; 7],
}

impl Tonality {
    pub fn new(key: Key) -> Self {
        let mut degrees = match key.mode {
            KeyMode::Major => C_MAJOR,
            KeyMode::Minor => A_MINOR,
        };
        let interval = if key.fifths >= 0 {
            PERFECT_FIFTH
        } else {
            PERFECT_FOURTH
        };
        for _ in 0..key.fifths.unsigned_abs() {
            degrees = transpose_degrees(&degrees, interval);
        }
        Tonality { key, degrees }
    }

    /// Look up a tonality by key name.
    pub fn from_name(name: &str) -> Result<Self, HarmonyError> {
        Ok(Tonality::new(name.parse()?))
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn degrees(&self) -> &[u8; 7] {
        &self.degrees
    }

    /// Pitch class of a scale degree.
    pub fn pc(&self, degree: Degree) -> u8 {
        self.degrees[degree.index()]
    }

    pub fn tonic(&self) -> u8 {
        self.pc(Degree::Tonic)
    }

    pub fn leading_tone(&self) -> u8 {
        self.pc(Degree::LeadingTone)
    }

    /// Degree of a pitch, or `None` if its pitch class is chromatic here.
    pub fn degree_of(&self, pitch: Pitch) -> Option<Degree> {
        let pc = pitch_class(pitch);
        self.degrees
            .iter()
            .position(|&d| d == pc)
            .map(Degree::from_index)
    }

    pub fn contains(&self, pitch: Pitch) -> bool {
        self.degree_of(pitch).is_some()
    }

    /// Major iff the mediant is a major third above the tonic.
    pub fn is_major(&self) -> bool {
        (self.pc(Degree::Mediant) + 12 - self.tonic()) % 12 == MAJOR_THIRD
    }

    /// Root, third and fifth of the triad built on `degree`.
    pub fn triad(&self, degree: Degree) -> SimplifiedChord {
        SimplifiedChord::new(
            self.pc(degree),
            self.pc(degree.up(2)),
            self.pc(degree.up(4)),
        )
    }

    /// Triad whose root is the pitch class of `pitch`, if it is diatonic.
    pub fn triad_on(&self, pitch: Pitch) -> Option<SimplifiedChord> {
        self.degree_of(pitch).map(|d| self.triad(d))
    }
}

impl fmt::Display for Tonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}
