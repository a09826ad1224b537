// Pitches, voices, four-voice chords and their pitch-class abstraction.
//
// Pitches are plain integers: semitones above the lowest C of the bass
// register (pitch 0 sounds as C2). Register matters for voice ranges and for
// motion between chords, pitch class (mod 12) matters for harmony.
//
// A `Chord` is one vertical slice of the four voices, stored in voice order
// bass, tenor, alto, soprano. Voices may cross, so this is not necessarily
// ascending pitch order. Chords compare, hash and order by the 4-tuple, which
// is what the transition cache and the ordered candidate sets key on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::VoiceRanges;

/// Semitones above C2.
pub type Pitch = i32;

/// Pitch class of any pitch, in 0..12.
pub fn pitch_class(pitch: Pitch) -> u8 {
    pitch.rem_euclid(12) as u8
}

/// Note name with octave, e.g. `pitch_name(0) == "C2"`, `pitch_name(40) == "E5"`.
pub fn pitch_name(pitch: Pitch) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
    ];
    format!(
        "{}{}",
        NAMES[pitch_class(pitch) as usize],
        2 + pitch.div_euclid(12)
    )
}

/// Voice index in bass-to-soprano order, matching the layout of `Chord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    Bass = 0,
    Tenor = 1,
    Alto = 2,
    Soprano = 3,
}

impl Voice {
    pub const ALL: [Voice; 4] = [Voice::Bass, Voice::Tenor, Voice::Alto, Voice::Soprano];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Voice::Bass => "bass",
            Voice::Tenor => "tenor",
            Voice::Alto => "alto",
            Voice::Soprano => "soprano",
        }
    }
}

/// Root, third and fifth pitch classes of a diatonic triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimplifiedChord {
    pub fundamental: u8,
    pub third: u8,
    pub fifth: u8,
}

impl SimplifiedChord {
    pub fn new(fundamental: u8, third: u8, fifth: u8) -> Self {
        SimplifiedChord {
            fundamental: fundamental % 12,
            third: third % 12,
            fifth: fifth % 12,
        }
    }

    pub fn pitch_classes(&self) -> [u8; 3] {
        [self.fundamental, self.third, self.fifth]
    }

    /// Whether `pitch` belongs to the triad in any octave.
    pub fn includes(&self, pitch: Pitch) -> bool {
        self.pitch_classes().contains(&pitch_class(pitch))
    }
}

/// Four absolute pitches in voice order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Chord {
    b: Pitch,
    t: Pitch,
    a: Pitch,
    s: Pitch,
}

impl Chord {
    /// Placeholder for "nothing harmonized here".
    pub const EMPTY: Chord = Chord {
        b: -1,
        t: -1,
        a: -1,
        s: -1,
    };

    pub const fn new(b: Pitch, t: Pitch, a: Pitch, s: Pitch) -> Self {
        Chord { b, t, a, s }
    }

    pub fn from_voices(voices: [Pitch; 4]) -> Self {
        let [b, t, a, s] = voices;
        Chord { b, t, a, s }
    }

    pub fn bass(&self) -> Pitch {
        self.b
    }

    pub fn tenor(&self) -> Pitch {
        self.t
    }

    pub fn alto(&self) -> Pitch {
        self.a
    }

    pub fn soprano(&self) -> Pitch {
        self.s
    }

    pub fn voice(&self, voice: Voice) -> Pitch {
        self.voices()[voice.index()]
    }

    /// The four pitches in voice order (bass first).
    pub fn voices(&self) -> [Pitch; 4] {
        [self.b, self.t, self.a, self.s]
    }

    pub fn is_empty(&self) -> bool {
        *self == Chord::EMPTY
    }

    /// Sorted, deduplicated pitch classes.
    pub fn simplify(&self) -> Vec<u8> {
        let mut pcs: Vec<u8> = self.voices().iter().map(|&p| pitch_class(p)).collect();
        pcs.sort_unstable();
        pcs.dedup();
        pcs
    }

    /// Number of voices sounding pitch class `pc`.
    pub fn count_pc(&self, pc: u8) -> usize {
        self.voices()
            .iter()
            .filter(|&&p| pitch_class(p) == pc)
            .count()
    }

    /// Whether some voice sounds exactly `pitch`.
    pub fn includes(&self, pitch: Pitch) -> bool {
        self.voices().contains(&pitch)
    }

    /// Every voice inside its register window.
    pub fn check_abs_ranges(&self, ranges: &VoiceRanges) -> bool {
        Voice::ALL.iter().all(|&v| {
            let (low, high) = ranges.range(v);
            (low..=high).contains(&self.voice(v))
        })
    }

    /// Adjacent voices no further apart than the configured spans.
    pub fn check_inter_ranges(&self, ranges: &VoiceRanges) -> bool {
        (self.s - self.a).abs() <= ranges.max_soprano_alto
            && (self.a - self.t).abs() <= ranges.max_alto_tenor
            && (self.t - self.b).abs() <= ranges.max_tenor_bass
    }

    /// Both range checks against the given ranges.
    pub fn check_ranges_in(&self, ranges: &VoiceRanges) -> bool {
        self.check_abs_ranges(ranges) && self.check_inter_ranges(ranges)
    }

    /// Both range checks against the standard SATB ranges.
    pub fn check_ranges(&self) -> bool {
        self.check_ranges_in(&VoiceRanges::default())
    }

    /// Note names in voice order, e.g. `"C2, C4, G4, E5"`.
    pub fn note_names(&self) -> String {
        self.voices()
            .iter()
            .map(|&p| pitch_name(p))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chord (b:{}, t:{}, a:{}, s:{})",
            self.b, self.t, self.a, self.s
        )
    }
}
