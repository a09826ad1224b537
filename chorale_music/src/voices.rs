// Per-voice views of a chord path and their note events.
//
// A renderer wants four melodic lines, not a list of vertical chords.
// `VoiceLines` transposes a path into bass, tenor, alto and soprano
// sequences. `materialize` pairs those lines with a duration sequence from the
// rhythm generator and lays out timed events per voice; a negative duration
// becomes a rest of the same length.

use chorale_rhythm::Ratio;
use serde::{Deserialize, Serialize};

use crate::chord::{Chord, Pitch, Voice, pitch_name};

/// MIDI key of pitch 0 (C2).
pub const MIDI_OFFSET: Pitch = 36;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLines {
    pub bass: Vec<Pitch>,
    pub tenor: Vec<Pitch>,
    pub alto: Vec<Pitch>,
    pub soprano: Vec<Pitch>,
}

impl VoiceLines {
    pub fn from_path(path: &[Chord]) -> Self {
        let mut lines = VoiceLines::default();
        lines.extend(path);
        lines
    }

    pub fn extend(&mut self, path: &[Chord]) {
        for chord in path {
            self.bass.push(chord.bass());
            self.tenor.push(chord.tenor());
            self.alto.push(chord.alto());
            self.soprano.push(chord.soprano());
        }
    }

    pub fn voice(&self, voice: Voice) -> &[Pitch] {
        match voice {
            Voice::Bass => &self.bass,
            Voice::Tenor => &self.tenor,
            Voice::Alto => &self.alto,
            Voice::Soprano => &self.soprano,
        }
    }

    /// Number of chords (all four lines have this length).
    pub fn len(&self) -> usize {
        self.bass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bass.is_empty()
    }

    /// Rebuild the chord at `index`.
    pub fn chord_at(&self, index: usize) -> Option<Chord> {
        Some(Chord::new(
            *self.bass.get(index)?,
            *self.tenor.get(index)?,
            *self.alto.get(index)?,
            *self.soprano.get(index)?,
        ))
    }
}

/// One timed note or rest in one voice. Times are in quarter notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub voice: Voice,
    /// `None` for a rest.
    pub pitch: Option<Pitch>,
    pub onset: Ratio,
    pub duration: Ratio,
}

impl NoteEvent {
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }

    pub fn midi_key(&self) -> Option<Pitch> {
        self.pitch.map(|p| p + MIDI_OFFSET)
    }

    pub fn name(&self) -> String {
        self.pitch.map_or_else(|| "rest".to_string(), pitch_name)
    }
}

/// Timed events for all four voices, voice by voice.
///
/// The i-th chord gets the i-th duration; extra chords or durations are
/// ignored. Every voice shares the same onsets.
pub fn materialize(lines: &VoiceLines, durations: &[Ratio]) -> Vec<NoteEvent> {
    let count = lines.len().min(durations.len());
    let mut events = Vec::with_capacity(count * 4);
    for voice in Voice::ALL {
        let mut onset = Ratio::ZERO;
        for (&pitch, &duration) in lines.voice(voice).iter().zip(durations).take(count) {
            let length = duration.abs();
            events.push(NoteEvent {
                voice,
                pitch: (!duration.is_negative()).then_some(pitch),
                onset,
                duration: length,
            });
            onset = onset + length;
        }
    }
    events
}

/// Repeat `durations` until there is one per chord. Empty input stays empty.
pub fn cycle_durations(durations: &[Ratio], count: usize) -> Vec<Ratio> {
    durations.iter().copied().cycle().take(count).collect()
}
