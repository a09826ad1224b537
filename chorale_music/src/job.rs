// A complete generation job: harmony plus rhythm, end to end.
//
// `JobConfig` is what the `generate` binary reads from JSON. Every field has
// a default, so `{}` runs the built-in C major demo. `run_job` harmonizes the
// requested sections, grows the rhythm preset's symbol string, decodes it and
// lays the durations over the chord path. The rhythm is repeated when it is
// shorter than the piece. With `Strategy::Driven` the same symbol string also
// steers the chord choices.

use chorale_prng::SeededRng;
use chorale_rhythm::{Ratio, preset};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chord::{Chord, Pitch};
use crate::config::HarmonyConfig;
use crate::error::Result;
use crate::harmonizer::Harmonizer;
use crate::path::DrivingSymbols;
use crate::piece::{PiecePlan, Strategy, compose_piece};
use crate::tonality::Key;
use crate::voices::{NoteEvent, VoiceLines, cycle_durations, materialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub key: Key,
    /// Starting chord, bass first.
    pub start: [Pitch; 4],
    /// Pool of bass lines; each line's first note stands for the chord the
    /// section starts from.
    pub bass_lines: Vec<Vec<Pitch>>,
    pub sections: usize,
    pub seed: u64,
    pub strategy: Strategy,
    pub rhythm: String,
    pub rhythm_iterations: usize,
    pub max_rhythm_len: usize,
    pub harmony: HarmonyConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        JobConfig {
            key: Key::C_MAJOR,
            start: [0, 24, 31, 40],
            bass_lines: vec![vec![0, 5, 7, 0], vec![0, 9, 5, 7, 0], vec![0, 4, 5, 7, 0]],
            sections: 4,
            seed: 0,
            strategy: Strategy::Tree,
            rhythm: "abcde".to_string(),
            rhythm_iterations: 4,
            max_rhythm_len: 100_000,
            harmony: HarmonyConfig::default(),
        }
    }
}

impl JobConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        JobConfig::from_json(&data)
    }
}

/// Everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub key: Key,
    pub seed: u64,
    pub chords: Vec<Chord>,
    pub voices: VoiceLines,
    /// The rhythm preset's symbol string.
    pub symbols: String,
    /// One duration per chord.
    pub durations: Vec<Ratio>,
    pub events: Vec<NoteEvent>,
}

pub fn run_job(job: &JobConfig) -> Result<Composition> {
    let rhythm = preset(&job.rhythm)?;
    let symbols = rhythm.generate(job.rhythm_iterations, job.max_rhythm_len)?;
    let decoded = rhythm.decoder.decode(&symbols);

    let mut driver = match job.strategy {
        Strategy::Driven => Some(DrivingSymbols::new(&symbols, rhythm.decoder.alphabet())?),
        Strategy::Tree | Strategy::Lazy => None,
    };
    let plan = PiecePlan {
        start: Chord::from_voices(job.start),
        bass_lines: job.bass_lines.clone(),
        sections: job.sections,
        strategy: job.strategy,
    };
    let mut harmonizer = Harmonizer::new(job.key, job.harmony.clone());
    let mut rng = SeededRng::new(job.seed);
    let chords = compose_piece(&plan, &mut harmonizer, &mut rng, driver.as_mut())?;

    let voices = VoiceLines::from_path(&chords);
    let durations = cycle_durations(&decoded, voices.len());
    let events = materialize(&voices, &durations);
    Ok(Composition {
        key: job.key,
        seed: job.seed,
        chords,
        voices,
        symbols,
        durations,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarmonyError;
    use chorale_rhythm::RhythmError;

    #[test]
    fn test_empty_json_is_the_demo() {
        let job = JobConfig::from_json("{}").unwrap();
        assert_eq!(job, JobConfig::default());
        assert_eq!(job.key, Key::C_MAJOR);
    }

    #[test]
    fn test_json_fields() {
        let job = JobConfig::from_json(
            r#"{"key": "sol major", "sections": 2, "strategy": "lazy", "harmony": {"epsilon": 5}}"#,
        )
        .unwrap();
        assert_eq!(job.key.to_string(), "G major");
        assert_eq!(job.sections, 2);
        assert_eq!(job.strategy, Strategy::Lazy);
        assert_eq!(job.harmony.epsilon, 5);
        assert_eq!(job.rhythm, "abcde");
    }

    #[test]
    fn test_unknown_key_in_json_fails() {
        assert!(matches!(
            JobConfig::from_json(r#"{"key": "H major"}"#),
            Err(HarmonyError::Config(_))
        ));
    }

    #[test]
    fn test_unknown_rhythm_fails_fast() {
        let job = JobConfig {
            rhythm: "tango".into(),
            ..JobConfig::default()
        };
        assert!(matches!(
            run_job(&job),
            Err(HarmonyError::Rhythm(RhythmError::UnknownPreset(_)))
        ));
    }

    #[test]
    fn test_one_section_job() {
        let job = JobConfig {
            bass_lines: vec![vec![0, 5, 7, 0]],
            sections: 1,
            ..JobConfig::default()
        };
        let out = run_job(&job).unwrap();
        assert_eq!(out.chords.len(), 4);
        assert_eq!(out.voices.len(), 4);
        assert_eq!(out.durations.len(), 4);
        assert_eq!(out.events.len(), 16);
        assert!(!out.symbols.is_empty());
    }
}
