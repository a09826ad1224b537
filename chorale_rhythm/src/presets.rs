// Named rhythm presets: a rule set, an axiom and the decoder that reads them.
//
// Each preset was tuned against one decoder's alphabet, so the pairing is
// fixed here instead of being chosen by callers. `bolero` converges on the
// snare ostinato of Ravel's Bolero (A B A C, where A is an eighth and three
// sixteenths); the others are free-running generators of different density.

use crate::decoder::Decoder;
use crate::error::{Result, RhythmError};
use crate::lsystem::LSystem;
use crate::ratio::Ratio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmPreset {
    pub name: &'static str,
    pub axiom: &'static str,
    pub productions: &'static [(&'static str, &'static str)],
    pub decoder: Decoder,
}

pub const PRESETS: &[RhythmPreset] = &[
    RhythmPreset {
        name: "abcde",
        axiom: "EEEA+",
        productions: &[
            ("A", "BB+E"),
            ("B", "DE-C"),
            ("C", "CD+C--C--"),
            ("D", "AD--D-D-D-ED"),
            ("E", "E-B"),
        ],
        decoder: Decoder::Abcde,
    },
    RhythmPreset {
        name: "complex",
        axiom: "A+B",
        productions: &[
            ("A", "BB[+-D+A"),
            ("B", "D[-CD[-C"),
            ("C", "CD+C-C-"),
            ("D", "A+[D-DD+D"),
        ],
        decoder: Decoder::Complex,
    },
    RhythmPreset {
        name: "complex_orig",
        axiom: "F]AEE-B",
        productions: &[
            ("A", "BB[+E-D+A]"),
            ("B", "D[E]-CD[E]-C"),
            ("C", "CD+C-C-"),
            ("D", "AE+[D-D]D+ED"),
            ("E", "[E+-]B"),
        ],
        decoder: Decoder::ComplexOrig,
    },
    RhythmPreset {
        name: "ornate",
        axiom: "[F]AEE-B",
        productions: &[
            ("A", "BB[F+E-D+A]FF"),
            ("B", "D[E]-CD[E]-C"),
            ("C", "CD+C-CF-"),
            ("D", "AE+[D-D]D+ED"),
            ("E", "[E+-]B"),
            ("F", "F+[-B]B[[A]EF]"),
        ],
        decoder: Decoder::ComplexOrig,
    },
    RhythmPreset {
        name: "slow",
        axiom: "A+B",
        productions: &[("A", "BB[+-D+A"), ("B", "D[-D[-"), ("D", "A+[D-DD+D")],
        decoder: Decoder::Slow,
    },
    RhythmPreset {
        name: "slow_2",
        axiom: "A+B",
        productions: &[("A", "[BB[+-A+A"), ("B", "BB[-AB[-")],
        decoder: Decoder::SlowTwo,
    },
    RhythmPreset {
        name: "bolero",
        axiom: "YWWX",
        productions: &[
            ("A", "ESSS"),
            ("B", "ESSSEE"),
            ("C", "ESSSSSSSSSZ"),
            ("E", "E"),
            ("S", "S"),
            ("T", "S"),
            ("W", "STSTSTTSSE"),
            ("X", "WYTTAYYESSYZ"),
            ("Y", "BATTWBWTTTTSTTA"),
            ("Z", "ABAC"),
        ],
        decoder: Decoder::Bolero,
    },
];

/// Look up a preset by name (case-insensitive).
pub fn preset(name: &str) -> Result<&'static RhythmPreset> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| RhythmError::UnknownPreset(name.to_string()))
}

impl RhythmPreset {
    pub fn system(&self) -> Result<LSystem> {
        LSystem::from_pairs(self.productions)
    }

    /// The symbol string after `iterations` passes, capped at `max_len`.
    pub fn generate(&self, iterations: usize, max_len: usize) -> Result<String> {
        self.system()?.run_bounded(self.axiom, iterations, max_len)
    }

    /// Generate and decode in one step.
    pub fn durations(&self, iterations: usize, max_len: usize) -> Result<Vec<Ratio>> {
        Ok(self.decoder.decode(&self.generate(iterations, max_len)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_is_well_formed() {
        for p in PRESETS {
            let sys = p.system().unwrap();
            assert_eq!(sys.len(), p.productions.len(), "{}", p.name);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(preset("Bolero").unwrap().decoder, Decoder::Bolero);
        assert_eq!(
            preset("tango").unwrap_err(),
            RhythmError::UnknownPreset("tango".into())
        );
    }

    #[test]
    fn test_bolero_first_pass() {
        let p = preset("bolero").unwrap();
        let s = p.generate(1, 10_000).unwrap();
        assert_eq!(
            s,
            "BATTWBWTTTTSTTASTSTSTTSSESTSTSTTSSEWYTTAYYESSYZ"
        );
        // W is a quarter rest in this alphabet.
        let d = p.decoder.decode(&s);
        assert_eq!(d.len(), s.len());
        assert!(d.contains(&Ratio::new(-1, 4)));
    }

    #[test]
    fn test_durations_are_nonempty_after_a_few_passes() {
        for p in PRESETS {
            let d = p.durations(3, 1_000_000).unwrap();
            assert!(!d.is_empty(), "{} produced no durations", p.name);
            assert!(d.iter().all(|x| *x != Ratio::ZERO), "{}", p.name);
        }
    }

    #[test]
    fn test_generate_respects_cap() {
        let p = preset("abcde").unwrap();
        assert!(matches!(
            p.generate(12, 100),
            Err(RhythmError::LengthLimit { limit: 100, .. })
        ));
    }
}
