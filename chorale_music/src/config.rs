// Harmonizer configuration.
//
// Everything the rule engine and the search read besides the tonality lives
// here and is passed in explicitly: the candidate window, the common-tone
// policy, the overtaking thresholds, which rules are active, the voice
// registers and the two resource limits. All fields default, so a partial
// JSON object (or `{}`) is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chord::{Pitch, Voice};
use crate::error::Result;
use crate::rules::Rule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyConfig {
    /// Half-width in semitones of the window each upper voice may move within.
    pub epsilon: Pitch,
    /// Hold common tones instead of enumerating every voice.
    pub maintain_common_notes: bool,
    /// Minimum `upper - lower` between adjacent voices at the final cadence.
    pub overtaking_cadence: Pitch,
    /// Minimum `upper - lower` between adjacent voices elsewhere.
    pub overtaking_no_cadence: Pitch,
    pub rules: RuleSet,
    pub ranges: VoiceRanges,
    /// Node budget for a fully built composition tree.
    pub max_tree_nodes: usize,
    /// Step budget for the lazy path sampler.
    pub max_search_steps: usize,
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        HarmonyConfig {
            epsilon: 7,
            maintain_common_notes: false,
            overtaking_cadence: 0,
            overtaking_no_cadence: -4,
            rules: RuleSet::default(),
            ranges: VoiceRanges::default(),
            max_tree_nodes: 2_000_000,
            max_search_steps: 200_000,
        }
    }
}

impl HarmonyConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        HarmonyConfig::from_json(&data)
    }

    /// Overtaking threshold for a transition, stricter at the cadence.
    pub fn overtaking_threshold(&self, cadence: bool) -> Pitch {
        if cadence {
            self.overtaking_cadence
        } else {
            self.overtaking_no_cadence
        }
    }
}

/// One switch per voice-leading rule. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub no_large_overtaking: bool,
    pub leading_tone_not_doubled: bool,
    pub voice_ranges: bool,
    pub leading_tone_resolves: bool,
    pub no_tripled_pitch: bool,
    pub fifth_not_doubled: bool,
    pub complete_triad: bool,
    pub third_doubling: bool,
    pub no_augmented_motion: bool,
    pub no_parallel_perfects: bool,
    pub no_direct_perfects: bool,
    pub cadence_soprano: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::all()
    }
}

impl RuleSet {
    pub fn all() -> Self {
        RuleSet::uniform(true)
    }

    pub fn none() -> Self {
        RuleSet::uniform(false)
    }

    fn uniform(on: bool) -> Self {
        RuleSet {
            no_large_overtaking: on,
            leading_tone_not_doubled: on,
            voice_ranges: on,
            leading_tone_resolves: on,
            no_tripled_pitch: on,
            fifth_not_doubled: on,
            complete_triad: on,
            third_doubling: on,
            no_augmented_motion: on,
            no_parallel_perfects: on,
            no_direct_perfects: on,
            cadence_soprano: on,
        }
    }

    pub fn is_active(&self, rule: Rule) -> bool {
        match rule {
            Rule::NoLargeOvertaking => self.no_large_overtaking,
            Rule::LeadingToneNotDoubled => self.leading_tone_not_doubled,
            Rule::VoiceRanges => self.voice_ranges,
            Rule::LeadingToneResolves => self.leading_tone_resolves,
            Rule::NoTripledPitch => self.no_tripled_pitch,
            Rule::FifthNotDoubled => self.fifth_not_doubled,
            Rule::CompleteTriad => self.complete_triad,
            Rule::ThirdDoubling => self.third_doubling,
            Rule::NoAugmentedMotion => self.no_augmented_motion,
            Rule::NoParallelPerfects => self.no_parallel_perfects,
            Rule::NoDirectPerfects => self.no_direct_perfects,
            Rule::CadenceSoprano => self.cadence_soprano,
        }
    }

    pub fn set(&mut self, rule: Rule, on: bool) {
        let flag = match rule {
            Rule::NoLargeOvertaking => &mut self.no_large_overtaking,
            Rule::LeadingToneNotDoubled => &mut self.leading_tone_not_doubled,
            Rule::VoiceRanges => &mut self.voice_ranges,
            Rule::LeadingToneResolves => &mut self.leading_tone_resolves,
            Rule::NoTripledPitch => &mut self.no_tripled_pitch,
            Rule::FifthNotDoubled => &mut self.fifth_not_doubled,
            Rule::CompleteTriad => &mut self.complete_triad,
            Rule::ThirdDoubling => &mut self.third_doubling,
            Rule::NoAugmentedMotion => &mut self.no_augmented_motion,
            Rule::NoParallelPerfects => &mut self.no_parallel_perfects,
            Rule::NoDirectPerfects => &mut self.no_direct_perfects,
            Rule::CadenceSoprano => &mut self.cadence_soprano,
        };
        *flag = on;
    }

    pub fn active_count(&self) -> usize {
        Rule::ALL.iter().filter(|&&r| self.is_active(r)).count()
    }
}

/// Register windows (inclusive) and maximum spans between adjacent voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceRanges {
    pub bass: (Pitch, Pitch),
    pub tenor: (Pitch, Pitch),
    pub alto: (Pitch, Pitch),
    pub soprano: (Pitch, Pitch),
    pub max_soprano_alto: Pitch,
    pub max_alto_tenor: Pitch,
    pub max_tenor_bass: Pitch,
}

impl Default for VoiceRanges {
    fn default() -> Self {
        VoiceRanges {
            bass: (0, 24),    // C2-C4
            tenor: (7, 31),   // G2-G4
            alto: (19, 40),   // G3-E5
            soprano: (24, 45), // C4-A5
            max_soprano_alto: 14,
            max_alto_tenor: 14,
            max_tenor_bass: 24,
        }
    }
}

impl VoiceRanges {
    pub fn range(&self, voice: Voice) -> (Pitch, Pitch) {
        match voice {
            Voice::Bass => self.bass,
            Voice::Tenor => self.tenor,
            Voice::Alto => self.alto,
            Voice::Soprano => self.soprano,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarmonyError;

    #[test]
    fn test_empty_json_is_default() {
        let config = HarmonyConfig::from_json("{}").unwrap();
        assert_eq!(config, HarmonyConfig::default());
        assert_eq!(config.rules.active_count(), 12);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = HarmonyConfig::from_json(
            r#"{"epsilon": 5, "rules": {"no_direct_perfects": false}, "ranges": {"soprano": [24, 43]}}"#,
        )
        .unwrap();
        assert_eq!(config.epsilon, 5);
        assert!(!config.rules.is_active(Rule::NoDirectPerfects));
        assert!(config.rules.is_active(Rule::NoParallelPerfects));
        assert_eq!(config.ranges.soprano, (24, 43));
        assert_eq!(config.ranges.bass, (0, 24));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = HarmonyConfig::from_json("{\"epsilon\": \"wide\"}").unwrap_err();
        assert!(matches!(err, HarmonyError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = HarmonyConfig::load(Path::new("/nonexistent/harmony.json")).unwrap_err();
        assert!(matches!(err, HarmonyError::Io(_)));
    }

    #[test]
    fn test_rule_switches() {
        let mut rules = RuleSet::none();
        assert_eq!(rules.active_count(), 0);
        for rule in Rule::ALL {
            rules.set(rule, true);
            assert!(rules.is_active(rule));
        }
        assert_eq!(rules, RuleSet::all());
    }

    #[test]
    fn test_thresholds() {
        let config = HarmonyConfig::default();
        assert_eq!(config.overtaking_threshold(true), 0);
        assert_eq!(config.overtaking_threshold(false), -4);
    }
}
