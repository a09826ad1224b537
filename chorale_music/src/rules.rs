// Voice-leading rules for one chord-to-chord transition.
//
// Each `Rule` is a pure predicate over (current chord, candidate next chord)
// in a `TransitionContext` that carries the tonality, the scale degrees of
// the two bass notes, the degree two steps ahead (if any) and whether the
// candidate is the final cadence chord. `filter_with_rules` runs the active
// rules in index order, each over the survivors of the previous one, so the
// output is the set of candidates every active rule accepts.
//
// Degrees always come from the tonality's table. The context constructor
// rejects a bass pitch outside the key, after which every predicate is total.
//
// Rule catalogue (index: contract):
//   0  adjacent voices never overtake by more than the threshold
//   1  leading tone at most once
//   2  voice registers and adjacent spans
//   3  V/VII -> I/IV/VI: every voice on the leading tone goes to the tonic
//   4  no pitch class more than twice
//   5  fifth of the triad at most once
//   6  root, third and fifth all present
//   7  doubled third: never on I/IV/V, required for V->VI and minor VI->(V)
//   8  no augmented melodic intervals into or out of the leading tone
//   9  no consecutive unisons/octaves, fourths or fifths
//  10  no perfect interval approached by both voices leaping the same way
//  11  at the final cadence a soprano leading tone resolves to the tonic

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

use crate::chord::{Chord, Pitch, SimplifiedChord, pitch_class};
use crate::config::HarmonyConfig;
use crate::error::{HarmonyError, Result};
use crate::tonality::{Degree, Tonality};

/// Interval classes (mod 12) treated as perfect consonances.
const PERFECT_CLASSES: [Pitch; 3] = [0, 5, 7];

/// Largest melodic motion still counted as a step.
const STEP: Pitch = 2;

const AUGMENTED_SECOND: Pitch = 3;
const AUGMENTED_FOURTH: Pitch = 6;
const AUGMENTED_FIFTH: Pitch = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    NoLargeOvertaking = 0,
    LeadingToneNotDoubled = 1,
    VoiceRanges = 2,
    LeadingToneResolves = 3,
    NoTripledPitch = 4,
    FifthNotDoubled = 5,
    CompleteTriad = 6,
    ThirdDoubling = 7,
    NoAugmentedMotion = 8,
    NoParallelPerfects = 9,
    NoDirectPerfects = 10,
    CadenceSoprano = 11,
}

impl Rule {
    pub const ALL: [Rule; 12] = [
        Rule::NoLargeOvertaking,
        Rule::LeadingToneNotDoubled,
        Rule::VoiceRanges,
        Rule::LeadingToneResolves,
        Rule::NoTripledPitch,
        Rule::FifthNotDoubled,
        Rule::CompleteTriad,
        Rule::ThirdDoubling,
        Rule::NoAugmentedMotion,
        Rule::NoParallelPerfects,
        Rule::NoDirectPerfects,
        Rule::CadenceSoprano,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Rule::NoLargeOvertaking => "no_large_overtaking",
            Rule::LeadingToneNotDoubled => "leading_tone_not_doubled",
            Rule::VoiceRanges => "voice_ranges",
            Rule::LeadingToneResolves => "leading_tone_resolves",
            Rule::NoTripledPitch => "no_tripled_pitch",
            Rule::FifthNotDoubled => "fifth_not_doubled",
            Rule::CompleteTriad => "complete_triad",
            Rule::ThirdDoubling => "third_doubling",
            Rule::NoAugmentedMotion => "no_augmented_motion",
            Rule::NoParallelPerfects => "no_parallel_perfects",
            Rule::NoDirectPerfects => "no_direct_perfects",
            Rule::CadenceSoprano => "cadence_soprano",
        }
    }

    /// Whether moving from `current` to `next` satisfies this rule.
    pub fn allows(self, current: &Chord, next: &Chord, ctx: &TransitionContext) -> bool {
        match self {
            Rule::NoLargeOvertaking => no_large_overtaking(next, ctx),
            Rule::LeadingToneNotDoubled => next.count_pc(ctx.tonality.leading_tone()) < 2,
            Rule::VoiceRanges => next.check_ranges_in(&ctx.config.ranges),
            Rule::LeadingToneResolves => leading_tone_resolves(current, next, ctx),
            Rule::NoTripledPitch => (0..12).all(|pc| next.count_pc(pc) <= 2),
            Rule::FifthNotDoubled => next.count_pc(ctx.next_triad.fifth) <= 1,
            Rule::CompleteTriad => ctx
                .next_triad
                .pitch_classes()
                .iter()
                .all(|&pc| next.count_pc(pc) > 0),
            Rule::ThirdDoubling => third_doubling(next, ctx),
            Rule::NoAugmentedMotion => no_augmented_motion(current, next, ctx),
            Rule::NoParallelPerfects => no_parallel_perfects(current, next),
            Rule::NoDirectPerfects => no_direct_perfects(current, next),
            Rule::CadenceSoprano => cadence_soprano(current, next, ctx),
        }
    }
}

/// Everything a rule needs to know about a transition besides the two chords.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub tonality: &'a Tonality,
    pub config: &'a HarmonyConfig,
    pub current_degree: Degree,
    pub next_degree: Degree,
    pub next_triad: SimplifiedChord,
    /// Degree of the bass note after the next one, if there is one.
    pub lookahead: Option<Degree>,
    /// The next chord is the last of the line.
    pub cadence: bool,
}

impl<'a> TransitionContext<'a> {
    pub fn new(
        tonality: &'a Tonality,
        config: &'a HarmonyConfig,
        current: &Chord,
        next_bass: Pitch,
        lookahead: Option<Degree>,
        cadence: bool,
    ) -> Result<Self> {
        let current_degree = degree_in(tonality, current.bass())?;
        let next_degree = degree_in(tonality, next_bass)?;
        Ok(TransitionContext {
            tonality,
            config,
            current_degree,
            next_degree,
            next_triad: tonality.triad(next_degree),
            lookahead,
            cadence,
        })
    }
}

/// Degree of `pitch`, or `NoteOutsideTonality`.
pub fn degree_in(tonality: &Tonality, pitch: Pitch) -> Result<Degree> {
    tonality
        .degree_of(pitch)
        .ok_or_else(|| HarmonyError::NoteOutsideTonality {
            pitch,
            key: tonality.to_string(),
        })
}

/// Keep only the candidates that pass every active rule.
///
/// All candidates are expected to share the context's next bass note.
pub fn filter_with_rules(
    current: &Chord,
    mut candidates: BTreeSet<Chord>,
    ctx: &TransitionContext,
) -> BTreeSet<Chord> {
    for rule in Rule::ALL {
        if !ctx.config.rules.is_active(rule) {
            continue;
        }
        candidates.retain(|next| rule.allows(current, next, ctx));
        trace!(rule = rule.name(), survivors = candidates.len(), "rule pass");
    }
    candidates
}

fn no_large_overtaking(next: &Chord, ctx: &TransitionContext) -> bool {
    let threshold = ctx.config.overtaking_threshold(ctx.cadence);
    next.voices().windows(2).all(|w| w[1] - w[0] >= threshold)
}

fn leading_tone_resolves(current: &Chord, next: &Chord, ctx: &TransitionContext) -> bool {
    let from_dominant = matches!(ctx.current_degree, Degree::Dominant | Degree::LeadingTone);
    let to_resolution = matches!(
        ctx.next_degree,
        Degree::Tonic | Degree::Subdominant | Degree::Submediant
    );
    if !(from_dominant && to_resolution) {
        return true;
    }
    let lt = ctx.tonality.leading_tone();
    let tonic = ctx.tonality.tonic();
    current
        .voices()
        .iter()
        .zip(next.voices())
        .all(|(&c, n)| pitch_class(c) != lt || pitch_class(n) == tonic)
}

fn third_doubling(next: &Chord, ctx: &TransitionContext) -> bool {
    let doubled = next.count_pc(ctx.next_triad.third) == 2;
    let from_dominant_to_vi =
        ctx.current_degree == Degree::Dominant && ctx.next_degree == Degree::Submediant;
    let minor_vi_before_v = !ctx.tonality.is_major()
        && ctx.next_degree == Degree::Submediant
        && ctx.lookahead == Some(Degree::Dominant);
    if from_dominant_to_vi || minor_vi_before_v {
        return doubled;
    }
    let primary = matches!(
        ctx.next_degree,
        Degree::Tonic | Degree::Subdominant | Degree::Dominant
    );
    !(primary && doubled)
}

fn no_augmented_motion(current: &Chord, next: &Chord, ctx: &TransitionContext) -> bool {
    let t = ctx.tonality;
    let lt = t.leading_tone();
    let minor = !t.is_major();
    // (from pitch class, to pitch class, signed semitone motion)
    let forbidden = [
        (t.pc(Degree::Subdominant), lt, AUGMENTED_FOURTH),
        (lt, t.pc(Degree::Subdominant), -AUGMENTED_FOURTH),
    ];
    let forbidden_minor = [
        (t.pc(Degree::Submediant), lt, AUGMENTED_SECOND),
        (lt, t.pc(Degree::Submediant), -AUGMENTED_SECOND),
        (t.pc(Degree::Mediant), lt, AUGMENTED_FIFTH),
        (lt, t.pc(Degree::Mediant), -AUGMENTED_FIFTH),
    ];
    current.voices().iter().zip(next.voices()).all(|(&c, n)| {
        let motion = (pitch_class(c), pitch_class(n), n - c);
        !forbidden.contains(&motion) && !(minor && forbidden_minor.contains(&motion))
    })
}

fn voice_pairs() -> impl Iterator<Item = (usize, usize)> {
    (0..4).flat_map(|i| (i + 1..4).map(move |j| (i, j)))
}

fn interval_class(lower: Pitch, upper: Pitch) -> Pitch {
    (upper - lower).rem_euclid(12)
}

fn no_parallel_perfects(current: &Chord, next: &Chord) -> bool {
    let cur = current.voices();
    let nxt = next.voices();
    voice_pairs().all(|(i, j)| {
        let held = cur[i] == nxt[i] && cur[j] == nxt[j];
        let before = interval_class(cur[i], cur[j]);
        let after = interval_class(nxt[i], nxt[j]);
        held || before != after || !PERFECT_CLASSES.contains(&after)
    })
}

fn no_direct_perfects(current: &Chord, next: &Chord) -> bool {
    let cur = current.voices();
    let nxt = next.voices();
    voice_pairs().all(|(i, j)| {
        let di = nxt[i] - cur[i];
        let dj = nxt[j] - cur[j];
        let leap_together = (di > STEP && dj > STEP) || (di < -STEP && dj < -STEP);
        !leap_together || !PERFECT_CLASSES.contains(&interval_class(nxt[i], nxt[j]))
    })
}

fn cadence_soprano(current: &Chord, next: &Chord, ctx: &TransitionContext) -> bool {
    let lt = ctx.tonality.leading_tone();
    if !ctx.cadence || pitch_class(current.bass()) == lt {
        return true;
    }
    pitch_class(current.soprano()) != lt || pitch_class(next.soprano()) == ctx.tonality.tonic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::tonality::Key;
    use proptest::prelude::*;

    fn c_major() -> Tonality {
        Key::C_MAJOR.tonality()
    }

    fn ctx<'a>(
        t: &'a Tonality,
        config: &'a HarmonyConfig,
        current: &Chord,
        next_bass: Pitch,
        cadence: bool,
    ) -> TransitionContext<'a> {
        TransitionContext::new(t, config, current, next_bass, None, cadence).unwrap()
    }

    fn passes_all(current: Chord, next: Chord, cx: &TransitionContext) -> Vec<Rule> {
        Rule::ALL
            .into_iter()
            .filter(|r| !r.allows(&current, &next, cx))
            .collect()
    }

    #[test]
    fn test_tonic_to_subdominant_passes_every_rule() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(0, 24, 31, 40);
        let cx = ctx(&t, &config, &cur, 5, false);
        assert_eq!(passes_all(cur, Chord::new(5, 24, 33, 41), &cx), vec![]);
    }

    #[test]
    fn test_subdominant_to_dominant_passes_every_rule() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(5, 24, 33, 41);
        let cx = ctx(&t, &config, &cur, 7, false);
        assert_eq!(passes_all(cur, Chord::new(7, 23, 31, 38), &cx), vec![]);
    }

    #[test]
    fn test_authentic_cadence_passes_every_rule() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(7, 23, 31, 38);
        let cx = ctx(&t, &config, &cur, 0, true);
        assert_eq!(passes_all(cur, Chord::new(0, 24, 31, 40), &cx), vec![]);
    }

    #[test]
    fn test_unresolved_leading_tone_is_rejected() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(7, 23, 31, 38);
        let cx = ctx(&t, &config, &cur, 0, true);
        // Tenor B drops to G instead of rising to C.
        let next = Chord::new(0, 19, 28, 36);
        assert!(!Rule::LeadingToneResolves.allows(&cur, &next, &cx));
    }

    #[test]
    fn test_doubling_rules() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(0, 24, 31, 40);
        let cx = ctx(&t, &config, &cur, 7, false);
        // G B B D: leading tone doubled.
        let lt_doubled = Chord::new(7, 23, 26, 35);
        assert!(!Rule::LeadingToneNotDoubled.allows(&cur, &lt_doubled, &cx));
        // G G G D: pitch class tripled.
        let tripled = Chord::new(7, 19, 31, 38);
        assert!(!Rule::NoTripledPitch.allows(&cur, &tripled, &cx));
        // G D D G: fifth doubled and triad incomplete.
        let open = Chord::new(7, 26, 31, 38);
        assert!(!Rule::FifthNotDoubled.allows(&cur, &open, &cx));
        assert!(!Rule::CompleteTriad.allows(&cur, &open, &cx));
    }

    #[test]
    fn test_third_doubling_policy() {
        let t = c_major();
        let config = HarmonyConfig::default();
        // V -> VI requires the doubled third (C).
        let cur = Chord::new(7, 23, 31, 38);
        let cx = ctx(&t, &config, &cur, 9, false);
        assert!(Rule::ThirdDoubling.allows(&cur, &Chord::new(9, 24, 33, 36), &cx));
        assert!(!Rule::ThirdDoubling.allows(&cur, &Chord::new(9, 24, 33, 40), &cx));
        // I -> IV forbids doubling A.
        let cur = Chord::new(0, 24, 31, 40);
        let cx = ctx(&t, &config, &cur, 5, false);
        assert!(!Rule::ThirdDoubling.allows(&cur, &Chord::new(5, 21, 33, 36), &cx));
    }

    #[test]
    fn test_minor_submediant_before_dominant_doubles_third() {
        let t = Key::A_MINOR.tonality();
        let config = HarmonyConfig::default();
        // A minor, i -> VI (F) with E two steps ahead.
        let cur = Chord::new(9, 24, 28, 33);
        let cx = TransitionContext::new(&t, &config, &cur, 5, Some(Degree::Dominant), false).unwrap();
        // F A A C: third doubled.
        assert!(Rule::ThirdDoubling.allows(&cur, &Chord::new(5, 21, 24, 33), &cx));
        // F A C F: third single.
        assert!(!Rule::ThirdDoubling.allows(&cur, &Chord::new(5, 21, 24, 29), &cx));
        // Without the look-ahead either doubling is fine for VI.
        let cx = TransitionContext::new(&t, &config, &cur, 5, None, false).unwrap();
        assert!(Rule::ThirdDoubling.allows(&cur, &Chord::new(5, 21, 24, 29), &cx));
    }

    #[test]
    fn test_augmented_motion() {
        let config = HarmonyConfig::default();
        let c = c_major();
        let cur = Chord::new(5, 24, 29, 33);
        let cx = ctx(&c, &config, &cur, 7, false);
        // Alto F up to B (6 semitones).
        assert!(!Rule::NoAugmentedMotion.allows(&cur, &Chord::new(7, 26, 35, 38), &cx));
        // Alto F down to B is a diminished fifth, which is allowed.
        assert!(Rule::NoAugmentedMotion.allows(&cur, &Chord::new(7, 26, 23, 38), &cx));

        let a = Key::A_MINOR.tonality();
        let cur = Chord::new(5, 24, 29, 33);
        let cx = ctx(&a, &config, &cur, 4, false);
        // Alto F up to G# is an augmented second in minor.
        assert!(!Rule::NoAugmentedMotion.allows(&cur, &Chord::new(4, 23, 32, 35), &cx));
        // Same motion in C major is not diatonic and not checked.
        let cx = ctx(&c, &config, &Chord::new(5, 24, 29, 33), 7, false);
        assert!(Rule::NoAugmentedMotion.allows(&cur, &Chord::new(7, 23, 32, 35), &cx));
    }

    #[test]
    fn test_parallel_and_direct_perfects() {
        // Bass and soprano move C -> D in parallel octaves.
        let cur = Chord::new(0, 24, 31, 36);
        let next = Chord::new(2, 26, 29, 38);
        assert!(!no_parallel_perfects(&cur, &next));
        // Held voices do not count as parallels.
        assert!(no_parallel_perfects(&cur, &cur));
        // Bass and alto leap up together into a fifth.
        let cur = Chord::new(0, 28, 31, 36);
        let next = Chord::new(5, 29, 36, 45);
        assert!(!no_direct_perfects(&cur, &next));
        // Bass up, upper voices down: no pair leaps the same way.
        assert!(no_direct_perfects(&cur, &Chord::new(5, 29, 29, 33)));
    }

    #[test]
    fn test_cadence_soprano() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(7, 26, 31, 35);
        let cx = ctx(&t, &config, &cur, 0, true);
        assert!(!Rule::CadenceSoprano.allows(&cur, &Chord::new(0, 24, 31, 31), &cx));
        assert!(Rule::CadenceSoprano.allows(&cur, &Chord::new(0, 28, 31, 36), &cx));
        // Outside the cadence the rule is vacuous.
        let cx = ctx(&t, &config, &cur, 0, false);
        assert!(Rule::CadenceSoprano.allows(&cur, &Chord::new(0, 24, 31, 31), &cx));
    }

    #[test]
    fn test_overtaking_threshold_depends_on_cadence() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(7, 23, 31, 38);
        // Alto two semitones above soprano.
        let next = Chord::new(0, 24, 31, 29);
        assert!(Rule::NoLargeOvertaking.allows(&cur, &next, &ctx(&t, &config, &cur, 0, false)));
        assert!(!Rule::NoLargeOvertaking.allows(&cur, &next, &ctx(&t, &config, &cur, 0, true)));
    }

    #[test]
    fn test_outside_bass_is_rejected() {
        let t = c_major();
        let config = HarmonyConfig::default();
        let cur = Chord::new(0, 24, 31, 40);
        let err = TransitionContext::new(&t, &config, &cur, 6, None, false).unwrap_err();
        assert!(matches!(err, HarmonyError::NoteOutsideTonality { pitch: 6, .. }));
    }

    #[test]
    fn test_disabled_rules_make_filter_identity() {
        let t = c_major();
        let config = HarmonyConfig {
            rules: RuleSet::none(),
            ..HarmonyConfig::default()
        };
        let cur = Chord::new(0, 24, 31, 40);
        let cx = ctx(&t, &config, &cur, 5, false);
        let candidates: BTreeSet<Chord> = [
            Chord::new(5, 5, 5, 5),
            Chord::new(5, 24, 33, 41),
            Chord::new(5, 60, 0, 12),
        ]
        .into_iter()
        .collect();
        assert_eq!(filter_with_rules(&cur, candidates.clone(), &cx), candidates);
    }

    proptest! {
        #[test]
        fn filtering_is_idempotent(
            voices in proptest::collection::vec((7i32..31, 19i32..40, 24i32..45), 0..40)
        ) {
            let t = c_major();
            let config = HarmonyConfig::default();
            let cur = Chord::new(0, 24, 31, 40);
            let cx = ctx(&t, &config, &cur, 5, false);
            let candidates: BTreeSet<Chord> =
                voices.into_iter().map(|(te, a, s)| Chord::new(5, te, a, s)).collect();
            let once = filter_with_rules(&cur, candidates, &cx);
            let twice = filter_with_rules(&cur, once.clone(), &cx);
            prop_assert_eq!(once, twice);
        }
    }
}
