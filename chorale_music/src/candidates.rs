// Unfiltered next-chord candidates.
//
// The bass is given. Every other voice may land on any pitch of the next
// triad within `epsilon` semitones of where it is now (clamped at pitch 0);
// the candidates are the Cartesian product of those per-voice options. A
// voice with no eligible pitch empties the whole product, which callers treat
// as "no transition" rather than as an error.
//
// With common-tone carry-over enabled some upper voices are fixed before the
// product is taken: a repeated bass holds the whole chord, otherwise each
// upper voice already on a tone of the next triad (other than the leading
// tone, which has to move) stays where it is.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::chord::{Chord, Pitch, SimplifiedChord, Voice, pitch_class};
use crate::rules::TransitionContext;

/// Pitches a voice at `pitch` may reach.
pub fn epsilon_window(pitch: Pitch, epsilon: Pitch) -> RangeInclusive<Pitch> {
    (pitch - epsilon).max(0)..=pitch + epsilon
}

/// Voices of the next chord fixed before enumeration, in voice order.
pub fn seed_next_voicing(
    current: &Chord,
    next_bass: Pitch,
    triad: &SimplifiedChord,
    leading_tone: u8,
    maintain_common_notes: bool,
) -> [Option<Pitch>; 4] {
    let mut seeded = [Some(next_bass), None, None, None];
    if !maintain_common_notes {
        return seeded;
    }
    let repeated_bass = current.bass() == next_bass;
    for voice in [Voice::Tenor, Voice::Alto, Voice::Soprano] {
        let pitch = current.voice(voice);
        let common = triad.includes(pitch) && pitch_class(pitch) != leading_tone;
        if repeated_bass || common {
            seeded[voice.index()] = Some(pitch);
        }
    }
    seeded
}

/// Fill every unset voice from its window and take the product.
pub fn complete_transition(
    current: &Chord,
    seeded: [Option<Pitch>; 4],
    triad: &SimplifiedChord,
    epsilon: Pitch,
) -> BTreeSet<Chord> {
    let options: Vec<Vec<Pitch>> = Voice::ALL
        .iter()
        .map(|&voice| match seeded[voice.index()] {
            Some(pitch) => vec![pitch],
            None => epsilon_window(current.voice(voice), epsilon)
                .filter(|&p| triad.includes(p))
                .collect(),
        })
        .collect();

    let mut out = BTreeSet::new();
    for &b in &options[0] {
        for &t in &options[1] {
            for &a in &options[2] {
                for &s in &options[3] {
                    out.insert(Chord::new(b, t, a, s));
                }
            }
        }
    }
    out
}

/// All structurally possible next chords for a transition.
pub fn candidate_chords(current: &Chord, next_bass: Pitch, ctx: &TransitionContext) -> BTreeSet<Chord> {
    let seeded = seed_next_voicing(
        current,
        next_bass,
        &ctx.next_triad,
        ctx.tonality.leading_tone(),
        ctx.config.maintain_common_notes,
    );
    complete_transition(current, seeded, &ctx.next_triad, ctx.config.epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarmonyConfig;
    use crate::tonality::Key;

    #[test]
    fn test_window_clamps_at_zero() {
        assert_eq!(epsilon_window(3, 7), 0..=10);
        assert_eq!(epsilon_window(24, 7), 17..=31);
    }

    #[test]
    fn test_every_candidate_spells_the_triad_and_keeps_the_bass() {
        let t = Key::C_MAJOR.tonality();
        let config = HarmonyConfig::default();
        let cur = Chord::new(0, 24, 31, 40);
        let ctx = TransitionContext::new(&t, &config, &cur, 5, None, false).unwrap();
        let cands = candidate_chords(&cur, 5, &ctx);
        assert!(!cands.is_empty());
        for c in &cands {
            assert_eq!(c.bass(), 5);
            assert!(c.voices().iter().all(|&p| ctx.next_triad.includes(p)));
            assert!((c.soprano() - 40).abs() <= 7);
        }
        assert!(cands.contains(&Chord::new(5, 24, 33, 41)));
    }

    #[test]
    fn test_product_size() {
        // F triad around tenor 24 (17..=31): 17 21 24 29 = 4 pitches.
        // Around alto 31 (24..=38): 24 29 33 36 = 4.
        // Around soprano 40 (33..=47): 33 36 41 45 = 4.
        let triad = SimplifiedChord::new(5, 9, 0);
        let cur = Chord::new(0, 24, 31, 40);
        let cands = complete_transition(&cur, [Some(5), None, None, None], &triad, 7);
        assert_eq!(cands.len(), 64);
    }

    #[test]
    fn test_empty_window_empties_product() {
        let triad = SimplifiedChord::new(5, 9, 0);
        let cur = Chord::new(0, 24, 31, 40);
        assert!(complete_transition(&cur, [Some(5), None, None, None], &triad, 0).is_empty());
    }

    #[test]
    fn test_common_tones_are_held() {
        let triad = SimplifiedChord::new(5, 9, 0);
        // C major to F: the C in the tenor is common, G and E are not.
        let cur = Chord::new(0, 24, 31, 40);
        let seeded = seed_next_voicing(&cur, 5, &triad, 11, true);
        assert_eq!(seeded, [Some(5), Some(24), None, None]);
        // Disabled: only the bass is set.
        let seeded = seed_next_voicing(&cur, 5, &triad, 11, false);
        assert_eq!(seeded, [Some(5), None, None, None]);
    }

    #[test]
    fn test_repeated_bass_holds_everything() {
        let triad = SimplifiedChord::new(0, 4, 7);
        let cur = Chord::new(0, 24, 31, 40);
        let seeded = seed_next_voicing(&cur, 0, &triad, 11, true);
        assert_eq!(seeded, [Some(0), Some(24), Some(31), Some(40)]);
    }

    #[test]
    fn test_leading_tone_is_never_held() {
        // G major chord to E minor in C: B is common but is the leading tone.
        let triad = SimplifiedChord::new(4, 7, 11);
        let cur = Chord::new(7, 23, 31, 38);
        let seeded = seed_next_voicing(&cur, 4, &triad, 11, true);
        assert_eq!(seeded, [Some(4), None, Some(31), None]);
    }
}
