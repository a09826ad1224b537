// End-to-end checks of the harmonizer and the rhythm pipeline through the
// public API only.

use chorale_music::config::RuleSet;
use chorale_music::job::{JobConfig, run_job};
use chorale_music::piece::Strategy;
use chorale_music::rules::{TransitionContext, filter_with_rules};
use chorale_music::transition::TransitionCache;
use chorale_music::{
    Chord, Degree, Harmonizer, HarmonyConfig, HarmonyError, Key, Selection, Tonality, Voice,
};
use chorale_prng::SeededRng;
use chorale_rhythm::{LSystem, Ratio};
use std::collections::BTreeSet;

const START: Chord = Chord::new(0, 24, 31, 40);

#[test]
fn tonic_to_subdominant_spells_the_subdominant_triad() {
    let t = Key::C_MAJOR.tonality();
    assert_eq!(t.degrees(), &[0, 2, 4, 5, 7, 9, 11]);
    let mut cache = TransitionCache::new();
    let next = cache
        .next_chords(&START, 5, None, false, &t, &HarmonyConfig::default())
        .unwrap();
    assert!(!next.is_empty());
    for chord in next.iter() {
        let pcs = chord.simplify();
        for pc in [5, 9, 0] {
            assert!(pcs.contains(&pc), "{chord} lacks {pc}");
        }
    }
}

#[test]
fn single_production_system_passes_other_symbols_through() {
    let sys = LSystem::from_pairs(&[("A", "BB+E")]).unwrap();
    assert_eq!(sys.run("A", 1), "BB+E");
    assert_eq!(sys.run("A", 2), "BB+E");
    assert_eq!(sys.run("A", 0), "A");
}

#[test]
fn start_only_bass_line_has_no_harmonizations() {
    let mut h = Harmonizer::new(Key::C_MAJOR, HarmonyConfig::default());
    let line = [0];
    let tree = h.compose(START, &line[1..]).unwrap();
    assert!(tree.children().is_empty());
    assert_eq!(tree.level(), 0);
}

#[test]
fn disabling_every_rule_makes_filtering_the_identity() {
    let t = Key::C_MAJOR.tonality();
    let config = HarmonyConfig {
        rules: RuleSet::none(),
        ..HarmonyConfig::default()
    };
    let ctx = TransitionContext::new(&t, &config, &START, 5, None, false).unwrap();
    let candidates: BTreeSet<Chord> = (0..30)
        .map(|i| Chord::new(5, 20 + i % 7, 30 - i % 5, 36 + i))
        .collect();
    assert_eq!(filter_with_rules(&START, candidates.clone(), &ctx), candidates);
}

#[test]
fn every_chord_in_every_key_stays_in_range() {
    // I to IV in a handful of keys, with V as lookahead.
    for name in ["C major", "G major", "F major", "D major", "Bb major"] {
        let t = Tonality::from_name(name).unwrap();
        let tonic = t.tonic() as i32;
        let sub = t.pc(Degree::Subdominant) as i32;
        let dom = t.pc(Degree::Dominant) as i32;
        let mut cache = TransitionCache::new();
        let config = HarmonyConfig::default();
        // Start: root, fifth, third voicing with the bass in the lowest octave.
        let start = Chord::new(tonic, tonic + 24, tonic + 31, tonic + 40);
        if !start.check_ranges() {
            continue;
        }
        let next = cache.next_chords(&start, sub, Some(dom), false, &t, &config).unwrap();
        assert!(next.iter().all(|c| c.check_ranges()), "{name}");
    }
}

#[test]
fn tree_and_lazy_paths_agree_on_validity() {
    let mut h = Harmonizer::new(Key::C_MAJOR, HarmonyConfig::default());
    let line = [5, 7, 0];
    let tree = h.compose(START, &line).unwrap();
    assert!(tree.level() > 0);
    for seed in 0..10 {
        let mut rng = SeededRng::new(seed);
        let path = h
            .harmonize(START, &line, Selection::Lazy(&mut rng))
            .unwrap();
        let mut node = &tree;
        for chord in &path[1..] {
            node = node
                .children()
                .iter()
                .find(|c| c.chord() == *chord)
                .expect("lazy path must exist in the tree");
        }
        assert!(node.is_leaf());
    }
}

#[test]
fn minor_key_cadence_resolves_the_raised_leading_tone() {
    // A minor: i, iv, V, i.
    let start = Chord::new(9, 24, 28, 33);
    let line = [14, 16, 9];
    for seed in 0..8 {
        let mut h = Harmonizer::new(Key::A_MINOR, HarmonyConfig::default());
        let mut rng = SeededRng::new(seed);
        let path = h.harmonize(start, &line, Selection::Lazy(&mut rng)).unwrap();
        let basses: Vec<i32> = path.iter().map(|c| c.bass()).collect();
        assert_eq!(basses, vec![9, 14, 16, 9]);
        assert!(path.iter().all(|c| c.check_ranges()));

        // The dominant carries G#, once; the final chord is a complete A minor triad.
        let (dominant, tonic) = (path[2], path[3]);
        assert_eq!(dominant.count_pc(8), 1, "{dominant}");
        assert_eq!(dominant.count_pc(7), 0, "{dominant}");
        for pc in [9, 0, 4] {
            assert!(tonic.count_pc(pc) > 0, "{tonic} lacks {pc}");
        }
        for voice in Voice::ALL {
            if dominant.voice(voice) % 12 == 8 {
                assert_eq!(tonic.voice(voice) % 12, 9, "{voice:?} leaves G# unresolved");
            }
        }

        // No augmented second between F and G# in any voice.
        for pair in path.windows(2) {
            for voice in Voice::ALL {
                let (a, b) = (pair[0].voice(voice), pair[1].voice(voice));
                let aug_second = (a % 12 == 5 && b - a == 3) || (a % 12 == 8 && a - b == 3);
                assert!(!aug_second, "{voice:?}: {} -> {}", pair[0], pair[1]);
            }
        }
    }

    let mut h = Harmonizer::new(Key::A_MINOR, HarmonyConfig::default());
    assert_eq!(h.compose(start, &line).unwrap().total_depth(), 4);
}

#[test]
fn full_job_pipeline() {
    let job = JobConfig {
        bass_lines: vec![vec![0, 5, 7, 0]],
        sections: 2,
        seed: 9,
        rhythm: "complex".into(),
        rhythm_iterations: 3,
        ..JobConfig::default()
    };
    let out = run_job(&job).unwrap();
    assert_eq!(out.chords.len(), 7);
    assert_eq!(out.voices.len(), 7);
    assert_eq!(out.durations.len(), 7);
    assert_eq!(out.events.len(), 28);
    assert!(out.durations.iter().all(|d| *d != Ratio::ZERO));

    // Every voice's onsets are cumulative absolute durations.
    for voice in Voice::ALL {
        let mut expected = Ratio::ZERO;
        for event in out.events.iter().filter(|e| e.voice == voice) {
            assert_eq!(event.onset, expected);
            expected = expected + event.duration;
        }
    }

    // Output is plain JSON.
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["key"], "C major");
    assert_eq!(json["voices"]["bass"][0], 0);
}

#[test]
fn driven_job_is_reproducible() {
    let job = JobConfig {
        bass_lines: vec![vec![0, 5, 7, 0]],
        sections: 2,
        strategy: Strategy::Driven,
        rhythm: "abcde".into(),
        rhythm_iterations: 2,
        ..JobConfig::default()
    };
    let a = run_job(&job).unwrap();
    let b = run_job(&job).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.chords.len(), 7);
}

#[test]
fn bad_input_fails_before_search() {
    let job = JobConfig {
        bass_lines: vec![vec![0, 6, 7, 0]],
        sections: 1,
        ..JobConfig::default()
    };
    assert!(matches!(
        run_job(&job),
        Err(HarmonyError::NoteOutsideTonality { pitch: 6, .. })
    ));
}
