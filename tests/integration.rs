// Integration tests (native) for the `zdg-warword` crate.
// These tests drive the puzzle engine with an in-memory surface and a manual
// scheduler, so they run under `cargo test` on the host.

use rand::SeedableRng;
use rand::rngs::StdRng;
use zdg_warword::puzzle::{
    Dictionary, DictionaryEntry, ManualScheduler, MemorySurface, Phase, PuzzleConfig, PuzzleEngine,
    TextChoice, TimerKind,
};

type TestEngine = PuzzleEngine<MemorySurface, ManualScheduler>;

fn engine(entries: Vec<DictionaryEntry>, seed: u64) -> TestEngine {
    let mut e = PuzzleEngine::new(
        PuzzleConfig::default(),
        Dictionary::new(entries),
        MemorySurface::default(),
        ManualScheduler::default(),
        StdRng::seed_from_u64(seed),
    );
    e.start();
    e
}

fn cannon() -> DictionaryEntry {
    DictionaryEntry::new("CANNON", "a large gun")
}

fn arsenal() -> Vec<DictionaryEntry> {
    ["CANNON", "TANK", "ARMY", "RADAR", "MORTAR", "NAVY", "SIEGE", "FORT"]
        .iter()
        .map(|w| DictionaryEntry::new(w, &format!("about {}", w.to_lowercase())))
        .collect()
}

#[test]
fn cannon_in_seven_slots_starts_at_offset_zero_or_one() {
    let mut seen = [false; 2];
    for seed in 0..64 {
        let e = engine(vec![cannon()], seed);
        let state = e.state();
        assert_eq!(state.word(), "CANNON");
        assert!(state.offset() <= 1, "offset {}", state.offset());
        seen[state.offset()] = true;

        let expected: String = (0..7)
            .map(|i| if i >= state.offset() && i < state.offset() + 6 { "CANNON".as_bytes()[i - state.offset()] as char } else { ' ' })
            .collect();
        assert_eq!(e.surface().letters(), expected);
        for (i, slot) in e.surface().slots.iter().enumerate() {
            let inside = i >= state.offset() && i < state.offset() + 6;
            assert_eq!(slot.style.empty, !inside);
            assert!(!slot.style.chaos);
        }
        assert_eq!(e.surface().definition, "a large gun");
    }
    assert!(seen[0] && seen[1], "both offsets should occur");
}

#[test]
fn empty_dictionary_falls_back_to_warword() {
    let e = engine(Vec::new(), 1);
    assert_eq!(e.state().word(), "WARWORD");
    assert_eq!(e.state().offset(), 0);
    assert_eq!(e.state().definition(), "");
    assert_eq!(e.state().context(), "");
    assert_eq!(e.surface().letters(), "WARWORD");
    assert_eq!(e.surface().definition, "");
}

#[test]
fn blank_or_oversized_words_also_fall_back() {
    let e = engine(
        vec![DictionaryEntry::new("  ", "blank"), DictionaryEntry::new("ARTILLERY", "too long")],
        2,
    );
    assert_eq!(e.state().word(), "WARWORD");
}

#[test]
fn spaces_render_as_underscores() {
    let e = engine(vec![DictionaryEntry::new("no go", "")], 3);
    let off = e.state().offset();
    assert_eq!(e.surface().slots[off + 2].letter, Some('_'));
    assert_eq!(e.state().word(), "NO GO");
}

#[test]
fn repeated_pointer_moves_do_not_stack_timers() {
    let mut e = engine(vec![cannon()], 4);
    e.on_pointer_move();
    e.on_pointer_move();
    e.on_pointer_move();
    let sched = e.scheduler();
    for kind in [TimerKind::Letters, TimerKind::Definition, TimerKind::Context] {
        assert_eq!(sched.live_count(kind), 1, "{kind:?}");
        assert_eq!(sched.scheduled.iter().filter(|k| **k == kind).count(), 1, "{kind:?}");
    }
    // Debounce: each move re-arms the quiet timer after cancelling it.
    assert_eq!(sched.live_count(TimerKind::Quiet), 1);
    assert_eq!(sched.scheduled.iter().filter(|k| **k == TimerKind::Quiet).count(), 3);
    assert_eq!(sched.cancelled, vec![TimerKind::Quiet, TimerKind::Quiet]);
    assert_eq!(sched.period_of(TimerKind::Letters), Some(60));
    assert_eq!(sched.period_of(TimerKind::Definition), Some(40));
    assert_eq!(sched.period_of(TimerKind::Quiet), Some(200));
    assert_eq!(e.state().phase(), Phase::Chaos);
}

#[test]
fn pin_stays_on_the_same_slot_for_the_whole_chaos_period() {
    let mut e = engine(arsenal(), 5);
    e.on_pointer_move();
    let pin = e.state().fixed_index().expect("pinned on first move");
    assert!(e.state().letter_at(pin).is_some(), "pin lands inside the word");
    e.on_pointer_move();
    assert_eq!(e.state().fixed_index(), Some(pin));
}

#[test]
fn letter_chaos_keeps_pinned_letter_visible() {
    let mut e = engine(arsenal(), 6);
    e.on_pointer_move();
    let pin = e.state().fixed_index().unwrap();
    let truth = e.state().letter_at(pin);
    for _ in 0..5 {
        e.on_timer(TimerKind::Letters);
        let slots = &e.surface().slots;
        assert_eq!(slots.len(), 7);
        for (i, slot) in slots.iter().enumerate() {
            assert!(slot.style.chaos);
            if i == pin {
                assert!(slot.style.fixed);
                assert_eq!(slot.letter, truth);
            } else {
                assert!(slot.letter.is_some_and(|c| c.is_ascii_uppercase()));
            }
        }
    }
}

#[test]
fn definition_flickers_then_restores_exactly() {
    let mut e = engine(vec![cannon()], 7);
    e.on_pointer_move();
    e.on_timer(TimerKind::Definition);
    let frame = e.surface().definition.clone();
    assert_eq!(frame.len(), "a large gun".len());
    for (a, b) in "a large gun".chars().zip(frame.chars()) {
        assert_eq!(a == ' ', b == ' ');
    }
    e.on_timer(TimerKind::Quiet);
    assert_eq!(e.surface().definition, "a large gun");
    assert_eq!(e.state().phase(), Phase::Idle);
}

#[test]
fn shutdown_mid_chaos_restores_text_and_cancels_everything() {
    let mut e = engine(vec![cannon().with_context(TextChoice::One("siege of the fort".into()))], 8);
    e.on_pointer_move();
    e.on_timer(TimerKind::Context);
    e.shutdown();
    assert_eq!(e.surface().context, "siege of the fort");
    assert_eq!(e.surface().definition, "a large gun");
    assert!(!e.timers().any_active());
    for kind in TimerKind::ALL {
        assert!(!e.scheduler().is_live(kind), "{kind:?} still live");
    }
}

#[test]
fn quiet_period_reselects_a_word_with_the_pinned_letter() {
    for seed in 0..40 {
        let mut e = engine(arsenal(), seed);
        e.on_pointer_move();
        let pin = e.state().fixed_index().unwrap();
        let letter = e.state().letter_at(pin).unwrap();
        e.on_timer(TimerKind::Quiet);

        let state = e.state();
        assert_eq!(state.letter_at(pin), Some(letter), "seed {seed}");
        assert!(state.offset() + state.letters().len() <= 7);
        assert_eq!(state.fixed_index(), None);
        assert!(!state.mouse_moving());
        assert!(!e.timers().any_active());
        assert_eq!(e.surface().slots[pin].letter, Some(letter));
        assert!(e.surface().slots[pin].style.fixed);
        assert_eq!(e.surface().definition, state.definition());
    }
}

#[test]
fn no_candidate_keeps_previous_word() {
    // WARWORD is not in the dictionary and nothing usable fits the row.
    let mut e = engine(vec![DictionaryEntry::new("ARTILLERY", "big guns")], 9);
    e.on_pointer_move();
    e.on_timer(TimerKind::Quiet);
    assert_eq!(e.state().word(), "WARWORD");
    assert_eq!(e.state().offset(), 0);
    assert_eq!(e.surface().letters(), "WARWORD");
}

#[test]
fn stale_ticks_are_ignored() {
    let mut e = engine(vec![cannon()], 10);
    let frames = e.surface().frames;
    e.on_timer(TimerKind::Letters);
    e.on_timer(TimerKind::Quiet);
    assert_eq!(e.surface().frames, frames);
    assert_eq!(e.state().phase(), Phase::Idle);
}

#[test]
fn word_changes_refresh_the_background() {
    let mut e = engine(vec![cannon()], 11);
    assert_eq!(e.surface().background_refreshes, 1);
    e.on_pointer_move();
    e.on_timer(TimerKind::Quiet);
    assert_eq!(e.surface().background_refreshes, 2);
}

#[test]
fn definition_alternatives_are_picked_at_selection() {
    let entry = DictionaryEntry {
        word: Some("fort".into()),
        definition: Some(TextChoice::Many(vec!["a stronghold".into(), "a bastion".into()])),
        context: Some(TextChoice::Many(vec!["hold the fort".into()])),
    };
    let e = engine(vec![entry], 12);
    assert!(["a stronghold", "a bastion"].contains(&e.state().definition()));
    assert_eq!(e.surface().context, "hold the fort");
}

#[test]
fn dictionary_document_feeds_the_engine() {
    let json = r#"{"list":[{"word":"cannon","definition":"a large gun"},{"definition":"orphan"}]}"#;
    let mut e = PuzzleEngine::new(
        PuzzleConfig::default(),
        Dictionary::from_json_or_empty(json),
        MemorySurface::default(),
        ManualScheduler::default(),
        StdRng::seed_from_u64(13),
    );
    e.start();
    assert_eq!(e.state().word(), "CANNON");
}

#[test]
fn fallback_word_is_clipped_to_a_short_row() {
    let config = PuzzleConfig {
        letter_count: 5,
        ..PuzzleConfig::default()
    };
    let mut e = PuzzleEngine::new(
        config,
        Dictionary::default(),
        MemorySurface::default(),
        ManualScheduler::default(),
        StdRng::seed_from_u64(14),
    );
    e.start();
    assert_eq!(e.state().word(), "WARWO");
    e.on_pointer_move();
    assert!(e.state().fixed_index().unwrap() < 5);
}

#[test]
fn zero_slot_config_is_raised_to_one_slot() {
    let config = PuzzleConfig {
        letter_count: 0,
        ..PuzzleConfig::default()
    };
    let mut e = PuzzleEngine::new(
        config,
        Dictionary::new(vec![DictionaryEntry::new("A", "one letter")]),
        MemorySurface::default(),
        ManualScheduler::default(),
        StdRng::seed_from_u64(15),
    );
    assert_eq!(e.config().letter_count, 1);
    e.start();
    assert_eq!(e.state().word(), "A");
    e.on_pointer_move();
    assert_eq!(e.state().fixed_index(), Some(0));
    e.on_timer(TimerKind::Quiet);
    assert_eq!(e.surface().letters(), "A");
}

#[test]
fn settling_leaves_no_text_flicker_running() {
    let mut e = engine(arsenal(), 16);
    e.on_pointer_move();
    e.on_timer(TimerKind::Definition);
    e.on_timer(TimerKind::Quiet);
    for kind in [TimerKind::Definition, TimerKind::Context] {
        assert!(!e.timers().is_active(kind), "{kind:?}");
        assert!(!e.scheduler().is_live(kind), "{kind:?}");
    }
    assert_eq!(e.surface().definition, e.state().definition());
}
