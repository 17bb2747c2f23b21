use std::time::Duration;

use pylon_defence_core::{InputKey, KeyboardState};
use pylon_defence_system_debounce::DebounceTracker;

const FRAME: Duration = Duration::from_millis(16);

fn poll(tracker: &mut DebounceTracker<InputKey>, keyboard: KeyboardState) -> Vec<InputKey> {
    tracker.poll(keyboard.iter(), FRAME)
}

#[test]
fn held_key_triggers_once_on_first_tick() {
    let mut tracker = DebounceTracker::new();
    let held = KeyboardState::new().with_pressed(InputKey::PlaceDefender);

    let triggers: Vec<usize> = (0..10).map(|_| poll(&mut tracker, held).len()).collect();

    assert_eq!(triggers, vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn quick_re_press_inside_window_is_suppressed() {
    let mut tracker = DebounceTracker::new();
    let held = KeyboardState::new().with_pressed(InputKey::ClearHostiles);
    let idle = KeyboardState::new();

    assert_eq!(poll(&mut tracker, held), vec![InputKey::ClearHostiles]);
    for _ in 0..5 {
        assert!(poll(&mut tracker, idle).is_empty());
    }
    assert!(
        poll(&mut tracker, held).is_empty(),
        "press 96ms after the first must not fire"
    );
}

#[test]
fn key_fires_again_after_release_and_full_window() {
    let mut tracker = DebounceTracker::new();
    let held = KeyboardState::new().with_pressed(InputKey::PlaceHostile);
    let idle = KeyboardState::new();

    assert_eq!(poll(&mut tracker, held), vec![InputKey::PlaceHostile]);

    // 484ms left after the press frame drains in 31 frames, the 32nd releases.
    for _ in 0..32 {
        assert!(poll(&mut tracker, idle).is_empty());
    }

    assert_eq!(poll(&mut tracker, held), vec![InputKey::PlaceHostile]);
}

#[test]
fn keys_are_independent() {
    let mut tracker = DebounceTracker::new();
    let both = KeyboardState::new()
        .with_pressed(InputKey::ToggleDebugMarker)
        .with_pressed(InputKey::ToggleOriginMarker);

    assert_eq!(
        poll(&mut tracker, both),
        vec![InputKey::ToggleDebugMarker, InputKey::ToggleOriginMarker]
    );

    let only_origin = KeyboardState::new().with_pressed(InputKey::ToggleOriginMarker);
    assert!(poll(&mut tracker, only_origin).is_empty());

    let mut fresh = KeyboardState::new();
    fresh.set(InputKey::PlaceDefender, true);
    assert_eq!(poll(&mut tracker, fresh), vec![InputKey::PlaceDefender]);
}

#[test]
fn countdown_decays_for_keys_that_are_up() {
    let mut tracker = DebounceTracker::new();
    let held = KeyboardState::new().with_pressed(InputKey::PlaceDefender);
    let _ = poll(&mut tracker, held);
    let before = tracker
        .get(InputKey::PlaceDefender)
        .map(|entry| entry.remaining_ms())
        .expect("entry");

    let _ = poll(&mut tracker, KeyboardState::new());
    let after = tracker
        .get(InputKey::PlaceDefender)
        .map(|entry| entry.remaining_ms())
        .expect("entry");

    assert_eq!(before - after, 16.0);
    assert!(tracker.get(InputKey::ClearHostiles).is_some());
}
