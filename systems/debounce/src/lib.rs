#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-key debounce tracking that turns held keys into one-shot triggers.
//!
//! Every key is a two-state machine. A **released** key fires on the tick it
//! is first observed pressed and becomes **suppressed**. A suppressed key only
//! returns to released once it is up and its suppression window has fully
//! elapsed. The window is armed when the press is observed and is not
//! re-armed while the key stays held.

use std::{collections::HashMap, fmt::Debug, hash::Hash, time::Duration};

use log::trace;
use pylon_defence_core::millis;

/// Suppression window applied when no other duration is configured.
pub const DEFAULT_SUPPRESSION_WINDOW: Duration = Duration::from_millis(500);

/// Debounce state of a single key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebounceEntry {
    released: bool,
    remaining_ms: f64,
    window_ms: f64,
}

impl DebounceEntry {
    /// Creates a released entry with the provided suppression window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            released: true,
            remaining_ms: 0.0,
            window_ms: millis(window),
        }
    }

    /// Whether the key is up and eligible to fire again.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// Milliseconds of suppression left. Never negative.
    #[must_use]
    pub const fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Full suppression window in milliseconds.
    #[must_use]
    pub const fn window_ms(&self) -> f64 {
        self.window_ms
    }

    fn is_triggerable(&self, pressed: bool) -> bool {
        pressed && self.released && self.remaining_ms <= 0.0
    }

    fn update(&mut self, pressed: bool, dt_ms: f64) {
        if pressed && self.released {
            self.released = false;
            self.remaining_ms = self.window_ms;
        }
        if !pressed && !self.released && self.remaining_ms <= 0.0 {
            self.released = true;
        }
        self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
    }
}

/// Debounce tracker keyed by an arbitrary input key identifier.
///
/// Entries are created lazily with default values on first reference and live
/// for as long as the tracker does.
#[derive(Clone, Debug)]
pub struct DebounceTracker<K> {
    entries: HashMap<K, DebounceEntry>,
    window: Duration,
}

impl<K> Default for DebounceTracker<K> {
    fn default() -> Self {
        Self::with_window(DEFAULT_SUPPRESSION_WINDOW)
    }
}

impl<K> DebounceTracker<K> {
    /// Creates a tracker using [`DEFAULT_SUPPRESSION_WINDOW`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker whose entries use the provided suppression window.
    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            window,
        }
    }

    /// Suppression window given to newly created entries.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl<K> DebounceTracker<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Returns the entry for `key`, inserting a default one if needed.
    pub fn entry(&mut self, key: K) -> &mut DebounceEntry {
        let window = self.window;
        self.entries
            .entry(key)
            .or_insert_with(|| DebounceEntry::new(window))
    }

    /// Returns the entry for `key` if it has been referenced before.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&DebounceEntry> {
        self.entries.get(&key)
    }

    /// Reports whether a press of `key` observed now should fire its action.
    ///
    /// Keys never seen before behave like released entries.
    #[must_use]
    pub fn is_triggerable(&self, key: K, pressed: bool) -> bool {
        self.entries
            .get(&key)
            .map_or(pressed, |entry| entry.is_triggerable(pressed))
    }

    /// Advances the entry for `key` by one tick.
    pub fn update(&mut self, key: K, pressed: bool, dt: Duration) {
        if pressed {
            trace!("key {key:?} held");
        }
        self.entry(key).update(pressed, millis(dt));
    }

    /// Evaluates and advances every key of the device for one tick.
    ///
    /// Triggers are decided against the state left by the previous tick, then
    /// every entry is updated so countdowns decay even for keys that are up.
    /// Returns the keys whose one-shot action fires on this tick, in input
    /// order.
    pub fn poll<I>(&mut self, keys: I, dt: Duration) -> Vec<K>
    where
        I: IntoIterator<Item = (K, bool)>,
    {
        let observed: Vec<(K, bool)> = keys.into_iter().collect();
        let triggered = observed
            .iter()
            .filter(|(key, pressed)| self.is_triggerable(*key, *pressed))
            .map(|(key, _)| *key)
            .collect();

        for (key, pressed) in observed {
            self.update(key, pressed, dt);
        }

        triggered
    }
}
