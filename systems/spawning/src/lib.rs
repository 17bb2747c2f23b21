#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that introduces hostiles at the map edges.

use std::time::Duration;

use glam::DVec2;
use log::debug;
use pylon_defence_core::{millis, Command, Event, SpawnEdge, Viewport};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Interval between spawns when no other cadence is configured.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_millis(1_000);

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    viewport: Viewport,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, viewport and seed.
    #[must_use]
    pub const fn new(spawn_interval: Duration, viewport: Viewport, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            viewport,
            rng_seed,
        }
    }
}

/// Pure system that emits a spawn command once per interval.
#[derive(Clone, Debug)]
pub struct Spawning {
    interval_ms: f64,
    remaining_ms: f64,
    viewport: Viewport,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    ///
    /// The first spawn happens on the first tick.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            interval_ms: millis(config.spawn_interval),
            remaining_ms: 0.0,
            viewport: config.viewport,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Milliseconds left until the next spawn.
    #[must_use]
    pub const fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    /// Consumes tick events and emits spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };

            let (remaining_ms, spawn) = try_spawn(
                *dt,
                self.remaining_ms,
                self.interval_ms,
                self.viewport,
                &mut self.rng,
            );
            self.remaining_ms = remaining_ms;

            if let Some(position) = spawn {
                debug!("spawning hostile at ({}, {})", position.x, position.y);
                out.push(Command::SpawnHostile { position });
            }
        }
    }
}

/// Advances the spawn timer by one tick.
///
/// When the timer has run out a new spawn position is rolled and the timer is
/// reset to the full interval; otherwise `dt` is subtracted. Returns the new
/// remaining time together with the spawn position, if any.
pub fn try_spawn<R>(
    dt: Duration,
    remaining_ms: f64,
    interval_ms: f64,
    viewport: Viewport,
    rng: &mut R,
) -> (f64, Option<DVec2>)
where
    R: Rng + ?Sized,
{
    if remaining_ms <= 0.0 {
        let edge = roll_edge(rng);
        (interval_ms, Some(edge.position(viewport)))
    } else {
        (remaining_ms - millis(dt), None)
    }
}

/// Picks one of the four spawn edges uniformly at random.
pub fn roll_edge<R>(rng: &mut R) -> SpawnEdge
where
    R: Rng + ?Sized,
{
    match rng.gen_range(0..4u8) {
        0 => SpawnEdge::East,
        1 => SpawnEdge::West,
        2 => SpawnEdge::South,
        3 => SpawnEdge::North,
        roll => unreachable!("spawn edge roll {roll} outside 0..4"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_timer_resets_to_full_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (remaining, spawn) = try_spawn(
            Duration::from_millis(16),
            0.0,
            1_000.0,
            Viewport::default(),
            &mut rng,
        );
        assert_eq!(remaining, 1_000.0);
        assert!(spawn.is_some());
    }

    #[test]
    fn running_timer_counts_down_without_spawning() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (remaining, spawn) = try_spawn(
            Duration::from_millis(16),
            10.0,
            1_000.0,
            Viewport::default(),
            &mut rng,
        );
        assert_eq!(remaining, -6.0);
        assert!(spawn.is_none());
    }

    #[test]
    fn ignores_events_other_than_time() {
        let mut spawning = Spawning::new(Config::new(
            DEFAULT_SPAWN_INTERVAL,
            Viewport::default(),
            1,
        ));
        let mut out = Vec::new();
        spawning.handle(&[Event::HostilesCleared { count: 3 }], &mut out);
        assert!(out.is_empty());
        assert_eq!(spawning.remaining_ms(), 0.0);
    }
}
