#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement and lifecycle system that walks hostiles toward their target.
//!
//! Hostiles move in a straight line with no collision against each other.
//! Overlap is expected.

use std::time::Duration;

use glam::DVec2;
use log::trace;
use pylon_defence_core::{millis, Command, Event, HostileSnapshot, HostileView};

/// Distance below which a hostile is placed exactly on its target.
pub const SNAP_DISTANCE: f64 = 0.3;

/// Milliseconds of simulated time over which a hostile covers `velocity` units.
pub const VELOCITY_BASELINE_MS: f64 = 60_000.0;

/// Outcome of advancing a single hostile by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// The hostile has no health left and must leave the world.
    Retire,
    /// The hostile was close enough to land exactly on its target.
    Snap(DVec2),
    /// The hostile stepped toward its target and now stands here.
    Step(DVec2),
}

impl Advance {
    /// Position the hostile occupies afterwards, unless it retires.
    #[must_use]
    pub const fn position(&self) -> Option<DVec2> {
        match self {
            Self::Retire => None,
            Self::Snap(position) | Self::Step(position) => Some(*position),
        }
    }
}

/// Advances one hostile by `dt`.
///
/// The step length is `velocity * dt_ms / 60000` along the unit direction to
/// the target and is not clamped, so a large `dt` may carry the hostile past
/// its target.
#[must_use]
pub fn advance(hostile: &HostileSnapshot, dt: Duration) -> Advance {
    if hostile.health.is_depleted() {
        return Advance::Retire;
    }

    let offset = hostile.target - hostile.position;
    if offset.length() < SNAP_DISTANCE {
        return Advance::Snap(hostile.target);
    }

    let direction = offset.normalize_or_zero();
    let step = hostile.velocity * millis(dt) / VELOCITY_BASELINE_MS;
    Advance::Step(hostile.position + direction * step)
}

/// Pure system that reacts to time advancing by moving or retiring hostiles.
#[derive(Debug, Default)]
pub struct Movement {
    scratch: Vec<Command>,
}

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits one move or retire command per hostile for every tick observed.
    ///
    /// Hostiles are processed in creation order from the snapshot. Retirement
    /// is emitted as a command so the world removes the hostile after the
    /// whole pass has been decided.
    pub fn handle(&mut self, events: &[Event], hostiles: &HostileView, out: &mut Vec<Command>) {
        let mut ticked = false;
        let mut dt = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt: step } = event {
                ticked = true;
                dt = dt.saturating_add(*step);
            }
        }

        if !ticked || hostiles.is_empty() {
            return;
        }

        self.scratch.clear();
        for hostile in hostiles.iter() {
            let command = match advance(hostile, dt) {
                Advance::Retire => Command::RetireHostile {
                    hostile: hostile.id,
                },
                Advance::Snap(position) | Advance::Step(position) => {
                    trace!(
                        "hostile {} -> ({}, {})",
                        hostile.id.get(),
                        position.x,
                        position.y
                    );
                    Command::MoveHostile {
                        hostile: hostile.id,
                        position,
                    }
                }
            };
            self.scratch.push(command);
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
