#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that lets ready defenders engage the nearest hostile in range.

use std::time::Duration;

use log::trace;
use pylon_defence_core::{
    Command, DefenderSnapshot, DefenderView, Event, HostileSnapshot, HostileView,
};

/// Engagement system that decides, per defender, whether to cool down or fire.
#[derive(Debug, Default)]
pub struct Engagement {
    scratch: Vec<Command>,
}

impl Engagement {
    /// Creates a new engagement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits cooldown and engagement commands for every defender.
    ///
    /// Defenders with a positive cooldown only count down this tick. Ready
    /// defenders engage the nearest hostile strictly inside their range, or
    /// stay idle and rescan next tick when nothing qualifies.
    pub fn handle(
        &mut self,
        events: &[Event],
        defenders: &DefenderView,
        hostiles: &HostileView,
        out: &mut Vec<Command>,
    ) {
        let mut ticked = false;
        let mut dt = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt: step } = event {
                ticked = true;
                dt = dt.saturating_add(*step);
            }
        }

        if !ticked || defenders.is_empty() {
            return;
        }

        self.scratch.clear();

        for defender in defenders.iter() {
            if defender.cooldown_ms > 0.0 {
                self.scratch.push(Command::CoolDown {
                    defender: defender.id,
                    dt,
                });
                continue;
            }

            if let Some(target) = select_target(defender, hostiles) {
                trace!(
                    "defender {} targets hostile {}",
                    defender.id.get(),
                    target.id.get()
                );
                self.scratch.push(Command::Engage {
                    defender: defender.id,
                    hostile: target.id,
                });
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

/// Finds the hostile a defender should engage.
///
/// Only hostiles strictly closer than the defender's range qualify. Among
/// those the nearest wins; equal distances keep the one encountered first.
#[must_use]
pub fn select_target<'a>(
    defender: &DefenderSnapshot,
    hostiles: &'a HostileView,
) -> Option<&'a HostileSnapshot> {
    let mut best: Option<(&HostileSnapshot, f64)> = None;

    for hostile in hostiles.iter() {
        let distance = defender.position.distance(hostile.position);
        if distance >= defender.range {
            continue;
        }

        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((hostile, distance)),
        }
    }

    best.map(|(hostile, _)| hostile)
}
