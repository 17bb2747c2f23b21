//! Authoritative defender state.

use glam::DVec2;
use pylon_defence_core::{DefenderId, DefenderSnapshot, DefenderTuning};

/// Defender stored inside the world. Defenders are never removed.
#[derive(Clone, Debug)]
pub(crate) struct Defender {
    pub(crate) id: DefenderId,
    pub(crate) position: DVec2,
    pub(crate) range: f64,
    pub(crate) damage: i32,
    pub(crate) cooldown_ms: f64,
    pub(crate) last_engagement: DVec2,
    pub(crate) show_range: bool,
}

impl Defender {
    /// Creates an idle defender that may engage on its first tick.
    pub(crate) fn place(id: DefenderId, position: DVec2, tuning: &DefenderTuning) -> Self {
        Self {
            id,
            position,
            range: tuning.range,
            damage: tuning.damage,
            cooldown_ms: 0.0,
            last_engagement: DVec2::ZERO,
            show_range: false,
        }
    }

    pub(crate) fn snapshot(&self) -> DefenderSnapshot {
        DefenderSnapshot {
            id: self.id,
            position: self.position,
            range: self.range,
            damage: self.damage,
            cooldown_ms: self.cooldown_ms,
            last_engagement: self.last_engagement,
            show_range: self.show_range,
        }
    }
}
