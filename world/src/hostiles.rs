//! Authoritative hostile state.

use glam::DVec2;
use pylon_defence_core::{Health, HostileId, HostileSnapshot, HostileTuning, CONVERGENCE_POINT};

/// Hostile stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Hostile {
    pub(crate) id: HostileId,
    pub(crate) position: DVec2,
    pub(crate) target: DVec2,
    pub(crate) health: Health,
    pub(crate) velocity: f64,
    pub(crate) show_health_bar: bool,
}

impl Hostile {
    /// Creates a hostile at full health heading for the convergence point.
    pub(crate) fn spawn(id: HostileId, position: DVec2, tuning: &HostileTuning) -> Self {
        Self {
            id,
            position,
            target: CONVERGENCE_POINT,
            health: Health::full(tuning.max_health),
            velocity: tuning.velocity,
            show_health_bar: true,
        }
    }

    pub(crate) fn snapshot(&self) -> HostileSnapshot {
        HostileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            health: self.health,
            velocity: self.velocity,
            show_health_bar: self.show_health_bar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_hostile_uses_tuning_and_targets_origin() {
        let tuning = HostileTuning {
            max_health: 40,
            velocity: 250.0,
            ..HostileTuning::default()
        };
        let hostile = Hostile::spawn(HostileId::new(3), DVec2::new(10.0, -5.0), &tuning);
        let snapshot = hostile.snapshot();

        assert_eq!(snapshot.id, HostileId::new(3));
        assert_eq!(snapshot.position, DVec2::new(10.0, -5.0));
        assert_eq!(snapshot.target, DVec2::ZERO);
        assert_eq!(snapshot.health, Health::full(40));
        assert_eq!(snapshot.velocity, 250.0);
        assert!(snapshot.show_health_bar);
    }
}
