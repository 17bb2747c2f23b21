#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Pylon Defence.
//!
//! The world is the only owner of hostiles and defenders. Everything else
//! reads it through [`query`] and changes it by handing [`Command`] values to
//! [`apply`].

mod defenders;
mod hostiles;

use std::time::Duration;

use log::{debug, trace};
use pylon_defence_core::{
    millis, Command, DefenderId, DefenderTuning, Event, HostileId, HostileTuning, WELCOME_BANNER,
};

use self::{defenders::Defender, hostiles::Hostile};

/// Represents the authoritative Pylon Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    hostiles: Vec<Hostile>,
    defenders: Vec<Defender>,
    ids: EntityIdAllocator,
    hostile_tuning: HostileTuning,
    defender_tuning: DefenderTuning,
    tick_index: u64,
    elapsed: Duration,
}

impl World {
    /// Creates an empty world that uses the default entity tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(HostileTuning::default(), DefenderTuning::default())
    }

    /// Creates an empty world whose new entities follow the provided tuning.
    #[must_use]
    pub fn with_tuning(hostile_tuning: HostileTuning, defender_tuning: DefenderTuning) -> Self {
        Self {
            banner: WELCOME_BANNER,
            hostiles: Vec::new(),
            defenders: Vec::new(),
            ids: EntityIdAllocator::default(),
            hostile_tuning,
            defender_tuning,
            tick_index: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn hostile_mut(&mut self, hostile: HostileId) -> Option<&mut Hostile> {
        self.hostiles.iter_mut().find(|entry| entry.id == hostile)
    }

    fn defender_mut(&mut self, defender: DefenderId) -> Option<&mut Defender> {
        self.defenders.iter_mut().find(|entry| entry.id == defender)
    }

    fn resolve_engagement(
        &mut self,
        defender: DefenderId,
        hostile: HostileId,
        out_events: &mut Vec<Event>,
    ) {
        let interval = self.defender_tuning.engagement_interval_ms;
        let Some(damage) = self
            .defenders
            .iter()
            .find(|entry| entry.id == defender)
            .map(|entry| entry.damage)
        else {
            return;
        };
        let Some(target) = self.hostile_mut(hostile) else {
            return;
        };

        target.health.damage(damage);
        let position = target.position;
        let remaining_health = target.health.current();

        if let Some(shooter) = self.defender_mut(defender) {
            shooter.last_engagement = position;
            shooter.cooldown_ms = interval;
        }

        debug!(
            "defender {} hit hostile {} for {damage}, {remaining_health} health left",
            defender.get(),
            hostile.get()
        );
        out_events.push(Event::DefenderEngaged {
            defender,
            hostile,
            target: position,
            remaining_health,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out identifiers from a single counter shared by every entity kind.
#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u32,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    fn next_hostile(&mut self) -> HostileId {
        HostileId::new(self.allocate())
    }

    fn next_defender(&mut self) -> DefenderId {
        DefenderId::new(self.allocate())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that reference entities which no longer exist are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnHostile { position } => {
            let hostile = world.ids.next_hostile();
            world
                .hostiles
                .push(Hostile::spawn(hostile, position, &world.hostile_tuning));
            debug!(
                "hostile {} spawned at ({}, {})",
                hostile.get(),
                position.x,
                position.y
            );
            out_events.push(Event::HostileSpawned { hostile, position });
        }
        Command::PlaceDefender { position } => {
            let defender = world.ids.next_defender();
            world
                .defenders
                .push(Defender::place(defender, position, &world.defender_tuning));
            debug!(
                "defender {} placed at ({}, {})",
                defender.get(),
                position.x,
                position.y
            );
            out_events.push(Event::DefenderPlaced { defender, position });
        }
        Command::MoveHostile { hostile, position } => {
            if let Some(entry) = world.hostile_mut(hostile) {
                entry.position = position;
                trace!("hostile {} at ({}, {})", hostile.get(), position.x, position.y);
            }
        }
        Command::RetireHostile { hostile } => {
            let Some(index) = world.hostiles.iter().position(|entry| entry.id == hostile) else {
                return;
            };
            let _ = world.hostiles.remove(index);
            debug!("hostile {} retired", hostile.get());
            out_events.push(Event::HostileRetired { hostile });
        }
        Command::ClearHostiles => {
            let count = world.hostiles.len();
            world.hostiles.clear();
            debug!("cleared {count} hostiles");
            out_events.push(Event::HostilesCleared { count });
        }
        Command::CoolDown { defender, dt } => {
            if let Some(entry) = world.defender_mut(defender) {
                entry.cooldown_ms -= millis(dt);
            }
        }
        Command::Engage { defender, hostile } => {
            world.resolve_engagement(defender, hostile, out_events);
        }
        Command::SetRangeIndicator { defender, visible } => {
            if let Some(entry) = world.defender_mut(defender) {
                if entry.show_range != visible {
                    entry.show_range = visible;
                    out_events.push(Event::RangeIndicatorChanged { defender, visible });
                }
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use pylon_defence_core::{
        DefenderId, DefenderSnapshot, DefenderTuning, DefenderView, HostileId, HostileSnapshot,
        HostileTuning, HostileView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures a read-only view of every live hostile.
    #[must_use]
    pub fn hostile_view(world: &World) -> HostileView {
        HostileView::from_snapshots(world.hostiles.iter().map(|entry| entry.snapshot()).collect())
    }

    /// Captures a read-only view of every placed defender.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        DefenderView::from_snapshots(
            world
                .defenders
                .iter()
                .map(|entry| entry.snapshot())
                .collect(),
        )
    }

    /// Looks up a single hostile.
    #[must_use]
    pub fn hostile(world: &World, hostile: HostileId) -> Option<HostileSnapshot> {
        world
            .hostiles
            .iter()
            .find(|entry| entry.id == hostile)
            .map(|entry| entry.snapshot())
    }

    /// Looks up a single defender.
    #[must_use]
    pub fn defender(world: &World, defender: DefenderId) -> Option<DefenderSnapshot> {
        world
            .defenders
            .iter()
            .find(|entry| entry.id == defender)
            .map(|entry| entry.snapshot())
    }

    /// Number of live hostiles.
    #[must_use]
    pub fn hostile_count(world: &World) -> usize {
        world.hostiles.len()
    }

    /// Number of placed defenders.
    #[must_use]
    pub fn defender_count(world: &World) -> usize {
        world.defenders.len()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Total simulated time processed so far.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Tuning applied to newly spawned hostiles.
    #[must_use]
    pub fn hostile_tuning(world: &World) -> &HostileTuning {
        &world.hostile_tuning
    }

    /// Tuning applied to newly placed defenders.
    #[must_use]
    pub fn defender_tuning(world: &World) -> &DefenderTuning {
        &world.defender_tuning
    }
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use glam::DVec2;
    use pylon_defence_core::{Command, DefenderId, DefenderTuning, Event, HostileId, HostileTuning};
    use std::time::Duration;

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn identifiers_share_one_counter_across_kinds() {
        let mut world = World::new();
        let first = run(
            &mut world,
            Command::SpawnHostile {
                position: DVec2::new(10.0, 0.0),
            },
        );
        let second = run(
            &mut world,
            Command::PlaceDefender {
                position: DVec2::new(0.0, 0.0),
            },
        );
        let third = run(
            &mut world,
            Command::SpawnHostile {
                position: DVec2::new(-10.0, 0.0),
            },
        );

        assert_eq!(
            first,
            vec![Event::HostileSpawned {
                hostile: HostileId::new(0),
                position: DVec2::new(10.0, 0.0),
            }]
        );
        assert_eq!(
            second,
            vec![Event::DefenderPlaced {
                defender: DefenderId::new(1),
                position: DVec2::ZERO,
            }]
        );
        assert_eq!(
            third,
            vec![Event::HostileSpawned {
                hostile: HostileId::new(2),
                position: DVec2::new(-10.0, 0.0),
            }]
        );
    }

    #[test]
    fn identifiers_are_not_reused_after_removal() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::SpawnHostile {
                position: DVec2::ZERO,
            },
        );
        let _ = run(&mut world, Command::ClearHostiles);
        let events = run(
            &mut world,
            Command::SpawnHostile {
                position: DVec2::ZERO,
            },
        );

        assert_eq!(
            events,
            vec![Event::HostileSpawned {
                hostile: HostileId::new(1),
                position: DVec2::ZERO,
            }]
        );
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = World::new();
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
        );

        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(query::elapsed(&world), Duration::from_millis(16));
    }

    #[test]
    fn engagement_damages_and_resets_cooldown() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::PlaceDefender {
                position: DVec2::ZERO,
            },
        );
        let _ = run(
            &mut world,
            Command::SpawnHostile {
                position: DVec2::new(30.0, 40.0),
            },
        );
        let defender = DefenderId::new(0);
        let hostile = HostileId::new(1);

        let _ = run(
            &mut world,
            Command::CoolDown {
                defender,
                dt: Duration::from_millis(250),
            },
        );
        assert_eq!(
            query::defender(&world, defender).map(|d| d.cooldown_ms),
            Some(-250.0)
        );

        let events = run(&mut world, Command::Engage { defender, hostile });
        assert_eq!(
            events,
            vec![Event::DefenderEngaged {
                defender,
                hostile,
                target: DVec2::new(30.0, 40.0),
                remaining_health: 90,
            }]
        );

        let snapshot = query::defender(&world, defender).expect("defender");
        assert_eq!(snapshot.cooldown_ms, 1_000.0);
        assert_eq!(snapshot.last_engagement, DVec2::new(30.0, 40.0));
        let target = query::hostile(&world, hostile).expect("hostile");
        assert_eq!(target.health.current(), 90);
    }

    #[test]
    fn engagement_against_missing_hostile_is_ignored() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::PlaceDefender {
                position: DVec2::ZERO,
            },
        );
        let events = run(
            &mut world,
            Command::Engage {
                defender: DefenderId::new(0),
                hostile: HostileId::new(42),
            },
        );

        assert!(events.is_empty());
        let snapshot = query::defender(&world, DefenderId::new(0)).expect("defender");
        assert_eq!(snapshot.cooldown_ms, 0.0);
    }

    #[test]
    fn retire_removes_only_named_hostile() {
        let mut world = World::new();
        for x in [1.0, 2.0, 3.0] {
            let _ = run(
                &mut world,
                Command::SpawnHostile {
                    position: DVec2::new(x, 0.0),
                },
            );
        }

        let events = run(
            &mut world,
            Command::RetireHostile {
                hostile: HostileId::new(1),
            },
        );
        assert_eq!(
            events,
            vec![Event::HostileRetired {
                hostile: HostileId::new(1)
            }]
        );

        let remaining: Vec<_> = query::hostile_view(&world)
            .iter()
            .map(|snapshot| snapshot.id.get())
            .collect();
        assert_eq!(remaining, vec![0, 2]);

        let repeat = run(
            &mut world,
            Command::RetireHostile {
                hostile: HostileId::new(1),
            },
        );
        assert!(repeat.is_empty());
    }

    #[test]
    fn clear_reports_previous_count() {
        let mut world = World::new();
        for _ in 0..4 {
            let _ = run(
                &mut world,
                Command::SpawnHostile {
                    position: DVec2::ZERO,
                },
            );
        }

        let events = run(&mut world, Command::ClearHostiles);
        assert_eq!(events, vec![Event::HostilesCleared { count: 4 }]);
        assert_eq!(query::hostile_count(&world), 0);
    }

    #[test]
    fn range_indicator_only_reports_changes() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::PlaceDefender {
                position: DVec2::ZERO,
            },
        );
        let defender = DefenderId::new(0);

        let shown = run(
            &mut world,
            Command::SetRangeIndicator {
                defender,
                visible: true,
            },
        );
        let again = run(
            &mut world,
            Command::SetRangeIndicator {
                defender,
                visible: true,
            },
        );

        assert_eq!(
            shown,
            vec![Event::RangeIndicatorChanged {
                defender,
                visible: true
            }]
        );
        assert!(again.is_empty());
        assert!(query::defender(&world, defender).is_some_and(|d| d.show_range));
    }

    #[test]
    fn placed_defenders_use_world_tuning() {
        let hostile_tuning = HostileTuning {
            max_health: 40,
            ..HostileTuning::default()
        };
        let defender_tuning = DefenderTuning {
            range: 120.0,
            damage: 3,
            ..DefenderTuning::default()
        };
        let mut world = World::with_tuning(hostile_tuning, defender_tuning);
        for x in [5.0, -5.0] {
            let _ = run(
                &mut world,
                Command::PlaceDefender {
                    position: DVec2::new(x, 0.0),
                },
            );
        }

        assert_eq!(query::hostile_tuning(&world), &hostile_tuning);
        assert_eq!(query::defender_tuning(&world), &defender_tuning);
        assert_eq!(query::defender_count(&world), 2);
        assert_eq!(query::hostile_count(&world), 0);

        let defenders = query::defender_view(&world).into_vec();
        assert_eq!(defenders.len(), 2);
        assert_eq!(defenders[0].position, DVec2::new(5.0, 0.0));
        assert_eq!(defenders[1].position, DVec2::new(-5.0, 0.0));
        for defender in &defenders {
            assert_eq!(defender.range, 120.0);
            assert_eq!(defender.damage, 3);
        }
    }
}
