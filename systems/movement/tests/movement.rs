use std::time::Duration;

use glam::DVec2;
use pylon_defence_core::{Command, Event, Health, HostileId, HostileSnapshot, HostileView};
use pylon_defence_system_movement::{advance, Advance, Movement, SNAP_DISTANCE};
use pylon_defence_world::{self as world, query, World};

fn hostile(id: u32, position: DVec2, target: DVec2, velocity: f64) -> HostileSnapshot {
    HostileSnapshot {
        id: HostileId::new(id),
        position,
        target,
        health: Health::full(100),
        velocity,
        show_health_bar: true,
    }
}

#[test]
fn whole_distance_covered_in_one_long_step() {
    let walker = hostile(0, DVec2::ZERO, DVec2::new(100.0, 0.0), 1_000.0);
    assert_eq!(
        advance(&walker, Duration::from_millis(6_000)),
        Advance::Step(DVec2::new(100.0, 0.0))
    );
}

#[test]
fn sixteen_millisecond_step_matches_velocity_scaling() {
    let walker = hostile(0, DVec2::new(100.0, 0.0), DVec2::ZERO, 1_000.0);
    let position = advance(&walker, Duration::from_millis(16))
        .position()
        .expect("still alive");

    let displacement = walker.position.distance(position);
    assert!((displacement - 1_000.0 * 16.0 / 60_000.0).abs() < 1e-12);
    assert_eq!(position.y, 0.0);
}

#[test]
fn diagonal_step_has_the_same_length() {
    let walker = hostile(0, DVec2::new(300.0, 400.0), DVec2::ZERO, 1_000.0);
    let position = advance(&walker, Duration::from_millis(600))
        .position()
        .expect("still alive");

    assert!((walker.position.distance(position) - 10.0).abs() < 1e-9);
    assert!((position - DVec2::new(294.0, 392.0)).length() < 1e-9);
}

#[test]
fn close_hostile_snaps_exactly_onto_target() {
    let target = DVec2::new(7.0, -3.0);
    let walker = hostile(0, target + DVec2::new(0.2, 0.1), target, 1_000.0);
    assert!(walker.position.distance(target) < SNAP_DISTANCE);
    assert_eq!(
        advance(&walker, Duration::from_millis(16)),
        Advance::Snap(target)
    );
}

#[test]
fn long_step_is_not_clamped_at_the_target() {
    let walker = hostile(0, DVec2::new(10.0, 0.0), DVec2::ZERO, 1_000.0);
    assert_eq!(
        advance(&walker, Duration::from_millis(6_000)),
        Advance::Step(DVec2::new(-90.0, 0.0))
    );
}

#[test]
fn handle_moves_living_and_retires_depleted_hostiles() {
    let mut fallen = hostile(3, DVec2::new(50.0, 0.0), DVec2::ZERO, 1_000.0);
    fallen.health.damage(120);
    let view = HostileView::from_snapshots(vec![
        fallen,
        hostile(1, DVec2::new(0.0, 60.0), DVec2::ZERO, 1_000.0),
    ]);

    let mut movement = Movement::new();
    let mut out = Vec::new();
    movement.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(60),
        }],
        &view,
        &mut out,
    );

    assert_eq!(
        out,
        vec![
            Command::MoveHostile {
                hostile: HostileId::new(1),
                position: DVec2::new(0.0, 59.0),
            },
            Command::RetireHostile {
                hostile: HostileId::new(3),
            },
        ]
    );
}

#[test]
fn hostiles_converge_on_origin_through_the_world() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnHostile {
            position: DVec2::new(1_000.0, 0.0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnHostile {
            position: DVec2::new(1_000.0, 0.0),
        },
        &mut events,
    );

    let mut movement = Movement::new();
    for _ in 0..61 {
        let mut tick = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1_000),
            },
            &mut tick,
        );
        let mut commands = Vec::new();
        movement.handle(&tick, &query::hostile_view(&world), &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut tick);
        }
    }

    let positions: Vec<DVec2> = query::hostile_view(&world)
        .iter()
        .map(|hostile| hostile.position)
        .collect();
    assert_eq!(positions.len(), 2, "hostiles overlap without colliding");
    for position in positions {
        assert!(position.length() < SNAP_DISTANCE, "{position:?}");
    }
}
