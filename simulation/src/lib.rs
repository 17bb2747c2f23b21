#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation context that drives the world and every system once per tick.
//!
//! A tick runs, in order: debounce polling, the clock, interaction, spawning,
//! engagement and movement. Each system's commands are applied to the world
//! before the next system reads its views, so a hostile defeated during
//! engagement is already gone when movement runs.

use std::time::Duration;

use log::debug;
use pylon_defence_core::{
    Command, CoordinateSpace, DefenderTuning, Event, FrameInput, HostileTuning, InputKey,
    PlacementMode, Viewport,
};
use pylon_defence_system_debounce::DebounceTracker;
use pylon_defence_system_engagement::Engagement;
use pylon_defence_system_interaction::{Footprints, Interaction};
use pylon_defence_system_movement::Movement;
use pylon_defence_system_spawning::{self as spawning, Spawning};
use pylon_defence_world::{self as world, query, World};
use serde::{Deserialize, Serialize};

/// Tunable parameters of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Visible area; spawn edges sit half of it away from the origin.
    pub viewport: Viewport,
    /// Milliseconds between automatic spawns.
    pub spawn_interval_ms: u64,
    /// Seed for the spawn edge roll.
    pub rng_seed: u64,
    /// Milliseconds a key stays suppressed after firing.
    pub debounce_window_ms: u64,
    /// Whether hostiles appear on their own.
    pub spawning_enabled: bool,
    /// Attributes of newly created hostiles.
    pub hostile: HostileTuning,
    /// Attributes of newly placed defenders.
    pub defender: DefenderTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            spawn_interval_ms: 1_000,
            rng_seed: 0,
            debounce_window_ms: 500,
            spawning_enabled: true,
            hostile: HostileTuning::default(),
            defender: DefenderTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Interval between automatic spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    /// Suppression window applied to every key.
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }
}

/// Owns the world and every system, and advances them together.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    debounce: DebounceTracker<InputKey>,
    interaction: Interaction,
    spawning: Spawning,
    engagement: Engagement,
    movement: Movement,
    tick_events: Vec<Event>,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    /// Creates an empty simulation from the provided configuration.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        debug!(
            "simulation created: viewport {}x{}, spawn every {} ms, seed {}",
            config.viewport.width(),
            config.viewport.height(),
            config.spawn_interval_ms,
            config.rng_seed
        );
        Self {
            world: World::with_tuning(config.hostile, config.defender),
            debounce: DebounceTracker::with_window(config.debounce_window()),
            interaction: Interaction::new(Footprints::from_tuning(
                &config.defender,
                &config.hostile,
            )),
            spawning: Spawning::new(spawning::Config::new(
                config.spawn_interval(),
                config.viewport,
                config.rng_seed,
            )),
            engagement: Engagement::new(),
            movement: Movement::new(),
            tick_events: Vec::new(),
            events: Vec::new(),
            commands: Vec::new(),
            config,
        }
    }

    /// Configuration the simulation was created with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the world for queries and rendering.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Input mode currently selected by the player.
    #[must_use]
    pub const fn mode(&self) -> PlacementMode {
        self.interaction.mode()
    }

    /// Whether the convergence point marker should be drawn.
    #[must_use]
    pub const fn show_origin_marker(&self) -> bool {
        self.interaction.show_origin_marker()
    }

    /// Runs one tick and returns every event the world broadcast during it.
    pub fn step<C>(&mut self, dt: Duration, input: &FrameInput, camera: &C) -> &[Event]
    where
        C: CoordinateSpace + ?Sized,
    {
        self.events.clear();

        let triggered = self.debounce.poll(input.keyboard.iter(), dt);

        self.tick_events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.tick_events);
        self.events.extend_from_slice(&self.tick_events);

        let defenders = query::defender_view(&self.world);
        self.interaction.handle(
            &input.pointer,
            &triggered,
            camera,
            &defenders,
            &mut self.commands,
        );
        self.flush();

        if self.config.spawning_enabled {
            self.spawning.handle(&self.tick_events, &mut self.commands);
            self.flush();
        }

        self.engagement.handle(
            &self.tick_events,
            &query::defender_view(&self.world),
            &query::hostile_view(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.movement.handle(
            &self.tick_events,
            &query::hostile_view(&self.world),
            &mut self.commands,
        );
        self.flush();

        &self.events
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
