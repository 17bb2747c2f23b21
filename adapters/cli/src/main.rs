#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Pylon Defence experience.

mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use pylon_defence_core::{Event, FrameInput, PointerState, WorldSpace};
use pylon_defence_rendering::{
    palette, Camera, DebugHud, EntityRadii, PointerPreview, Presentation, RenderingBackend, Scene,
};
use pylon_defence_rendering_macroquad::MacroquadBackend;
use pylon_defence_simulation::{Simulation, SimulationConfig};
use pylon_defence_world::query;

use self::config::Overrides;

/// Stationary pylons defending the origin against converging hostiles.
#[derive(Debug, Parser)]
#[command(name = "pylon-defence", version)]
struct CliArgs {
    /// TOML file with simulation settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for the spawn edge roll.
    #[arg(long)]
    seed: Option<u64>,
    /// Viewport width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Viewport height in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Milliseconds between automatic spawns.
    #[arg(long, value_name = "MS")]
    spawn_interval_ms: Option<u64>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
    /// Run without a window for a fixed number of ticks.
    #[arg(long)]
    headless: bool,
    /// Number of ticks simulated by a headless run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Length of a headless tick in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 16)]
    tick_ms: u64,
}

impl CliArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed: self.seed,
            width: self.width,
            height: self.height,
            spawn_interval_ms: self.spawn_interval_ms,
        }
    }

    fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => config::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => SimulationConfig::default(),
        };
        self.overrides().apply(&mut config);
        Ok(config)
    }
}

/// Entry point for the Pylon Defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = args.resolve_config()?;

    if args.headless {
        let summary = run_headless(config, args.ticks, Duration::from_millis(args.tick_ms));
        info!(
            "headless run finished: {} ticks, {} spawned, {} engagements, {} defeated, {} left",
            summary.ticks,
            summary.spawned,
            summary.engagements,
            summary.defeated,
            summary.remaining
        );
        return Ok(());
    }

    run_windowed(config, &args)
}

fn run_windowed(config: SimulationConfig, args: &CliArgs) -> Result<()> {
    let radii = EntityRadii {
        hostile: config.hostile.visual_radius,
        defender: config.defender.visual_radius,
    };
    let mut simulation = Simulation::new(config);
    info!("{}", query::welcome_banner(simulation.world()));

    let presentation = Presentation::new(
        "Pylon Defence",
        config.viewport,
        palette::BACKGROUND,
        Scene::default(),
    );

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, camera, scene| {
            let _ = simulation.step(dt, &input, camera);
            populate_scene(&simulation, scene, radii, camera, &input.pointer, dt);
        })
}

fn populate_scene(
    simulation: &Simulation,
    scene: &mut Scene,
    radii: EntityRadii,
    camera: &Camera,
    pointer: &PointerState,
    dt: Duration,
) {
    let world = simulation.world();
    scene.populate(
        &query::hostile_view(world),
        &query::defender_view(world),
        radii,
    );
    scene.show_origin_marker = simulation.show_origin_marker();
    scene.pointer_preview = PointerPreview::for_mode(simulation.mode(), radii);
    scene.hud = DebugHud::compose(
        scene.show_origin_marker,
        simulation.mode(),
        camera.offset(),
        pointer,
        dt,
    );
}

/// Tallies of a headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct HeadlessSummary {
    ticks: u32,
    spawned: usize,
    engagements: usize,
    defeated: usize,
    remaining: usize,
}

fn run_headless(config: SimulationConfig, ticks: u32, tick: Duration) -> HeadlessSummary {
    let mut simulation = Simulation::new(config);
    info!("{}", query::welcome_banner(simulation.world()));

    let input = FrameInput::default();
    let mut summary = HeadlessSummary::default();
    for _ in 0..ticks {
        for event in simulation.step(tick, &input, &WorldSpace) {
            match event {
                Event::HostileSpawned { .. } => summary.spawned += 1,
                Event::DefenderEngaged { .. } => summary.engagements += 1,
                Event::HostileRetired { .. } => summary.defeated += 1,
                _ => {}
            }
        }
        summary.ticks += 1;
    }
    summary.remaining = query::hostile_count(simulation.world());
    summary
}
