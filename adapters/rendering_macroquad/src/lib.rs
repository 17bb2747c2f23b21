#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Pylon Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::{Context, Result};
use glam::DVec2;
use log::info;
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};
use pylon_defence_core::{FrameInput, InputKey, KeyboardState, PointerState};
use pylon_defence_rendering::{
    palette, Camera, Color, DebugHud, DefenderPresentation, HostilePresentation, PointerPreview,
    Presentation, RenderingBackend, Scene, HEALTH_BAR_HEIGHT,
};
use std::time::Duration;

const DEFENDER_RING_THICKNESS: f32 = 10.0;
const ENGAGEMENT_LINE_THICKNESS: f32 = 3.0;
const ORIGIN_MARKER_RADIUS: f32 = 5.0;
const HUD_FONT_SIZE: u16 = 25;
const HUD_MARGIN: f32 = 15.0;
const HUD_CELL_GAP: f32 = 5.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &Camera, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            viewport,
            clear_color,
            scene,
        } = presentation;

        let mut camera = Camera::new(viewport).context("failed to set up the camera")?;
        let window_width =
            i32::try_from(viewport.width()).context("viewport width exceeds window limits")?;
        let window_height =
            i32::try_from(viewport.height()).context("viewport height exceeds window limits")?;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!("opening {window_width}x{window_height} window");

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut pointer_tracker = PointerTracker::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    info!("quit requested");
                    break;
                }

                macroquad::window::clear_background(background);

                let frame_dt = frame_duration(macroquad::time::get_frame_time());
                let (cursor_x, cursor_y) = mouse_position();
                let pointer = pointer_tracker.observe(
                    DVec2::new(f64::from(cursor_x), f64::from(cursor_y)),
                    is_mouse_button_down(MouseButton::Left),
                    is_mouse_button_down(MouseButton::Right),
                    is_mouse_button_down(MouseButton::Middle),
                );
                let keyboard = keyboard_from_observations(|key| is_key_down(key_code(key)));
                let input = FrameInput { keyboard, pointer };

                camera.track(&pointer);
                update_scene(frame_dt, input, &camera, &mut scene);

                draw_scene(&scene, &camera, pointer.position);

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        info!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Key each simulation input is bound to.
#[must_use]
pub fn key_code(key: InputKey) -> KeyCode {
    match key {
        InputKey::ToggleDebugMarker => KeyCode::F1,
        InputKey::ToggleOriginMarker => KeyCode::F2,
        InputKey::PlaceDefender => KeyCode::P,
        InputKey::PlaceHostile => KeyCode::Z,
        InputKey::ClearHostiles => KeyCode::C,
    }
}

/// Samples every bound key through the provided probe.
pub fn keyboard_from_observations<F>(mut is_down: F) -> KeyboardState
where
    F: FnMut(InputKey) -> bool,
{
    let mut keyboard = KeyboardState::new();
    for key in InputKey::ALL {
        keyboard.set(key, is_down(key));
    }
    keyboard
}

/// Rounds a frame time reported in seconds to whole milliseconds.
#[must_use]
pub fn frame_duration(seconds: f32) -> Duration {
    let millis = (f64::from(seconds.max(0.0)) * 1_000.0).round();
    Duration::from_millis(millis as u64)
}

/// Derives pointer motion from successive cursor positions.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    previous: Option<DVec2>,
}

impl PointerTracker {
    /// Records the cursor for this frame and returns the full pointer state.
    ///
    /// The first observation reports no motion.
    pub fn observe(
        &mut self,
        position: DVec2,
        primary: bool,
        secondary: bool,
        tertiary: bool,
    ) -> PointerState {
        let delta = self
            .previous
            .map_or(DVec2::ZERO, |previous| position - previous);
        self.previous = Some(position);

        PointerState {
            primary,
            secondary,
            tertiary,
            position,
            delta,
        }
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Returns the average frame rate once a full second has been recorded.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

fn draw_scene(scene: &Scene, camera: &Camera, pointer: DVec2) {
    for defender in &scene.defenders {
        draw_defender(defender, camera);
    }
    for hostile in &scene.hostiles {
        draw_hostile(hostile, camera);
    }
    if scene.show_origin_marker {
        let origin = camera.world_to_screen(DVec2::ZERO);
        macroquad::shapes::draw_circle(
            origin.x as f32,
            origin.y as f32,
            ORIGIN_MARKER_RADIUS,
            to_macroquad_color(palette::ALERT),
        );
    }
    draw_hud(&scene.hud);
    if let Some(preview) = scene.pointer_preview {
        draw_pointer_preview(preview, pointer);
    }
}

fn draw_defender(defender: &DefenderPresentation, camera: &Camera) {
    let centre = camera.world_to_screen(defender.position);
    let (x, y) = (centre.x as f32, centre.y as f32);

    if let Some(range) = defender.range_indicator {
        macroquad::shapes::draw_circle(x, y, range as f32, to_macroquad_color(palette::RANGE));
    }
    draw_defender_ring(x, y, defender.radius as f32);

    if let Some(line) = defender.engagement {
        let from = camera.world_to_screen(line.from);
        let to = camera.world_to_screen(line.to);
        macroquad::shapes::draw_line(
            from.x as f32,
            from.y as f32,
            to.x as f32,
            to.y as f32,
            ENGAGEMENT_LINE_THICKNESS,
            to_macroquad_color(palette::ALERT),
        );
    }
}

fn draw_defender_ring(x: f32, y: f32, radius: f32) {
    // Stroke is centred on the radius; pull it inwards so the outer edge matches.
    macroquad::shapes::draw_circle_lines(
        x,
        y,
        radius - DEFENDER_RING_THICKNESS / 2.0,
        DEFENDER_RING_THICKNESS,
        to_macroquad_color(palette::DEFENDER),
    );
}

fn draw_hostile(hostile: &HostilePresentation, camera: &Camera) {
    let centre = camera.world_to_screen(hostile.position);
    macroquad::shapes::draw_circle(
        centre.x as f32,
        centre.y as f32,
        hostile.radius as f32,
        to_macroquad_color(palette::HOSTILE),
    );

    if let Some(bar) = hostile.health_bar {
        let origin = camera.world_to_screen(bar.origin);
        macroquad::shapes::draw_rectangle(
            origin.x as f32,
            origin.y as f32,
            bar.width as f32,
            HEALTH_BAR_HEIGHT as f32,
            to_macroquad_color(palette::ALERT),
        );
    }
}

fn draw_hud(hud: &DebugHud) {
    let text_color = to_macroquad_color(palette::HUD_TEXT);
    let background = to_macroquad_color(palette::HUD_BACKGROUND);
    let font_size = f32::from(HUD_FONT_SIZE);

    let mut y = HUD_MARGIN;
    for row in &hud.rows {
        let mut x = HUD_MARGIN;
        let mut row_height: f32 = 0.0;
        for cell in row {
            let dimensions = macroquad::text::measure_text(cell, None, HUD_FONT_SIZE, 1.0);
            macroquad::shapes::draw_rectangle(x, y, dimensions.width, font_size, background);
            macroquad::text::draw_text(cell, x, y + dimensions.offset_y, font_size, text_color);
            x += dimensions.width + HUD_CELL_GAP;
            row_height = row_height.max(font_size);
        }
        y += row_height;
    }
}

fn draw_pointer_preview(preview: PointerPreview, pointer: DVec2) {
    let (x, y) = (pointer.x as f32, pointer.y as f32);
    match preview {
        PointerPreview::Defender { radius } => {
            let radius = radius as f32;
            draw_defender_ring(x + radius, y + radius, radius);
        }
        PointerPreview::Hostile { radius } => {
            let radius = radius as f32;
            macroquad::shapes::draw_circle(
                x + radius,
                y + radius,
                radius,
                to_macroquad_color(palette::HOSTILE),
            );
        }
        PointerPreview::DebugMarker { size } => {
            let size = size as f32;
            macroquad::shapes::draw_rectangle(
                x,
                y,
                size,
                size,
                to_macroquad_color(palette::DEBUG_MARKER),
            );
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
