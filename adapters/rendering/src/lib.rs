#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Pylon Defence adapters.
//!
//! Nothing here draws pixels. Backends receive a [`Scene`] that has already
//! been reduced to screen-agnostic presentation data and convert world
//! positions through the [`Camera`].

use anyhow::Result as AnyResult;
use glam::{DVec2, IVec2};
use pylon_defence_core::{
    CoordinateSpace, DefenderSnapshot, DefenderView, FrameInput, Health, HostileSnapshot,
    HostileView, PlacementMode, PointerState, Viewport,
};
use std::time::Duration;
use thiserror::Error;

/// Full width of a hostile's health bar at maximum health.
pub const HEALTH_BAR_WIDTH: f64 = 50.0;

/// Height of a hostile's health bar.
pub const HEALTH_BAR_HEIGHT: f64 = 10.0;

/// Width used for empty or degenerate health bars.
pub const MIN_HEALTH_BAR_WIDTH: f64 = 1.0;

/// Cooldown at or above which the engagement line stays visible.
pub const ENGAGEMENT_FEEDBACK_MS: f64 = 800.0;

/// Multiplier applied to pointer motion while dragging the camera.
pub const CAMERA_DRAG_FACTOR: f64 = 1.25;

/// Side length of the square debug marker that follows the pointer.
pub const DEBUG_MARKER_SIZE: f64 = 50.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, u8::MAX)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }
}

/// Fixed palette of the experience.
pub mod palette {
    use super::Color;

    /// Frame background.
    pub const BACKGROUND: Color = Color::from_rgb_u8(255, 255, 255);
    /// Hostile body.
    pub const HOSTILE: Color = Color::from_rgb_u8(0, 150, 0);
    /// Health bar fill, engagement line and origin marker.
    pub const ALERT: Color = Color::from_rgb_u8(255, 0, 0);
    /// Defender ring.
    pub const DEFENDER: Color = Color::from_rgb_u8(0, 255, 255);
    /// Translucent disc showing a defender's range.
    pub const RANGE: Color = Color::from_rgba_u8(100, 100, 100, 100);
    /// Translucent square following the pointer in debug-marker mode.
    pub const DEBUG_MARKER: Color = Color::from_rgba_u8(255, 0, 0, 100);
    /// Debug HUD text.
    pub const HUD_TEXT: Color = Color::from_rgb_u8(255, 255, 255);
    /// Debug HUD text background.
    pub const HUD_BACKGROUND: Color = Color::from_rgb_u8(0, 0, 0);
}

/// Pannable view onto the world.
///
/// The convergence point sits at the centre of the viewport when the offset
/// is zero. Dragging with the tertiary button moves the offset by the
/// pointer motion scaled by [`CAMERA_DRAG_FACTOR`], truncated per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    offset: IVec2,
    viewport: Viewport,
    dragging: bool,
}

impl Camera {
    /// Creates a centred camera for the provided viewport.
    pub fn new(viewport: Viewport) -> Result<Self, RenderingError> {
        if viewport.is_degenerate() {
            return Err(RenderingError::InvalidViewport {
                width: viewport.width(),
                height: viewport.height(),
            });
        }

        Ok(Self {
            offset: IVec2::ZERO,
            viewport,
            dragging: false,
        })
    }

    /// Current camera offset in screen units.
    #[must_use]
    pub const fn offset(&self) -> IVec2 {
        self.offset
    }

    /// Viewport the camera projects onto.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether the tertiary button was held on the previous frame.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Applies one frame of pointer input.
    ///
    /// Motion only pans the camera when the drag was already active on the
    /// previous frame, so the frame that presses the button does not move it.
    pub fn track(&mut self, pointer: &PointerState) {
        if self.dragging {
            self.offset += drag_step(pointer.delta);
        }
        self.dragging = pointer.tertiary;
    }

    /// Maps a world-space point into screen space.
    #[must_use]
    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        world + self.origin()
    }

    fn origin(&self) -> DVec2 {
        self.offset.as_dvec2()
            + DVec2::new(
                f64::from(self.viewport.half_width()),
                f64::from(self.viewport.half_height()),
            )
    }
}

impl CoordinateSpace for Camera {
    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        screen - self.origin()
    }
}

fn drag_step(delta: DVec2) -> IVec2 {
    let scaled = (delta * CAMERA_DRAG_FACTOR).trunc();
    IVec2::new(scaled.x as i32, scaled.y as i32)
}

/// Width of a health bar for the provided health pool.
///
/// Empty, negative and degenerate pools all collapse to
/// [`MIN_HEALTH_BAR_WIDTH`].
#[must_use]
pub fn health_bar_width(health: Health) -> f64 {
    let width = HEALTH_BAR_WIDTH * health.ratio();
    if width.is_finite() && width >= MIN_HEALTH_BAR_WIDTH {
        width
    } else {
        MIN_HEALTH_BAR_WIDTH
    }
}

/// Visual radii used to size entities and placement previews.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityRadii {
    /// Radius of a hostile body.
    pub hostile: f64,
    /// Outer radius of a defender ring.
    pub defender: f64,
}

impl Default for EntityRadii {
    fn default() -> Self {
        Self {
            hostile: 25.0,
            defender: 50.0,
        }
    }
}

/// Health bar drawn beneath a hostile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBarPresentation {
    /// Top-left corner in world space.
    pub origin: DVec2,
    /// Width of the filled bar.
    pub width: f64,
}

/// Hostile as seen by a rendering backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostilePresentation {
    /// Centre in world space.
    pub position: DVec2,
    /// Body radius.
    pub radius: f64,
    /// Health bar, when the hostile displays one.
    pub health_bar: Option<HealthBarPresentation>,
}

impl HostilePresentation {
    /// Builds the presentation of a hostile snapshot.
    ///
    /// The bar is centred horizontally and sits one bar height below the
    /// bottom of the body.
    #[must_use]
    pub fn from_snapshot(snapshot: &HostileSnapshot, radius: f64) -> Self {
        let health_bar = snapshot.show_health_bar.then(|| {
            let width = health_bar_width(snapshot.health);
            HealthBarPresentation {
                origin: DVec2::new(
                    snapshot.position.x - (width / 2.0).floor(),
                    snapshot.position.y + radius + HEALTH_BAR_HEIGHT,
                ),
                width,
            }
        });

        Self {
            position: snapshot.position,
            radius,
            health_bar,
        }
    }
}

/// Line from a defender to the hostile it engaged last.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngagementLine {
    /// Defender centre in world space.
    pub from: DVec2,
    /// Engaged hostile position in world space.
    pub to: DVec2,
}

/// Defender as seen by a rendering backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderPresentation {
    /// Centre in world space.
    pub position: DVec2,
    /// Outer radius of the ring.
    pub radius: f64,
    /// Range indicator radius, when it is visible.
    pub range_indicator: Option<f64>,
    /// Feedback line for a recent engagement.
    pub engagement: Option<EngagementLine>,
}

impl DefenderPresentation {
    /// Builds the presentation of a defender snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &DefenderSnapshot, radius: f64) -> Self {
        let recently_engaged = snapshot.cooldown_ms >= ENGAGEMENT_FEEDBACK_MS;
        let engagement = recently_engaged.then_some(EngagementLine {
            from: snapshot.position,
            to: snapshot.last_engagement,
        });

        Self {
            position: snapshot.position,
            radius,
            range_indicator: snapshot.show_range.then_some(snapshot.range),
            engagement,
        }
    }
}

/// What follows the pointer while a mode is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerPreview {
    /// Defender ring with its bounding box anchored at the pointer.
    Defender {
        /// Ring radius.
        radius: f64,
    },
    /// Hostile body with its bounding box anchored at the pointer.
    Hostile {
        /// Body radius.
        radius: f64,
    },
    /// Translucent square anchored at the pointer.
    DebugMarker {
        /// Side length.
        size: f64,
    },
}

impl PointerPreview {
    /// Preview matching the provided mode, if any.
    #[must_use]
    pub fn for_mode(mode: PlacementMode, radii: EntityRadii) -> Option<Self> {
        match mode {
            PlacementMode::None => None,
            PlacementMode::PlaceDefender => Some(Self::Defender {
                radius: radii.defender,
            }),
            PlacementMode::PlaceHostile => Some(Self::Hostile {
                radius: radii.hostile,
            }),
            PlacementMode::ShowDebugMarker => Some(Self::DebugMarker {
                size: DEBUG_MARKER_SIZE,
            }),
        }
    }
}

/// Text rows of the debug overlay, top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugHud {
    /// Each row is a list of cells laid out left to right.
    pub rows: Vec<Vec<String>>,
}

impl DebugHud {
    /// Composes the overlay for one frame.
    #[must_use]
    pub fn compose(
        show_origin_marker: bool,
        mode: PlacementMode,
        camera_offset: IVec2,
        pointer: &PointerState,
        dt: Duration,
    ) -> Self {
        let mut flags = vec!["[DEBUG]".to_owned()];
        if show_origin_marker {
            flags.push("[CDOT]".to_owned());
        }
        if mode == PlacementMode::ShowDebugMarker {
            flags.push("[MHOV]".to_owned());
        }

        let delta = pointer.delta.trunc();
        let camera_x = signed_padded(i64::from(camera_offset.x), 6);
        let camera_y = signed_padded(i64::from(camera_offset.y), 6);
        let rows = vec![
            flags,
            vec![
                format!("camera_x = {camera_x}"),
                signed_padded(delta.x as i64, 3),
            ],
            vec![
                format!("camera_y = {camera_y}"),
                signed_padded(delta.y as i64, 3),
            ],
            vec![format!(
                "mouse = ({}, {}, {})",
                pointer.primary, pointer.tertiary, pointer.secondary
            )],
            vec![format!("dt = {}", dt.as_millis())],
        ];

        Self { rows }
    }
}

fn signed_padded(value: i64, width: usize) -> String {
    let sign = if value >= 0 { '+' } else { '-' };
    format!("{sign}{:0>width$}", value.unsigned_abs())
}

/// Presentation-ready state for a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Hostiles in creation order.
    pub hostiles: Vec<HostilePresentation>,
    /// Defenders in placement order.
    pub defenders: Vec<DefenderPresentation>,
    /// Whether the convergence point marker is drawn.
    pub show_origin_marker: bool,
    /// Preview attached to the pointer, if a mode is active.
    pub pointer_preview: Option<PointerPreview>,
    /// Debug overlay.
    pub hud: DebugHud,
}

impl Scene {
    /// Replaces the entity presentations with the provided views.
    pub fn populate(
        &mut self,
        hostiles: &HostileView,
        defenders: &DefenderView,
        radii: EntityRadii,
    ) {
        self.hostiles.clear();
        self.hostiles.extend(
            hostiles
                .iter()
                .map(|hostile| HostilePresentation::from_snapshot(hostile, radii.hostile)),
        );
        self.defenders.clear();
        self.defenders.extend(
            defenders
                .iter()
                .map(|defender| DefenderPresentation::from_snapshot(defender, radii.defender)),
        );
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Window size, which is also the camera viewport.
    pub viewport: Viewport,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene shown before the first update.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, viewport: Viewport, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            viewport,
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Pylon Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The backend owns the [`Camera`] and applies pointer input to it before
    /// every update. The `update_scene` closure receives the frame delta, the
    /// sampled input and the camera, and refreshes the scene that is drawn
    /// afterwards.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &Camera, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// Both viewport dimensions must be positive.
    #[error("viewport must have a positive size (received {width}x{height})")]
    InvalidViewport {
        /// Provided width.
        width: u32,
        /// Provided height.
        height: u32,
    },
}
