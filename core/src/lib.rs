#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pylon Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable snapshot
//! views of the world and respond with [`Command`] batches, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what actually changed.
//!
//! Coordinates are continuous world units with the convergence point at the
//! origin and the y axis growing downward, matching screen space.

use std::time::Duration;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Pylon Defence.";

/// Point every hostile converges on unless told otherwise.
pub const CONVERGENCE_POINT: DVec2 = DVec2::ZERO;

/// Converts a tick duration into floating-point milliseconds.
///
/// The conversion goes through whole nanoseconds so that integral
/// millisecond durations map onto exactly representable values.
#[must_use]
pub fn millis(dt: Duration) -> f64 {
    dt.as_nanos() as f64 / 1_000_000.0
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new hostile enter the world at the provided position.
    SpawnHostile {
        /// World position the hostile starts from.
        position: DVec2,
    },
    /// Requests that a new defender be placed at the provided position.
    PlaceDefender {
        /// World position the defender occupies for its whole life.
        position: DVec2,
    },
    /// Moves a hostile to a new position.
    MoveHostile {
        /// Identifier of the hostile being moved.
        hostile: HostileId,
        /// Position the hostile occupies after the move.
        position: DVec2,
    },
    /// Removes a single hostile from the world.
    RetireHostile {
        /// Identifier of the hostile to remove.
        hostile: HostileId,
    },
    /// Removes every hostile from the world.
    ClearHostiles,
    /// Counts a defender's cooldown down by the provided duration.
    CoolDown {
        /// Identifier of the defender cooling down.
        defender: DefenderId,
        /// Duration subtracted from the remaining cooldown.
        dt: Duration,
    },
    /// Resolves one engagement of a defender against a hostile.
    Engage {
        /// Identifier of the engaging defender.
        defender: DefenderId,
        /// Identifier of the hostile receiving damage.
        hostile: HostileId,
    },
    /// Shows or hides a defender's range indicator.
    SetRangeIndicator {
        /// Identifier of the defender whose indicator changes.
        defender: DefenderId,
        /// Whether the indicator should be drawn.
        visible: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a hostile entered the world.
    HostileSpawned {
        /// Identifier assigned to the hostile.
        hostile: HostileId,
        /// Position the hostile starts from.
        position: DVec2,
    },
    /// Confirms that a defender was placed.
    DefenderPlaced {
        /// Identifier assigned to the defender.
        defender: DefenderId,
        /// Position the defender occupies.
        position: DVec2,
    },
    /// Reports that a defender damaged a hostile.
    DefenderEngaged {
        /// Identifier of the engaging defender.
        defender: DefenderId,
        /// Identifier of the damaged hostile.
        hostile: HostileId,
        /// Position of the hostile at the moment of the engagement.
        target: DVec2,
        /// Health left on the hostile after the damage was applied.
        remaining_health: i32,
    },
    /// Confirms that a hostile left the world.
    HostileRetired {
        /// Identifier of the removed hostile.
        hostile: HostileId,
    },
    /// Confirms that every hostile was removed at once.
    HostilesCleared {
        /// Number of hostiles that were alive before the clear.
        count: usize,
    },
    /// Reports that a defender's range indicator changed visibility.
    RangeIndicatorChanged {
        /// Identifier of the defender.
        defender: DefenderId,
        /// Visibility after the change.
        visible: bool,
    },
}

/// Unique identifier assigned to a hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostileId(u32);

impl HostileId {
    /// Creates a new hostile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefenderId(u32);

impl DefenderId {
    /// Creates a new defender identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Current and maximum health of a hostile.
///
/// The current value may drop to zero or below for the remainder of the tick
/// in which the hostile was fatally damaged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Health {
    current: i32,
    maximum: i32,
}

impl Health {
    /// Creates a full health pool with the provided maximum.
    #[must_use]
    pub const fn full(maximum: i32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Health currently remaining.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Upper bound of the health pool.
    #[must_use]
    pub const fn maximum(&self) -> i32 {
        self.maximum
    }

    /// Subtracts `amount` from the remaining health.
    ///
    /// Negative amounts are ignored so health can never grow.
    pub fn damage(&mut self, amount: i32) {
        self.current = self.current.saturating_sub(amount.max(0));
    }

    /// Reports whether the hostile has run out of health.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    /// Fraction of health remaining, or zero for a degenerate pool.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.maximum <= 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.maximum)
    }
}

/// Immutable representation of a single hostile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostileSnapshot {
    /// Unique identifier assigned to the hostile.
    pub id: HostileId,
    /// Current world position.
    pub position: DVec2,
    /// Point the hostile walks toward.
    pub target: DVec2,
    /// Health pool of the hostile.
    pub health: Health,
    /// Speed in world units per 60 000 ms of simulated time.
    pub velocity: f64,
    /// Whether the health bar should be drawn.
    pub show_health_bar: bool,
}

/// Read-only snapshot describing all hostiles in the world.
#[derive(Clone, Debug, Default)]
pub struct HostileView {
    snapshots: Vec<HostileSnapshot>,
}

impl HostileView {
    /// Creates a new hostile view from the provided snapshots.
    ///
    /// Snapshots are ordered by identifier, which is also creation order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HostileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured hostile snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &HostileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of hostiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no hostiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HostileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single defender used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderSnapshot {
    /// Identifier allocated to the defender by the world.
    pub id: DefenderId,
    /// Fixed world position.
    pub position: DVec2,
    /// Radius within which hostiles can be engaged.
    pub range: f64,
    /// Damage dealt per engagement.
    pub damage: i32,
    /// Milliseconds until the defender may engage again. Engagement is
    /// allowed whenever this is not positive.
    pub cooldown_ms: f64,
    /// Position of the most recently engaged hostile.
    pub last_engagement: DVec2,
    /// Whether the range indicator should be drawn.
    pub show_range: bool,
}

/// Read-only snapshot describing all defenders placed in the world.
#[derive(Clone, Debug, Default)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured defender snapshots in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Number of defenders captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no defenders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Input mode selected by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlacementMode {
    /// Pointer clicks interact with existing defenders.
    #[default]
    None,
    /// The next primary click places a defender.
    PlaceDefender,
    /// The next primary click places a hostile.
    PlaceHostile,
    /// A debug marker follows the pointer.
    ShowDebugMarker,
}

/// Keys the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputKey {
    /// `F1`: toggles the debug marker.
    ToggleDebugMarker,
    /// `F2`: toggles the origin marker.
    ToggleOriginMarker,
    /// `P`: arms defender placement.
    PlaceDefender,
    /// `Z`: arms hostile placement.
    PlaceHostile,
    /// `C`: removes every hostile.
    ClearHostiles,
}

impl InputKey {
    /// Every key in the set, in a stable order.
    pub const ALL: [Self; 5] = [
        Self::ToggleDebugMarker,
        Self::ToggleOriginMarker,
        Self::PlaceDefender,
        Self::PlaceHostile,
        Self::ClearHostiles,
    ];

    const fn index(self) -> usize {
        match self {
            Self::ToggleDebugMarker => 0,
            Self::ToggleOriginMarker => 1,
            Self::PlaceDefender => 2,
            Self::PlaceHostile => 3,
            Self::ClearHostiles => 4,
        }
    }
}

/// Pressed state of every [`InputKey`] sampled on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pressed: [bool; InputKey::ALL.len()],
}

impl KeyboardState {
    /// Creates a state where nothing is pressed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pressed: [false; InputKey::ALL.len()],
        }
    }

    /// Returns the state with the provided key marked as pressed.
    #[must_use]
    pub fn with_pressed(mut self, key: InputKey) -> Self {
        self.pressed[key.index()] = true;
        self
    }

    /// Records whether `key` is held down.
    pub fn set(&mut self, key: InputKey, pressed: bool) {
        self.pressed[key.index()] = pressed;
    }

    /// Reports whether `key` is held down.
    #[must_use]
    pub const fn is_pressed(&self, key: InputKey) -> bool {
        self.pressed[key.index()]
    }

    /// Iterates every key together with its pressed state.
    pub fn iter(&self) -> impl Iterator<Item = (InputKey, bool)> + '_ {
        InputKey::ALL
            .into_iter()
            .map(|key| (key, self.is_pressed(key)))
    }
}

/// Pointer buttons, position and motion sampled on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// Primary (left) button held.
    pub primary: bool,
    /// Secondary (right) button held.
    pub secondary: bool,
    /// Tertiary (middle) button held. Acts as the drag modifier.
    pub tertiary: bool,
    /// Pointer position in screen space.
    pub position: DVec2,
    /// Pointer movement since the previous tick, in screen space.
    pub delta: DVec2,
}

/// Input gathered by an adapter for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Keyboard state for the tick.
    pub keyboard: KeyboardState,
    /// Pointer state for the tick.
    pub pointer: PointerState,
}

/// Conversion from screen space into world space.
///
/// Implemented by the camera collaborator; the simulation only ever works in
/// world space.
pub trait CoordinateSpace {
    /// Maps a screen-space point into world space.
    fn screen_to_world(&self, screen: DVec2) -> DVec2;
}

/// Identity mapping used when screen and world space coincide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldSpace;

impl CoordinateSpace for WorldSpace {
    fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        screen
    }
}

/// Dimensions of the visible area in screen units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Creates a viewport with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width in screen units.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in screen units.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Half of the width, rounded down.
    #[must_use]
    pub const fn half_width(&self) -> u32 {
        self.width / 2
    }

    /// Half of the height, rounded down.
    #[must_use]
    pub const fn half_height(&self) -> u32 {
        self.height / 2
    }

    /// Reports whether either dimension is zero.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(2_000, 1_000)
    }
}

/// Cardinal edge at which the spawner introduces a hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpawnEdge {
    /// Right of the convergence point.
    East,
    /// Left of the convergence point.
    West,
    /// Below the convergence point.
    South,
    /// Above the convergence point.
    North,
}

impl SpawnEdge {
    /// Every edge, in roll order.
    pub const ALL: [Self; 4] = [Self::East, Self::West, Self::South, Self::North];

    /// Offset from the convergence point at which the edge spawns hostiles.
    #[must_use]
    pub fn offset(self, viewport: Viewport) -> DVec2 {
        let half_width = f64::from(viewport.half_width());
        let half_height = f64::from(viewport.half_height());
        match self {
            Self::East => DVec2::new(half_width, 0.0),
            Self::West => DVec2::new(-half_width, 0.0),
            Self::South => DVec2::new(0.0, half_height),
            Self::North => DVec2::new(0.0, -half_height),
        }
    }

    /// Spawn position for the edge around the convergence point.
    #[must_use]
    pub fn position(self, viewport: Viewport) -> DVec2 {
        CONVERGENCE_POINT + self.offset(viewport)
    }

    /// Recovers the edge a spawn position belongs to, if any.
    #[must_use]
    pub fn classify(position: DVec2, viewport: Viewport) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|edge| edge.position(viewport) == position)
    }
}

/// Attributes given to every newly created hostile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileTuning {
    /// Starting and maximum health.
    pub max_health: i32,
    /// Speed in world units per 60 000 ms.
    pub velocity: f64,
    /// Radius of the hostile's visual footprint.
    pub visual_radius: f64,
}

impl Default for HostileTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            velocity: 1_000.0,
            visual_radius: 25.0,
        }
    }
}

/// Attributes given to every newly placed defender.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderTuning {
    /// Engagement radius. Hostiles must be strictly closer than this.
    pub range: f64,
    /// Damage dealt per engagement.
    pub damage: i32,
    /// Cooldown applied after every engagement, in milliseconds.
    pub engagement_interval_ms: f64,
    /// Radius of the defender's visual footprint, used for hit-testing.
    pub visual_radius: f64,
}

impl Default for DefenderTuning {
    fn default() -> Self {
        Self {
            range: 250.0,
            damage: 10,
            engagement_interval_ms: 1_000.0,
            visual_radius: 50.0,
        }
    }
}
