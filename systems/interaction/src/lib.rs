#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure interaction system that turns pointer and key input into world commands.

use glam::DVec2;
use log::debug;
use pylon_defence_core::{
    Command, CoordinateSpace, DefenderTuning, DefenderView, HostileTuning, InputKey,
    PlacementMode, PointerState,
};

/// Hit-test and placement geometry derived from entity tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprints {
    /// Visual radius of a defender.
    pub defender_radius: f64,
    /// Visual radius of a hostile.
    pub hostile_radius: f64,
}

impl Footprints {
    /// Builds footprints from the tuning used by the world.
    #[must_use]
    pub fn from_tuning(defender: &DefenderTuning, hostile: &HostileTuning) -> Self {
        Self {
            defender_radius: defender.visual_radius,
            hostile_radius: hostile.visual_radius,
        }
    }
}

impl Default for Footprints {
    fn default() -> Self {
        Self::from_tuning(&DefenderTuning::default(), &HostileTuning::default())
    }
}

/// Interaction controller holding the player's current input mode.
#[derive(Clone, Debug)]
pub struct Interaction {
    mode: PlacementMode,
    show_origin_marker: bool,
    footprints: Footprints,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new(Footprints::default())
    }
}

impl Interaction {
    /// Creates a controller with no active mode and the origin marker shown.
    #[must_use]
    pub const fn new(footprints: Footprints) -> Self {
        Self {
            mode: PlacementMode::None,
            show_origin_marker: true,
            footprints,
        }
    }

    /// Mode currently selected by the player.
    #[must_use]
    pub const fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Whether the convergence point marker should be drawn.
    #[must_use]
    pub const fn show_origin_marker(&self) -> bool {
        self.show_origin_marker
    }

    /// Consumes one tick of input and emits the resulting world commands.
    ///
    /// `triggered` lists the keys whose debounced one-shot action fires on
    /// this tick. Pointer input is resolved before key input, so a mode
    /// selected by a key takes effect on the following tick.
    pub fn handle<C>(
        &mut self,
        pointer: &PointerState,
        triggered: &[InputKey],
        camera: &C,
        defenders: &DefenderView,
        out: &mut Vec<Command>,
    ) where
        C: CoordinateSpace + ?Sized,
    {
        self.handle_pointer(pointer, camera, defenders, out);
        self.handle_keys(triggered, out);
    }

    fn handle_pointer<C>(
        &mut self,
        pointer: &PointerState,
        camera: &C,
        defenders: &DefenderView,
        out: &mut Vec<Command>,
    ) where
        C: CoordinateSpace + ?Sized,
    {
        let cursor = camera.screen_to_world(pointer.position);

        if pointer.primary {
            match self.mode {
                PlacementMode::PlaceDefender => {
                    let position = placement_position(
                        camera,
                        pointer.position,
                        self.footprints.defender_radius,
                    );
                    out.push(Command::PlaceDefender { position });
                    self.set_mode(PlacementMode::None);
                }
                PlacementMode::PlaceHostile => {
                    let position = placement_position(
                        camera,
                        pointer.position,
                        self.footprints.hostile_radius,
                    );
                    out.push(Command::SpawnHostile { position });
                    self.set_mode(PlacementMode::None);
                }
                PlacementMode::None | PlacementMode::ShowDebugMarker => {
                    let radius = self.footprints.defender_radius;
                    for defender in defenders.iter() {
                        if !defender.show_range && defender.position.distance(cursor) < radius {
                            out.push(Command::SetRangeIndicator {
                                defender: defender.id,
                                visible: true,
                            });
                        }
                    }
                }
            }
        }

        if pointer.secondary {
            if self.mode != PlacementMode::None {
                self.set_mode(PlacementMode::None);
            } else if !pointer.tertiary {
                let radius = self.footprints.defender_radius * 2.0;
                for defender in defenders.iter() {
                    if defender.show_range && defender.position.distance(cursor) < radius {
                        out.push(Command::SetRangeIndicator {
                            defender: defender.id,
                            visible: false,
                        });
                    }
                }
            }
        }
    }

    fn handle_keys(&mut self, triggered: &[InputKey], out: &mut Vec<Command>) {
        let fired = |key: InputKey| triggered.contains(&key);

        if fired(InputKey::ToggleDebugMarker) {
            let next = if self.mode == PlacementMode::None {
                PlacementMode::ShowDebugMarker
            } else {
                PlacementMode::None
            };
            self.set_mode(next);
        }

        if fired(InputKey::ToggleOriginMarker) {
            self.show_origin_marker = !self.show_origin_marker;
            debug!("origin marker shown: {}", self.show_origin_marker);
        }

        if fired(InputKey::PlaceDefender) {
            self.set_mode(PlacementMode::PlaceDefender);
        } else if fired(InputKey::PlaceHostile) {
            self.set_mode(PlacementMode::PlaceHostile);
        } else if fired(InputKey::ClearHostiles) {
            out.push(Command::ClearHostiles);
        }
    }

    fn set_mode(&mut self, mode: PlacementMode) {
        if self.mode != mode {
            debug!("placement mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }
}

/// The preview is drawn with its corner at the pointer, so the entity centre
/// sits one radius further along both axes.
fn placement_position<C>(camera: &C, pointer: DVec2, radius: f64) -> DVec2
where
    C: CoordinateSpace + ?Sized,
{
    camera.screen_to_world(pointer + DVec2::splat(radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pylon_defence_core::WorldSpace;

    fn press(primary: bool, secondary: bool, tertiary: bool) -> PointerState {
        PointerState {
            primary,
            secondary,
            tertiary,
            ..PointerState::default()
        }
    }

    #[test]
    fn starts_idle_with_origin_marker() {
        let interaction = Interaction::default();
        assert_eq!(interaction.mode(), PlacementMode::None);
        assert!(interaction.show_origin_marker());
    }

    #[test]
    fn debug_marker_key_toggles_between_none_and_marker() {
        let mut interaction = Interaction::default();
        let mut out = Vec::new();
        let idle = PointerState::default();
        let view = DefenderView::default();

        interaction.handle(&idle, &[InputKey::ToggleDebugMarker], &WorldSpace, &view, &mut out);
        assert_eq!(interaction.mode(), PlacementMode::ShowDebugMarker);

        interaction.handle(&idle, &[InputKey::ToggleDebugMarker], &WorldSpace, &view, &mut out);
        assert_eq!(interaction.mode(), PlacementMode::None);

        interaction.handle(&idle, &[InputKey::PlaceHostile], &WorldSpace, &view, &mut out);
        interaction.handle(&idle, &[InputKey::ToggleDebugMarker], &WorldSpace, &view, &mut out);
        assert_eq!(interaction.mode(), PlacementMode::None);
        assert!(out.is_empty());
    }

    #[test]
    fn placement_keys_form_an_exclusive_chain() {
        let mut interaction = Interaction::default();
        let mut out = Vec::new();
        let view = DefenderView::default();

        interaction.handle(
            &PointerState::default(),
            &[InputKey::ClearHostiles, InputKey::PlaceHostile, InputKey::PlaceDefender],
            &WorldSpace,
            &view,
            &mut out,
        );

        assert_eq!(interaction.mode(), PlacementMode::PlaceDefender);
        assert!(out.is_empty(), "clear must not fire when a placement key wins");
    }

    #[test]
    fn secondary_cancels_mode_without_hiding_ranges() {
        let mut interaction = Interaction::default();
        let mut out = Vec::new();
        let view = DefenderView::default();
        interaction.handle(
            &PointerState::default(),
            &[InputKey::PlaceDefender],
            &WorldSpace,
            &view,
            &mut out,
        );

        interaction.handle(&press(false, true, false), &[], &WorldSpace, &view, &mut out);

        assert_eq!(interaction.mode(), PlacementMode::None);
        assert!(out.is_empty());
    }
}
