//! High-level plugin composition.
//!
//! `StashRunPlugin` loads the config, registers every subsystem plugin and fixes the order of the
//! per-frame sets. Each subsystem owns its own resources; this file only wires them together.

use bevy::prelude::*;

use crate::audio::GameAudioPlugin;
use crate::camera::CameraPlugin;
use crate::config::startup_config;
use crate::level::LevelPlugin;
use crate::movement::MovementPlugin;
use crate::render::RenderPlugin;
use crate::session::SessionPlugin;
use crate::state::{toggle_pause, GameSet, GameState};
use crate::transition::TransitionPlugin;
use crate::ui::UiPlugin;

/// Bundles every gameplay plugin into a single unit that can be added to the Bevy `App`.
pub struct StashRunPlugin;

impl Plugin for StashRunPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .insert_resource(startup_config())
            .add_plugins((
                SessionPlugin,    // Inventory, RNG and the simulation step.
                MovementPlugin,   // Keyboard + gamepad intent.
                LevelPlugin,      // LDtk background layers.
                CameraPlugin,     // Fixed room camera.
                RenderPlugin,     // Sprites and effects.
                TransitionPlugin, // Door fade overlay.
                GameAudioPlugin,  // Cue sounds.
                UiPlugin,         // HUD and overlays.
            ))
            // Input → Simulation → Presentation, only while playing.
            .configure_sets(
                Update,
                (GameSet::Input, GameSet::Simulation, GameSet::Presentation)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, toggle_pause);
    }
}
