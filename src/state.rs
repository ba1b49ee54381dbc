//! Global game state definitions. States are stored by Bevy in a stack; switching states simply
//! updates an enum value and triggers on-enter/on-exit schedules.

use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

/// High-level state machine for the game loop. `Victory` and `GameOver` freeze the simulation
/// until the player confirms a restart.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
    Victory,
    GameOver,
}

/// Named system sets to structure the Update schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Simulation,
    Presentation,
}

/// Toggles between Playing and Paused when `ESC` is pressed. Terminal screens ignore the key so a
/// finished run cannot be resumed.
pub fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    match state.get() {
        GameState::Playing => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::Playing),
        GameState::Loading | GameState::Victory | GameState::GameOver => {}
    }
}
