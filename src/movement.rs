//! Player intent. Keyboard and gamepad state are folded into a single `PlayerInput` resource each
//! frame, before the simulation step reads it.
//!
//! Keyboard: WASD or arrows move, Space attacks, Shift throws, E interacts, Q consumes.
//! Gamepad: left stick moves; South, East, West and North map to the same four actions.

use bevy::input::gamepad::{GamepadAxisType, GamepadButtonType};
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;

use crate::player::DEFAULT_PLAYER_SPEED;
use crate::state::GameSet;

/// Registers the input resources and the input-reading system.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementSettings>()
            .init_resource::<PlayerInput>()
            .add_systems(Update, read_player_input.in_set(GameSet::Input));
    }
}

/// Tunables for steering, overwritten from `GameConfig` when the session starts.
#[derive(Resource, Debug, Clone)]
pub struct MovementSettings {
    /// Room units per second.
    pub player_speed: f32,
    /// Stick magnitude below which the gamepad is ignored.
    pub gamepad_deadzone: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            player_speed: DEFAULT_PLAYER_SPEED,
            gamepad_deadzone: 0.2,
        }
    }
}

/// One frame of player intent. `axis` is in room space (y down); the action flags are
/// edge-triggered and only true on the frame the button went down.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PlayerInput {
    pub axis: Vec2,
    pub attack: bool,
    pub throw: bool,
    pub interact: bool,
    pub consume: bool,
}

fn keyboard_axis(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        axis.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        axis.y += 1.0;
    }
    axis
}

/// Left stick beyond the dead-zone overrides the keyboard. Stick y points up, so it is flipped
/// into room space.
fn stick_axis(stick: Vec2, deadzone: f32) -> Option<Vec2> {
    (stick.length() > deadzone).then(|| Vec2::new(stick.x, -stick.y))
}

/// Samples the keyboard and every connected gamepad into `PlayerInput`. Buttons from any pad
/// count; a stick outside the dead-zone replaces the keyboard axis.
fn read_player_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Res<Gamepads>,
    buttons: Res<ButtonInput<GamepadButton>>,
    axes: Res<Axis<GamepadAxis>>,
    settings: Res<MovementSettings>,
    mut input: ResMut<PlayerInput>,
) {
    let mut next = PlayerInput {
        axis: keyboard_axis(&keyboard),
        attack: keyboard.just_pressed(KeyCode::Space),
        throw: keyboard.any_just_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        interact: keyboard.just_pressed(KeyCode::KeyE),
        consume: keyboard.just_pressed(KeyCode::KeyQ),
    };

    for gamepad in gamepads.iter() {
        let pressed = |kind| buttons.just_pressed(GamepadButton::new(gamepad, kind));
        next.attack |= pressed(GamepadButtonType::South);
        next.throw |= pressed(GamepadButtonType::East);
        next.interact |= pressed(GamepadButtonType::West);
        next.consume |= pressed(GamepadButtonType::North);

        let stick = Vec2::new(
            axes.get(GamepadAxis::new(gamepad, GamepadAxisType::LeftStickX))
                .unwrap_or(0.0),
            axes.get(GamepadAxis::new(gamepad, GamepadAxisType::LeftStickY))
                .unwrap_or(0.0),
        );
        if let Some(axis) = stick_axis(stick, settings.gamepad_deadzone) {
            next.axis = axis;
        }
    }

    *input = next;
}
