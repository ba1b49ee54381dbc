//! Owns the run: the shared inventory, the RNG and the `Dungeon`, and steps the simulation once
//! per frame while playing.

use bevy::input::gamepad::GamepadButtonType;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::dungeon::{Cue, Dungeon, Outcome};
use crate::inventory::Inventory;
use crate::movement::{MovementSettings, PlayerInput};
use crate::state::{GameSet, GameState};

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Cue>()
            .add_systems(PreStartup, start_session)
            .add_systems(Update, step_simulation.in_set(GameSet::Simulation))
            .add_systems(
                Update,
                restart_session.run_if(run_finished),
            );
    }
}

#[derive(Resource, Deref, DerefMut)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => {
                info!("using fixed rng seed {seed}");
                Self(StdRng::seed_from_u64(seed))
            }
            None => Self(StdRng::from_entropy()),
        }
    }
}

fn start_session(mut commands: Commands, config: Res<GameConfig>) {
    let mut rng = GameRng::from_seed(config.seed);
    let inventory = Inventory::default();
    let dungeon = Dungeon::new(config.start_level, &inventory, &mut *rng, config.player_speed);

    commands.insert_resource(MovementSettings {
        player_speed: config.player_speed,
        gamepad_deadzone: config.gamepad_deadzone,
    });
    commands.insert_resource(inventory);
    commands.insert_resource(dungeon);
    commands.insert_resource(rng);
}

fn step_simulation(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut dungeon: ResMut<Dungeon>,
    mut inventory: ResMut<Inventory>,
    mut rng: ResMut<GameRng>,
    mut cues: EventWriter<Cue>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    dungeon.tick(time.delta(), &input, &mut inventory, &mut **rng);
    cues.send_batch(dungeon.drain_cues());

    match dungeon.outcome() {
        Some(Outcome::Victory) => next_state.set(GameState::Victory),
        Some(Outcome::GameOver) => next_state.set(GameState::GameOver),
        None => {}
    }
}

fn run_finished(state: Res<State<GameState>>) -> bool {
    matches!(state.get(), GameState::Victory | GameState::GameOver)
}

/// Space or the gamepad's South button starts a fresh run from the first room.
fn restart_session(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Res<Gamepads>,
    buttons: Res<ButtonInput<GamepadButton>>,
    settings: Res<MovementSettings>,
    mut dungeon: ResMut<Dungeon>,
    mut inventory: ResMut<Inventory>,
    mut rng: ResMut<GameRng>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let confirmed = keyboard.just_pressed(KeyCode::Space)
        || gamepads
            .iter()
            .any(|gamepad| buttons.just_pressed(GamepadButton::new(gamepad, GamepadButtonType::South)));
    if !confirmed {
        return;
    }

    info!("restarting run");
    inventory.reset();
    *dungeon = Dungeon::new(1, &inventory, &mut **rng, settings.player_speed);
    next_state.set(GameState::Playing);
}
