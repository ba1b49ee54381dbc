//! Sound effects. Handles are queued on startup and kept alive in `AudioHandles`; cues from the
//! simulation pick which one to play.
//!
//! Missing files simply never finish loading, so playback is silent rather than an error.

use bevy::audio::Volume;
use bevy::prelude::*;

use crate::config::GameConfig;
use crate::dungeon::Cue;
use crate::state::{GameSet, GameState};

/// Registers audio handle preloading and cue playback.
pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioHandles>()
            .add_systems(OnEnter(GameState::Loading), load_audio_handles)
            .add_systems(Update, play_cue_sounds.after(GameSet::Simulation));
    }
}

#[derive(Resource, Default)]
pub struct AudioHandles {
    pub pickup: Option<Handle<AudioSource>>,
    pub hurt: Option<Handle<AudioSource>>,
    pub door: Option<Handle<AudioSource>>,
    pub victory: Option<Handle<AudioSource>>,
}

impl AudioHandles {
    /// The clip for `cue`, if that cue has a sound at all.
    pub fn for_cue(&self, cue: &Cue) -> Option<&Handle<AudioSource>> {
        match cue {
            Cue::Pickup { .. } | Cue::Purchased(_) => self.pickup.as_ref(),
            Cue::PlayerHurt | Cue::Fell | Cue::GameOver => self.hurt.as_ref(),
            Cue::DoorEntered => self.door.as_ref(),
            Cue::Victory => self.victory.as_ref(),
            Cue::Slash { .. } | Cue::EnemyHit { .. } | Cue::EnemyDefeated { .. } => None,
        }
    }
}

fn load_audio_handles(asset_server: Res<AssetServer>, mut handles: ResMut<AudioHandles>) {
    handles.pickup = Some(asset_server.load("audio/pickup.ogg"));
    handles.hurt = Some(asset_server.load("audio/hurt.ogg"));
    handles.door = Some(asset_server.load("audio/door.ogg"));
    handles.victory = Some(asset_server.load("audio/victory.ogg"));

    info!("Queued audio cues. Add files under assets/audio/ to enable playback.");
}

fn play_cue_sounds(
    mut commands: Commands,
    mut cues: EventReader<Cue>,
    handles: Res<AudioHandles>,
    config: Res<GameConfig>,
) {
    for cue in cues.read() {
        let Some(source) = handles.for_cue(cue) else {
            continue;
        };
        commands.spawn(AudioBundle {
            source: source.clone(),
            settings: PlaybackSettings::DESPAWN.with_volume(Volume::new(config.master_volume)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::ItemKind;

    #[test]
    fn combat_cues_are_silent() {
        let handles = AudioHandles {
            pickup: Some(Handle::default()),
            hurt: Some(Handle::default()),
            door: Some(Handle::default()),
            victory: Some(Handle::default()),
        };
        assert!(handles
            .for_cue(&Cue::EnemyHit { pos: Vec2::ZERO })
            .is_none());
        assert!(handles
            .for_cue(&Cue::Pickup {
                kind: ItemKind::Money { value: 1 },
                pos: Vec2::ZERO
            })
            .is_some());
        assert!(AudioHandles::default().for_cue(&Cue::Victory).is_none());
    }
}
