//! LDtk background layers: one project per themed level, drawn behind the room.
//!
//! The layer is decoration only. A project that fails to load is logged once and the level falls
//! back to the theme's flat background colour; gameplay never waits on it after the first load.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_ecs_ldtk::prelude::*;

use crate::dungeon::Dungeon;
use crate::room::{ROOM_HEIGHT, ROOM_WIDTH};
use crate::state::GameState;
use crate::theme::{level_theme, LEVEL_COUNT};

/// Registers LDtk asset plumbing and keeps the background layer in step with the current level.
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(LevelConfig::default())
            .init_resource::<LevelLayer>()
            .insert_resource(LevelSelection::index(0))
            .insert_resource(LdtkSettings {
                level_spawn_behavior: LevelSpawnBehavior::UseZeroTranslation,
                set_clear_color: SetClearColor::No,
                ..default()
            })
            .add_plugins(LdtkPlugin)
            .add_systems(
                Update,
                (
                    follow_dungeon_level,
                    watch_layer_load,
                    monitor_level_loading.run_if(in_state(GameState::Loading)),
                )
                    .chain(),
            );
    }
}

/// Which LDtk project backs each level, and where the layer sits in world space.
#[derive(Resource, Clone)]
pub struct LevelConfig {
    /// Indexed by level number minus one. `None` means the level uses a flat colour.
    pub project_paths: [Option<String>; LEVEL_COUNT as usize],
    pub frame_shift: Vec2,
    pub depth: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            project_paths: [
                Some("levels/crib.ldtk".to_owned()),
                Some("levels/store.ldtk".to_owned()),
                None,
            ],
            frame_shift: Vec2::new(-ROOM_WIDTH / 2.0, -ROOM_HEIGHT / 2.0),
            depth: -10.0,
        }
    }
}

impl LevelConfig {
    pub fn project_for(&self, level: u8) -> Option<&str> {
        let index = usize::from(level.clamp(1, LEVEL_COUNT)) - 1;
        self.project_paths[index].as_deref()
    }
}

/// State of the background layer currently spawned.
#[derive(Resource, Default)]
pub struct LevelLayer {
    pub level: Option<u8>,
    pub project: Option<Handle<LdtkProject>>,
    pub project_path: Option<String>,
    pub ready: bool,
    pub failed: bool,
}

impl LevelLayer {
    /// True while the room should draw its own floor decoration instead of the layer.
    pub fn needs_fallback(&self) -> bool {
        !self.ready
    }

    /// Loaded, failed, or never requested. Nothing changes once this holds.
    pub fn is_settled(&self) -> bool {
        self.project.is_none() || self.ready || self.failed
    }

    /// Records the project's load state, logging the outcome once.
    pub fn settle(&mut self, state: Option<LoadState>) {
        let path = self.project_path.as_deref().unwrap_or("<unknown>");
        match state {
            Some(LoadState::Loaded) => {
                info!("background layer '{path}' loaded");
                self.ready = true;
            }
            Some(LoadState::Failed(_)) => {
                warn!("Unable to load LDtk project at '{path}'; continuing without a background layer.");
                self.failed = true;
            }
            _ => {}
        }
    }
}

/// Marker on the LDtk world entity so it can be despawned when the level changes.
#[derive(Component)]
pub struct LevelRoot;

fn spawn_layer(
    commands: &mut Commands,
    roots: &Query<Entity, With<LevelRoot>>,
    asset_server: &AssetServer,
    config: &LevelConfig,
    layer: &mut LevelLayer,
    clear_color: &mut ClearColor,
    level: u8,
) {
    for entity in roots {
        commands.entity(entity).despawn_recursive();
    }

    *layer = LevelLayer {
        level: Some(level),
        ..default()
    };
    clear_color.0 = level_theme(level).background();

    let Some(path) = config.project_for(level) else {
        debug!("level {level} has no background layer");
        return;
    };

    let project: Handle<LdtkProject> = asset_server.load(path.to_owned());
    layer.project = Some(project.clone());
    layer.project_path = Some(path.to_owned());

    commands.spawn((
        LevelRoot,
        Name::new("LevelRoot"),
        LdtkWorldBundle {
            ldtk_handle: project,
            transform: Transform::from_translation(config.frame_shift.extend(config.depth)),
            ..default()
        },
    ));
}

/// Holds the game in `Loading` until the first layer settles either way.
fn monitor_level_loading(layer: Res<LevelLayer>, mut next_state: ResMut<NextState<GameState>>) {
    if layer.level.is_some() && layer.is_settled() {
        next_state.set(GameState::Playing);
    }
}

/// Spawns the layer for the dungeon's level whenever it differs from the one on screen.
fn follow_dungeon_level(
    mut commands: Commands,
    roots: Query<Entity, With<LevelRoot>>,
    asset_server: Res<AssetServer>,
    config: Res<LevelConfig>,
    dungeon: Res<Dungeon>,
    mut layer: ResMut<LevelLayer>,
    mut clear_color: ResMut<ClearColor>,
) {
    let level = dungeon.progress().level;
    if layer.level == Some(level) {
        return;
    }
    spawn_layer(
        &mut commands,
        &roots,
        &asset_server,
        &config,
        &mut layer,
        &mut clear_color,
        level,
    );
}

fn watch_layer_load(asset_server: Res<AssetServer>, mut layer: ResMut<LevelLayer>) {
    if layer.is_settled() {
        return;
    }
    let state = layer
        .project
        .as_ref()
        .and_then(|project| asset_server.get_load_state(project.id()));
    layer.settle(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_level_has_no_layer() {
        let config = LevelConfig::default();
        assert_eq!(config.project_for(1), Some("levels/crib.ldtk"));
        assert_eq!(config.project_for(2), Some("levels/store.ldtk"));
        assert_eq!(config.project_for(3), None);
        assert_eq!(config.project_for(9), None);
    }

    #[test]
    fn fallback_shows_until_layer_is_ready() {
        let mut layer = LevelLayer::default();
        assert!(layer.needs_fallback());
        layer.ready = true;
        assert!(!layer.needs_fallback());
    }

    #[test]
    fn layer_settles_once_on_load_or_failure() {
        let mut layer = LevelLayer {
            level: Some(1),
            project: Some(Handle::default()),
            project_path: Some("levels/crib.ldtk".to_owned()),
            ..default()
        };
        assert!(!layer.is_settled());

        layer.settle(Some(LoadState::Loading));
        layer.settle(None);
        assert!(!layer.is_settled());

        layer.settle(Some(LoadState::Loaded));
        assert!(layer.is_settled());
        assert!(!layer.needs_fallback());
    }

    #[test]
    fn level_without_project_is_settled_immediately() {
        let layer = LevelLayer {
            level: Some(3),
            ..default()
        };
        assert!(layer.is_settled());
        assert!(layer.needs_fallback());
    }
}
