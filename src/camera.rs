//! Fixed room camera. The whole 1280×720 room is always in view; the orthographic scale and the
//! UI scale follow the window so the HUD keeps its place over the play field.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::room::{ROOM_HEIGHT, ROOM_WIDTH};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera)
            .add_systems(Update, fit_room_to_window);
    }
}

/// Marker component so systems can locate the camera entity without relying on names.
#[derive(Component)]
pub struct RoomCamera;

fn setup_camera(mut commands: Commands) {
    commands.spawn((Name::new("MainCamera"), Camera2dBundle::default(), RoomCamera));
}

/// World units per physical pixel needed to fit the room inside `window` (letterboxed).
pub fn room_scale(window: Vec2) -> f32 {
    if window.x <= 0.0 || window.y <= 0.0 {
        return 1.0;
    }
    (ROOM_WIDTH / window.x).max(ROOM_HEIGHT / window.y).max(0.0001)
}

fn fit_room_to_window(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<&mut OrthographicProjection, With<RoomCamera>>,
    mut ui_scale: ResMut<UiScale>,
    mut fitted: Local<bool>,
) {
    let changed = resized.read().count() > 0;
    if *fitted && !changed {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok(mut projection) = cameras.get_single_mut() else {
        return;
    };

    let scale = room_scale(window.resolution.size());
    projection.scale = scale;
    ui_scale.0 = 1.0 / scale;
    *fitted = true;
}
