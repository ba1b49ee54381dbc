//! Application entry point: window configuration, core Bevy plugins, and the `StashRunPlugin`
//! defined in `app.rs`.

mod app;
mod audio;
mod behavior;
mod camera;
mod collision;
mod combat;
mod config;
mod dungeon;
mod hud;
mod inventory;
mod level;
mod movement;
mod player;
mod populate;
mod render;
mod room;
mod session;
mod state;
mod theme;
mod transition;
mod ui;

use app::StashRunPlugin;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::render::texture::ImagePlugin;
use bevy::window::{Window, WindowResizeConstraints, WindowResolution};

fn main() {
    // Panics in the browser otherwise end in an opaque `unreachable` trap.
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    console_error_panic_hook::set_once();

    // Logical resolution matches the room, so one world unit is one room unit at 1:1 zoom.
    let primary_window = Window {
        title: "Stash Run".to_string(),
        resolution: WindowResolution::new(1280.0, 720.0),
        resizable: true,
        resize_constraints: WindowResizeConstraints {
            min_width: 640.0,
            min_height: 360.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        },
        canvas: cfg!(all(target_arch = "wasm32", feature = "web"))
            .then(|| "#bevy-canvas".to_owned()),
        ..default()
    };

    // Hot reload only makes sense where the asset folder lives on disk.
    let asset_plugin = AssetPlugin {
        file_path: "assets".to_owned(),
        watch_for_changes_override: Some(!cfg!(target_arch = "wasm32")),
        ..default()
    };

    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(primary_window),
            ..default()
        })
        .set(ImagePlugin::default_nearest())
        .set(asset_plugin);

    App::new()
        // Replaced by the level theme as soon as the first room loads.
        .insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.04)))
        .add_plugins(default_plugins)
        .add_plugins(StashRunPlugin)
        .run();
}
