//! HUD and full-screen overlays (pause, victory, game over).
//!
//! UI entities are part of Bevy's ECS; the HUD is spawned once and its texts are rewritten from a
//! `HudModel` snapshot each frame while playing.

use bevy::prelude::*;

use crate::dungeon::Dungeon;
use crate::hud::HudModel;
use crate::inventory::{Inventory, MAX_HEALTH};
use crate::state::{GameSet, GameState};

const HUD_FONT: f32 = 22.0;
const CONTROLS: &str = "WASD/Arrows: move  SPACE: attack  SHIFT: throw  E: interact  Q: smoke  ESC: pause";

/// Registers the HUD and the overlay spawn/despawn systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, update_hud.in_set(GameSet::Presentation))
            .add_systems(OnEnter(GameState::Paused), spawn_pause_menu)
            .add_systems(OnExit(GameState::Paused), despawn_overlay)
            .add_systems(OnEnter(GameState::Victory), spawn_victory_screen)
            .add_systems(OnExit(GameState::Victory), despawn_overlay)
            .add_systems(OnEnter(GameState::GameOver), spawn_game_over_screen)
            .add_systems(OnExit(GameState::GameOver), despawn_overlay)
            .add_systems(
                Update,
                pulse_title.run_if(in_state(GameState::Victory)),
            );
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum HudField {
    Lives,
    Money,
    Items,
    Progress,
    Mission,
    Prompt,
}

#[derive(Component)]
struct HeartIcon(u32);

#[derive(Component)]
struct Overlay;

#[derive(Component)]
struct PulsingTitle;

fn hud_text(commands: &mut ChildBuilder, field: HudField, size: f32, color: Color) {
    commands.spawn((
        field,
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: size,
                color,
                ..default()
            },
        ),
    ));
}

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("Hud"),
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::SpaceBetween,
                    padding: UiRect::all(Val::Px(12.0)),
                    ..default()
                },
                ..default()
            },
        ))
        .with_children(|root| {
            // Top band: hearts and counters on the left, progress and controls on the right.
            root.spawn(NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::SpaceBetween,
                    ..default()
                },
                ..default()
            })
            .with_children(|band| {
                band.spawn(NodeBundle {
                    style: Style {
                        flex_direction: FlexDirection::Column,
                        row_gap: Val::Px(6.0),
                        ..default()
                    },
                    ..default()
                })
                .with_children(|left| {
                    left.spawn(NodeBundle {
                        style: Style {
                            column_gap: Val::Px(4.0),
                            ..default()
                        },
                        ..default()
                    })
                    .with_children(|hearts| {
                        for index in 0..MAX_HEALTH {
                            hearts.spawn((
                                HeartIcon(index),
                                NodeBundle {
                                    style: Style {
                                        width: Val::Px(18.0),
                                        height: Val::Px(18.0),
                                        ..default()
                                    },
                                    background_color: BackgroundColor(Color::srgb(0.9, 0.1, 0.2)),
                                    ..default()
                                },
                            ));
                        }
                    });
                    hud_text(left, HudField::Lives, HUD_FONT, Color::WHITE);
                    hud_text(left, HudField::Money, HUD_FONT, Color::srgb(1.0, 0.84, 0.0));
                    hud_text(left, HudField::Items, 18.0, Color::srgb(0.6, 1.0, 0.6));
                });

                band.spawn(NodeBundle {
                    style: Style {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::FlexEnd,
                        row_gap: Val::Px(6.0),
                        ..default()
                    },
                    ..default()
                })
                .with_children(|right| {
                    hud_text(right, HudField::Progress, HUD_FONT, Color::WHITE);
                    right.spawn(TextBundle::from_section(
                        CONTROLS,
                        TextStyle {
                            font_size: 14.0,
                            color: Color::srgba(0.9, 0.9, 0.9, 0.8),
                            ..default()
                        },
                    ));
                });
            });

            root.spawn(NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            })
            .with_children(|middle| {
                hud_text(middle, HudField::Prompt, 26.0, Color::srgb(1.0, 1.0, 0.4));
            });

            root.spawn(NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                },
                ..default()
            })
            .with_children(|bottom| {
                hud_text(bottom, HudField::Mission, 24.0, Color::WHITE);
            });
        });
}

fn update_hud(
    dungeon: Res<Dungeon>,
    inventory: Res<Inventory>,
    mut texts: Query<(&HudField, &mut Text, &mut Transform)>,
    mut hearts: Query<(&HeartIcon, &mut BackgroundColor)>,
) {
    let model = HudModel::capture(&dungeon, &inventory);

    for (field, mut text, mut transform) in &mut texts {
        let value = match field {
            HudField::Lives => model.lives.as_str(),
            HudField::Money => model.money.as_str(),
            HudField::Items => model.items.as_str(),
            HudField::Progress => model.progress.as_str(),
            HudField::Mission => model.mission.as_str(),
            HudField::Prompt => model.prompt.as_deref().unwrap_or(""),
        };
        if text.sections[0].value != value {
            text.sections[0].value = value.to_owned();
        }
        if *field == HudField::Mission {
            transform.scale = Vec3::splat(model.mission_scale);
        }
    }

    for (icon, mut color) in &mut hearts {
        let filled = model.hearts.get(icon.0 as usize).copied().unwrap_or(false);
        color.0 = if filled {
            Color::srgb(0.9, 0.1, 0.2)
        } else {
            Color::srgb(0.25, 0.25, 0.25)
        };
    }
}

/// Spawns a full-screen dimmed node with one text line per entry. The first line is the title.
fn spawn_overlay(commands: &mut Commands, name: &'static str, lines: &[(&str, f32, Color)]) {
    commands
        .spawn((
            Overlay,
            Name::new(name),
            NodeBundle {
                background_color: BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
                style: Style {
                    position_type: PositionType::Absolute,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    row_gap: Val::Px(24.0),
                    ..default()
                },
                z_index: ZIndex::Global(100),
                ..default()
            },
        ))
        .with_children(|parent| {
            for (index, (text, size, color)) in lines.iter().enumerate() {
                let mut line = parent.spawn(TextBundle::from_section(
                    *text,
                    TextStyle {
                        font_size: *size,
                        color: *color,
                        ..default()
                    },
                ));
                if index == 0 {
                    line.insert(PulsingTitle);
                }
            }
        });
}

fn spawn_pause_menu(mut commands: Commands) {
    spawn_overlay(
        &mut commands,
        "PauseMenu",
        &[
            ("Paused", 36.0, Color::srgba(0.9, 0.9, 0.9, 1.0)),
            ("Press ESC to resume", 24.0, Color::srgba(0.9, 0.9, 0.9, 1.0)),
        ],
    );
}

fn spawn_victory_screen(mut commands: Commands) {
    spawn_overlay(
        &mut commands,
        "VictoryScreen",
        &[
            ("YOU WIN!", 64.0, Color::srgb(0.0, 1.0, 0.0)),
            ("Time to chill and enjoy that doobie!", 24.0, Color::WHITE),
            ("Press SPACE to play again", 20.0, Color::srgb(1.0, 1.0, 0.0)),
        ],
    );
}

fn spawn_game_over_screen(mut commands: Commands) {
    spawn_overlay(
        &mut commands,
        "GameOverScreen",
        &[
            ("GAME OVER", 64.0, Color::srgb(1.0, 0.2, 0.2)),
            ("Press SPACE to restart", 20.0, Color::srgb(1.0, 1.0, 0.0)),
        ],
    );
}

/// Breathes the victory title between 1.0 and 1.1 every 800 ms.
fn pulse_title(time: Res<Time>, mut titles: Query<&mut Transform, With<PulsingTitle>>) {
    let phase = (time.elapsed_seconds() / 0.8 * std::f32::consts::PI).sin().abs();
    for mut transform in &mut titles {
        transform.scale = Vec3::splat(1.0 + 0.1 * phase);
    }
}

/// Removes whichever overlay is showing on state exit.
fn despawn_overlay(mut commands: Commands, query: Query<Entity, With<Overlay>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}
