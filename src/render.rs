//! Draws the simulation: one sprite per room entity, the player and thrown weapon, and short-lived
//! effects spawned from cues.
//!
//! Room space (y down, origin top-left) is mapped to world space (y up, origin at the room centre)
//! here and nowhere else.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::time::Duration;

use bevy::prelude::*;

use crate::dungeon::{Cue, Dungeon};
use crate::level::LevelLayer;
use crate::player::{Player, Vulnerability, PLAYER_SIZE};
use crate::room::{
    DecorationKind, Direction, EnemyBehavior, EnemyLife, EntityId, ItemKind, NpcKind, ObstacleKind,
    RoomState, ROOM_HEIGHT, ROOM_WIDTH,
};
use crate::state::GameSet;
use crate::theme::{hex_color, level_theme, EnemySprite, HazardKind};

const MONEY_SPIN: f32 = 2.0;
const MONEY_BOB: f32 = 0.8;
const LIGHTER_PULSE: f32 = 0.8;
const DOOR_PULSE: f32 = 1.2;
const EFFECT_TIME: Duration = Duration::from_millis(700);
const SLASH_TIME: Duration = Duration::from_millis(150);

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player_sprites).add_systems(
            Update,
            (
                sync_room_sprites,
                sync_player_sprites,
                spawn_cue_effects,
                animate_effects,
            )
                .chain()
                .in_set(GameSet::Presentation),
        );
    }
}

/// Maps a room-space point to world space at depth `z`.
pub fn room_to_world(point: Vec2, z: f32) -> Vec3 {
    Vec3::new(point.x - ROOM_WIDTH / 2.0, ROOM_HEIGHT / 2.0 - point.y, z)
}

/// Links a sprite to the room entity it shows.
#[derive(Component)]
pub struct RoomSprite(pub EntityId);

#[derive(Component)]
pub struct ThrownSprite;

/// A transient effect that rises and fades, then despawns.
#[derive(Component)]
pub struct Effect {
    timer: Timer,
    rise: f32,
}

/// How one room entity should look this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
    pub color: Color,
    pub z: f32,
    /// Clockwise, in radians.
    pub rotation: f32,
    pub flip_x: bool,
    pub label: Option<&'static str>,
}

impl Visual {
    fn new(id: EntityId, pos: Vec2, size: Vec2, color: Color, z: f32) -> Self {
        Self {
            id,
            pos,
            size,
            color,
            z,
            rotation: 0.0,
            flip_x: false,
            label: None,
        }
    }

    fn transform(&self) -> Transform {
        Transform::from_translation(room_to_world(self.pos, self.z))
            .with_rotation(Quat::from_rotation_z(-self.rotation))
    }
}

fn pulse(elapsed: f32, period: f32) -> f32 {
    0.5 - 0.5 * (elapsed / period * TAU).cos()
}

/// Builds the look of every room entity. `elapsed` drives the idle animations; `show_rug` is set
/// while the level's background layer is missing.
pub fn room_visuals(room: &RoomState, elapsed: f32, show_rug: bool) -> Vec<Visual> {
    let theme = level_theme(room.level);
    let mut visuals = Vec::new();

    for decoration in &room.decorations {
        if decoration.kind == DecorationKind::Rug && show_rug {
            visuals.push(Visual::new(
                decoration.id,
                decoration.pos,
                decoration.size,
                hex_color(0x7a1f2b),
                0.5,
            ));
        }
    }

    for wall in &room.walls {
        visuals.push(Visual::new(wall.id, wall.rect.center(), wall.rect.size(), theme.wall(), 1.0));
    }

    for door in &room.doors {
        let glow = 0.6 + 0.4 * pulse(elapsed, DOOR_PULSE);
        let base = if door.is_level_transition { 0xffd700 } else { 0x33ff66 };
        let mut visual = Visual::new(
            door.id,
            door.frame_position(),
            Vec2::new(32.0, 64.0),
            hex_color(base).with_alpha(glow),
            1.5,
        );
        if door.is_level_transition {
            visual.label = Some("EXIT");
        }
        visuals.push(visual);
    }

    for obstacle in &room.obstacles {
        let color = match obstacle.kind {
            ObstacleKind::Crate => hex_color(0x8b5a2b),
            ObstacleKind::Shelf => hex_color(0x5c4033),
        };
        visuals.push(Visual::new(obstacle.id, obstacle.pos, obstacle.half_extents * 2.0, color, 2.0));
    }

    for hazard in &room.hazards {
        let color = match hazard.kind {
            HazardKind::Spill => hex_color(0x3fa7d6),
            HazardKind::Crab => hex_color(0xd9534f),
            HazardKind::Rat => hex_color(0x7f7f7f),
        };
        let mut visual = Visual::new(hazard.id, hazard.pos, hazard.collider().half_extents * 2.0, color, 3.0);
        visual.flip_x = hazard.velocity.x < 0.0;
        visuals.push(visual);
    }

    for item in &room.items {
        let visual = match item.kind {
            ItemKind::Money { .. } => {
                let bob = (elapsed / MONEY_BOB * TAU).sin() * 4.0;
                let mut visual = Visual::new(
                    item.id,
                    item.pos + Vec2::new(0.0, bob),
                    Vec2::splat(20.0),
                    hex_color(0xffd700),
                    4.0,
                );
                visual.rotation = (elapsed % MONEY_SPIN) / MONEY_SPIN * TAU;
                visual
            }
            ItemKind::Heart { .. } => {
                Visual::new(item.id, item.pos, Vec2::splat(18.0), hex_color(0xff3355), 4.0)
            }
            ItemKind::Lighter => Visual::new(
                item.id,
                item.pos,
                Vec2::new(10.0, 20.0),
                hex_color(0xff8c00).with_alpha(0.6 + 0.4 * pulse(elapsed, LIGHTER_PULSE * 2.0)),
                4.0,
            ),
        };
        visuals.push(visual);
    }

    for enemy in &room.enemies {
        let base = match (theme.enemy_sprite, &enemy.behavior) {
            (_, EnemyBehavior::Shooter(state)) if state.firing.is_some() => hex_color(0x4f6bd8),
            (EnemySprite::Police, _) => hex_color(0x1e3a8a),
            (EnemySprite::Dog, _) => hex_color(0xa0522d),
        };
        let mut color = if enemy.hit_flash.is_some() {
            hex_color(0xff0000)
        } else {
            base
        };
        if let EnemyLife::Dying(fade) = &enemy.life {
            color = color.with_alpha(1.0 - fade.fraction());
        }
        let mut visual = Visual::new(enemy.id, enemy.pos, enemy.collider().half_extents * 2.0, color, 5.0);
        visual.flip_x = matches!(enemy.behavior, EnemyBehavior::Roamer { facing_left: true });
        visuals.push(visual);
    }

    for projectile in &room.projectiles {
        visuals.push(Visual::new(
            projectile.id,
            projectile.pos,
            Vec2::splat(10.0),
            hex_color(0xffff66),
            6.0,
        ));
    }

    for npc in &room.npcs {
        let (color, label) = match npc.kind {
            NpcKind::Clerk => (hex_color(0x2e8b57), Some("CLERK")),
            NpcKind::Dealer => (hex_color(0x6a0dad), None),
        };
        let mut visual = Visual::new(npc.id, npc.pos, Vec2::new(32.0, 48.0), color, 5.0);
        visual.label = label;
        visuals.push(visual);
    }

    visuals
}

fn sync_room_sprites(
    mut commands: Commands,
    dungeon: Res<Dungeon>,
    layer: Res<LevelLayer>,
    time: Res<Time>,
    mut sprites: Query<(Entity, &RoomSprite, &mut Transform, &mut Sprite)>,
) {
    let mut wanted: HashMap<EntityId, Visual> = room_visuals(
        dungeon.room(),
        time.elapsed_seconds(),
        layer.needs_fallback(),
    )
    .into_iter()
    .map(|visual| (visual.id, visual))
    .collect();

    for (entity, room_sprite, mut transform, mut sprite) in &mut sprites {
        match wanted.remove(&room_sprite.0) {
            Some(visual) => {
                *transform = visual.transform();
                sprite.color = visual.color;
                sprite.custom_size = Some(visual.size);
                sprite.flip_x = visual.flip_x;
            }
            None => commands.entity(entity).despawn_recursive(),
        }
    }

    for visual in wanted.into_values() {
        let mut entity = commands.spawn((
            RoomSprite(visual.id),
            SpriteBundle {
                sprite: Sprite {
                    color: visual.color,
                    custom_size: Some(visual.size),
                    flip_x: visual.flip_x,
                    ..default()
                },
                transform: visual.transform(),
                ..default()
            },
        ));
        if let Some(label) = visual.label {
            entity.with_children(|parent| {
                parent.spawn(Text2dBundle {
                    text: Text::from_section(
                        label,
                        TextStyle {
                            font_size: 16.0,
                            color: Color::WHITE,
                            ..default()
                        },
                    ),
                    transform: Transform::from_xyz(0.0, visual.size.y * 0.5 + 14.0, 1.0),
                    ..default()
                });
            });
        }
    }
}

fn spawn_player_sprites(mut commands: Commands) {
    commands.spawn((
        Player,
        Name::new("Player"),
        SpriteBundle {
            sprite: Sprite {
                color: hex_color(0x4cc9f0),
                custom_size: Some(PLAYER_SIZE),
                ..default()
            },
            transform: Transform::from_xyz(0.0, 0.0, 10.0),
            ..default()
        },
    ));
    commands.spawn((
        ThrownSprite,
        Name::new("ThrownWeapon"),
        SpriteBundle {
            sprite: Sprite {
                color: hex_color(0xe0e0e0),
                custom_size: Some(Vec2::splat(20.0)),
                ..default()
            },
            transform: Transform::from_xyz(0.0, 0.0, 11.0),
            visibility: Visibility::Hidden,
            ..default()
        },
    ));
}

/// Vertical squash applied while the player walks; idle players stand still.
pub fn walk_bob(moving: bool, elapsed: f32) -> f32 {
    if moving {
        1.0 + 0.06 * (elapsed * 14.0).sin()
    } else {
        1.0
    }
}

fn sync_player_sprites(
    time: Res<Time>,
    dungeon: Res<Dungeon>,
    mut player_query: Query<(&mut Transform, &mut Sprite), (With<Player>, Without<ThrownSprite>)>,
    mut thrown_query: Query<(&mut Transform, &mut Visibility), (With<ThrownSprite>, Without<Player>)>,
) {
    let player = dungeon.player();

    if let Ok((mut transform, mut sprite)) = player_query.get_single_mut() {
        let (scale, spin) = player.fall_pose();
        transform.translation = room_to_world(player.pos, 10.0);
        let bob = walk_bob(player.moving, time.elapsed_seconds());
        transform.scale = Vec3::new(scale, scale * bob, 1.0);
        transform.rotation = Quat::from_rotation_z(-spin);

        let base = match player.vulnerability {
            Vulnerability::Invincible(_) => hex_color(0xff6666),
            _ => hex_color(0x4cc9f0),
        };
        sprite.color = base.with_alpha(player.alpha());
        sprite.flip_x = player.facing == Direction::Left;
    }

    if let Ok((mut transform, mut visibility)) = thrown_query.get_single_mut() {
        match &player.thrown {
            Some(weapon) => {
                transform.translation = room_to_world(weapon.pos, 11.0);
                transform.rotation = Quat::from_rotation_z(-weapon.spin);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

fn spawn_floating_text(commands: &mut Commands, pos: Vec2, text: String, color: Color) {
    commands.spawn((
        Effect {
            timer: Timer::new(EFFECT_TIME, TimerMode::Once),
            rise: 40.0,
        },
        Text2dBundle {
            text: Text::from_section(
                text,
                TextStyle {
                    font_size: 20.0,
                    color,
                    ..default()
                },
            ),
            transform: Transform::from_translation(room_to_world(pos + Vec2::new(0.0, -20.0), 20.0)),
            ..default()
        },
    ));
}

fn spawn_sparkle(commands: &mut Commands, pos: Vec2, color: Color) {
    for offset in [Vec2::new(-8.0, -6.0), Vec2::new(8.0, -4.0), Vec2::new(0.0, 8.0)] {
        commands.spawn((
            Effect {
                timer: Timer::new(EFFECT_TIME, TimerMode::Once),
                rise: 20.0,
            },
            SpriteBundle {
                sprite: Sprite {
                    color,
                    custom_size: Some(Vec2::splat(6.0)),
                    ..default()
                },
                transform: Transform::from_translation(room_to_world(pos + offset, 19.0)),
                ..default()
            },
        ));
    }
}

fn spawn_cue_effects(mut commands: Commands, mut cues: EventReader<Cue>) {
    for cue in cues.read() {
        match *cue {
            Cue::Pickup { kind, pos } => match kind {
                ItemKind::Money { value } => {
                    spawn_floating_text(&mut commands, pos, format!("+${value}"), hex_color(0xffd700));
                    spawn_sparkle(&mut commands, pos, hex_color(0xffff99));
                }
                ItemKind::Heart { .. } => spawn_sparkle(&mut commands, pos, hex_color(0xff3355)),
                ItemKind::Lighter => {
                    spawn_floating_text(&mut commands, pos, "Lighter found!".to_owned(), hex_color(0xff8c00));
                    spawn_sparkle(&mut commands, pos, hex_color(0xff8c00));
                }
            },
            Cue::Slash { pos, facing } => {
                let size = match facing {
                    Direction::Left | Direction::Right => Vec2::new(12.0, 48.0),
                    Direction::Up | Direction::Down => Vec2::new(48.0, 12.0),
                };
                commands.spawn((
                    Effect {
                        timer: Timer::new(SLASH_TIME, TimerMode::Once),
                        rise: 0.0,
                    },
                    SpriteBundle {
                        sprite: Sprite {
                            color: Color::WHITE,
                            custom_size: Some(size),
                            ..default()
                        },
                        transform: Transform::from_translation(room_to_world(pos, 12.0)),
                        ..default()
                    },
                ));
            }
            Cue::EnemyDefeated { pos } => spawn_sparkle(&mut commands, pos, hex_color(0xbbbbbb)),
            _ => {}
        }
    }
}

fn animate_effects(
    mut commands: Commands,
    time: Res<Time>,
    mut effects: Query<(Entity, &mut Effect, &mut Transform, Option<&mut Sprite>, Option<&mut Text>)>,
) {
    for (entity, mut effect, mut transform, sprite, text) in &mut effects {
        if effect.timer.tick(time.delta()).finished() {
            commands.entity(entity).despawn_recursive();
            continue;
        }
        transform.translation.y += effect.rise * time.delta_seconds() / EFFECT_TIME.as_secs_f32();

        let alpha = 1.0 - effect.timer.fraction();
        if let Some(mut sprite) = sprite {
            sprite.color.set_alpha(alpha);
        }
        if let Some(mut text) = text {
            for section in &mut text.sections {
                section.style.color.set_alpha(alpha);
            }
        }
    }
}
