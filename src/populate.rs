//! Procedural room population.
//!
//! Entities are placed in a fixed order (shelves, obstacles, hazards, money, roamers, shooters,
//! NPC). Each placement adds an exclusion circle so later draws keep their distance from earlier
//! ones.

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::collision::{rects_overlap, Collider};
use crate::inventory::{Inventory, QuestItem};
use crate::player::{PLAYER_SIZE, START_POSITION};
use crate::room::{
    build_doors, build_walls, Decoration, DecorationKind, Direction, Enemy, EnemyBehavior, EnemyLife, Hazard,
    IdAllocator, Item, ItemKind, Npc, NpcKind, Obstacle, ObstacleKind, RoomState, ShooterState,
    HUD_BAND, ROOM_HEIGHT, ROOM_WIDTH,
};
use crate::theme::{level_theme, HazardKind, LEVEL_COUNT};
use crate::transition::arrival_point;

pub const PLACEMENT_ATTEMPTS: usize = 100;
pub const PLACEMENT_BUFFER: f32 = 20.0;
pub const FALLBACK_POSITION: Vec2 = Vec2::new(640.0, 400.0);
const BOTTOM_MARGIN: f32 = 50.0;

const CRATE_SIZE: f32 = 40.0;
const SHELF_SIZE: Vec2 = Vec2::new(57.6, 38.4);
const LIGHTER_OFFSET: Vec2 = Vec2::new(0.0, -20.0);
/// Large enough that no crate, hazard or enemy drawn outside it can touch the player's box.
const SPAWN_CLEARANCE: f32 = 70.0;

/// A placement constraint: new entities must stay clear of `center` by `radius` plus a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionCircle {
    pub center: Vec2,
    pub radius: f32,
}

impl ExclusionCircle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    fn admits(&self, point: Vec2) -> bool {
        point.distance(self.center) > self.radius + PLACEMENT_BUFFER
    }
}

/// Draws up to `PLACEMENT_ATTEMPTS` integer positions inside the play area, `clearance` away from
/// the side walls, and returns the first one outside every exclusion circle. Falls back to a
/// fixed point near the centre when the room is too crowded.
pub fn sample_safe_position<R: Rng + ?Sized>(
    rng: &mut R,
    exclusions: &[ExclusionCircle],
    clearance: f32,
) -> Vec2 {
    let x_range = clearance as i32..=(ROOM_WIDTH - clearance) as i32;
    let y_range = (HUD_BAND + clearance) as i32..=(ROOM_HEIGHT - clearance - BOTTOM_MARGIN) as i32;

    for _ in 0..PLACEMENT_ATTEMPTS {
        let candidate = Vec2::new(
            rng.gen_range(x_range.clone()) as f32,
            rng.gen_range(y_range.clone()) as f32,
        );
        if exclusions.iter().all(|circle| circle.admits(candidate)) {
            return candidate;
        }
    }

    FALLBACK_POSITION
}

/// Accreting constraint set shared by every placement in one room.
struct Placer<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    exclusions: Vec<ExclusionCircle>,
}

impl<'a, R: Rng + ?Sized> Placer<'a, R> {
    fn place(&mut self, clearance: f32, radius: f32) -> Vec2 {
        let pos = sample_safe_position(&mut *self.rng, &self.exclusions, clearance);
        self.exclusions.push(ExclusionCircle::new(pos, radius));
        pos
    }

    fn reserve(&mut self, pos: Vec2, radius: f32) {
        self.exclusions.push(ExclusionCircle::new(pos, radius));
    }
}

/// Every point the player can appear at in a room: the door arrival points and the run start.
pub fn spawn_points() -> impl Iterator<Item = Vec2> {
    [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .map(arrival_point)
        .chain(std::iter::once(START_POSITION))
}

fn blocks_spawn(rect: Rect) -> bool {
    let player = Collider::from_size(PLAYER_SIZE);
    spawn_points().any(|point| rects_overlap(rect, player.aabb(point)))
}

fn random_heading<R: Rng + ?Sized>(rng: &mut R, speed: f32) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU)) * speed
}

/// Builds a freshly populated room for `room_index` of `level`.
///
/// `inventory` decides quest-dependent spawns (the hidden lighter and the NPC traders); `now`
/// seeds the shooters' roaming timers.
pub fn populate_room<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut IdAllocator,
    level: u8,
    room_index: usize,
    inventory: &Inventory,
    now: Duration,
) -> RoomState {
    let theme = level_theme(level);
    let mut room = RoomState::empty(level, room_index);
    room.doors = build_doors(ids, level, room_index);
    room.walls = build_walls(ids, &room.doors);

    let mut placer = Placer {
        rng,
        exclusions: Vec::new(),
    };
    let step = room_index as i32;

    for point in spawn_points() {
        placer.reserve(point, SPAWN_CLEARANCE);
    }

    if level == 2 && room_index > 0 {
        for row in 0..2 {
            let x = 150.0 + row as f32 * 200.0;
            for y in (160..400).step_by(60) {
                let pos = Vec2::new(x, y as f32);
                if blocks_spawn(Rect::from_center_half_size(pos, SHELF_SIZE * 0.5)) {
                    continue;
                }
                placer.reserve(pos, 45.0);
                room.obstacles.push(Obstacle {
                    id: ids.next_id(),
                    kind: ObstacleKind::Shelf,
                    pos,
                    half_extents: SHELF_SIZE * 0.5,
                });
            }
        }
    }

    let obstacle_count = placer.rng.gen_range(3 + step..=5 + step);
    for i in 0..obstacle_count {
        let pos = placer.place(80.0, 50.0);
        let low = 0.9 + room_index as f32 * 0.15;
        let scale = placer.rng.gen_range(low..low + 0.4);
        room.obstacles.push(Obstacle {
            id: ids.next_id(),
            kind: ObstacleKind::Crate,
            pos,
            half_extents: Vec2::splat(CRATE_SIZE * scale * 0.5),
        });

        if level == 1 && i == 0 && !inventory.has(QuestItem::Lighter) {
            room.items.push(Item {
                id: ids.next_id(),
                kind: ItemKind::Lighter,
                pos: pos + LIGHTER_OFFSET,
            });
        }
    }

    let hazard_count = placer.rng.gen_range(2 + step..=4 + step);
    for _ in 0..hazard_count {
        let pos = placer.place(70.0, 40.0);
        let kind = theme
            .hazards
            .choose(&mut *placer.rng)
            .copied()
            .unwrap_or(HazardKind::Spill);
        let velocity = match kind.wander_speed() {
            Some(speed) => random_heading(&mut *placer.rng, speed),
            None => Vec2::ZERO,
        };
        room.hazards.push(Hazard {
            id: ids.next_id(),
            kind,
            pos,
            velocity,
        });
    }

    let money_count = placer.rng.gen_range(2..=3 + step);
    for _ in 0..money_count {
        let pos = placer.place(70.0, 30.0);
        let value = placer.rng.gen_range(1..=5);
        room.items.push(Item {
            id: ids.next_id(),
            kind: ItemKind::Money { value },
            pos,
        });
    }

    for _ in 0..theme.roamer_count[room_index] {
        let pos = placer.place(80.0, 40.0);
        let speed = placer.rng.gen_range(40..=70) as f32;
        room.enemies.push(Enemy {
            id: ids.next_id(),
            pos,
            velocity: random_heading(&mut *placer.rng, speed),
            health: theme.enemy_health,
            behavior: EnemyBehavior::Roamer { facing_left: false },
            life: EnemyLife::Alive,
            hit_flash: None,
        });
    }

    for _ in 0..theme.shooter_count[room_index] {
        let pos = placer.place(80.0, 40.0);
        let roam_speed = placer.rng.gen_range(30..=50) as f32;
        let roam_angle = placer.rng.gen_range(0.0..TAU);
        let roam_deadline = now + Duration::from_millis(placer.rng.gen_range(1000..=2000));
        room.enemies.push(Enemy {
            id: ids.next_id(),
            pos,
            velocity: Vec2::ZERO,
            health: theme.enemy_health,
            behavior: EnemyBehavior::Shooter(ShooterState {
                last_shot: Duration::ZERO,
                roam_angle,
                roam_speed,
                roam_deadline,
                firing: None,
            }),
            life: EnemyLife::Alive,
            hit_flash: None,
        });
    }

    let trader = match (level, room_index) {
        (2, _) if !inventory.has(QuestItem::Papers) => Some(NpcKind::Clerk),
        (LEVEL_COUNT, 2) if !inventory.has(QuestItem::Stash) => Some(NpcKind::Dealer),
        _ => None,
    };
    if let Some(kind) = trader {
        let pos = placer.place(80.0, 60.0);
        room.npcs.push(Npc {
            id: ids.next_id(),
            kind,
            pos,
        });
    }

    if level == 1 {
        room.decorations.push(Decoration {
            id: ids.next_id(),
            kind: DecorationKind::Rug,
            pos: Vec2::new(640.0, 400.0),
            size: Vec2::new(300.0, 200.0),
        });
    }

    room
}
