//! Room occupancy model: every entity a room owns, plus its fixed wall and door layout.
//!
//! Positions are in room space: origin at the top-left corner, y growing downwards, one unit per
//! logical pixel of the 1280×720 play field. The renderer converts to world space.

use std::time::Duration;

use bevy::math::Rect;
use bevy::prelude::*;

use crate::collision::Collider;
use crate::inventory::QuestItem;
use crate::theme::{HazardKind, LEVEL_COUNT};

pub const ROOM_WIDTH: f32 = 1280.0;
pub const ROOM_HEIGHT: f32 = 720.0;
pub const ROOM_CENTER: Vec2 = Vec2::new(ROOM_WIDTH / 2.0, ROOM_HEIGHT / 2.0);
/// Top band covered by the HUD; nothing spawns or roams above it.
pub const HUD_BAND: f32 = 150.0;

const WALL_THICKNESS: f32 = 32.0;
const TOP_WALL_Y: f32 = 80.0;
const DOOR_Y: f32 = 380.0;
const DOOR_INSET: f32 = 24.0;
const DOOR_GAP: (f32, f32) = (352.0, 416.0);
const DOOR_TRIGGER_SIZE: Vec2 = Vec2::new(48.0, 64.0);

pub fn room_bounds() -> Rect {
    Rect::new(0.0, 0.0, ROOM_WIDTH, ROOM_HEIGHT)
}

/// Stable identifier for anything the renderer needs to track. Ids are never reused within a
/// session, so a sprite left over from an old room can never be mistaken for a new entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        self.next += 1;
        EntityId(self.next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit vector in room space (y down).
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wall {
    pub id: EntityId,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Crate,
    Shelf,
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: EntityId,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub half_extents: Vec2,
}

impl Obstacle {
    pub fn rect(&self) -> Rect {
        Rect::from_center_half_size(self.pos, self.half_extents)
    }
}

#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: EntityId,
    pub kind: HazardKind,
    pub pos: Vec2,
    pub velocity: Vec2,
}

impl Hazard {
    pub fn collider(&self) -> Collider {
        Collider::from_half_extents(self.kind.half_extents())
    }

    pub fn is_moving(&self) -> bool {
        self.kind.wander_speed().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Money { value: u32 },
    Heart { value: u32 },
    Lighter,
}

#[derive(Debug, Clone)]
pub struct Item {
    pub id: EntityId,
    pub kind: ItemKind,
    pub pos: Vec2,
}

impl Item {
    pub fn collider(&self) -> Collider {
        Collider::from_size(Vec2::splat(24.0))
    }
}

#[derive(Debug, Clone)]
pub struct ShooterState {
    pub last_shot: Duration,
    pub roam_angle: f32,
    pub roam_speed: f32,
    pub roam_deadline: Duration,
    /// Running while the firing pose is shown.
    pub firing: Option<Timer>,
}

#[derive(Debug, Clone)]
pub enum EnemyBehavior {
    Roamer { facing_left: bool },
    Shooter(ShooterState),
}

#[derive(Debug, Clone)]
pub enum EnemyLife {
    Alive,
    /// Defeated shooters linger while their body fades out.
    Dying(Timer),
    Dead,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub health: i32,
    pub behavior: EnemyBehavior,
    pub life: EnemyLife,
    pub hit_flash: Option<Timer>,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        matches!(self.life, EnemyLife::Alive)
    }

    pub fn is_shooter(&self) -> bool {
        matches!(self.behavior, EnemyBehavior::Shooter(_))
    }

    pub fn collider(&self) -> Collider {
        match self.behavior {
            EnemyBehavior::Roamer { .. } => Collider::from_size(Vec2::new(24.0, 18.0)),
            EnemyBehavior::Shooter(_) => Collider::from_size(Vec2::new(32.0, 39.0)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    pub velocity: Vec2,
}

impl Projectile {
    pub fn collider(&self) -> Collider {
        Collider::from_size(Vec2::splat(10.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpcKind {
    Clerk,
    Dealer,
}

impl NpcKind {
    pub fn cost(self) -> u32 {
        match self {
            NpcKind::Clerk => 20,
            NpcKind::Dealer => 50,
        }
    }

    pub fn sells(self) -> QuestItem {
        match self {
            NpcKind::Clerk => QuestItem::Papers,
            NpcKind::Dealer => QuestItem::Stash,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Npc {
    pub id: EntityId,
    pub kind: NpcKind,
    pub pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct Door {
    pub id: EntityId,
    pub pos: Vec2,
    pub direction: Direction,
    pub target_room: usize,
    pub is_level_transition: bool,
}

impl Door {
    pub fn trigger(&self) -> Rect {
        Rect::from_center_size(self.pos, DOOR_TRIGGER_SIZE)
    }

    /// Where the frame is drawn: flush with the wall the door sits in.
    pub fn frame_position(&self) -> Vec2 {
        match self.direction {
            Direction::Left => Vec2::new(WALL_THICKNESS / 2.0, self.pos.y),
            Direction::Right => Vec2::new(ROOM_WIDTH - WALL_THICKNESS / 2.0, self.pos.y),
            Direction::Up | Direction::Down => self.pos,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    Rug,
}

#[derive(Debug, Clone)]
pub struct Decoration {
    pub id: EntityId,
    pub kind: DecorationKind,
    pub pos: Vec2,
    pub size: Vec2,
}

/// One entry of the fixed door table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorSpec {
    pub direction: Direction,
    pub target_room: usize,
    pub is_level_transition: bool,
}

/// Door topology for a room: 0 → 1 → 2 → next level, with back doors on rooms 1 and 2. The last
/// room of the last level has no way forward.
pub fn door_layout(level: u8, room_index: usize) -> Vec<DoorSpec> {
    let forward = |target_room| DoorSpec {
        direction: Direction::Right,
        target_room,
        is_level_transition: false,
    };
    let back = |target_room| DoorSpec {
        direction: Direction::Left,
        target_room,
        is_level_transition: false,
    };

    match room_index {
        0 => vec![forward(1)],
        1 => vec![back(0), forward(2)],
        _ if level < LEVEL_COUNT => vec![
            back(1),
            DoorSpec {
                direction: Direction::Right,
                target_room: 0,
                is_level_transition: true,
            },
        ],
        _ => vec![back(1)],
    }
}

pub fn build_doors(ids: &mut IdAllocator, level: u8, room_index: usize) -> Vec<Door> {
    door_layout(level, room_index)
        .into_iter()
        .map(|spec| Door {
            id: ids.next_id(),
            pos: match spec.direction {
                Direction::Left => Vec2::new(DOOR_INSET, DOOR_Y),
                Direction::Right => Vec2::new(ROOM_WIDTH - DOOR_INSET, DOOR_Y),
                Direction::Up => Vec2::new(ROOM_CENTER.x, TOP_WALL_Y + DOOR_INSET),
                Direction::Down => Vec2::new(ROOM_CENTER.x, ROOM_HEIGHT - DOOR_INSET),
            },
            direction: spec.direction,
            target_room: spec.target_room,
            is_level_transition: spec.is_level_transition,
        })
        .collect()
}

/// Perimeter walls, leaving a gap wherever a side door is.
pub fn build_walls(ids: &mut IdAllocator, doors: &[Door]) -> Vec<Wall> {
    let has_door = |direction| doors.iter().any(|door| door.direction == direction);
    let mut rects = vec![
        Rect::new(0.0, TOP_WALL_Y, ROOM_WIDTH, TOP_WALL_Y + WALL_THICKNESS),
        Rect::new(0.0, ROOM_HEIGHT - WALL_THICKNESS, ROOM_WIDTH, ROOM_HEIGHT),
    ];

    for (direction, x0) in [
        (Direction::Left, 0.0),
        (Direction::Right, ROOM_WIDTH - WALL_THICKNESS),
    ] {
        let x1 = x0 + WALL_THICKNESS;
        if has_door(direction) {
            rects.push(Rect::new(x0, TOP_WALL_Y, x1, DOOR_GAP.0));
            rects.push(Rect::new(x0, DOOR_GAP.1, x1, ROOM_HEIGHT));
        } else {
            rects.push(Rect::new(x0, TOP_WALL_Y, x1, ROOM_HEIGHT));
        }
    }

    rects
        .into_iter()
        .map(|rect| Wall {
            id: ids.next_id(),
            rect,
        })
        .collect()
}

/// Everything a single room owns. Built fresh on each entry and dropped wholesale on exit.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub level: u8,
    pub room_index: usize,
    pub walls: Vec<Wall>,
    pub obstacles: Vec<Obstacle>,
    pub hazards: Vec<Hazard>,
    pub decorations: Vec<Decoration>,
    pub items: Vec<Item>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub npcs: Vec<Npc>,
    pub doors: Vec<Door>,
}

impl RoomState {
    pub fn empty(level: u8, room_index: usize) -> Self {
        Self {
            level,
            room_index,
            walls: Vec::new(),
            obstacles: Vec::new(),
            hazards: Vec::new(),
            decorations: Vec::new(),
            items: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            npcs: Vec::new(),
            doors: Vec::new(),
        }
    }

    /// Rectangles that block movement.
    pub fn solids(&self) -> Vec<Rect> {
        self.walls
            .iter()
            .map(|wall| wall.rect)
            .chain(self.obstacles.iter().map(Obstacle::rect))
            .collect()
    }

    pub fn remove_dead_enemies(&mut self) {
        self.enemies
            .retain(|enemy| !matches!(enemy.life, EnemyLife::Dead));
    }
}
