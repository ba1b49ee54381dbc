//! Axis-aligned collision for room bodies.
//!
//! Bodies move one axis at a time against the room's solid rectangles (walls and obstacles), the
//! same way a tile resolver sweeps a kinematic body. Player overlaps with interactive entities are
//! gathered into an explicit list once per tick so the combat resolver can react to them in a
//! fixed order.

use bevy::math::Rect;
use bevy::prelude::*;

use crate::room::{EntityId, RoomState};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Collider {
    pub half_extents: Vec2,
}

impl Collider {
    pub fn from_size(size: Vec2) -> Self {
        Self {
            half_extents: size * 0.5,
        }
    }

    pub fn from_half_extents(half_extents: Vec2) -> Self {
        Self { half_extents }
    }

    pub fn aabb(&self, center: Vec2) -> Rect {
        Rect::from_center_half_size(center, self.half_extents)
    }
}

/// Strict overlap: rectangles that only touch along an edge do not count.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Which axes were stopped by a solid during `move_and_collide`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blocked {
    pub x: bool,
    pub y: bool,
}

impl Blocked {
    pub fn any(self) -> bool {
        self.x || self.y
    }
}

const SKIN: f32 = 0.001;

/// Integrates `velocity` over `dt`, stopping flush against any solid in the way.
pub fn move_and_collide(
    position: &mut Vec2,
    velocity: Vec2,
    half: Vec2,
    dt: f32,
    solids: &[Rect],
) -> Blocked {
    Blocked {
        x: resolve_horizontal(position, velocity.x, half, dt, solids),
        y: resolve_vertical(position, velocity.y, half, dt, solids),
    }
}

fn resolve_horizontal(position: &mut Vec2, velocity: f32, half: Vec2, dt: f32, solids: &[Rect]) -> bool {
    if velocity.abs() < f32::EPSILON {
        return false;
    }

    let mut new_x = position.x + velocity * dt;
    let mut blocked = false;

    for solid in solids {
        let candidate = Rect::from_center_half_size(Vec2::new(new_x, position.y), half);
        if !rects_overlap(candidate, *solid) {
            continue;
        }

        if velocity > 0.0 && position.x + half.x <= solid.min.x + SKIN {
            new_x = solid.min.x - half.x - SKIN;
            blocked = true;
        } else if velocity < 0.0 && position.x - half.x >= solid.max.x - SKIN {
            new_x = solid.max.x + half.x + SKIN;
            blocked = true;
        }
    }

    position.x = new_x;
    blocked
}

fn resolve_vertical(position: &mut Vec2, velocity: f32, half: Vec2, dt: f32, solids: &[Rect]) -> bool {
    if velocity.abs() < f32::EPSILON {
        return false;
    }

    let mut new_y = position.y + velocity * dt;
    let mut blocked = false;

    for solid in solids {
        let candidate = Rect::from_center_half_size(Vec2::new(position.x, new_y), half);
        if !rects_overlap(candidate, *solid) {
            continue;
        }

        if velocity > 0.0 && position.y + half.y <= solid.min.y + SKIN {
            new_y = solid.min.y - half.y - SKIN;
            blocked = true;
        } else if velocity < 0.0 && position.y - half.y >= solid.max.y - SKIN {
            new_y = solid.max.y + half.y + SKIN;
            blocked = true;
        }
    }

    position.y = new_y;
    blocked
}

/// Keeps a body's box inside `bounds`.
pub fn clamp_to_bounds(position: &mut Vec2, half: Vec2, bounds: Rect) {
    position.x = position.x.clamp(bounds.min.x + half.x, bounds.max.x - half.x);
    position.y = position.y.clamp(bounds.min.y + half.y, bounds.max.y - half.y);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    Door,
    Enemy,
    Item,
    Projectile,
    Hazard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub kind: OverlapKind,
    pub id: EntityId,
}

/// Collects every entity the player's box currently overlaps.
///
/// Events come out grouped by kind (doors, enemies, items, projectiles, hazards) and, within a
/// kind, in collection order, so stacked hits always resolve the same way.
pub fn player_overlaps(player_box: Rect, room: &RoomState) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    let mut push = |kind, id, rect| {
        if rects_overlap(player_box, rect) {
            overlaps.push(Overlap { kind, id });
        }
    };

    for door in &room.doors {
        push(OverlapKind::Door, door.id, door.trigger());
    }
    for enemy in room.enemies.iter().filter(|enemy| enemy.is_alive()) {
        push(OverlapKind::Enemy, enemy.id, enemy.collider().aabb(enemy.pos));
    }
    for item in &room.items {
        push(OverlapKind::Item, item.id, item.collider().aabb(item.pos));
    }
    for projectile in &room.projectiles {
        push(OverlapKind::Projectile, projectile.id, projectile.collider().aabb(projectile.pos));
    }
    for hazard in &room.hazards {
        push(OverlapKind::Hazard, hazard.id, hazard.collider().aabb(hazard.pos));
    }

    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(min: Vec2, max: Vec2) -> Rect {
        Rect::from_corners(min, max)
    }

    #[test]
    fn free_move_without_solids() {
        let mut pos = Vec2::new(100.0, 100.0);
        let blocked = move_and_collide(&mut pos, Vec2::new(50.0, -20.0), Vec2::splat(5.0), 1.0, &[]);
        assert_eq!(pos, Vec2::new(150.0, 80.0));
        assert!(!blocked.any());
    }

    #[test]
    fn moving_right_stops_flush_against_wall() {
        let solids = [wall(Vec2::new(200.0, 0.0), Vec2::new(232.0, 400.0))];
        let mut pos = Vec2::new(180.0, 100.0);
        let blocked = move_and_collide(&mut pos, Vec2::new(100.0, 0.0), Vec2::splat(10.0), 1.0, &solids);
        assert!(blocked.x);
        assert!(!blocked.y);
        assert!((pos.x - 190.0).abs() < 0.01, "x={}", pos.x);
    }

    #[test]
    fn moving_up_stops_below_ceiling_and_keeps_sliding() {
        let solids = [wall(Vec2::new(0.0, 80.0), Vec2::new(1280.0, 112.0))];
        let mut pos = Vec2::new(300.0, 140.0);
        let blocked = move_and_collide(&mut pos, Vec2::new(30.0, -100.0), Vec2::splat(16.0), 1.0, &solids);
        assert!(blocked.y);
        assert!(!blocked.x);
        assert!((pos.y - 128.0).abs() < 0.01, "y={}", pos.y);
        assert!((pos.x - 330.0).abs() < 0.01);
    }

    #[test]
    fn clamp_keeps_box_inside_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut pos = Vec2::new(-20.0, 150.0);
        clamp_to_bounds(&mut pos, Vec2::splat(5.0), bounds);
        assert_eq!(pos, Vec2::new(5.0, 95.0));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!rects_overlap(a, b));
        assert!(rects_overlap(a, Rect::new(9.0, 9.0, 12.0, 12.0)));
    }
}
