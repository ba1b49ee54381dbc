//! Per-tick enemy and hazard behaviour, plus body integration against room solids.
//!
//! Roamers wander and occasionally pick a new heading. Shooters wander on a timer and fire at the
//! player every two seconds. Anything that strays into the wall margin or the HUD band gets
//! steered back toward the middle of the room; that is a soft pull, walls still do the hard
//! stopping.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::collision::{move_and_collide, rects_overlap};
use crate::room::{
    room_bounds, Enemy, EnemyBehavior, Hazard, RoomState, HUD_BAND, ROOM_CENTER, ROOM_HEIGHT,
    ROOM_WIDTH,
};

pub const ROAMER_SPEED: f32 = 60.0;
pub const ROAMER_TURN_CHANCE: f64 = 0.02;
pub const CONTAINMENT_MARGIN: f32 = 60.0;
pub const CONTAINMENT_SPEED: f32 = 60.0;
pub const SHOT_INTERVAL: Duration = Duration::from_millis(2000);
pub const SHOT_SPEED: f32 = 120.0;
pub const FIRING_POSE: Duration = Duration::from_millis(300);
const FACING_THRESHOLD: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 50.0;

/// True when `pos` is inside the side margins, the HUD band, or the bottom margin.
pub fn outside_play_area(pos: Vec2) -> bool {
    pos.x < CONTAINMENT_MARGIN
        || pos.x > ROOM_WIDTH - CONTAINMENT_MARGIN
        || pos.y < HUD_BAND
        || pos.y > ROOM_HEIGHT - CONTAINMENT_MARGIN - BOTTOM_MARGIN
}

pub fn toward_center(pos: Vec2, speed: f32) -> Vec2 {
    (ROOM_CENTER - pos).normalize_or_zero() * speed
}

/// A projectile an enemy wants to fire this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: Vec2,
    pub velocity: Vec2,
}

/// Updates headings, animation hints and firing for every living enemy, in collection order.
pub fn update_enemies<R: Rng + ?Sized>(
    enemies: &mut [Enemy],
    player: Vec2,
    now: Duration,
    dt: Duration,
    rng: &mut R,
) -> Vec<Shot> {
    let mut shots = Vec::new();

    for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
        let stray = outside_play_area(enemy.pos);

        match &mut enemy.behavior {
            EnemyBehavior::Roamer { facing_left } => {
                if stray {
                    enemy.velocity = toward_center(enemy.pos, CONTAINMENT_SPEED);
                }
                if rng.gen_bool(ROAMER_TURN_CHANCE) {
                    let degrees = rng.gen_range(0..=360) as f32;
                    enemy.velocity = Vec2::from_angle(degrees.to_radians()) * ROAMER_SPEED;
                }
                if enemy.velocity.x < -FACING_THRESHOLD {
                    *facing_left = true;
                } else if enemy.velocity.x > FACING_THRESHOLD {
                    *facing_left = false;
                }
            }
            EnemyBehavior::Shooter(state) => {
                if now > state.roam_deadline {
                    state.roam_angle = rng.gen_range(0.0..std::f32::consts::TAU);
                    state.roam_deadline = now + Duration::from_millis(rng.gen_range(1500..=3000));
                }
                if stray {
                    let pull = toward_center(enemy.pos, 1.0);
                    state.roam_angle = pull.y.atan2(pull.x);
                }
                enemy.velocity = Vec2::from_angle(state.roam_angle) * state.roam_speed;

                if let Some(pose) = &mut state.firing {
                    if pose.tick(dt).finished() {
                        state.firing = None;
                    }
                }

                if now.saturating_sub(state.last_shot) > SHOT_INTERVAL {
                    state.last_shot = now;
                    state.firing = Some(Timer::new(FIRING_POSE, TimerMode::Once));
                    shots.push(Shot {
                        origin: enemy.pos,
                        velocity: (player - enemy.pos).normalize_or_zero() * SHOT_SPEED,
                    });
                }
            }
        }
    }

    shots
}

/// Steers wandering hazards back into the play area.
pub fn update_hazards(hazards: &mut [Hazard]) {
    for hazard in hazards.iter_mut().filter(|hazard| hazard.is_moving()) {
        if outside_play_area(hazard.pos) {
            hazard.velocity = toward_center(hazard.pos, CONTAINMENT_SPEED);
        }
    }
}

/// Moves enemies, hazards and enemy projectiles for one tick. Enemies and wandering hazards bounce
/// off solids; projectiles are removed when they hit one or leave the room.
pub fn integrate_bodies(room: &mut RoomState, dt: Duration) {
    let solids = room.solids();
    let dt = dt.as_secs_f32();

    for enemy in room.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
        let half = enemy.collider().half_extents;
        let blocked = move_and_collide(&mut enemy.pos, enemy.velocity, half, dt, &solids);
        if blocked.x {
            enemy.velocity.x = -enemy.velocity.x;
        }
        if blocked.y {
            enemy.velocity.y = -enemy.velocity.y;
        }
        if let (true, EnemyBehavior::Shooter(state)) = (blocked.any(), &mut enemy.behavior) {
            state.roam_angle = enemy.velocity.y.atan2(enemy.velocity.x);
        }
    }

    for hazard in room.hazards.iter_mut().filter(|hazard| hazard.is_moving()) {
        let half = hazard.collider().half_extents;
        let blocked = move_and_collide(&mut hazard.pos, hazard.velocity, half, dt, &solids);
        if blocked.x {
            hazard.velocity.x = -hazard.velocity.x;
        }
        if blocked.y {
            hazard.velocity.y = -hazard.velocity.y;
        }
    }

    let bounds = room_bounds();
    room.projectiles.retain_mut(|projectile| {
        let half = projectile.collider().half_extents;
        let blocked = move_and_collide(&mut projectile.pos, projectile.velocity, half, dt, &solids);
        !blocked.any() && rects_overlap(projectile.collider().aabb(projectile.pos), bounds)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::{EnemyLife, EntityId, Projectile, ShooterState};
    use crate::theme::HazardKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roamer(pos: Vec2, velocity: Vec2) -> Enemy {
        Enemy {
            id: EntityId(1),
            pos,
            velocity,
            health: 2,
            behavior: EnemyBehavior::Roamer { facing_left: false },
            life: EnemyLife::Alive,
            hit_flash: None,
        }
    }

    fn shooter(pos: Vec2) -> Enemy {
        Enemy {
            id: EntityId(2),
            pos,
            velocity: Vec2::ZERO,
            health: 2,
            behavior: EnemyBehavior::Shooter(ShooterState {
                last_shot: Duration::ZERO,
                roam_angle: 0.0,
                roam_speed: 40.0,
                roam_deadline: Duration::from_secs(60),
                firing: None,
            }),
            life: EnemyLife::Alive,
            hit_flash: None,
        }
    }

    #[test]
    fn play_area_edges() {
        assert!(!outside_play_area(ROOM_CENTER));
        assert!(outside_play_area(Vec2::new(40.0, 400.0)));
        assert!(outside_play_area(Vec2::new(1230.0, 400.0)));
        assert!(outside_play_area(Vec2::new(640.0, 120.0)));
        assert!(outside_play_area(Vec2::new(640.0, 620.0)));
    }

    #[test]
    fn roamers_turn_about_two_percent_of_ticks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemies = [roamer(ROOM_CENTER, Vec2::new(1.0, 0.0))];
        let mut turns = 0;
        for _ in 0..10_000 {
            let before = enemies[0].velocity;
            update_enemies(&mut enemies, ROOM_CENTER, Duration::ZERO, Duration::ZERO, &mut rng);
            if enemies[0].velocity != before {
                turns += 1;
                enemies[0].velocity = Vec2::new(1.0, 0.0);
            }
        }
        assert!((120..=300).contains(&turns), "turns={turns}");
    }

    #[test]
    fn stray_roamer_heads_back_to_center() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut enemies = [roamer(Vec2::new(30.0, 380.0), Vec2::new(-50.0, 0.0))];
        update_enemies(&mut enemies, ROOM_CENTER, Duration::ZERO, Duration::ZERO, &mut rng);
        // A random turn can override the pull on the same tick; either way speed is 60.
        assert!((enemies[0].velocity.length() - CONTAINMENT_SPEED).abs() < 1e-3);
    }

    #[test]
    fn roamer_faces_its_heading() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut enemies = [roamer(ROOM_CENTER, Vec2::new(-40.0, 0.0))];
        enemies[0].velocity = Vec2::new(-40.0, 0.0);
        update_enemies(&mut enemies, ROOM_CENTER, Duration::ZERO, Duration::ZERO, &mut rng);
        if enemies[0].velocity.x < -FACING_THRESHOLD {
            assert!(matches!(enemies[0].behavior, EnemyBehavior::Roamer { facing_left: true }));
        }
    }

    #[test]
    fn shooter_fires_at_player_every_two_seconds() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut enemies = [shooter(Vec2::new(400.0, 400.0))];
        let player = Vec2::new(700.0, 400.0);
        let dt = Duration::from_millis(100);

        let mut shots = Vec::new();
        let mut now = Duration::ZERO;
        for _ in 0..65 {
            now += dt;
            let fired = update_enemies(&mut enemies, player, now, dt, &mut rng);
            if !fired.is_empty() {
                shots.push((now, fired[0]));
            }
        }

        let times: Vec<u128> = shots.iter().map(|(time, _)| time.as_millis()).collect();
        assert_eq!(times, vec![2100, 4200, 6300]);
        let velocity = shots[0].1.velocity;
        assert!((velocity - Vec2::new(SHOT_SPEED, 0.0)).length() < 1e-3);
    }

    #[test]
    fn shooter_repicks_heading_after_deadline() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut enemies = [shooter(ROOM_CENTER)];
        if let EnemyBehavior::Shooter(state) = &mut enemies[0].behavior {
            state.roam_deadline = Duration::from_millis(500);
            state.last_shot = Duration::from_millis(900);
        }
        let now = Duration::from_millis(600);
        update_enemies(&mut enemies, ROOM_CENTER, now, Duration::ZERO, &mut rng);
        let EnemyBehavior::Shooter(state) = &enemies[0].behavior else {
            panic!("expected shooter");
        };
        let delay = state.roam_deadline - now;
        assert!(delay >= Duration::from_millis(1500) && delay <= Duration::from_millis(3000));
        assert!((enemies[0].velocity.length() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn dead_enemies_are_left_alone() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut enemies = [shooter(ROOM_CENTER)];
        enemies[0].life = EnemyLife::Dying(Timer::new(Duration::from_secs(2), TimerMode::Once));
        let shots = update_enemies(&mut enemies, ROOM_CENTER, Duration::from_secs(10), Duration::ZERO, &mut rng);
        assert!(shots.is_empty());
        assert_eq!(enemies[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn stray_hazard_is_pulled_in() {
        let mut hazards = [
            Hazard {
                id: EntityId(3),
                kind: HazardKind::Rat,
                pos: Vec2::new(640.0, 130.0),
                velocity: Vec2::new(0.0, -40.0),
            },
            Hazard {
                id: EntityId(4),
                kind: HazardKind::Spill,
                pos: Vec2::new(640.0, 130.0),
                velocity: Vec2::ZERO,
            },
        ];
        update_hazards(&mut hazards);
        assert!(hazards[0].velocity.y > 0.0);
        assert!((hazards[0].velocity.length() - CONTAINMENT_SPEED).abs() < 1e-3);
        assert_eq!(hazards[1].velocity, Vec2::ZERO);
    }

    #[test]
    fn projectiles_vanish_on_walls_and_roamers_bounce() {
        let mut ids = crate::room::IdAllocator::default();
        let mut room = RoomState::empty(1, 0);
        room.doors = crate::room::build_doors(&mut ids, 1, 0);
        room.walls = crate::room::build_walls(&mut ids, &room.doors);
        room.projectiles.push(Projectile {
            id: ids.next_id(),
            pos: Vec2::new(640.0, 120.0),
            velocity: Vec2::new(0.0, -120.0),
        });
        room.enemies.push(roamer(Vec2::new(640.0, 123.0), Vec2::new(0.0, -60.0)));

        integrate_bodies(&mut room, Duration::from_millis(100));
        assert!(room.projectiles.is_empty());
        assert!(room.enemies[0].velocity.y > 0.0);
    }
}
