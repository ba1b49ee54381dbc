//! Player avatar state: position, facing, and the timed gates that keep attacks, throws and
//! damage from re-triggering.
//!
//! All cooldowns are explicit `Timer`s advanced by the simulation clock, so a test can step the
//! player through a whole attack or fall without a real frame loop.

use std::time::Duration;

use bevy::prelude::*;

use crate::collision::Collider;
use crate::room::{Direction, EntityId};

pub const PLAYER_SIZE: Vec2 = Vec2::new(34.0, 64.0);
pub const DEFAULT_PLAYER_SPEED: f32 = 230.0;
pub const START_POSITION: Vec2 = Vec2::new(640.0, 500.0);

pub const INVINCIBILITY: Duration = Duration::from_millis(1000);
pub const FALL_DURATION: Duration = Duration::from_millis(600);
pub const RECOVERY_GRACE: Duration = Duration::from_millis(800);
pub const FLICKER_STEP: Duration = Duration::from_millis(100);
pub const ATTACK_WINDOW: Duration = Duration::from_millis(150);
pub const ATTACK_RECOVERY: Duration = Duration::from_millis(200);

/// Marker for the sprite that shows the avatar.
#[derive(Component)]
pub struct Player;

/// Whether contact damage currently lands on the player.
#[derive(Debug, Clone)]
pub enum Vulnerability {
    Vulnerable,
    /// Short window after a hit.
    Invincible(Timer),
    /// Shrinking into a hazard; ends in a respawn at the last door.
    Falling(Timer),
    /// Flickering grace period after a respawn.
    Recovering(Timer),
}

impl Vulnerability {
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Vulnerability::Vulnerable)
    }

    pub fn is_falling(&self) -> bool {
        matches!(self, Vulnerability::Falling(_))
    }
}

#[derive(Debug, Clone)]
pub enum AttackState {
    Ready,
    Striking(Timer),
    Recovering(Timer),
}

impl AttackState {
    pub fn can_attack(&self) -> bool {
        matches!(self, AttackState::Ready)
    }
}

/// The boomerang-style thrown weapon. At most one exists at a time.
#[derive(Debug, Clone)]
pub struct ThrownWeapon {
    pub pos: Vec2,
    pub origin: Vec2,
    pub velocity: Vec2,
    pub returning: bool,
    pub spin: f32,
    /// Enemies recently struck, each locked out until its timer finishes.
    pub lockouts: Vec<(EntityId, Timer)>,
}

impl ThrownWeapon {
    pub fn collider(&self) -> Collider {
        Collider::from_size(Vec2::splat(20.0))
    }

    pub fn is_locked_out(&self, enemy: EntityId) -> bool {
        self.lockouts.iter().any(|(id, _)| *id == enemy)
    }
}

/// Returned by `PlayerState::tick_timers` when a hazard fall completes this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallCompleted;

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub facing: Direction,
    pub moving: bool,
    pub vulnerability: Vulnerability,
    pub attack: AttackState,
    pub thrown: Option<ThrownWeapon>,
}

impl PlayerState {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            velocity: Vec2::ZERO,
            facing: Direction::Down,
            moving: false,
            vulnerability: Vulnerability::Vulnerable,
            attack: AttackState::Ready,
            thrown: None,
        }
    }

    pub fn collider(&self) -> Collider {
        Collider::from_size(PLAYER_SIZE)
    }

    pub fn can_throw(&self) -> bool {
        self.thrown.is_none()
    }

    /// Sets velocity and facing from a movement axis (room space, y down). The dominant axis
    /// decides which way the player faces.
    pub fn steer(&mut self, axis: Vec2, speed: f32) {
        if axis == Vec2::ZERO || self.vulnerability.is_falling() {
            self.velocity = Vec2::ZERO;
            self.moving = false;
            return;
        }

        self.velocity = Vec2::from_angle(axis.y.atan2(axis.x)) * speed;
        self.moving = true;
        self.facing = if axis.x.abs() > axis.y.abs() {
            if axis.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if axis.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        };
    }

    /// Starts the post-hit invincibility window.
    pub fn start_invincibility(&mut self) {
        self.vulnerability = Vulnerability::Invincible(Timer::new(INVINCIBILITY, TimerMode::Once));
    }

    pub fn start_fall(&mut self) {
        self.vulnerability = Vulnerability::Falling(Timer::new(FALL_DURATION, TimerMode::Once));
        self.velocity = Vec2::ZERO;
    }

    /// Advances attack and vulnerability timers.
    pub fn tick_timers(&mut self, dt: Duration) -> Option<FallCompleted> {
        match &mut self.attack {
            AttackState::Ready => {}
            AttackState::Striking(timer) => {
                if timer.tick(dt).finished() {
                    self.attack =
                        AttackState::Recovering(Timer::new(ATTACK_RECOVERY, TimerMode::Once));
                }
            }
            AttackState::Recovering(timer) => {
                if timer.tick(dt).finished() {
                    self.attack = AttackState::Ready;
                }
            }
        }

        match &mut self.vulnerability {
            Vulnerability::Vulnerable => None,
            Vulnerability::Invincible(timer) | Vulnerability::Recovering(timer) => {
                if timer.tick(dt).finished() {
                    self.vulnerability = Vulnerability::Vulnerable;
                }
                None
            }
            Vulnerability::Falling(timer) => {
                if timer.tick(dt).finished() {
                    self.vulnerability =
                        Vulnerability::Recovering(Timer::new(RECOVERY_GRACE, TimerMode::Once));
                    Some(FallCompleted)
                } else {
                    None
                }
            }
        }
    }

    /// Sprite alpha: fades while falling, blinks every 100 ms while recovering.
    pub fn alpha(&self) -> f32 {
        match &self.vulnerability {
            Vulnerability::Falling(timer) => 1.0 - 0.7 * timer.fraction(),
            Vulnerability::Recovering(timer) => {
                let step = timer.elapsed().as_millis() / FLICKER_STEP.as_millis();
                if step % 2 == 0 {
                    0.5
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }

    /// Sprite scale and spin while falling into a hazard.
    pub fn fall_pose(&self) -> (f32, f32) {
        match &self.vulnerability {
            Vulnerability::Falling(timer) => {
                let t = timer.fraction();
                let eased = t * t * t;
                (1.0 - 0.8 * eased, eased * std::f32::consts::TAU * 2.0)
            }
            _ => (1.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steer_faces_dominant_axis() {
        let mut player = PlayerState::new(START_POSITION);
        player.steer(Vec2::new(1.0, 0.0), DEFAULT_PLAYER_SPEED);
        assert_eq!(player.facing, Direction::Right);
        player.steer(Vec2::new(-0.3, -0.9), DEFAULT_PLAYER_SPEED);
        assert_eq!(player.facing, Direction::Up);
        assert!((player.velocity.length() - DEFAULT_PLAYER_SPEED).abs() < 1e-3);
        player.steer(Vec2::ZERO, DEFAULT_PLAYER_SPEED);
        assert_eq!(player.velocity, Vec2::ZERO);
        assert_eq!(player.facing, Direction::Up);
    }

    #[test]
    fn diagonal_keys_move_at_full_speed_not_faster() {
        let mut player = PlayerState::new(START_POSITION);
        player.steer(Vec2::new(1.0, 1.0), 100.0);
        assert!((player.velocity.length() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn attack_cycle_takes_350ms() {
        let mut player = PlayerState::new(START_POSITION);
        player.attack = AttackState::Striking(Timer::new(ATTACK_WINDOW, TimerMode::Once));
        player.tick_timers(Duration::from_millis(150));
        assert!(matches!(player.attack, AttackState::Recovering(_)));
        player.tick_timers(Duration::from_millis(199));
        assert!(!player.attack.can_attack());
        player.tick_timers(Duration::from_millis(1));
        assert!(player.attack.can_attack());
    }

    #[test]
    fn fall_then_grace_then_vulnerable() {
        let mut player = PlayerState::new(START_POSITION);
        player.start_fall();
        assert_eq!(player.tick_timers(Duration::from_millis(599)), None);
        assert_eq!(player.tick_timers(Duration::from_millis(1)), Some(FallCompleted));
        assert!(matches!(player.vulnerability, Vulnerability::Recovering(_)));
        player.tick_timers(RECOVERY_GRACE);
        assert!(player.vulnerability.is_vulnerable());
    }

    #[test]
    fn falling_player_cannot_steer() {
        let mut player = PlayerState::new(START_POSITION);
        player.start_fall();
        player.steer(Vec2::X, DEFAULT_PLAYER_SPEED);
        assert_eq!(player.velocity, Vec2::ZERO);
    }
}
