//! Door-driven room and level transitions with a fade through black.
//!
//! A door is honoured only while no transition is running and more than two seconds have passed
//! since the previous one. The screen fades out for 200 ms, the room is swapped at full black,
//! then it fades back in; 300 ms after the swap the door gate reopens and the cooldown restarts so
//! the new room's doors cannot fire straight away.

use std::time::Duration;

use bevy::prelude::*;

use crate::dungeon::Dungeon;
use crate::room::{Direction, Door, ROOM_CENTER, ROOM_HEIGHT, ROOM_WIDTH};
use crate::state::GameSet;
use crate::theme::LEVEL_COUNT;

pub const DOOR_COOLDOWN: Duration = Duration::from_millis(2000);
pub const FADE_DURATION: Duration = Duration::from_millis(200);
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Registers the fade overlay that mirrors the simulation's transition phase.
pub struct TransitionPlugin;

impl Plugin for TransitionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_fade_overlay)
            .add_systems(Update, update_fade_overlay.in_set(GameSet::Presentation));
    }
}

/// The door the player walked through, captured when the transition starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorPassage {
    pub direction: Direction,
    pub target_room: usize,
    pub is_level_transition: bool,
}

impl From<&Door> for DoorPassage {
    fn from(door: &Door) -> Self {
        Self {
            direction: door.direction,
            target_room: door.target_room,
            is_level_transition: door.is_level_transition,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionPhase {
    Idle,
    FadingOut { elapsed: Duration, passage: DoorPassage },
    Arriving { elapsed: Duration },
}

/// What the caller must do after advancing the transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionStep {
    /// Screen is black: rebuild the room for this passage.
    Swap(DoorPassage),
    /// The door gate has reopened.
    Settled,
}

#[derive(Debug, Clone)]
pub struct TransitionState {
    phase: TransitionPhase,
    last_door_time: Duration,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self {
            phase: TransitionPhase::Idle,
            last_door_time: Duration::ZERO,
        }
    }
}

impl TransitionState {
    pub fn is_transitioning(&self) -> bool {
        !matches!(self.phase, TransitionPhase::Idle)
    }

    /// Starts a transition through `door` unless one is running or the cooldown is active.
    pub fn try_enter(&mut self, door: &Door, now: Duration) -> bool {
        if self.is_transitioning() || now.saturating_sub(self.last_door_time) <= DOOR_COOLDOWN {
            return false;
        }

        self.last_door_time = now;
        self.phase = TransitionPhase::FadingOut {
            elapsed: Duration::ZERO,
            passage: DoorPassage::from(door),
        };
        true
    }

    pub fn advance(&mut self, dt: Duration, now: Duration) -> Option<TransitionStep> {
        match &mut self.phase {
            TransitionPhase::Idle => None,
            TransitionPhase::FadingOut { elapsed, passage } => {
                *elapsed += dt;
                if *elapsed < FADE_DURATION {
                    return None;
                }
                let passage = *passage;
                self.phase = TransitionPhase::Arriving {
                    elapsed: Duration::ZERO,
                };
                Some(TransitionStep::Swap(passage))
            }
            TransitionPhase::Arriving { elapsed } => {
                *elapsed += dt;
                if *elapsed < SETTLE_DELAY {
                    return None;
                }
                self.phase = TransitionPhase::Idle;
                self.last_door_time = now;
                Some(TransitionStep::Settled)
            }
        }
    }

    /// Overlay opacity: 0 is clear, 1 is fully black.
    pub fn fade_alpha(&self) -> f32 {
        let fade = FADE_DURATION.as_secs_f32();
        match &self.phase {
            TransitionPhase::Idle => 0.0,
            TransitionPhase::FadingOut { elapsed, .. } => (elapsed.as_secs_f32() / fade).min(1.0),
            TransitionPhase::Arriving { elapsed } => (1.0 - elapsed.as_secs_f32() / fade).max(0.0),
        }
    }
}

/// Level and room the player currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub level: u8,
    pub room: usize,
}

impl Progress {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.clamp(1, LEVEL_COUNT),
            room: 0,
        }
    }

    pub fn apply(&mut self, passage: &DoorPassage) {
        if passage.is_level_transition {
            self.level = (self.level + 1).min(LEVEL_COUNT);
            self.room = 0;
        } else {
            self.room = passage.target_room;
        }
    }
}

/// Where the player appears after walking through a door facing `door_direction`: just inside
/// the wall opposite that door.
pub fn arrival_point(door_direction: Direction) -> Vec2 {
    match door_direction.opposite() {
        Direction::Up => Vec2::new(ROOM_CENTER.x, 180.0),
        Direction::Down => Vec2::new(ROOM_CENTER.x, ROOM_HEIGHT - 150.0),
        Direction::Left => Vec2::new(150.0, 380.0),
        Direction::Right => Vec2::new(ROOM_WIDTH - 150.0, 380.0),
    }
}

/// Marker component for the fade overlay sprite.
#[derive(Component)]
pub struct FadeOverlay;

/// Spawns a fullscreen black overlay for fade transitions.
fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        FadeOverlay,
        Name::new("FadeOverlay"),
        SpriteBundle {
            sprite: Sprite {
                color: Color::srgba(0.0, 0.0, 0.0, 0.0),
                custom_size: Some(Vec2::new(10000.0, 10000.0)),
                ..default()
            },
            transform: Transform::from_translation(Vec3::new(0.0, 0.0, 900.0)),
            ..default()
        },
    ));
}

/// Updates the fade overlay opacity based on the transition phase.
fn update_fade_overlay(
    dungeon: Res<Dungeon>,
    mut overlay_query: Query<&mut Sprite, With<FadeOverlay>>,
) {
    let alpha = dungeon.transition().fade_alpha();
    for mut sprite in &mut overlay_query {
        sprite.color = Color::srgba(0.0, 0.0, 0.0, alpha);
    }
}
