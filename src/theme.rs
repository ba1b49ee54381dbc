//! Static per-level parameters: what a level looks like and what it spawns.

use bevy::prelude::*;

use crate::inventory::{Inventory, QuestItem};

pub const LEVEL_COUNT: u8 = 3;
pub const ROOMS_PER_LEVEL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardKind {
    Crab,
    Spill,
    Rat,
}

impl HazardKind {
    /// Wander speed for hazards that move on their own; puddles stay put.
    pub fn wander_speed(self) -> Option<f32> {
        match self {
            HazardKind::Rat => Some(40.0),
            HazardKind::Crab => Some(25.0),
            HazardKind::Spill => None,
        }
    }

    pub fn half_extents(self) -> Vec2 {
        match self {
            HazardKind::Spill => Vec2::splat(10.0),
            HazardKind::Crab => Vec2::new(16.0, 12.0),
            HazardKind::Rat => Vec2::new(14.0, 8.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemySprite {
    Dog,
    Police,
}

#[derive(Debug)]
pub struct LevelTheme {
    pub name: &'static str,
    pub wall_color: u32,
    pub background_color: u32,
    pub hazards: &'static [HazardKind],
    pub enemy_sprite: EnemySprite,
    pub enemy_health: i32,
    pub roamer_count: [usize; ROOMS_PER_LEVEL],
    pub shooter_count: [usize; ROOMS_PER_LEVEL],
}

impl LevelTheme {
    pub fn wall(&self) -> Color {
        hex_color(self.wall_color)
    }

    pub fn background(&self) -> Color {
        hex_color(self.background_color)
    }
}

static THEMES: [LevelTheme; LEVEL_COUNT as usize] = [
    LevelTheme {
        name: "THE CRIB",
        wall_color: 0x4a3020,
        background_color: 0x6b5444,
        hazards: &[HazardKind::Crab, HazardKind::Spill],
        enemy_sprite: EnemySprite::Dog,
        enemy_health: 2,
        roamer_count: [1, 2, 3],
        shooter_count: [0, 0, 0],
    },
    LevelTheme {
        name: "CONVENIENCE STORE",
        wall_color: 0x3a4a5a,
        background_color: 0xd0d0d0,
        hazards: &[HazardKind::Spill],
        enemy_sprite: EnemySprite::Police,
        enemy_health: 2,
        roamer_count: [1, 2, 3],
        shooter_count: [1, 2, 2],
    },
    LevelTheme {
        name: "BACK ALLEY",
        wall_color: 0x2a2a2a,
        background_color: 0x3a3a3a,
        hazards: &[HazardKind::Rat, HazardKind::Spill],
        enemy_sprite: EnemySprite::Dog,
        enemy_health: 2,
        roamer_count: [2, 3, 4],
        shooter_count: [1, 2, 3],
    },
];

/// Looks up the theme for `level`, falling back to the first level for unknown numbers.
pub fn level_theme(level: u8) -> &'static LevelTheme {
    match level {
        1..=LEVEL_COUNT => &THEMES[usize::from(level - 1)],
        _ => &THEMES[0],
    }
}

/// Objective line for the bottom banner.
pub fn mission_text(level: u8, inventory: &Inventory) -> String {
    let theme = level_theme(level);
    let objective = match level {
        1 if !inventory.has(QuestItem::Lighter) => "Find the lighter!",
        2 if !inventory.has(QuestItem::Papers) => "Buy papers from the clerk (E)!",
        3 if !inventory.has(QuestItem::Stash) => "Buy weed from dealer (E)!",
        3 => "Objective complete! Press Q to roll a doobie, smoke and WIN!",
        _ => "Objective complete! Find the exit!",
    };
    format!("{}: {}", theme.name, objective)
}

pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}
