//! Player progress shared by every level: money, quest items, health and lives.
//!
//! A single `Inventory` resource lives for the whole process. It is created at startup by the
//! session plugin and only reset when the player restarts after a win or a game over. Health and
//! lives are private so the clamping rules below cannot be bypassed.

use bevy::prelude::*;

pub const MAX_HEALTH: u32 = 6;
pub const MAX_LIVES: u32 = 3;

/// The three items needed to finish the run, in the order they are usually found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestItem {
    Lighter,
    Papers,
    Stash,
}

impl QuestItem {
    pub const ALL: [QuestItem; 3] = [QuestItem::Lighter, QuestItem::Papers, QuestItem::Stash];

    pub fn label(self) -> &'static str {
        match self {
            QuestItem::Lighter => "lighter",
            QuestItem::Papers => "papers",
            QuestItem::Stash => "weed",
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    money: u32,
    has_lighter: bool,
    has_papers: bool,
    has_doobie: bool,
    health: u32,
    lives: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            money: 0,
            has_lighter: false,
            has_papers: false,
            has_doobie: false,
            health: MAX_HEALTH,
            lives: MAX_LIVES,
        }
    }
}

impl Inventory {
    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn has(&self, item: QuestItem) -> bool {
        match item {
            QuestItem::Lighter => self.has_lighter,
            QuestItem::Papers => self.has_papers,
            QuestItem::Stash => self.has_doobie,
        }
    }

    /// Quest flags only ever go from false to true until the next `reset`.
    pub fn grant(&mut self, item: QuestItem) {
        match item {
            QuestItem::Lighter => self.has_lighter = true,
            QuestItem::Papers => self.has_papers = true,
            QuestItem::Stash => self.has_doobie = true,
        }
    }

    pub fn has_all_quest_items(&self) -> bool {
        QuestItem::ALL.iter().all(|item| self.has(*item))
    }

    pub fn missing_items(&self) -> Vec<QuestItem> {
        QuestItem::ALL
            .into_iter()
            .filter(|item| !self.has(*item))
            .collect()
    }

    /// Applies damage and returns the remaining health.
    ///
    /// Dropping to zero health consumes a life and refills health. When the last life goes, health
    /// stays at zero and the inventory reports `is_defeated`.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 && self.lives > 0 {
            self.lives -= 1;
            if self.lives > 0 {
                self.health = MAX_HEALTH;
            }
        }
        self.health
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(MAX_HEALTH);
    }

    pub fn add_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Deducts `amount` if affordable. Nothing changes on failure.
    pub fn spend_money(&mut self, amount: u32) -> bool {
        if self.money >= amount {
            self.money -= amount;
            true
        } else {
            false
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0 && self.lives == 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
