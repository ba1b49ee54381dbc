//! Text and gauge state shown over the play field.
//!
//! The simulation owns the mission banner and the centre prompt because gameplay decides when
//! they change. `HudModel` is the read-only snapshot the UI layer draws each frame.

use std::time::Duration;

use bevy::prelude::*;

use crate::dungeon::Dungeon;
use crate::inventory::{Inventory, QuestItem, MAX_HEALTH};
use crate::theme::LEVEL_COUNT;

pub const MISSION_POP: Duration = Duration::from_millis(600);
const MISSION_POP_SCALE: f32 = 2.5;

/// Bottom-of-screen objective line that pops in whenever it changes.
#[derive(Debug, Clone)]
pub struct MissionBanner {
    text: String,
    pop: Timer,
}

impl MissionBanner {
    pub fn new(text: String) -> Self {
        Self {
            text,
            pop: Timer::new(MISSION_POP, TimerMode::Once),
        }
    }

    /// Replaces the text and restarts the pop-in from the top.
    pub fn set(&mut self, text: String) {
        self.text = text;
        self.pop.reset();
    }

    pub fn tick(&mut self, dt: Duration) {
        self.pop.tick(dt);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scale(&self) -> f32 {
        let t = self.pop.fraction();
        MISSION_POP_SCALE + (1.0 - MISSION_POP_SCALE) * back_ease_out(t)
    }
}

fn back_ease_out(t: f32) -> f32 {
    const OVERSHOOT: f32 = 1.70158;
    let u = t - 1.0;
    1.0 + (OVERSHOOT + 1.0) * u * u * u + OVERSHOOT * u * u
}

/// Centre-screen prompt. A timed notice (purchase result, missing items) wins over the standing
/// offer from a nearby trader until it expires.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    offer: Option<String>,
    notice: Option<(String, Timer)>,
}

impl Prompt {
    pub fn set_offer(&mut self, offer: Option<String>) {
        self.offer = offer;
    }

    pub fn notify(&mut self, text: String, duration: Duration) {
        self.notice = Some((text, Timer::new(duration, TimerMode::Once)));
    }

    pub fn tick(&mut self, dt: Duration) {
        if let Some((_, timer)) = &mut self.notice {
            if timer.tick(dt).finished() {
                self.notice = None;
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .map(|(text, _)| text.as_str())
            .or(self.offer.as_deref())
    }
}

/// Everything the HUD draws, captured from the simulation and inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct HudModel {
    pub hearts: Vec<bool>,
    pub lives: String,
    pub money: String,
    pub items: String,
    pub progress: String,
    pub mission: String,
    pub mission_scale: f32,
    pub prompt: Option<String>,
}

impl HudModel {
    pub fn capture(dungeon: &Dungeon, inventory: &Inventory) -> Self {
        let progress = dungeon.progress();
        Self {
            hearts: (0..MAX_HEALTH).map(|i| i < inventory.health()).collect(),
            lives: format!("LIVES: {}", inventory.lives()),
            money: format!("${}", inventory.money()),
            items: QuestItem::ALL
                .into_iter()
                .filter(|item| inventory.has(*item))
                .map(|item| item.label().to_uppercase())
                .collect::<Vec<_>>()
                .join(" "),
            progress: format!(
                "Level {}/{} - Room {}/3",
                progress.level,
                LEVEL_COUNT,
                progress.room + 1
            ),
            mission: dungeon.mission().text().to_owned(),
            mission_scale: dungeon.mission().scale(),
            prompt: dungeon.prompt().text().map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_pops_from_large_to_normal() {
        let mut banner = MissionBanner::new("hello".to_owned());
        assert!((banner.scale() - MISSION_POP_SCALE).abs() < 1e-4);
        banner.tick(MISSION_POP);
        assert!((banner.scale() - 1.0).abs() < 1e-4);

        banner.set("again".to_owned());
        assert_eq!(banner.text(), "again");
        assert!((banner.scale() - MISSION_POP_SCALE).abs() < 1e-4);
    }

    #[test]
    fn notice_overrides_offer_until_it_expires() {
        let mut prompt = Prompt::default();
        prompt.set_offer(Some("offer".to_owned()));
        prompt.notify("notice".to_owned(), Duration::from_millis(1500));
        assert_eq!(prompt.text(), Some("notice"));
        prompt.tick(Duration::from_millis(1499));
        assert_eq!(prompt.text(), Some("notice"));
        prompt.tick(Duration::from_millis(1));
        assert_eq!(prompt.text(), Some("offer"));
        prompt.set_offer(None);
        assert_eq!(prompt.text(), None);
    }
}
