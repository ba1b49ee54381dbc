//! The running game session: current room, player, transition and the per-tick update order.
//!
//! `Dungeon::tick` is the whole simulation step. It never touches Bevy's `World`; the session
//! plugin feeds it input, the shared inventory and an RNG, and the presentation layer reads it
//! back through the accessors and the drained cue list.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::behavior::{integrate_bodies, update_enemies, update_hazards};
use crate::collision::{clamp_to_bounds, move_and_collide, player_overlaps, OverlapKind};
use crate::combat::{self, Trade, CONTACT_DAMAGE};
use crate::hud::{MissionBanner, Prompt};
use crate::inventory::{Inventory, QuestItem};
use crate::movement::PlayerInput;
use crate::player::{PlayerState, START_POSITION};
use crate::populate::populate_room;
use crate::room::{room_bounds, Direction, EntityId, IdAllocator, ItemKind, Projectile, RoomState};
use crate::theme::{level_theme, mission_text};
use crate::transition::{arrival_point, DoorPassage, Progress, TransitionState, TransitionStep};

pub const TRADE_RADIUS: f32 = 60.0;
pub const TRADE_NOTICE: Duration = Duration::from_millis(1500);
pub const MISSING_NOTICE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    GameOver,
}

/// Something the presentation layer should show or play once.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum Cue {
    Pickup { kind: ItemKind, pos: Vec2 },
    Slash { pos: Vec2, facing: Direction },
    EnemyHit { pos: Vec2 },
    EnemyDefeated { pos: Vec2 },
    PlayerHurt,
    Fell,
    DoorEntered,
    Purchased(QuestItem),
    Victory,
    GameOver,
}

#[derive(Resource, Debug)]
pub struct Dungeon {
    progress: Progress,
    room: RoomState,
    player: PlayerState,
    transition: TransitionState,
    /// Where a hazard fall respawns the player: the last arrival point.
    entry_point: Vec2,
    clock: Duration,
    ids: IdAllocator,
    prompt: Prompt,
    mission: MissionBanner,
    nearby_npc: Option<EntityId>,
    outcome: Option<Outcome>,
    cues: Vec<Cue>,
    player_speed: f32,
}

impl Dungeon {
    pub fn new<R: Rng + ?Sized>(
        level: u8,
        inventory: &Inventory,
        rng: &mut R,
        player_speed: f32,
    ) -> Self {
        let progress = Progress::new(level);
        let mut ids = IdAllocator::default();
        let room = populate_room(rng, &mut ids, progress.level, progress.room, inventory, Duration::ZERO);
        log_room_entry(&room);

        Self {
            progress,
            room,
            player: PlayerState::new(START_POSITION),
            transition: TransitionState::default(),
            entry_point: START_POSITION,
            clock: Duration::ZERO,
            ids,
            prompt: Prompt::default(),
            mission: MissionBanner::new(mission_text(progress.level, inventory)),
            nearby_npc: None,
            outcome: None,
            cues: Vec::new(),
            player_speed,
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn room(&self) -> &RoomState {
        &self.room
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn transition(&self) -> &TransitionState {
        &self.transition
    }

    pub fn mission(&self) -> &MissionBanner {
        &self.mission
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    /// Ends the run in defeat. Only the first call has any effect.
    pub fn trigger_game_over(&mut self) -> bool {
        self.finish(Outcome::GameOver)
    }

    fn finish(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        self.player.velocity = Vec2::ZERO;
        match outcome {
            Outcome::Victory => {
                info!("victory in level {} room {}", self.progress.level, self.progress.room);
                self.cues.push(Cue::Victory);
            }
            Outcome::GameOver => {
                info!("game over in level {} room {}", self.progress.level, self.progress.room);
                self.cues.push(Cue::GameOver);
            }
        }
        true
    }

    /// Advances the simulation by `dt`.
    ///
    /// Order within a tick: transition, player timers, movement, actions, trader proximity,
    /// thrown weapon, enemies and hazards, overlap resolution. Once an outcome is set nothing
    /// moves again.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: Duration,
        input: &PlayerInput,
        inventory: &mut Inventory,
        rng: &mut R,
    ) {
        if self.outcome.is_some() {
            return;
        }
        if inventory.is_defeated() {
            self.trigger_game_over();
            return;
        }

        self.clock += dt;
        self.prompt.tick(dt);
        self.mission.tick(dt);

        if let Some(TransitionStep::Swap(passage)) = self.transition.advance(dt, self.clock) {
            self.enter_room(passage, inventory, rng);
        }
        if self.transition.is_transitioning() {
            return;
        }

        if self.player.tick_timers(dt).is_some() {
            self.player.pos = self.entry_point;
        }

        self.player.steer(input.axis, self.player_speed);
        let half = self.player.collider().half_extents;
        move_and_collide(
            &mut self.player.pos,
            self.player.velocity,
            half,
            dt.as_secs_f32(),
            &self.room.solids(),
        );
        clamp_to_bounds(&mut self.player.pos, half, room_bounds());

        self.refresh_offer(inventory);
        if !self.player.vulnerability.is_falling() {
            self.handle_actions(input, inventory);
        }
        if self.outcome.is_some() {
            return;
        }

        combat::update_thrown(&mut self.player, &mut self.room, &mut self.ids, dt, &mut self.cues);

        let shots = update_enemies(&mut self.room.enemies, self.player.pos, self.clock, dt, rng);
        for shot in shots {
            self.room.projectiles.push(Projectile {
                id: self.ids.next_id(),
                pos: shot.origin,
                velocity: shot.velocity,
            });
        }
        update_hazards(&mut self.room.hazards);
        integrate_bodies(&mut self.room, dt);
        combat::tick_enemy_timers(&mut self.room, dt);

        self.resolve_overlaps(inventory);

        if inventory.is_defeated() {
            self.trigger_game_over();
        }
    }

    fn enter_room<R: Rng + ?Sized>(
        &mut self,
        passage: DoorPassage,
        inventory: &Inventory,
        rng: &mut R,
    ) {
        self.progress.apply(&passage);
        self.room = populate_room(
            rng,
            &mut self.ids,
            self.progress.level,
            self.progress.room,
            inventory,
            self.clock,
        );

        let arrival = arrival_point(passage.direction);
        self.player.pos = arrival;
        self.player.velocity = Vec2::ZERO;
        self.player.thrown = None;
        self.entry_point = arrival;
        self.nearby_npc = None;
        self.prompt.set_offer(None);

        if passage.is_level_transition {
            info!(
                "entering level {} ({})",
                self.progress.level,
                level_theme(self.progress.level).name
            );
            self.mission.set(mission_text(self.progress.level, inventory));
        }
        log_room_entry(&self.room);
    }

    /// Finds the closest trader within reach that still has something to sell and shows its offer.
    fn refresh_offer(&mut self, inventory: &Inventory) {
        let player = self.player.pos;
        let nearby = self
            .room
            .npcs
            .iter()
            .filter(|npc| !inventory.has(npc.kind.sells()))
            .filter(|npc| npc.pos.distance(player) < TRADE_RADIUS)
            .min_by(|a, b| a.pos.distance(player).total_cmp(&b.pos.distance(player)));

        self.nearby_npc = nearby.map(|npc| npc.id);
        self.prompt.set_offer(nearby.map(|npc| {
            format!(
                "Press E to buy {} (${})\nYou have ${}",
                npc.kind.sells().label(),
                npc.kind.cost(),
                inventory.money()
            )
        }));
    }

    fn handle_actions(&mut self, input: &PlayerInput, inventory: &mut Inventory) {
        if input.attack {
            combat::melee(&mut self.player, &mut self.room, &mut self.ids, &mut self.cues);
        }
        if input.throw {
            combat::throw_weapon(&mut self.player);
        }
        if input.interact {
            self.interact(inventory);
        }
        if input.consume {
            self.consume(inventory);
        }
    }

    fn interact(&mut self, inventory: &mut Inventory) {
        let Some(npc) = self
            .nearby_npc
            .and_then(|id| self.room.npcs.iter().find(|npc| npc.id == id))
            .map(|npc| npc.kind)
        else {
            return;
        };

        match combat::trade(npc, inventory) {
            Trade::Bought(item) => {
                info!("bought {} for ${}", item.label(), npc.cost());
                self.prompt.notify(format!("{} purchased!", capitalized(item.label())), TRADE_NOTICE);
                self.mission.set(mission_text(self.progress.level, inventory));
                self.cues.push(Cue::Purchased(item));
                self.refresh_offer(inventory);
            }
            Trade::Short { needed } => {
                self.prompt
                    .notify(format!("Not enough money! Need ${needed} more"), TRADE_NOTICE);
            }
        }
    }

    fn consume(&mut self, inventory: &Inventory) {
        if inventory.has_all_quest_items() {
            self.finish(Outcome::Victory);
            return;
        }
        let missing: Vec<&str> = inventory
            .missing_items()
            .into_iter()
            .map(QuestItem::label)
            .collect();
        self.prompt
            .notify(format!("Need: {}!", missing.join(", ")), MISSING_NOTICE);
    }

    /// Applies every overlap found this tick, grouped by kind and in collection order.
    fn resolve_overlaps(&mut self, inventory: &mut Inventory) {
        let player_box = self.player.collider().aabb(self.player.pos);

        for overlap in player_overlaps(player_box, &self.room) {
            match overlap.kind {
                OverlapKind::Door => {
                    let Some(door) = self.room.doors.iter().find(|door| door.id == overlap.id) else {
                        continue;
                    };
                    if self.transition.try_enter(door, self.clock) {
                        info!(
                            "door {:?} -> room {} (level door: {})",
                            door.direction, door.target_room, door.is_level_transition
                        );
                        self.cues.push(Cue::DoorEntered);
                    }
                }
                OverlapKind::Enemy => {
                    let alive = self
                        .room
                        .enemies
                        .iter()
                        .any(|enemy| enemy.id == overlap.id && enemy.is_alive());
                    if alive && combat::hurt_player(&mut self.player, inventory) {
                        self.cues.push(Cue::PlayerHurt);
                    }
                }
                OverlapKind::Projectile => {
                    let Some(index) = self
                        .room
                        .projectiles
                        .iter()
                        .position(|projectile| projectile.id == overlap.id)
                    else {
                        continue;
                    };
                    if combat::hurt_player(&mut self.player, inventory) {
                        self.room.projectiles.remove(index);
                        self.cues.push(Cue::PlayerHurt);
                    }
                }
                OverlapKind::Item => {
                    let Some(index) = self.room.items.iter().position(|item| item.id == overlap.id)
                    else {
                        continue;
                    };
                    let item = self.room.items.remove(index);
                    combat::apply_pickup(item.kind, inventory);
                    if item.kind == ItemKind::Lighter {
                        info!("lighter found");
                        self.mission.set(mission_text(self.progress.level, inventory));
                    }
                    self.cues.push(Cue::Pickup {
                        kind: item.kind,
                        pos: item.pos,
                    });
                }
                OverlapKind::Hazard => {
                    if self.player.vulnerability.is_vulnerable() {
                        inventory.take_damage(CONTACT_DAMAGE);
                        self.player.start_fall();
                        self.cues.push(Cue::Fell);
                    }
                }
            }
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase())
        .into_iter()
        .chain(chars)
        .collect()
}

fn log_room_entry(room: &RoomState) {
    info!(
        "level {} room {}: {} obstacles, {} hazards, {} items, {} enemies, {} npcs",
        room.level,
        room.room_index,
        room.obstacles.len(),
        room.hazards.len(),
        room.items.len(),
        room.enemies.len(),
        room.npcs.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::HudModel;
    use crate::inventory::MAX_HEALTH;
    use crate::room::{build_doors, build_walls, Enemy, EnemyBehavior, EnemyLife, Hazard, Item, Npc, NpcKind};
    use crate::theme::HazardKind;
    use crate::transition::arrival_point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(16);

    /// A session parked in an empty room so each scenario controls exactly what is nearby.
    fn quiet_session(level: u8, inventory: &Inventory) -> (Dungeon, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut dungeon = Dungeon::new(level, inventory, &mut rng, 230.0);
        dungeon.room = RoomState::empty(level, 0);
        (dungeon, rng)
    }

    fn roamer(dungeon: &mut Dungeon, pos: Vec2, health: i32) -> EntityId {
        let id = dungeon.ids.next_id();
        dungeon.room.enemies.push(Enemy {
            id,
            pos,
            velocity: Vec2::ZERO,
            health,
            behavior: EnemyBehavior::Roamer { facing_left: false },
            life: EnemyLife::Alive,
            hit_flash: None,
        });
        id
    }

    #[test]
    fn money_pickup_updates_inventory_and_hud() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        let id = dungeon.ids.next_id();
        dungeon.room.items.push(Item {
            id,
            kind: ItemKind::Money { value: 3 },
            pos: START_POSITION,
        });

        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);

        assert_eq!(inventory.money(), 3);
        assert!(dungeon.room().items.is_empty());
        assert_eq!(HudModel::capture(&dungeon, &inventory).money, "$3");
        assert!(dungeon
            .drain_cues()
            .contains(&Cue::Pickup { kind: ItemKind::Money { value: 3 }, pos: START_POSITION }));
    }

    #[test]
    fn melee_kill_leaves_one_heart_where_the_enemy_stood() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        dungeon.player.facing = Direction::Right;
        let target = START_POSITION + Vec2::new(50.0, 0.0);
        roamer(&mut dungeon, target, 1);

        let input = PlayerInput {
            attack: true,
            ..default()
        };
        dungeon.tick(FRAME, &input, &mut inventory, &mut rng);

        assert!(dungeon.room().enemies.is_empty());
        assert_eq!(dungeon.room().items.len(), 1);
        assert_eq!(dungeon.room().items[0].kind, ItemKind::Heart { value: 1 });
        assert_eq!(dungeon.room().items[0].pos, target);
        assert_eq!(inventory.health(), MAX_HEALTH);
    }

    #[test]
    fn consuming_with_every_item_wins_and_freezes_the_run() {
        let mut inventory = Inventory::default();
        for item in QuestItem::ALL {
            inventory.grant(item);
        }
        let (mut dungeon, mut rng) = quiet_session(3, &inventory);
        roamer(&mut dungeon, START_POSITION, 3);

        let input = PlayerInput {
            consume: true,
            ..default()
        };
        dungeon.tick(FRAME, &input, &mut inventory, &mut rng);
        assert_eq!(dungeon.outcome(), Some(Outcome::Victory));

        let clock = dungeon.clock();
        for _ in 0..120 {
            dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        }
        assert_eq!(inventory.health(), MAX_HEALTH);
        assert_eq!(dungeon.clock(), clock);
    }

    #[test]
    fn consuming_without_items_lists_what_is_missing() {
        let mut inventory = Inventory::default();
        inventory.grant(QuestItem::Papers);
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);

        let input = PlayerInput {
            consume: true,
            ..default()
        };
        dungeon.tick(FRAME, &input, &mut inventory, &mut rng);
        assert_eq!(dungeon.outcome(), None);
        assert_eq!(dungeon.prompt().text(), Some("Need: lighter, weed!"));

        for _ in 0..130 {
            dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        }
        assert_eq!(dungeon.prompt().text(), None);
    }

    #[test]
    fn clerk_refuses_when_short_of_money() {
        let mut inventory = Inventory::default();
        inventory.add_money(10);
        let (mut dungeon, mut rng) = quiet_session(2, &inventory);
        let id = dungeon.ids.next_id();
        dungeon.room.npcs.push(Npc {
            id,
            kind: NpcKind::Clerk,
            pos: START_POSITION + Vec2::new(30.0, 0.0),
        });

        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        assert_eq!(
            dungeon.prompt().text(),
            Some("Press E to buy papers ($20)\nYou have $10")
        );

        let input = PlayerInput {
            interact: true,
            ..default()
        };
        dungeon.tick(FRAME, &input, &mut inventory, &mut rng);
        assert_eq!(dungeon.prompt().text(), Some("Not enough money! Need $10 more"));
        assert_eq!(inventory.money(), 10);
        assert!(!inventory.has(QuestItem::Papers));
    }

    #[test]
    fn clerk_sells_papers_and_updates_mission() {
        let mut inventory = Inventory::default();
        inventory.add_money(25);
        let (mut dungeon, mut rng) = quiet_session(2, &inventory);
        let id = dungeon.ids.next_id();
        dungeon.room.npcs.push(Npc {
            id,
            kind: NpcKind::Clerk,
            pos: START_POSITION + Vec2::new(30.0, 0.0),
        });

        let input = PlayerInput {
            interact: true,
            ..default()
        };
        dungeon.tick(FRAME, &input, &mut inventory, &mut rng);
        assert!(inventory.has(QuestItem::Papers));
        assert_eq!(inventory.money(), 5);
        assert_eq!(dungeon.prompt().text(), Some("Papers purchased!"));
        assert_eq!(dungeon.mission().text(), mission_text(2, &inventory));
    }

    #[test]
    fn game_over_fires_once() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        while !inventory.is_defeated() {
            inventory.take_damage(1);
        }

        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        assert_eq!(dungeon.outcome(), Some(Outcome::GameOver));
        assert!(!dungeon.trigger_game_over());

        let game_overs = dungeon
            .drain_cues()
            .into_iter()
            .filter(|cue| *cue == Cue::GameOver)
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn standing_in_a_door_changes_room_once_per_cooldown() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        dungeon.room.doors = build_doors(&mut dungeon.ids, 1, 0);
        dungeon.room.walls = build_walls(&mut dungeon.ids, &dungeon.room.doors);
        let exit = dungeon.room.doors[0].pos;

        let step = Duration::from_millis(100);
        let mut changes = 0;
        let mut last = dungeon.progress();
        for _ in 0..35 {
            if !dungeon.transition().is_transitioning() {
                dungeon.player.pos = exit;
            }
            dungeon.tick(step, &PlayerInput::default(), &mut inventory, &mut rng);
            if dungeon.progress() != last {
                changes += 1;
                last = dungeon.progress();
            }
        }

        assert_eq!(changes, 1);
        assert_eq!(last, Progress { level: 1, room: 1 });
    }

    #[test]
    fn hazard_fall_costs_health_and_respawns_at_entry() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        let id = dungeon.ids.next_id();
        dungeon.room.hazards.push(Hazard {
            id,
            kind: HazardKind::Spill,
            pos: Vec2::new(800.0, 500.0),
            velocity: Vec2::ZERO,
        });
        dungeon.player.pos = Vec2::new(800.0, 500.0);

        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        assert!(dungeon.player().vulnerability.is_falling());
        assert_eq!(inventory.health(), MAX_HEALTH - 1);

        let input = PlayerInput {
            axis: Vec2::X,
            ..default()
        };
        for _ in 0..10 {
            dungeon.tick(FRAME, &input, &mut inventory, &mut rng);
        }
        assert_eq!(dungeon.player().pos, Vec2::new(800.0, 500.0));

        for _ in 0..40 {
            dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
            if !dungeon.player().vulnerability.is_falling() {
                break;
            }
        }
        assert_eq!(dungeon.player().pos, START_POSITION);
        assert_eq!(inventory.health(), MAX_HEALTH - 1);
    }

    fn projectile_on_player(dungeon: &mut Dungeon) -> EntityId {
        let id = dungeon.ids.next_id();
        dungeon.room.projectiles.push(Projectile {
            id,
            pos: dungeon.player.pos,
            velocity: Vec2::ZERO,
        });
        id
    }

    #[test]
    fn projectile_is_spent_on_a_hit_and_passes_through_while_invincible() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);

        projectile_on_player(&mut dungeon);
        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        assert_eq!(inventory.health(), MAX_HEALTH - 1);
        assert!(dungeon.room().projectiles.is_empty());
        assert!(dungeon.drain_cues().contains(&Cue::PlayerHurt));

        let second = projectile_on_player(&mut dungeon);
        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        assert_eq!(inventory.health(), MAX_HEALTH - 1);
        assert_eq!(dungeon.room().projectiles.len(), 1);
        assert_eq!(dungeon.room().projectiles[0].id, second);
    }

    #[test]
    fn finding_the_lighter_rewrites_the_mission() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        let before = dungeon.mission().text().to_owned();
        for _ in 0..50 {
            dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);
        }
        assert_eq!(dungeon.mission().scale(), 1.0);

        let id = dungeon.ids.next_id();
        dungeon.room.items.push(Item {
            id,
            kind: ItemKind::Lighter,
            pos: START_POSITION,
        });
        dungeon.tick(FRAME, &PlayerInput::default(), &mut inventory, &mut rng);

        assert!(inventory.has(QuestItem::Lighter));
        assert_ne!(dungeon.mission().text(), before);
        assert_eq!(dungeon.mission().text(), mission_text(1, &inventory));
        assert!(dungeon.mission().scale() > 2.0);
    }

    #[test]
    fn level_door_moves_to_the_next_level() {
        let mut inventory = Inventory::default();
        let (mut dungeon, mut rng) = quiet_session(1, &inventory);
        dungeon.progress = Progress { level: 1, room: 2 };
        dungeon.room = RoomState::empty(1, 2);
        dungeon.room.doors = build_doors(&mut dungeon.ids, 1, 2);
        dungeon.room.walls = build_walls(&mut dungeon.ids, &dungeon.room.doors);
        let Some(exit) = dungeon.room.doors.iter().find(|door| door.is_level_transition) else {
            panic!("the last room of level 1 has a level door");
        };
        let (exit_pos, exit_direction) = (exit.pos, exit.direction);

        // Let the door gate open and the opening banner settle.
        let step = Duration::from_millis(100);
        for _ in 0..21 {
            dungeon.tick(step, &PlayerInput::default(), &mut inventory, &mut rng);
        }
        assert_eq!(dungeon.mission().scale(), 1.0);

        dungeon.player.pos = exit_pos;
        for _ in 0..10 {
            dungeon.tick(step, &PlayerInput::default(), &mut inventory, &mut rng);
            if dungeon.progress().level != 1 {
                break;
            }
        }

        assert_eq!(dungeon.progress(), Progress { level: 2, room: 0 });
        assert_eq!(dungeon.room().level, 2);
        assert_eq!(dungeon.room().room_index, 0);
        assert_eq!(dungeon.player().pos, arrival_point(exit_direction));
        assert_eq!(dungeon.mission().text(), mission_text(2, &inventory));
        assert!(dungeon.mission().scale() > 2.0);
    }
}
