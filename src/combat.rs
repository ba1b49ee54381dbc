//! Damage rules: melee strikes, the returning thrown weapon, contact damage, pickups and trades.
//!
//! Every function here checks its own guards (liveness, vulnerability, lockouts), so the caller
//! can resolve a whole frame of overlaps in order without double-applying anything.

use std::time::Duration;

use bevy::prelude::*;

use crate::collision::move_and_collide;
use crate::dungeon::Cue;
use crate::inventory::{Inventory, QuestItem};
use crate::player::{AttackState, PlayerState, ThrownWeapon, ATTACK_WINDOW};
use crate::room::{Enemy, EnemyBehavior, EnemyLife, IdAllocator, Item, ItemKind, NpcKind, RoomState};

pub const MELEE_REACH: f32 = 40.0;
pub const MELEE_RADIUS: f32 = 40.0;
pub const THROW_SPEED: f32 = 300.0;
pub const THROW_RANGE: f32 = 200.0;
pub const RETURN_SPEED: f32 = 250.0;
pub const CATCH_RADIUS: f32 = 30.0;
pub const THROW_HIT_RADIUS: f32 = 30.0;
pub const THROW_LOCKOUT: Duration = Duration::from_millis(500);
pub const HIT_FLASH: Duration = Duration::from_millis(200);
pub const DEATH_FADE: Duration = Duration::from_millis(2000);
pub const CONTACT_DAMAGE: u32 = 1;
const WEAPON_SPIN: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    Wounded,
    Defeated,
}

/// Deals `amount` to a living enemy. Roamers die on the spot; shooters fade out over two seconds
/// and take no further part in play meanwhile.
pub fn strike_enemy(enemy: &mut Enemy, amount: i32) -> Option<Strike> {
    if !enemy.is_alive() {
        return None;
    }

    enemy.health -= amount;
    enemy.hit_flash = Some(Timer::new(HIT_FLASH, TimerMode::Once));
    if enemy.health > 0 {
        return Some(Strike::Wounded);
    }

    enemy.velocity = Vec2::ZERO;
    enemy.life = match enemy.behavior {
        EnemyBehavior::Roamer { .. } => EnemyLife::Dead,
        EnemyBehavior::Shooter(_) => EnemyLife::Dying(Timer::new(DEATH_FADE, TimerMode::Once)),
    };
    Some(Strike::Defeated)
}

/// Strikes the enemy at `index` and drops a heart where it falls.
fn hit_enemy(room: &mut RoomState, ids: &mut IdAllocator, index: usize, cues: &mut Vec<Cue>) {
    let enemy = &mut room.enemies[index];
    let pos = enemy.pos;
    match strike_enemy(enemy, 1) {
        Some(Strike::Wounded) => cues.push(Cue::EnemyHit { pos }),
        Some(Strike::Defeated) => {
            debug!("enemy {:?} defeated at {pos}", enemy.id);
            room.items.push(Item {
                id: ids.next_id(),
                kind: ItemKind::Heart { value: 1 },
                pos,
            });
            cues.push(Cue::EnemyDefeated { pos });
        }
        None => {}
    }
}

/// Swings at the point `MELEE_REACH` ahead of the player. Returns false while the previous swing
/// is still striking or recovering.
pub fn melee(
    player: &mut PlayerState,
    room: &mut RoomState,
    ids: &mut IdAllocator,
    cues: &mut Vec<Cue>,
) -> bool {
    if !player.attack.can_attack() {
        return false;
    }

    let point = player.pos + player.facing.unit() * MELEE_REACH;
    player.attack = AttackState::Striking(Timer::new(ATTACK_WINDOW, TimerMode::Once));
    cues.push(Cue::Slash {
        pos: point,
        facing: player.facing,
    });

    let targets: Vec<usize> = room
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_alive() && enemy.pos.distance(point) < MELEE_RADIUS)
        .map(|(index, _)| index)
        .collect();
    for index in targets {
        hit_enemy(room, ids, index, cues);
    }
    true
}

/// Launches the thrown weapon in the facing direction if it is in hand.
pub fn throw_weapon(player: &mut PlayerState) -> bool {
    if !player.can_throw() {
        return false;
    }
    player.thrown = Some(ThrownWeapon {
        pos: player.pos,
        origin: player.pos,
        velocity: player.facing.unit() * THROW_SPEED,
        returning: false,
        spin: 0.0,
        lockouts: Vec::new(),
    });
    true
}

/// Flies the thrown weapon out until it hits a solid or its range, then homes back to the
/// player. Each enemy can be struck once per `THROW_LOCKOUT`.
pub fn update_thrown(
    player: &mut PlayerState,
    room: &mut RoomState,
    ids: &mut IdAllocator,
    dt: Duration,
    cues: &mut Vec<Cue>,
) {
    let holder = player.pos;
    let Some(weapon) = player.thrown.as_mut() else {
        return;
    };
    let secs = dt.as_secs_f32();

    weapon.lockouts.retain_mut(|(_, timer)| !timer.tick(dt).finished());
    weapon.spin += WEAPON_SPIN * secs;

    if weapon.returning {
        weapon.velocity = (holder - weapon.pos).normalize_or_zero() * RETURN_SPEED;
        weapon.pos += weapon.velocity * secs;
        if weapon.pos.distance(holder) < CATCH_RADIUS {
            player.thrown = None;
            return;
        }
    } else {
        let half = weapon.collider().half_extents;
        let blocked = move_and_collide(&mut weapon.pos, weapon.velocity, half, secs, &room.solids());
        if blocked.any() || weapon.pos.distance(weapon.origin) > THROW_RANGE {
            weapon.returning = true;
        }
    }

    let targets: Vec<usize> = room
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| {
            enemy.is_alive()
                && !weapon.is_locked_out(enemy.id)
                && enemy.pos.distance(weapon.pos) < THROW_HIT_RADIUS
        })
        .map(|(index, _)| index)
        .collect();
    for index in targets {
        weapon
            .lockouts
            .push((room.enemies[index].id, Timer::new(THROW_LOCKOUT, TimerMode::Once)));
        hit_enemy(room, ids, index, cues);
    }
}

/// Contact damage from an enemy body or projectile. Ignored unless the player is vulnerable.
pub fn hurt_player(player: &mut PlayerState, inventory: &mut Inventory) -> bool {
    if !player.vulnerability.is_vulnerable() {
        return false;
    }
    inventory.take_damage(CONTACT_DAMAGE);
    player.start_invincibility();
    true
}

pub fn apply_pickup(kind: ItemKind, inventory: &mut Inventory) {
    match kind {
        ItemKind::Money { value } => inventory.add_money(value),
        ItemKind::Heart { value } => inventory.heal(value),
        ItemKind::Lighter => inventory.grant(QuestItem::Lighter),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trade {
    Bought(QuestItem),
    Short { needed: u32 },
}

/// Buys whatever `npc` sells if the player can afford it. A failed trade changes nothing.
pub fn trade(npc: NpcKind, inventory: &mut Inventory) -> Trade {
    let cost = npc.cost();
    if inventory.spend_money(cost) {
        inventory.grant(npc.sells());
        Trade::Bought(npc.sells())
    } else {
        Trade::Short {
            needed: cost - inventory.money(),
        }
    }
}

/// Advances hit flashes and death fades, then drops enemies whose fade has finished.
pub fn tick_enemy_timers(room: &mut RoomState, dt: Duration) {
    for enemy in &mut room.enemies {
        if let Some(flash) = &mut enemy.hit_flash {
            if flash.tick(dt).finished() {
                enemy.hit_flash = None;
            }
        }
        if let EnemyLife::Dying(fade) = &mut enemy.life {
            if fade.tick(dt).finished() {
                enemy.life = EnemyLife::Dead;
            }
        }
    }
    room.remove_dead_enemies();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::START_POSITION;
    use crate::player::INVINCIBILITY;
    use crate::room::{Direction, EntityId, Obstacle, ObstacleKind, ShooterState};

    fn roamer(id: u32, pos: Vec2, health: i32) -> Enemy {
        Enemy {
            id: EntityId(id),
            pos,
            velocity: Vec2::new(30.0, 0.0),
            health,
            behavior: EnemyBehavior::Roamer { facing_left: false },
            life: EnemyLife::Alive,
            hit_flash: None,
        }
    }

    fn shooter(id: u32, pos: Vec2) -> Enemy {
        Enemy {
            behavior: EnemyBehavior::Shooter(ShooterState {
                last_shot: Duration::ZERO,
                roam_angle: 0.0,
                roam_speed: 40.0,
                roam_deadline: Duration::ZERO,
                firing: None,
            }),
            ..roamer(id, pos, 1)
        }
    }

    fn facing_right() -> PlayerState {
        let mut player = PlayerState::new(START_POSITION);
        player.facing = Direction::Right;
        player
    }

    #[test]
    fn melee_kill_drops_exactly_one_heart() {
        let mut room = RoomState::empty(1, 0);
        let mut ids = IdAllocator::default();
        let mut cues = Vec::new();
        let mut player = facing_right();
        room.enemies.push(roamer(1, START_POSITION + Vec2::new(45.0, 0.0), 1));

        assert!(melee(&mut player, &mut room, &mut ids, &mut cues));
        assert!(!room.enemies[0].is_alive());
        let hearts = room
            .items
            .iter()
            .filter(|item| item.kind == ItemKind::Heart { value: 1 })
            .count();
        assert_eq!(hearts, 1);

        // A dead enemy cannot be struck again, even after the cooldown.
        player.attack = AttackState::Ready;
        melee(&mut player, &mut room, &mut ids, &mut cues);
        assert_eq!(room.items.len(), 1);
    }

    #[test]
    fn melee_respects_cooldown() {
        let mut room = RoomState::empty(1, 0);
        let mut ids = IdAllocator::default();
        let mut cues = Vec::new();
        let mut player = facing_right();
        room.enemies.push(roamer(1, START_POSITION + Vec2::new(40.0, 0.0), 5));

        assert!(melee(&mut player, &mut room, &mut ids, &mut cues));
        assert!(!melee(&mut player, &mut room, &mut ids, &mut cues));
        assert_eq!(room.enemies[0].health, 4);
    }

    #[test]
    fn defeated_shooter_fades_before_removal() {
        let mut room = RoomState::empty(2, 0);
        room.enemies.push(shooter(1, ROOM_POINT));
        assert_eq!(strike_enemy(&mut room.enemies[0], 1), Some(Strike::Defeated));
        assert!(matches!(room.enemies[0].life, EnemyLife::Dying(_)));
        assert_eq!(room.enemies[0].velocity, Vec2::ZERO);

        tick_enemy_timers(&mut room, Duration::from_millis(1999));
        assert_eq!(room.enemies.len(), 1);
        tick_enemy_timers(&mut room, Duration::from_millis(1));
        assert!(room.enemies.is_empty());
    }

    const ROOM_POINT: Vec2 = Vec2::new(500.0, 400.0);

    #[test]
    fn thrown_weapon_returns_after_range_and_is_caught() {
        let mut room = RoomState::empty(1, 0);
        let mut ids = IdAllocator::default();
        let mut cues = Vec::new();
        let mut player = facing_right();
        assert!(throw_weapon(&mut player));
        assert!(!throw_weapon(&mut player));

        let step = Duration::from_millis(50);
        let mut turned = false;
        for _ in 0..100 {
            update_thrown(&mut player, &mut room, &mut ids, step, &mut cues);
            match &player.thrown {
                Some(weapon) => {
                    turned |= weapon.returning;
                    assert!(weapon.pos.distance(weapon.origin) < THROW_RANGE + THROW_SPEED * 0.05 + 1.0);
                }
                None => break,
            }
        }
        assert!(turned);
        assert!(player.thrown.is_none());
    }

    #[test]
    fn thrown_weapon_turns_back_at_an_obstacle() {
        let mut room = RoomState::empty(1, 0);
        let mut ids = IdAllocator::default();
        let mut cues = Vec::new();
        let mut player = facing_right();
        let crate_box = Obstacle {
            id: ids.next_id(),
            kind: ObstacleKind::Crate,
            pos: START_POSITION + Vec2::new(60.0, 0.0),
            half_extents: Vec2::splat(20.0),
        };
        let face = crate_box.rect().min.x;
        room.obstacles.push(crate_box);
        throw_weapon(&mut player);

        let step = Duration::from_millis(50);
        for _ in 0..10 {
            update_thrown(&mut player, &mut room, &mut ids, step, &mut cues);
            if player.thrown.as_ref().is_some_and(|weapon| weapon.returning) {
                break;
            }
        }

        let Some(weapon) = player.thrown.as_ref() else {
            panic!("weapon caught before it reached the crate");
        };
        assert!(weapon.returning);
        assert!(weapon.pos.x + weapon.collider().half_extents.x <= face + 0.01);
        assert!(weapon.pos.distance(weapon.origin) < THROW_RANGE);
    }

    #[test]
    fn thrown_weapon_hits_each_enemy_once_per_lockout() {
        let mut room = RoomState::empty(1, 0);
        let mut ids = IdAllocator::default();
        let mut cues = Vec::new();
        let mut player = facing_right();
        room.enemies.push(roamer(7, START_POSITION + Vec2::new(20.0, 0.0), 5));
        throw_weapon(&mut player);

        update_thrown(&mut player, &mut room, &mut ids, Duration::from_millis(10), &mut cues);
        update_thrown(&mut player, &mut room, &mut ids, Duration::from_millis(10), &mut cues);
        assert_eq!(room.enemies[0].health, 4);
    }

    #[test]
    fn contact_damage_only_when_vulnerable() {
        let mut player = PlayerState::new(START_POSITION);
        let mut inventory = Inventory::default();
        assert!(hurt_player(&mut player, &mut inventory));
        assert!(!hurt_player(&mut player, &mut inventory));
        assert_eq!(inventory.health(), crate::inventory::MAX_HEALTH - 1);
    }

    #[test]
    fn contact_damage_lands_again_after_invincibility() {
        let mut player = PlayerState::new(START_POSITION);
        let mut inventory = Inventory::default();
        assert!(hurt_player(&mut player, &mut inventory));

        player.tick_timers(INVINCIBILITY - Duration::from_millis(1));
        assert!(!hurt_player(&mut player, &mut inventory));

        player.tick_timers(Duration::from_millis(1));
        assert!(player.vulnerability.is_vulnerable());
        assert!(hurt_player(&mut player, &mut inventory));
        assert_eq!(inventory.health(), crate::inventory::MAX_HEALTH - 2);
    }

    #[test]
    fn trade_needs_enough_money() {
        let mut inventory = Inventory::default();
        inventory.add_money(10);
        assert_eq!(trade(NpcKind::Clerk, &mut inventory), Trade::Short { needed: 10 });
        assert_eq!(inventory.money(), 10);
        assert!(!inventory.has(QuestItem::Papers));

        inventory.add_money(15);
        assert_eq!(trade(NpcKind::Clerk, &mut inventory), Trade::Bought(QuestItem::Papers));
        assert_eq!(inventory.money(), 5);
        assert!(inventory.has(QuestItem::Papers));
    }

    #[test]
    fn pickups_apply_their_effect() {
        let mut inventory = Inventory::default();
        apply_pickup(ItemKind::Money { value: 3 }, &mut inventory);
        apply_pickup(ItemKind::Lighter, &mut inventory);
        inventory.take_damage(2);
        apply_pickup(ItemKind::Heart { value: 1 }, &mut inventory);
        assert_eq!(inventory.money(), 3);
        assert!(inventory.has(QuestItem::Lighter));
        assert_eq!(inventory.health(), crate::inventory::MAX_HEALTH - 1);
    }
}
