//! Collision detection and damage resolution
//!
//! All shapes are circles, tested with squared distances. What happens on
//! contact is looked up by the ordered pair of entity kinds, so the resolver
//! never inspects concrete types. Removals are collected during each pass
//! and applied afterwards with `retain`.

use glam::Vec2;
use rand::Rng;

use super::effects::{EffectiveStats, PowerUpKind, granted_duration_ms, mitigate};
use super::spawner::roll_drop;
use super::state::{
    BulletOwner, DamageSource, EntityKind, EntityPool, GameEvent, PickupKind, take_damage,
};
use crate::circles_overlap;
use crate::tuning::Tuning;

/// Contact rule for an ordered pair of entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// A bullet damages the target and is spent
    Strike,
    /// The player is damaged; `consume` removes the other entity
    HarmPlayer { source: DamageSource, consume: bool },
    /// The player collects the pickup
    Collect,
}

/// Interaction table. Pairs not listed pass through each other.
pub fn interaction(a: EntityKind, b: EntityKind) -> Option<Interaction> {
    use EntityKind::*;
    match (a, b) {
        (PlayerBullet, Enemy) | (PlayerBullet, Obstacle) => Some(Interaction::Strike),
        (EnemyBullet, Player) => Some(Interaction::HarmPlayer {
            source: DamageSource::EnemyBullet,
            consume: true,
        }),
        (Enemy, Player) => Some(Interaction::HarmPlayer {
            source: DamageSource::EnemyContact,
            consume: true,
        }),
        // Obstacles break on the ship; only the player takes damage.
        (Obstacle, Player) => Some(Interaction::HarmPlayer {
            source: DamageSource::ObstacleContact,
            consume: true,
        }),
        (Player, Pickup) => Some(Interaction::Collect),
        _ => None,
    }
}

/// Something a player bullet can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Enemy(usize),
    Obstacle(usize),
}

/// Nearest overlapping candidate by squared distance
pub fn nearest_hit(
    pos: Vec2,
    radius: f32,
    candidates: impl IntoIterator<Item = (Target, Vec2, f32)>,
) -> Option<Target> {
    candidates
        .into_iter()
        .filter(|&(_, c_pos, c_radius)| circles_overlap(pos, radius, c_pos, c_radius))
        .map(|(target, c_pos, _)| (target, pos.distance_squared(c_pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(target, _)| target)
}

/// Side effects the frame driver still has to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// A nuke was collected this frame
    pub nuke: bool,
    /// Pickups dropped by destroyed targets
    pub drops: u32,
}

/// Resolve every contact in the pool for this frame
pub fn resolve_collisions<R: Rng + ?Sized>(
    pool: &mut EntityPool,
    tuning: &Tuning,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) -> Resolution {
    let config = &tuning.config;
    let mut resolution = Resolution::default();
    let mut wrecks: Vec<Vec2> = Vec::new();

    // --- BULLETS ---
    {
        let EntityPool {
            player,
            enemies,
            obstacles,
            bullets,
            ..
        } = &mut *pool;
        let damage_factor = EffectiveStats::of(player, &config.powerups).damage_factor;
        let mut spent = vec![false; bullets.len()];

        for (bullet, used) in bullets.iter().zip(spent.iter_mut()) {
            match bullet.owner {
                BulletOwner::Player => {
                    let kind = bullet.kind();
                    let candidates = enemies
                        .iter()
                        .enumerate()
                        .filter(|(_, e)| e.health > 0)
                        .filter(|_| interaction(kind, EntityKind::Enemy).is_some())
                        .map(|(i, e)| (Target::Enemy(i), e.pos, e.radius))
                        .chain(
                            obstacles
                                .iter()
                                .enumerate()
                                .filter(|(_, o)| o.health > 0)
                                .filter(|_| interaction(kind, EntityKind::Obstacle).is_some())
                                .map(|(i, o)| (Target::Obstacle(i), o.pos, o.radius)),
                        );
                    let Some(target) = nearest_hit(bullet.pos, bullet.radius, candidates) else {
                        continue;
                    };
                    *used = true;
                    match target {
                        Target::Enemy(i) => {
                            let enemy = &mut enemies[i];
                            if take_damage(&mut enemy.health, bullet.damage) {
                                events.push(GameEvent::EnemyDestroyed { id: enemy.id });
                                wrecks.push(enemy.pos);
                            } else {
                                events.push(GameEvent::EnemyHit { id: enemy.id });
                            }
                        }
                        Target::Obstacle(i) => {
                            let obstacle = &mut obstacles[i];
                            if take_damage(&mut obstacle.health, bullet.damage) {
                                events.push(GameEvent::ObstacleDestroyed { id: obstacle.id });
                                wrecks.push(obstacle.pos);
                            } else {
                                events.push(GameEvent::ObstacleHit { id: obstacle.id });
                            }
                        }
                    }
                }
                BulletOwner::Enemy => {
                    let Some(Interaction::HarmPlayer { source, consume }) =
                        interaction(bullet.kind(), EntityKind::Player)
                    else {
                        continue;
                    };
                    if circles_overlap(bullet.pos, bullet.radius, player.pos, player.radius) {
                        let dealt = mitigate(bullet.damage, damage_factor);
                        player.take_damage(dealt);
                        events.push(GameEvent::PlayerHit {
                            damage: dealt,
                            source,
                        });
                        *used = consume;
                    }
                }
            }
        }

        let mut flags = spent.into_iter();
        bullets.retain(|_| !flags.next().unwrap_or(false));
        enemies.retain(|e| e.health > 0);
        obstacles.retain(|o| o.health > 0);
    }

    // --- CONTACT ---
    {
        let EntityPool {
            player,
            enemies,
            obstacles,
            ..
        } = &mut *pool;
        let damage_factor = EffectiveStats::of(player, &config.powerups).damage_factor;

        if let Some(Interaction::HarmPlayer { source, consume }) =
            interaction(EntityKind::Enemy, EntityKind::Player)
        {
            enemies.retain(|enemy| {
                if !circles_overlap(enemy.pos, enemy.radius, player.pos, player.radius) {
                    return true;
                }
                let dealt = mitigate(config.player.collision_with_enemy_damage, damage_factor);
                player.take_damage(dealt);
                events.push(GameEvent::PlayerHit {
                    damage: dealt,
                    source,
                });
                !consume
            });
        }

        if let Some(Interaction::HarmPlayer { source, consume }) =
            interaction(EntityKind::Obstacle, EntityKind::Player)
        {
            obstacles.retain(|obstacle| {
                if !circles_overlap(obstacle.pos, obstacle.radius, player.pos, player.radius) {
                    return true;
                }
                let dealt = mitigate(obstacle.collision_damage, damage_factor);
                player.take_damage(dealt);
                events.push(GameEvent::PlayerHit {
                    damage: dealt,
                    source,
                });
                !consume
            });
        }
    }

    // --- PICKUPS ---
    // A ship destroyed earlier in this pass collects nothing
    if pool.player.is_alive()
        && interaction(EntityKind::Player, EntityKind::Pickup) == Some(Interaction::Collect)
    {
        let EntityPool {
            player, pickups, ..
        } = &mut *pool;
        pickups.retain(|pickup| {
            if !circles_overlap(pickup.pos, pickup.radius, player.pos, player.radius) {
                return true;
            }
            match pickup.kind {
                PickupKind::Health { restore } => {
                    let restored = player.heal(restore);
                    events.push(GameEvent::HealthCollected { restored });
                }
                PickupKind::PowerUp { kind, rarity } => {
                    let duration = granted_duration_ms(config, kind, rarity);
                    let refreshed = player.effects.activate(kind, duration);
                    log::debug!(
                        "Power-up {} ({:?}) for {}ms, refreshed={}",
                        kind.as_str(),
                        rarity,
                        duration,
                        refreshed
                    );
                    if kind == PowerUpKind::Nuke {
                        resolution.nuke = true;
                    }
                    events.push(GameEvent::PowerUpCollected { kind, rarity });
                }
            }
            false
        });
    }

    // --- DROPS ---
    for pos in wrecks {
        if roll_drop(pool, tuning, pos, rng) {
            resolution.drops += 1;
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::{Bullet, Enemy, Obstacle, Pickup, Rarity};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn tuning() -> Tuning {
        let mut config = GameConfig::default();
        config.pickup.drop_chance = 0.0;
        Tuning::new(config).unwrap()
    }

    fn player_bullet(pos: Vec2, damage: i32) -> Bullet {
        Bullet {
            id: 0,
            pos,
            vel: Vec2::new(0.0, -10.0),
            radius: 4.0,
            owner: BulletOwner::Player,
            damage,
        }
    }

    fn enemy_bullet(pos: Vec2) -> Bullet {
        Bullet {
            id: 0,
            pos,
            vel: Vec2::new(0.0, 4.0),
            radius: 4.0,
            owner: BulletOwner::Enemy,
            damage: 5,
        }
    }

    fn enemy(pos: Vec2, health: i32) -> Enemy {
        Enemy {
            id: 0,
            pos,
            vel: Vec2::new(0.0, 2.0),
            radius: 15.0,
            health,
            fire_delay_ms: 1500.0,
            last_fire_ms: 0.0,
        }
    }

    fn obstacle(pos: Vec2, health: i32) -> Obstacle {
        Obstacle {
            id: 0,
            pos,
            vel: Vec2::new(0.0, 1.0),
            radius: 20.0,
            health,
            collision_damage: 15,
        }
    }

    #[test]
    fn test_interaction_table() {
        use EntityKind::*;
        assert_eq!(interaction(PlayerBullet, Enemy), Some(Interaction::Strike));
        assert_eq!(interaction(Player, Pickup), Some(Interaction::Collect));
        assert_eq!(interaction(EnemyBullet, Enemy), None);
        assert_eq!(interaction(PlayerBullet, Player), None);
        assert_eq!(interaction(Enemy, Obstacle), None);
    }

    #[test]
    fn test_touching_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 3.0, Vec2::new(5.0, 0.0), 2.0));
        assert!(!circles_overlap(Vec2::ZERO, 3.0, Vec2::new(5.01, 0.0), 2.0));
    }

    #[test]
    fn test_obstacle_breaks_on_second_hit() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let rock = Vec2::new(400.0, 100.0);
        pool.push_obstacle(obstacle(rock, 5));

        pool.push_bullet(player_bullet(rock, 3));
        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.obstacles.len(), 1);
        assert_eq!(pool.obstacles[0].health, 2);
        assert!(pool.bullets.is_empty());

        pool.push_bullet(player_bullet(rock, 3));
        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert!(pool.obstacles.is_empty());
        assert!(pool.bullets.is_empty());
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::ObstacleDestroyed { .. }))
        );
    }

    #[test]
    fn test_bullet_hits_only_nearest_target() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.push_enemy(enemy(Vec2::new(410.0, 100.0), 3));
        pool.push_obstacle(obstacle(Vec2::new(395.0, 100.0), 5));
        pool.push_bullet(player_bullet(Vec2::new(400.0, 100.0), 1));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.obstacles[0].health, 4);
        assert_eq!(pool.enemies[0].health, 3);
        assert!(pool.bullets.is_empty());
    }

    #[test]
    fn test_bullets_skip_target_destroyed_earlier_in_pass() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let at = Vec2::new(400.0, 100.0);
        pool.push_enemy(enemy(at, 1));
        pool.push_bullet(player_bullet(at, 1));
        pool.push_bullet(player_bullet(at, 1));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert!(pool.enemies.is_empty());
        assert_eq!(pool.bullets.len(), 1);
    }

    #[test]
    fn test_shield_blocks_enemy_bullet() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.player.effects.activate(PowerUpKind::Shield, 1000.0);
        let before = pool.player.health;
        pool.push_bullet(enemy_bullet(pool.player.pos));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.player.health, before);
        assert!(pool.bullets.is_empty());
    }

    #[test]
    fn test_enemy_bullet_damages_unshielded_player() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.push_bullet(enemy_bullet(pool.player.pos));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.player.health, 95);
        assert!(events.contains(&GameEvent::PlayerHit {
            damage: 5,
            source: DamageSource::EnemyBullet
        }));
    }

    #[test]
    fn test_contact_damage_consumes_enemy_and_obstacle() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let at = pool.player.pos;
        pool.push_enemy(enemy(at, 3));
        pool.push_obstacle(obstacle(at + Vec2::new(0.0, 10.0), 5));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert!(pool.enemies.is_empty());
        assert!(pool.obstacles.is_empty());
        assert_eq!(pool.player.health, 100 - 20 - 15);
    }

    #[test]
    fn test_shield_blocks_contact_damage_but_still_consumes() {
        let mut config = GameConfig::default();
        config.pickup.drop_chance = 0.0;
        config.powerups.shield.damage_reduction = 1.0;
        let tuning = Tuning::new(config).unwrap();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.player.effects.activate(PowerUpKind::Shield, 1000.0);
        let before = pool.player.health;
        let at = pool.player.pos;
        pool.push_enemy(enemy(at, 3));
        pool.push_obstacle(obstacle(at + Vec2::new(0.0, 10.0), 5));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.player.health, before);
        assert!(pool.enemies.is_empty());
        assert!(pool.obstacles.is_empty());
        assert!(events.contains(&GameEvent::PlayerHit {
            damage: 0,
            source: DamageSource::ObstacleContact
        }));
    }

    #[test]
    fn test_dead_player_collects_nothing() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.player.health = 5;
        let at = pool.player.pos;
        pool.push_bullet(enemy_bullet(at));
        pool.push_pickup(Pickup {
            id: 0,
            pos: at,
            vel: Vec2::ZERO,
            radius: 10.0,
            kind: PickupKind::PowerUp {
                kind: PowerUpKind::Nuke,
                rarity: Rarity::Common,
            },
        });

        let resolution = resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.player.health, 0);
        assert!(!resolution.nuke);
        assert_eq!(pool.pickups.len(), 1);
        assert!(pool.player.effects.is_empty());
    }

    #[test]
    fn test_health_never_negative() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.player.health = 3;
        pool.push_enemy(enemy(pool.player.pos, 3));

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(pool.player.health, 0);
    }

    #[test]
    fn test_health_pickup_collected_at_full_health() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.push_pickup(Pickup {
            id: 0,
            pos: pool.player.pos,
            vel: Vec2::new(0.0, 1.0),
            radius: 10.0,
            kind: PickupKind::Health { restore: 20 },
        });

        resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert!(pool.pickups.is_empty());
        assert_eq!(pool.player.health, pool.player.max_health);
        assert!(events.contains(&GameEvent::HealthCollected { restored: 0 }));
    }

    #[test]
    fn test_power_up_pickup_activates_scaled_duration() {
        let tuning = tuning();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        pool.push_pickup(Pickup {
            id: 0,
            pos: pool.player.pos,
            vel: Vec2::new(0.0, 1.0),
            radius: 10.0,
            kind: PickupKind::PowerUp {
                kind: PowerUpKind::RapidFire,
                rarity: Rarity::Rare,
            },
        });

        let resolution = resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert!(!resolution.nuke);
        assert_eq!(
            pool.player.effects.remaining_ms(PowerUpKind::RapidFire),
            Some(6000.0 * 2.0)
        );
    }

    #[test]
    fn test_destroyed_enemy_can_drop_pickup() {
        let mut config = GameConfig::default();
        config.pickup.drop_chance = 1.0;
        let tuning = Tuning::new(config).unwrap();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        let at = Vec2::new(100.0, 100.0);
        pool.push_enemy(enemy(at, 1));
        pool.push_bullet(player_bullet(at, 1));

        let resolution = resolve_collisions(&mut pool, &tuning, &mut rng, &mut events);
        assert_eq!(resolution.drops, 1);
        assert_eq!(pool.pickups.len(), 1);
        assert_eq!(pool.pickups[0].pos, at);
    }

    proptest! {
        #[test]
        fn prop_overlap_iff_squared_distance_within_reach(
            ax in -1000.0f32..1000.0, ay in -1000.0f32..1000.0,
            bx in -1000.0f32..1000.0, by in -1000.0f32..1000.0,
            r1 in 0.1f32..100.0, r2 in 0.1f32..100.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let d2 = a.distance_squared(b);
            let reach = (r1 + r2) * (r1 + r2);
            prop_assert_eq!(circles_overlap(a, r1, b, r2), d2 <= reach);
        }
    }
}
