//! Player volleys and enemy aimed shots

use glam::Vec2;

use super::effects::EffectiveStats;
use super::state::{Bullet, BulletOwner, EntityPool};
use crate::config::GameConfig;
use crate::up_rotated;

/// Velocities for one player volley: a single straight-up shot, or `volley`
/// shots fanned evenly across `spread_rad` centered on straight up.
pub fn volley_velocities(speed: f32, volley: u32, spread_rad: f32) -> Vec<Vec2> {
    if volley <= 1 {
        return vec![Vec2::new(0.0, -speed)];
    }
    let step = spread_rad / (volley - 1) as f32;
    (0..volley)
        .map(|i| up_rotated(-spread_rad / 2.0 + step * i as f32) * speed)
        .collect()
}

/// Fire a volley if the cooldown allows. Returns the number of bullets spawned.
pub fn try_fire_player(
    pool: &mut EntityPool,
    config: &GameConfig,
    stats: &EffectiveStats,
    now_ms: f32,
) -> u32 {
    if now_ms - pool.player.last_fire_ms < stats.fire_delay_ms {
        return 0;
    }
    pool.player.last_fire_ms = now_ms;

    let origin = pool.player.pos;
    let velocities = volley_velocities(
        config.bullet.player_bullet_speed,
        stats.volley,
        stats.spread_rad,
    );
    let count = velocities.len() as u32;
    for vel in velocities {
        pool.push_bullet(Bullet {
            id: 0,
            pos: origin,
            vel,
            radius: config.bullet.radius,
            owner: BulletOwner::Player,
            damage: config.bullet.player_bullet_damage,
        });
    }
    count
}

/// Every enemy whose cooldown elapsed fires one shot aimed at the player.
/// Returns the number of shots.
pub fn fire_enemies(pool: &mut EntityPool, config: &GameConfig, level: u32, now_ms: f32) -> u32 {
    let speed = config.bullet.enemy_bullet_base_speed
        + level as f32 * config.bullet.enemy_bullet_speed_per_level;
    let target = pool.player.pos;

    let mut shots = Vec::new();
    for enemy in &mut pool.enemies {
        if now_ms - enemy.last_fire_ms >= enemy.fire_delay_ms {
            enemy.last_fire_ms = now_ms;
            let dir = (target - enemy.pos).normalize_or(Vec2::Y);
            shots.push((enemy.pos, dir * speed));
        }
    }

    let count = shots.len() as u32;
    for (pos, vel) in shots {
        pool.push_bullet(Bullet {
            id: 0,
            pos,
            vel,
            radius: config.bullet.radius,
            owner: BulletOwner::Enemy,
            damage: config.bullet.enemy_bullet_damage,
        });
    }
    count
}
