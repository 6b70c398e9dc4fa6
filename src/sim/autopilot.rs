//! Idle/demo mode steering
//!
//! Picks a pointer target the way a cautious player would: dodge the closest
//! incoming shot, otherwise grab the nearest pickup, otherwise line up under
//! the nearest enemy.

use glam::Vec2;

use super::state::{BulletOwner, EntityPool};
use crate::config::GameConfig;

/// Enemy bullets closer than this are treated as a threat
const THREAT_RADIUS: f32 = 90.0;
/// How far to sidestep a threat
const DODGE_DISTANCE: f32 = 60.0;
/// Preferred cruising height as a fraction of the window
const CRUISE_HEIGHT: f32 = 0.8;

/// Pointer position the autopilot wants this frame
pub fn steer_target(pool: &EntityPool, config: &GameConfig) -> Vec2 {
    let me = pool.player.pos;
    let cruise_y = config.window.height * CRUISE_HEIGHT;

    // Incoming shot: sidestep perpendicular to its travel
    let threat = pool
        .bullets
        .iter()
        .filter(|b| b.owner == BulletOwner::Enemy)
        .filter(|b| b.vel.dot(me - b.pos) > 0.0)
        .map(|b| (b, b.pos.distance_squared(me)))
        .filter(|&(_, d2)| d2 < THREAT_RADIUS * THREAT_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((bullet, _)) = threat {
        let side = bullet.vel.perp().normalize_or_zero();
        let away = if side.dot(me - bullet.pos) >= 0.0 {
            side
        } else {
            -side
        };
        return me + away * DODGE_DISTANCE;
    }

    let nearest_pickup = pool
        .pickups
        .iter()
        .min_by(|a, b| {
            a.pos
                .distance_squared(me)
                .total_cmp(&b.pos.distance_squared(me))
        })
        .map(|p| p.pos);
    if let Some(pos) = nearest_pickup {
        return pos;
    }

    // Track the nearest enemy horizontally from cruising height
    let nearest_enemy = pool
        .enemies
        .iter()
        .min_by(|a, b| (a.pos.x - me.x).abs().total_cmp(&(b.pos.x - me.x).abs()))
        .map(|e| e.pos.x);
    match nearest_enemy {
        Some(x) => Vec2::new(x, cruise_y),
        None => Vec2::new(config.window.width / 2.0, cruise_y),
    }
}
