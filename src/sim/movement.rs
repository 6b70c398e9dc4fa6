//! Per-frame movement and off-screen retirement

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{EntityPool, Player};
use crate::consts::STAR_SPEED;

/// Window rectangle plus a margin; anything beyond it is retired
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayBounds {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PlayBounds {
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= -self.margin
            && pos.x <= self.width + self.margin
            && pos.y >= -self.margin
            && pos.y <= self.height + self.margin
    }
}

/// Move the player toward `target`, covering at most `max_speed` this frame,
/// and keep the whole ship inside the window.
pub fn steer_player(player: &mut Player, target: Vec2, max_speed: f32, bounds: &PlayBounds) {
    let delta = (target - player.pos).clamp_length_max(max_speed);
    player.pos += delta;

    let r = player.radius;
    player.pos.x = player.pos.x.clamp(r, (bounds.width - r).max(r));
    player.pos.y = player.pos.y.clamp(r, (bounds.height - r).max(r));
}

/// Add each entity's velocity to its position once
pub fn advance(pool: &mut EntityPool) {
    for enemy in &mut pool.enemies {
        enemy.pos += enemy.vel;
    }
    for obstacle in &mut pool.obstacles {
        obstacle.pos += obstacle.vel;
    }
    for bullet in &mut pool.bullets {
        bullet.pos += bullet.vel;
    }
    for pickup in &mut pool.pickups {
        pickup.pos += pickup.vel;
    }
}

/// Drop every entity that left the play bounds. Returns how many were removed.
pub fn retire_out_of_bounds(pool: &mut EntityPool, bounds: &PlayBounds) -> usize {
    let before = pool.live_count();
    pool.enemies.retain(|e| bounds.contains(e.pos));
    pool.obstacles.retain(|o| bounds.contains(o.pos));
    pool.bullets.retain(|b| bounds.contains(b.pos));
    pool.pickups.retain(|p| bounds.contains(p.pos));
    before - pool.live_count()
}

/// Scroll the background down, wrapping stars to the top at a random x
pub fn scroll_stars<R: Rng + ?Sized>(stars: &mut [Vec2], bounds: &PlayBounds, rng: &mut R) {
    for star in stars.iter_mut() {
        star.y += STAR_SPEED;
        if star.y > bounds.height {
            star.y = 0.0;
            star.x = rng.random_range(0.0..=bounds.width);
        }
    }
}
