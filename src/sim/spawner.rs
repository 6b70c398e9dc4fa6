//! Time-driven wave spawning and the difficulty curve
//!
//! Difficulty is a step function of session time: one level per
//! `time_scale_ms`. Every quantity derived from it is monotone, and the wave
//! interval is floored at `wave_interval_min_ms`.

use glam::Vec2;
use rand::Rng;

use super::state::{Enemy, EntityPool, Obstacle, Pickup, PickupKind};
use crate::config::DifficultyConfig;
use crate::tuning::Tuning;

/// Difficulty level reached after `elapsed_ms` of session time
pub fn difficulty_level(elapsed_ms: f32, difficulty: &DifficultyConfig) -> u32 {
    (elapsed_ms.max(0.0) / difficulty.time_scale_ms).floor() as u32
}

/// Interval between waves at `elapsed_ms`, never below the configured floor
pub fn wave_interval_ms(elapsed_ms: f32, difficulty: &DifficultyConfig) -> f32 {
    let level = difficulty_level(elapsed_ms, difficulty) as f32;
    (difficulty.wave_interval_start_ms - difficulty.wave_interval_decrement_ms * level)
        .max(difficulty.wave_interval_min_ms)
}

/// Whether a new wave is due
pub fn wave_due(elapsed_ms: f32, last_wave_ms: f32, difficulty: &DifficultyConfig) -> bool {
    elapsed_ms - last_wave_ms >= wave_interval_ms(elapsed_ms, difficulty)
}

pub fn enemies_per_wave(level: u32, difficulty: &DifficultyConfig) -> u32 {
    1 + (level as f32 * difficulty.enemy_spawn_factor).floor() as u32
}

pub fn obstacles_per_wave(level: u32, difficulty: &DifficultyConfig) -> u32 {
    ((level as f32 / difficulty.obstacle_spawn_factor).floor() as u32).max(1)
}

/// What a wave put into the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaveReport {
    pub enemies: u32,
    pub obstacles: u32,
    pub pickup: bool,
}

/// Spawn one wave of enemies and obstacles, plus a pickup by chance
pub fn spawn_wave<R: Rng + ?Sized>(
    pool: &mut EntityPool,
    tuning: &Tuning,
    level: u32,
    now_ms: f32,
    rng: &mut R,
) -> WaveReport {
    let difficulty = &tuning.config.difficulty;
    let enemies = enemies_per_wave(level, difficulty);
    let obstacles = obstacles_per_wave(level, difficulty);

    for _ in 0..enemies {
        spawn_enemy(pool, tuning, level, now_ms, rng);
    }
    for _ in 0..obstacles {
        spawn_obstacle(pool, tuning, rng);
    }

    let pickup = rng.random_bool(f64::from(difficulty.pickup_chance));
    if pickup {
        let radius = tuning.config.pickup.radius;
        let x = random_x(tuning, radius, rng);
        spawn_pickup_at(pool, tuning, Vec2::new(x, -radius), rng);
    }

    log::debug!(
        "Wave at level {}: {} enemies, {} obstacles, pickup={}",
        level,
        enemies,
        obstacles,
        pickup
    );
    WaveReport {
        enemies,
        obstacles,
        pickup,
    }
}

pub fn spawn_enemy<R: Rng + ?Sized>(
    pool: &mut EntityPool,
    tuning: &Tuning,
    level: u32,
    now_ms: f32,
    rng: &mut R,
) -> u32 {
    let e = &tuning.config.enemy;
    let x = random_x(tuning, e.radius, rng);
    let speed = e.base_speed + level as f32 * e.speed_per_level;
    pool.push_enemy(Enemy {
        id: 0,
        pos: Vec2::new(x, -e.radius),
        vel: Vec2::new(0.0, speed),
        radius: e.radius,
        health: e.initial_health,
        fire_delay_ms: e.fire_delay_ms,
        last_fire_ms: now_ms,
    })
}

pub fn spawn_obstacle<R: Rng + ?Sized>(pool: &mut EntityPool, tuning: &Tuning, rng: &mut R) -> u32 {
    let o = &tuning.config.obstacle;
    let radius = rng.random_range(o.radius_min..=o.radius_max);
    let x = random_x(tuning, radius, rng);
    let speed = rng.random_range(o.speed_min..=o.speed_max);
    pool.push_obstacle(Obstacle {
        id: 0,
        pos: Vec2::new(x, -radius),
        vel: Vec2::new(0.0, speed),
        radius,
        health: o.initial_health,
        collision_damage: o.collision_damage,
    })
}

/// Decide what a new pickup carries: health, or a power-up with a rarity
pub fn roll_pickup_kind<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> PickupKind {
    let p = &tuning.config.pickup;
    if rng.random_bool(f64::from(p.powerup_share)) {
        let kind = tuning.roll_power_up(rng);
        let rarity = tuning.roll_rarity(rng);
        PickupKind::PowerUp { kind, rarity }
    } else {
        PickupKind::Health {
            restore: p.restore_amount,
        }
    }
}

pub fn spawn_pickup_at<R: Rng + ?Sized>(
    pool: &mut EntityPool,
    tuning: &Tuning,
    pos: Vec2,
    rng: &mut R,
) -> u32 {
    let p = &tuning.config.pickup;
    let kind = roll_pickup_kind(tuning, rng);
    let speed = rng.random_range(p.speed_min..=p.speed_max);
    pool.push_pickup(Pickup {
        id: 0,
        pos,
        vel: Vec2::new(0.0, speed),
        radius: p.radius,
        kind,
    })
}

/// Roll the drop chance for a destroyed enemy or obstacle at `pos`.
/// Returns true if a pickup was spawned.
pub fn roll_drop<R: Rng + ?Sized>(
    pool: &mut EntityPool,
    tuning: &Tuning,
    pos: Vec2,
    rng: &mut R,
) -> bool {
    if rng.random_bool(f64::from(tuning.config.pickup.drop_chance)) {
        spawn_pickup_at(pool, tuning, pos, rng);
        true
    } else {
        false
    }
}

fn random_x<R: Rng + ?Sized>(tuning: &Tuning, radius: f32, rng: &mut R) -> f32 {
    let width = tuning.config.window.width;
    rng.random_range(radius..=(width - radius).max(radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::effects::PowerUpKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn difficulty() -> DifficultyConfig {
        GameConfig::default().difficulty
    }

    #[test]
    fn test_wave_interval_steps_down_to_floor() {
        let d = difficulty();
        assert_eq!(wave_interval_ms(0.0, &d), 3000.0);
        assert_eq!(wave_interval_ms(9_999.0, &d), 3000.0);
        assert_eq!(wave_interval_ms(10_000.0, &d), 2900.0);
        assert_eq!(wave_interval_ms(1_000_000.0, &d), d.wave_interval_min_ms);
    }

    #[test]
    fn test_wave_counts_grow_with_level() {
        let d = difficulty();
        assert_eq!(enemies_per_wave(0, &d), 1);
        assert_eq!(enemies_per_wave(4, &d), 3);
        assert_eq!(obstacles_per_wave(0, &d), 1);
        assert_eq!(obstacles_per_wave(6, &d), 3);
    }

    #[test]
    fn test_spawn_wave_fills_pool_above_window() {
        let tuning = Tuning::new(GameConfig::default()).unwrap();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(11);

        let report = spawn_wave(&mut pool, &tuning, 4, 40_000.0, &mut rng);
        assert_eq!(report.enemies, 3);
        assert_eq!(report.obstacles, 2);
        assert_eq!(pool.enemies.len(), 3);
        assert_eq!(pool.obstacles.len(), 2);

        let o = &tuning.config.obstacle;
        for obstacle in &pool.obstacles {
            assert!(obstacle.radius >= o.radius_min && obstacle.radius <= o.radius_max);
            assert_eq!(obstacle.pos.y, -obstacle.radius);
            assert!(obstacle.vel.y >= o.speed_min && obstacle.vel.y <= o.speed_max);
        }
        for enemy in &pool.enemies {
            assert!(enemy.pos.y < 0.0);
            assert_eq!(enemy.last_fire_ms, 40_000.0);
            assert!((enemy.vel.y - (2.0 + 4.0 * 0.05)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pickup_kinds_follow_share() {
        let mut config = GameConfig::default();
        config.pickup.powerup_share = 0.0;
        let tuning = Tuning::new(config).unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..100 {
            assert!(matches!(
                roll_pickup_kind(&tuning, &mut rng),
                PickupKind::Health { restore: 20 }
            ));
        }

        let mut config = GameConfig::default();
        config.pickup.powerup_share = 1.0;
        config.powerups.speed_boost.weight = 0.0;
        config.powerups.spread_shot.weight = 0.0;
        config.powerups.rapid_fire.weight = 0.0;
        config.powerups.nuke.weight = 0.0;
        let tuning = Tuning::new(config).unwrap();
        for _ in 0..100 {
            assert!(matches!(
                roll_pickup_kind(&tuning, &mut rng),
                PickupKind::PowerUp {
                    kind: PowerUpKind::Shield,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_drop_chance_extremes() {
        let mut config = GameConfig::default();
        config.pickup.drop_chance = 1.0;
        let tuning = Tuning::new(config).unwrap();
        let mut pool = EntityPool::new(&tuning.config);
        let mut rng = Pcg32::seed_from_u64(9);
        assert!(roll_drop(&mut pool, &tuning, Vec2::new(10.0, 20.0), &mut rng));
        assert_eq!(pool.pickups[0].pos, Vec2::new(10.0, 20.0));

        let mut config = GameConfig::default();
        config.pickup.drop_chance = 0.0;
        let tuning = Tuning::new(config).unwrap();
        assert!(!roll_drop(&mut pool, &tuning, Vec2::ZERO, &mut rng));
        assert_eq!(pool.pickups.len(), 1);
    }

    #[test]
    fn test_same_seed_same_wave() {
        let tuning = Tuning::new(GameConfig::default()).unwrap();
        let mut a = EntityPool::new(&tuning.config);
        let mut b = EntityPool::new(&tuning.config);
        spawn_wave(&mut a, &tuning, 3, 0.0, &mut Pcg32::seed_from_u64(77));
        spawn_wave(&mut b, &tuning, 3, 0.0, &mut Pcg32::seed_from_u64(77));
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_wave_interval_monotone_and_floored(t1 in 0.0f32..5_000_000.0, dt in 0.0f32..5_000_000.0) {
            let d = difficulty();
            let t2 = t1 + dt;
            let i1 = wave_interval_ms(t1, &d);
            let i2 = wave_interval_ms(t2, &d);
            prop_assert!(i2 <= i1);
            prop_assert!(i1 >= d.wave_interval_min_ms);
            prop_assert!(i2 >= d.wave_interval_min_ms);
        }

        #[test]
        fn prop_wave_sizes_monotone(l1 in 0u32..1000, dl in 0u32..1000) {
            let d = difficulty();
            prop_assert!(enemies_per_wave(l1 + dl, &d) >= enemies_per_wave(l1, &d));
            prop_assert!(obstacles_per_wave(l1 + dl, &d) >= obstacles_per_wave(l1, &d));
        }
    }
}
