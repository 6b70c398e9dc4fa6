//! Game state and core simulation types
//!
//! Everything a frame reads or writes lives in `GameState`: the entity pool,
//! the session clock, the seeded RNG and the current phase.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{PowerUpKind, StatusEffects};
use crate::config::GameConfig;
use crate::consts::STAR_COUNT;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start input
    Menu,
    /// Active gameplay
    Playing,
    /// Player health reached zero
    GameOver,
    /// Player asked to leave; terminal
    Quit,
}

/// Closed set of entity kinds used to look up interaction rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Obstacle,
    PlayerBullet,
    EnemyBullet,
    Pickup,
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Power-up rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Uncommon, Rarity::Rare];
}

/// What a pickup does when collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PickupKind {
    Health { restore: i32 },
    PowerUp { kind: PowerUpKind, rarity: Rarity },
}

/// Subtract damage, clamping at zero. Returns true if health is now zero.
pub fn take_damage(health: &mut i32, amount: i32) -> bool {
    *health = (*health - amount.max(0)).max(0);
    *health == 0
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    /// Fire delay before any power-up modifiers
    pub base_fire_delay_ms: f32,
    /// Per-frame steering cap before any power-up modifiers
    pub base_max_speed: f32,
    /// Session time of the last volley
    pub last_fire_ms: f32,
    pub effects: StatusEffects,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        let p = &config.player;
        Self {
            pos: Vec2::new(config.window.width / 2.0, config.window.height / 2.0),
            radius: p.radius,
            health: p.initial_health,
            max_health: config.max_health(),
            base_fire_delay_ms: p.fire_delay_ms,
            base_max_speed: p.max_speed,
            last_fire_ms: 0.0,
            effects: StatusEffects::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply already-mitigated damage. Returns true if this killed the player.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        take_damage(&mut self.health, amount)
    }

    /// Restore health up to the cap. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }
}

/// A descending enemy ship that fires aimed shots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: i32,
    pub fire_delay_ms: f32,
    pub last_fire_ms: f32,
}

/// A drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: i32,
    /// Damage dealt to the player on contact
    pub collision_damage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub owner: BulletOwner,
    pub damage: i32,
}

impl Bullet {
    pub fn kind(&self) -> EntityKind {
        match self.owner {
            BulletOwner::Player => EntityKind::PlayerBullet,
            BulletOwner::Enemy => EntityKind::EnemyBullet,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub kind: PickupKind,
}

/// Things that happened during a frame, for audio and presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted,
    PlayerFired { bullets: u32 },
    WaveSpawned { level: u32, enemies: u32, obstacles: u32 },
    EnemyHit { id: u32 },
    EnemyDestroyed { id: u32 },
    ObstacleHit { id: u32 },
    ObstacleDestroyed { id: u32 },
    PlayerHit { damage: i32, source: DamageSource },
    HealthCollected { restored: i32 },
    PowerUpCollected { kind: PowerUpKind, rarity: Rarity },
    PowerUpExpired { kind: PowerUpKind },
    Nuke { enemies: u32, obstacles: u32 },
    GameOver { score: u32 },
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    EnemyBullet,
    EnemyContact,
    ObstacleContact,
}

/// Live entity collections for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityPool {
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id
    pub obstacles: Vec<Obstacle>,
    /// Sorted by id
    pub bullets: Vec<Bullet>,
    /// Sorted by id
    pub pickups: Vec<Pickup>,
    next_id: u32,
}

impl EntityPool {
    /// Empty pool with a fresh player at the window center
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player: Player::new(config),
            enemies: Vec::new(),
            obstacles: Vec::new(),
            bullets: Vec::new(),
            pickups: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_enemy(&mut self, mut enemy: Enemy) -> u32 {
        enemy.id = self.next_entity_id();
        let id = enemy.id;
        self.enemies.push(enemy);
        id
    }

    pub fn push_obstacle(&mut self, mut obstacle: Obstacle) -> u32 {
        obstacle.id = self.next_entity_id();
        let id = obstacle.id;
        self.obstacles.push(obstacle);
        id
    }

    pub fn push_bullet(&mut self, mut bullet: Bullet) -> u32 {
        bullet.id = self.next_entity_id();
        let id = bullet.id;
        self.bullets.push(bullet);
        id
    }

    pub fn push_pickup(&mut self, mut pickup: Pickup) -> u32 {
        pickup.id = self.next_entity_id();
        let id = pickup.id;
        self.pickups.push(pickup);
        id
    }

    /// Number of live non-player entities
    pub fn live_count(&self) -> usize {
        self.enemies.len() + self.obstacles.len() + self.bullets.len() + self.pickups.len()
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.obstacles.sort_by_key(|o| o.id);
        self.bullets.sort_by_key(|b| b.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Session time since the last start/restart
    pub elapsed_ms: f32,
    /// Playing frames since the last start/restart
    pub frame: u64,
    pub score: f32,
    /// Session time the last wave spawned at
    pub last_wave_ms: f32,
    pub pool: EntityPool,
    /// Background starfield (visual only)
    pub stars: Vec<Vec2>,
    /// Events raised by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session in the menu phase
    pub fn new(seed: u64, config: &GameConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = scatter_stars(&mut rng, config);
        Self {
            seed,
            rng,
            phase: GamePhase::Menu,
            elapsed_ms: 0.0,
            frame: 0,
            score: 0.0,
            last_wave_ms: 0.0,
            pool: EntityPool::new(config),
            stars,
            events: Vec::new(),
        }
    }

    /// Reinitialize every collection from empty and enter play
    pub fn start_session(&mut self, config: &GameConfig) {
        self.pool = EntityPool::new(config);
        self.elapsed_ms = 0.0;
        self.frame = 0;
        self.score = 0.0;
        self.last_wave_ms = 0.0;
        self.stars = scatter_stars(&mut self.rng, config);
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::SessionStarted);
        log::info!("Session started (seed {})", self.seed);
    }

    /// Move to game over if the player is dead. Returns true only on the
    /// frame the transition happens.
    pub fn end_session_if_dead(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.pool.player.is_alive() {
            return false;
        }
        self.phase = GamePhase::GameOver;
        let score = self.score as u32;
        self.events.push(GameEvent::GameOver { score });
        log::info!(
            "Game over: score {} after {:.1}s",
            score,
            self.elapsed_ms / 1000.0
        );
        true
    }
}

fn scatter_stars(rng: &mut Pcg32, config: &GameConfig) -> Vec<Vec2> {
    (0..STAR_COUNT)
        .map(|_| {
            Vec2::new(
                rng.random_range(0.0..=config.window.width),
                rng.random_range(0.0..=config.window.height),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut health = 5;
        assert!(!take_damage(&mut health, 3));
        assert_eq!(health, 2);
        assert!(take_damage(&mut health, 10));
        assert_eq!(health, 0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.health = 95;
        assert_eq!(player.heal(20), 5);
        assert_eq!(player.health, config.max_health());
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let config = GameConfig::default();
        let mut pool = EntityPool::new(&config);
        let a = pool.next_entity_id();
        let b = pool.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_start_session_resets_pool() {
        let config = GameConfig::default();
        let mut state = GameState::new(7, &config);
        assert_eq!(state.phase, GamePhase::Menu);

        state.pool.push_bullet(Bullet {
            id: 0,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 4.0,
            owner: BulletOwner::Player,
            damage: 1,
        });
        state.pool.player.health = 3;
        state.score = 42.0;

        state.start_session(&config);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.pool.live_count(), 0);
        assert_eq!(state.pool.player.health, config.player.initial_health);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.stars.len(), STAR_COUNT);
    }

    #[test]
    fn test_game_over_transition_happens_once() {
        let config = GameConfig::default();
        let mut state = GameState::new(7, &config);
        state.start_session(&config);
        state.pool.player.take_damage(1000);

        assert!(state.end_session_if_dead());
        assert!(!state.end_session_if_dead());
        assert_eq!(state.phase, GamePhase::GameOver);
        let overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }
}
