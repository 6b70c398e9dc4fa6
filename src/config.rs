//! Game settings loaded from a JSON document
//!
//! Loaded once at startup and validated before the first frame. The
//! simulation only ever sees an already-validated, immutable `GameConfig`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::sim::effects::PowerUpKind;
use crate::sim::state::Rarity;

/// RGB color triple
pub type Rgb = [u8; 3];

/// Window and frame rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub fps: u32,
}

/// UI colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(rename = "BLACK")]
    pub black: Rgb,
    #[serde(rename = "WHITE")]
    pub white: Rgb,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            black: [0, 0, 0],
            white: [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub radius: f32,
    pub initial_health: i32,
    /// Health cap; defaults to `initial_health`
    #[serde(default)]
    pub max_health: Option<i32>,
    pub color: Rgb,
    pub fire_delay_ms: f32,
    /// Maximum distance covered per frame while steering
    pub max_speed: f32,
    pub collision_with_enemy_damage: i32,
    /// Fire whenever the cooldown allows, without waiting for a click
    #[serde(default = "default_true")]
    pub auto_fire: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub radius: f32,
    pub color: Rgb,
    pub initial_health: i32,
    pub fire_delay_ms: f32,
    pub base_speed: f32,
    /// Extra descent speed per difficulty level
    #[serde(default = "default_enemy_speed_per_level")]
    pub speed_per_level: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub radius_min: f32,
    pub radius_max: f32,
    pub color: Rgb,
    pub initial_health: i32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub collision_damage: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletConfig {
    pub radius: f32,
    /// Speed of player bullets (pixels per frame, always upward). Older
    /// settings files give it as a signed `player_bullet_speed_y`.
    #[serde(alias = "player_bullet_speed_y", deserialize_with = "magnitude")]
    pub player_bullet_speed: f32,
    #[serde(default = "default_player_bullet_damage")]
    pub player_bullet_damage: i32,
    pub player_bullet_color: Rgb,
    pub enemy_bullet_base_speed: f32,
    #[serde(default = "default_enemy_bullet_speed_per_level")]
    pub enemy_bullet_speed_per_level: f32,
    pub enemy_bullet_damage: i32,
    pub enemy_bullet_color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupConfig {
    pub radius: f32,
    pub color: Rgb,
    pub speed_min: f32,
    pub speed_max: f32,
    pub restore_amount: i32,
    /// Chance that a destroyed enemy or obstacle drops a pickup
    #[serde(default = "default_drop_chance")]
    pub drop_chance: f32,
    /// Fraction of pickups that are power-ups rather than health
    #[serde(default = "default_powerup_share")]
    pub powerup_share: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Session time per difficulty level
    pub time_scale_ms: f32,
    pub wave_interval_start_ms: f32,
    pub wave_interval_min_ms: f32,
    /// Wave interval reduction per difficulty level
    pub wave_interval_decrement_ms: f32,
    pub enemy_spawn_factor: f32,
    pub obstacle_spawn_factor: f32,
    /// Chance that a wave also carries a pickup
    pub pickup_chance: f32,
}

/// Play area margin beyond the window edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    pub margin: f32,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self { margin: 50.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub passive_per_frame: f32,
    pub enemy_kill: f32,
    pub obstacle_kill: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            passive_per_frame: 0.03,
            enemy_kill: 10.0,
            obstacle_kill: 10.0,
        }
    }
}

// === Power-ups ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedBoostConfig {
    pub weight: f32,
    pub duration_ms: f32,
    pub multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadShotConfig {
    pub weight: f32,
    pub duration_ms: f32,
    /// Bullets per volley
    pub count: u32,
    /// Total fan angle in degrees
    pub angle_deg: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RapidFireConfig {
    pub weight: f32,
    pub duration_ms: f32,
    /// Fire delay multiplier, below 1.0
    pub fire_delay_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShieldConfig {
    pub weight: f32,
    pub duration_ms: f32,
    /// 1.0 blocks all incoming damage, 0.0 blocks nothing
    pub damage_reduction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NukeConfig {
    pub weight: f32,
    /// Presentation-only flash duration
    pub duration_ms: f32,
    /// Damage dealt to every enemy and obstacle on activation
    pub damage: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpsConfig {
    pub speed_boost: SpeedBoostConfig,
    pub spread_shot: SpreadShotConfig,
    pub rapid_fire: RapidFireConfig,
    pub shield: ShieldConfig,
    pub nuke: NukeConfig,
}

impl Default for PowerUpsConfig {
    fn default() -> Self {
        Self {
            speed_boost: SpeedBoostConfig {
                weight: 3.0,
                duration_ms: 6000.0,
                multiplier: 1.6,
            },
            spread_shot: SpreadShotConfig {
                weight: 3.0,
                duration_ms: 6000.0,
                count: 5,
                angle_deg: 40.0,
            },
            rapid_fire: RapidFireConfig {
                weight: 3.0,
                duration_ms: 6000.0,
                fire_delay_factor: 0.4,
            },
            shield: ShieldConfig {
                weight: 2.0,
                duration_ms: 5000.0,
                damage_reduction: 1.0,
            },
            nuke: NukeConfig {
                weight: 1.0,
                duration_ms: 250.0,
                damage: 1000,
            },
        }
    }
}

impl PowerUpsConfig {
    pub fn weight(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::SpeedBoost => self.speed_boost.weight,
            PowerUpKind::SpreadShot => self.spread_shot.weight,
            PowerUpKind::RapidFire => self.rapid_fire.weight,
            PowerUpKind::Shield => self.shield.weight,
            PowerUpKind::Nuke => self.nuke.weight,
        }
    }

    /// Nominal duration before rarity scaling
    pub fn duration_ms(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::SpeedBoost => self.speed_boost.duration_ms,
            PowerUpKind::SpreadShot => self.spread_shot.duration_ms,
            PowerUpKind::RapidFire => self.rapid_fire.duration_ms,
            PowerUpKind::Shield => self.shield.duration_ms,
            PowerUpKind::Nuke => self.nuke.duration_ms,
        }
    }
}

/// One rarity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityTierConfig {
    pub weight: f32,
    pub duration_multiplier: f32,
    pub outline: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityConfig {
    pub common: RarityTierConfig,
    pub uncommon: RarityTierConfig,
    pub rare: RarityTierConfig,
}

impl Default for RarityConfig {
    fn default() -> Self {
        Self {
            common: RarityTierConfig {
                weight: 0.7,
                duration_multiplier: 1.0,
                outline: [200, 200, 200],
            },
            uncommon: RarityTierConfig {
                weight: 0.25,
                duration_multiplier: 1.5,
                outline: [80, 160, 255],
            },
            rare: RarityTierConfig {
                weight: 0.05,
                duration_multiplier: 2.0,
                outline: [255, 200, 40],
            },
        }
    }
}

impl RarityConfig {
    pub fn tier(&self, rarity: Rarity) -> &RarityTierConfig {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Uncommon => &self.uncommon,
            Rarity::Rare => &self.rare,
        }
    }
}

// === Assets ===

/// Sprite file entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteConfig {
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_sprite_scale")]
    pub scale: [u32; 2],
    #[serde(default = "default_sprite_offset")]
    pub offset: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Looping background music
    #[serde(default)]
    pub music: Option<String>,
    /// Cue name to sound file
    #[serde(default)]
    pub cues: BTreeMap<String, String>,
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music: None,
            cues: BTreeMap::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    pub show_collision_circles: bool,
}

/// Complete settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub window: WindowConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub obstacle: ObstacleConfig,
    pub bullet: BulletConfig,
    pub pickup: PickupConfig,
    pub difficulty: DifficultyConfig,
    #[serde(default)]
    pub bounds: BoundsConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub powerups: PowerUpsConfig,
    #[serde(default)]
    pub rarity: RarityConfig,
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteConfig>,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig {
                width: 800.0,
                height: 600.0,
                fps: 60,
            },
            colors: ColorsConfig::default(),
            player: PlayerConfig {
                radius: 15.0,
                initial_health: 100,
                max_health: None,
                color: [0, 200, 255],
                fire_delay_ms: 250.0,
                max_speed: 8.0,
                collision_with_enemy_damage: 20,
                auto_fire: true,
            },
            enemy: EnemyConfig {
                radius: 15.0,
                color: [255, 60, 60],
                initial_health: 3,
                fire_delay_ms: 1500.0,
                base_speed: 2.0,
                speed_per_level: default_enemy_speed_per_level(),
            },
            obstacle: ObstacleConfig {
                radius_min: 15.0,
                radius_max: 35.0,
                color: [140, 120, 100],
                initial_health: 5,
                speed_min: 1.0,
                speed_max: 3.0,
                collision_damage: 15,
            },
            bullet: BulletConfig {
                radius: 4.0,
                player_bullet_speed: 10.0,
                player_bullet_damage: default_player_bullet_damage(),
                player_bullet_color: [255, 255, 0],
                enemy_bullet_base_speed: 4.0,
                enemy_bullet_speed_per_level: default_enemy_bullet_speed_per_level(),
                enemy_bullet_damage: 5,
                enemy_bullet_color: [255, 120, 0],
            },
            pickup: PickupConfig {
                radius: 10.0,
                color: [255, 105, 180],
                speed_min: 1.0,
                speed_max: 2.5,
                restore_amount: 20,
                drop_chance: default_drop_chance(),
                powerup_share: default_powerup_share(),
            },
            difficulty: DifficultyConfig {
                time_scale_ms: 10_000.0,
                wave_interval_start_ms: 3000.0,
                wave_interval_min_ms: 800.0,
                wave_interval_decrement_ms: 100.0,
                enemy_spawn_factor: 0.5,
                obstacle_spawn_factor: 2.0,
                pickup_chance: 0.3,
            },
            bounds: BoundsConfig::default(),
            scoring: ScoringConfig::default(),
            powerups: PowerUpsConfig::default(),
            rarity: RarityConfig::default(),
            sprites: BTreeMap::new(),
            audio: AudioConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl GameConfig {
    /// Read, parse and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a settings document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Effective health cap
    pub fn max_health(&self) -> i32 {
        self.player.max_health.unwrap_or(self.player.initial_health)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("window.width", self.window.width)?;
        positive("window.height", self.window.height)?;
        if self.window.fps == 0 {
            return Err(ConfigError::invalid("window.fps", "must be at least 1"));
        }

        positive("player.radius", self.player.radius)?;
        positive_int("player.initial_health", self.player.initial_health)?;
        if self.max_health() < self.player.initial_health {
            return Err(ConfigError::invalid(
                "player.max_health",
                "must not be below initial_health",
            ));
        }
        positive("player.fire_delay_ms", self.player.fire_delay_ms)?;
        positive("player.max_speed", self.player.max_speed)?;
        non_negative_int(
            "player.collision_with_enemy_damage",
            self.player.collision_with_enemy_damage,
        )?;

        positive("enemy.radius", self.enemy.radius)?;
        positive_int("enemy.initial_health", self.enemy.initial_health)?;
        positive("enemy.fire_delay_ms", self.enemy.fire_delay_ms)?;
        non_negative("enemy.base_speed", self.enemy.base_speed)?;
        non_negative("enemy.speed_per_level", self.enemy.speed_per_level)?;

        positive("obstacle.radius_min", self.obstacle.radius_min)?;
        ordered(
            "obstacle.radius_max",
            self.obstacle.radius_min,
            self.obstacle.radius_max,
        )?;
        positive_int("obstacle.initial_health", self.obstacle.initial_health)?;
        non_negative("obstacle.speed_min", self.obstacle.speed_min)?;
        ordered(
            "obstacle.speed_max",
            self.obstacle.speed_min,
            self.obstacle.speed_max,
        )?;
        non_negative_int("obstacle.collision_damage", self.obstacle.collision_damage)?;

        positive("bullet.radius", self.bullet.radius)?;
        positive("bullet.player_bullet_speed", self.bullet.player_bullet_speed)?;
        positive_int("bullet.player_bullet_damage", self.bullet.player_bullet_damage)?;
        positive(
            "bullet.enemy_bullet_base_speed",
            self.bullet.enemy_bullet_base_speed,
        )?;
        non_negative_int("bullet.enemy_bullet_damage", self.bullet.enemy_bullet_damage)?;

        positive("pickup.radius", self.pickup.radius)?;
        non_negative("pickup.speed_min", self.pickup.speed_min)?;
        ordered("pickup.speed_max", self.pickup.speed_min, self.pickup.speed_max)?;
        non_negative_int("pickup.restore_amount", self.pickup.restore_amount)?;
        unit_interval("pickup.drop_chance", self.pickup.drop_chance)?;
        unit_interval("pickup.powerup_share", self.pickup.powerup_share)?;

        let d = &self.difficulty;
        positive("difficulty.time_scale_ms", d.time_scale_ms)?;
        positive("difficulty.wave_interval_min_ms", d.wave_interval_min_ms)?;
        ordered(
            "difficulty.wave_interval_start_ms",
            d.wave_interval_min_ms,
            d.wave_interval_start_ms,
        )?;
        non_negative(
            "difficulty.wave_interval_decrement_ms",
            d.wave_interval_decrement_ms,
        )?;
        non_negative("difficulty.enemy_spawn_factor", d.enemy_spawn_factor)?;
        positive("difficulty.obstacle_spawn_factor", d.obstacle_spawn_factor)?;
        unit_interval("difficulty.pickup_chance", d.pickup_chance)?;

        // Spawned entities start one radius above the window and must not be
        // retired on their first frame.
        let widest = self
            .obstacle
            .radius_max
            .max(self.enemy.radius)
            .max(self.pickup.radius);
        if self.bounds.margin < widest {
            return Err(ConfigError::invalid(
                "bounds.margin",
                format!("must be at least the largest spawn radius ({widest})"),
            ));
        }

        let p = &self.powerups;
        for kind in PowerUpKind::ALL {
            non_negative(kind.weight_field(), p.weight(kind))?;
            positive(kind.duration_field(), p.duration_ms(kind))?;
        }
        if PowerUpKind::ALL.iter().all(|&k| p.weight(k) == 0.0) {
            return Err(ConfigError::invalid(
                "powerups",
                "at least one power-up weight must be positive",
            ));
        }
        positive("powerups.speed_boost.multiplier", p.speed_boost.multiplier)?;
        if p.spread_shot.count == 0 {
            return Err(ConfigError::invalid(
                "powerups.spread_shot.count",
                "must be at least 1",
            ));
        }
        non_negative("powerups.spread_shot.angle_deg", p.spread_shot.angle_deg)?;
        if !(p.rapid_fire.fire_delay_factor > 0.0 && p.rapid_fire.fire_delay_factor <= 1.0) {
            return Err(ConfigError::invalid(
                "powerups.rapid_fire.fire_delay_factor",
                "must be in (0, 1]",
            ));
        }
        unit_interval("powerups.shield.damage_reduction", p.shield.damage_reduction)?;
        non_negative_int("powerups.nuke.damage", p.nuke.damage)?;

        let r = &self.rarity;
        for (field, tier) in [
            ("rarity.common", &r.common),
            ("rarity.uncommon", &r.uncommon),
            ("rarity.rare", &r.rare),
        ] {
            non_negative(field, tier.weight)?;
            positive(field, tier.duration_multiplier)?;
        }
        if r.common.weight + r.uncommon.weight + r.rare.weight <= 0.0 {
            return Err(ConfigError::invalid(
                "rarity",
                "weights must sum to a positive total",
            ));
        }

        for (field, v) in [
            ("audio.master_volume", self.audio.master_volume),
            ("audio.sfx_volume", self.audio.sfx_volume),
            ("audio.music_volume", self.audio.music_volume),
        ] {
            unit_interval(field, v)?;
        }

        Ok(())
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {v}")))
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must not be negative, got {v}"),
        ))
    }
}

fn positive_int(field: &'static str, v: i32) -> Result<(), ConfigError> {
    if v > 0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {v}")))
    }
}

fn non_negative_int(field: &'static str, v: i32) -> Result<(), ConfigError> {
    if v >= 0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must not be negative, got {v}"),
        ))
    }
}

fn unit_interval(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be in [0, 1], got {v}")))
    }
}

fn ordered(field: &'static str, lo: f32, hi: f32) -> Result<(), ConfigError> {
    if hi.is_finite() && hi >= lo {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be at least {lo}, got {hi}"),
        ))
    }
}

fn default_true() -> bool {
    true
}

fn default_enemy_speed_per_level() -> f32 {
    0.05
}

fn default_enemy_bullet_speed_per_level() -> f32 {
    0.1
}

fn default_player_bullet_damage() -> i32 {
    1
}

fn default_drop_chance() -> f32 {
    0.15
}

fn default_powerup_share() -> f32 {
    0.5
}

fn magnitude<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    f32::deserialize(deserializer).map(f32::abs)
}

fn default_sprite_scale() -> [u32; 2] {
    [32, 32]
}

fn default_sprite_offset() -> [f32; 2] {
    [16.0, 16.0]
}
