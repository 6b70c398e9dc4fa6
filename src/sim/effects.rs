//! Timed power-up effects on the player
//!
//! Effects are independent modifier records. Base player stats are never
//! touched; `EffectiveStats` folds the active records over them each frame,
//! so an expired effect simply stops contributing.

use serde::{Deserialize, Serialize};

use super::state::{EntityPool, GameEvent, Player, Rarity, take_damage};
use crate::config::{GameConfig, PowerUpsConfig};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    SpreadShot,
    RapidFire,
    Shield,
    Nuke,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::SpreadShot,
        PowerUpKind::RapidFire,
        PowerUpKind::Shield,
        PowerUpKind::Nuke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "speed_boost",
            PowerUpKind::SpreadShot => "spread_shot",
            PowerUpKind::RapidFire => "rapid_fire",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Nuke => "nuke",
        }
    }

    /// Audio cue played on collection
    pub fn cue_name(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "powerup_speed_boost",
            PowerUpKind::SpreadShot => "powerup_spread_shot",
            PowerUpKind::RapidFire => "powerup_rapid_fire",
            PowerUpKind::Shield => "powerup_shield",
            PowerUpKind::Nuke => "powerup_nuke",
        }
    }

    pub(crate) fn weight_field(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "powerups.speed_boost.weight",
            PowerUpKind::SpreadShot => "powerups.spread_shot.weight",
            PowerUpKind::RapidFire => "powerups.rapid_fire.weight",
            PowerUpKind::Shield => "powerups.shield.weight",
            PowerUpKind::Nuke => "powerups.nuke.weight",
        }
    }

    pub(crate) fn duration_field(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "powerups.speed_boost.duration_ms",
            PowerUpKind::SpreadShot => "powerups.spread_shot.duration_ms",
            PowerUpKind::RapidFire => "powerups.rapid_fire.duration_ms",
            PowerUpKind::Shield => "powerups.shield.duration_ms",
            PowerUpKind::Nuke => "powerups.nuke.duration_ms",
        }
    }
}

/// One active modifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub remaining_ms: f32,
    /// Full rarity-scaled duration granted at pickup
    pub duration_ms: f32,
}

impl ActiveEffect {
    /// Remaining time as a fraction of the granted duration
    pub fn fraction_left(&self) -> f32 {
        (self.remaining_ms / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// The player's active effects, at most one record per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    active: Vec<ActiveEffect>,
}

impl StatusEffects {
    /// Activate `kind` for `duration_ms`. Re-activating a live effect resets
    /// its remaining time to the new duration instead of stacking.
    /// Returns true if the effect was already active.
    pub fn activate(&mut self, kind: PowerUpKind, duration_ms: f32) -> bool {
        if let Some(effect) = self.active.iter_mut().find(|e| e.kind == kind) {
            effect.remaining_ms = duration_ms;
            effect.duration_ms = duration_ms;
            return true;
        }
        self.active.push(ActiveEffect {
            kind,
            remaining_ms: duration_ms,
            duration_ms,
        });
        self.active.sort_by_key(|e| e.kind);
        false
    }

    /// Count down every effect and drop the ones that ran out.
    /// Returns the kinds that expired this call.
    pub fn tick(&mut self, dt_ms: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        self.active.retain_mut(|effect| {
            effect.remaining_ms -= dt_ms;
            if effect.remaining_ms <= 0.0 {
                expired.push(effect.kind);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.iter().any(|e| e.kind == kind)
    }

    pub fn remaining_ms(&self, kind: PowerUpKind) -> Option<f32> {
        self.active
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.remaining_ms)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.active.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Player stats after folding in active effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStats {
    pub max_speed: f32,
    pub fire_delay_ms: f32,
    /// Bullets per volley
    pub volley: u32,
    /// Total fan angle of a volley, radians
    pub spread_rad: f32,
    /// Multiplier applied to incoming damage
    pub damage_factor: f32,
}

impl EffectiveStats {
    pub fn of(player: &Player, config: &PowerUpsConfig) -> Self {
        let base = Self {
            max_speed: player.base_max_speed,
            fire_delay_ms: player.base_fire_delay_ms,
            volley: 1,
            spread_rad: 0.0,
            damage_factor: 1.0,
        };
        player.effects.iter().fold(base, |stats, effect| match effect.kind {
            PowerUpKind::SpeedBoost => Self {
                max_speed: stats.max_speed * config.speed_boost.multiplier,
                ..stats
            },
            PowerUpKind::SpreadShot => Self {
                volley: config.spread_shot.count,
                spread_rad: config.spread_shot.angle_deg.to_radians(),
                ..stats
            },
            PowerUpKind::RapidFire => Self {
                fire_delay_ms: stats.fire_delay_ms * config.rapid_fire.fire_delay_factor,
                ..stats
            },
            PowerUpKind::Shield => Self {
                damage_factor: 1.0 - config.shield.damage_reduction,
                ..stats
            },
            PowerUpKind::Nuke => stats,
        })
    }

    pub fn shielded(&self) -> bool {
        self.damage_factor < 1.0
    }
}

/// Scale raw damage by a mitigation factor, rounding to whole points
pub fn mitigate(damage: i32, factor: f32) -> i32 {
    ((damage as f32) * factor).round().max(0.0) as i32
}

/// Duration granted for a pickup; rarity scales duration, never magnitude
pub fn granted_duration_ms(config: &GameConfig, kind: PowerUpKind, rarity: Rarity) -> f32 {
    config.powerups.duration_ms(kind) * config.rarity.tier(rarity).duration_multiplier
}

/// Damage every live enemy and obstacle, removing the ones that drop to zero
pub fn detonate_nuke(pool: &mut EntityPool, damage: i32, events: &mut Vec<GameEvent>) {
    let mut enemies = 0;
    let mut obstacles = 0;

    pool.enemies.retain_mut(|enemy| {
        if take_damage(&mut enemy.health, damage) {
            enemies += 1;
            events.push(GameEvent::EnemyDestroyed { id: enemy.id });
            false
        } else {
            events.push(GameEvent::EnemyHit { id: enemy.id });
            true
        }
    });
    pool.obstacles.retain_mut(|obstacle| {
        if take_damage(&mut obstacle.health, damage) {
            obstacles += 1;
            events.push(GameEvent::ObstacleDestroyed { id: obstacle.id });
            false
        } else {
            events.push(GameEvent::ObstacleHit { id: obstacle.id });
            true
        }
    });

    log::info!("Nuke cleared {} enemies, {} obstacles", enemies, obstacles);
    events.push(GameEvent::Nuke { enemies, obstacles });
}
