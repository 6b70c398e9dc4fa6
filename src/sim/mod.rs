//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Per-frame velocities, millisecond timers
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or audio dependencies

pub mod autopilot;
pub mod collision;
pub mod effects;
pub mod movement;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapons;

pub use collision::{Interaction, Resolution, interaction, resolve_collisions};
pub use effects::{ActiveEffect, EffectiveStats, PowerUpKind, StatusEffects};
pub use movement::PlayBounds;
pub use spawner::{difficulty_level, spawn_wave, wave_interval_ms};
pub use state::{
    Bullet, BulletOwner, DamageSource, Enemy, EntityKind, EntityPool, GameEvent, GamePhase,
    GameState, Obstacle, Pickup, PickupKind, Player, Rarity,
};
pub use tick::{TickInput, tick};
