//! Starfield Storm - A 2D arcade space-shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, power-ups)
//! - `config`: Settings file loading and validation
//! - `tuning`: Data-driven game balance derived from the config
//! - `render`: Per-frame draw lists for an external renderer
//! - `audio`: Sound cue mapping for an external audio backend

pub mod audio;
pub mod config;
pub mod error;
pub mod render;
pub mod sim;
pub mod tuning;

pub use config::GameConfig;
pub use error::{AssetLoadError, ConfigError};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame time in milliseconds (60 Hz)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Number of background stars
    pub const STAR_COUNT: usize = 100;
    /// Background star scroll speed (pixels per frame)
    pub const STAR_SPEED: f32 = 2.0;
    /// Default session seed for the headless runner
    pub const DEFAULT_SEED: u64 = 0x5747_4152_4649_454c;
    /// Frame cap for headless sessions (10 minutes at 60 Hz)
    pub const HEADLESS_FRAME_LIMIT: u64 = 60 * 60 * 10;
}

/// Circle-circle overlap using squared distance (no square root).
///
/// Touching circles count as overlapping.
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// Unit direction for an angle measured from straight up (negative Y), clockwise
#[inline]
pub fn up_rotated(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}
