//! Per-frame draw lists for an external renderer
//!
//! The simulation never draws. Each frame it is flattened into a `Frame`:
//! GPU-ready sprite instances sorted by z-order, starfield points and the HUD.
//! A `RenderAdapter` takes it from there.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};

use crate::config::{Rgb, SpriteConfig};
use crate::error::AssetLoadError;
use crate::sim::effects::{EffectiveStats, PowerUpKind};
use crate::sim::spawner::difficulty_level;
use crate::sim::state::{BulletOwner, GamePhase, GameState, PickupKind};
use crate::tuning::Tuning;

/// Everything the game can draw
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpriteKind {
    PlayerShip = 0,
    EnemyShip = 1,
    Obstacle = 2,
    PlayerBullet = 3,
    EnemyBullet = 4,
    HealthPickup = 5,
    PowerUp = 6,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 7] = [
        SpriteKind::PlayerShip,
        SpriteKind::EnemyShip,
        SpriteKind::Obstacle,
        SpriteKind::PlayerBullet,
        SpriteKind::EnemyBullet,
        SpriteKind::HealthPickup,
        SpriteKind::PowerUp,
    ];

    /// Key in the `sprites` config section
    pub fn key(self) -> &'static str {
        match self {
            SpriteKind::PlayerShip => "player_ship",
            SpriteKind::EnemyShip => "enemy_ship",
            SpriteKind::Obstacle => "obstacle",
            SpriteKind::PlayerBullet => "player_bullet",
            SpriteKind::EnemyBullet => "enemy_bullet",
            SpriteKind::HealthPickup => "health_pickup",
            SpriteKind::PowerUp => "powerup",
        }
    }

    /// Draw order; higher draws on top
    pub fn z(self) -> u32 {
        match self {
            SpriteKind::HealthPickup | SpriteKind::PowerUp => 1,
            SpriteKind::Obstacle => 2,
            SpriteKind::EnemyShip => 3,
            SpriteKind::PlayerBullet | SpriteKind::EnemyBullet => 4,
            SpriteKind::PlayerShip => 5,
        }
    }

    /// Circle color used when the sprite image is unavailable
    pub fn placeholder(self) -> [f32; 4] {
        match self {
            SpriteKind::PlayerShip => colors::PLAYER,
            SpriteKind::EnemyShip => colors::ENEMY,
            SpriteKind::Obstacle => colors::OBSTACLE,
            SpriteKind::PlayerBullet => colors::PLAYER_BULLET,
            SpriteKind::EnemyBullet => colors::ENEMY_BULLET,
            SpriteKind::HealthPickup => colors::HEALTH,
            SpriteKind::PowerUp => colors::POWERUP,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const PLAYER: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const ENEMY: [f32; 4] = [0.9, 0.25, 0.25, 1.0];
    pub const OBSTACLE: [f32; 4] = [0.55, 0.5, 0.45, 1.0];
    pub const PLAYER_BULLET: [f32; 4] = [1.0, 1.0, 0.6, 1.0];
    pub const ENEMY_BULLET: [f32; 4] = [1.0, 0.5, 0.2, 1.0];
    pub const HEALTH: [f32; 4] = [0.3, 1.0, 0.3, 1.0];
    pub const POWERUP: [f32; 4] = [0.6, 0.4, 1.0, 1.0];
    pub const SHIELD: [f32; 4] = [0.4, 0.8, 1.0, 0.8];
    pub const NONE: [f32; 4] = [0.0; 4];
    pub const WHITE: [f32; 4] = [1.0; 4];
}

/// Convert a config color to normalized RGBA
pub fn rgba(rgb: Rgb) -> [f32; 4] {
    [
        f32::from(rgb[0]) / 255.0,
        f32::from(rgb[1]) / 255.0,
        f32::from(rgb[2]) / 255.0,
        1.0,
    ]
}

/// One sprite to draw (instance data, uploaded as-is)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub radius: f32,
    /// `SpriteKind` discriminant
    pub sprite: u32,
    pub z: u32,
    /// Multiplied with the image, or the fill color of a placeholder circle
    pub tint: [f32; 4],
    /// Outline ring color; alpha 0 draws none
    pub outline: [f32; 4],
}

/// How a sprite kind is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteSlot {
    Image {
        path: PathBuf,
        size: [u32; 2],
        offset: [f32; 2],
    },
    Placeholder {
        color: [f32; 4],
    },
}

/// Resolved sprite images, with placeholders for anything missing
#[derive(Debug, Clone)]
pub struct SpriteAtlas {
    slots: BTreeMap<SpriteKind, SpriteSlot>,
    failures: Vec<AssetLoadError>,
}

impl Default for SpriteAtlas {
    /// Placeholders for everything
    fn default() -> Self {
        Self::resolve(&BTreeMap::new(), Path::new("."))
    }
}

impl SpriteAtlas {
    /// Look up every sprite kind in the config. Each one that has no path or
    /// whose file is missing gets a placeholder and a single warning.
    pub fn resolve(sprites: &BTreeMap<String, SpriteConfig>, base_dir: &Path) -> Self {
        let mut slots = BTreeMap::new();
        let mut failures = Vec::new();

        for kind in SpriteKind::ALL {
            match Self::locate(kind, sprites.get(kind.key()), base_dir) {
                Ok(slot) => {
                    slots.insert(kind, slot);
                }
                Err(err) => {
                    log::warn!("{}; drawing a placeholder", err);
                    slots.insert(
                        kind,
                        SpriteSlot::Placeholder {
                            color: kind.placeholder(),
                        },
                    );
                    failures.push(err);
                }
            }
        }

        Self { slots, failures }
    }

    fn locate(
        kind: SpriteKind,
        config: Option<&SpriteConfig>,
        base_dir: &Path,
    ) -> Result<SpriteSlot, AssetLoadError> {
        let name = kind.key().to_string();
        let config = match config {
            Some(c) if !c.path.is_empty() => c,
            _ => return Err(AssetLoadError::NoPath { name }),
        };
        let path = base_dir.join(&config.path);
        if !path.is_file() {
            return Err(AssetLoadError::Missing { name, path });
        }
        Ok(SpriteSlot::Image {
            path,
            size: config.scale,
            offset: config.offset,
        })
    }

    pub fn slot(&self, kind: SpriteKind) -> Option<&SpriteSlot> {
        self.slots.get(&kind)
    }

    /// Sprites that fell back to a placeholder
    pub fn failures(&self) -> &[AssetLoadError] {
        &self.failures
    }

    fn tint(&self, kind: SpriteKind) -> [f32; 4] {
        match self.slots.get(&kind) {
            Some(SpriteSlot::Placeholder { color }) => *color,
            _ => colors::WHITE,
        }
    }
}

/// Heads-up display values
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub health: i32,
    pub max_health: i32,
    pub score: u32,
    pub level: u32,
    pub phase: GamePhase,
    /// Active power-ups with the fraction of their duration left
    pub effects: Vec<(PowerUpKind, f32)>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub background: [f32; 4],
    pub stars: Vec<[f32; 2]>,
    pub star_color: [f32; 4],
    /// Sorted by z-order
    pub sprites: Vec<SpriteInstance>,
    pub hud: Hud,
    pub show_collision_circles: bool,
}

/// Something that can present a frame (window, GPU, terminal, nothing)
pub trait RenderAdapter {
    fn draw(&mut self, frame: &Frame);
}

/// Draws nothing; keeps a few counters for headless runs
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub peak_sprites: usize,
}

impl RenderAdapter for HeadlessRenderer {
    fn draw(&mut self, frame: &Frame) {
        self.frames += 1;
        self.peak_sprites = self.peak_sprites.max(frame.sprites.len());
    }
}

/// Flatten the game state into a draw list
pub fn build_frame(state: &GameState, tuning: &Tuning, atlas: &SpriteAtlas) -> Frame {
    let config = &tuning.config;
    let pool = &state.pool;
    let mut sprites = Vec::with_capacity(pool.live_count() + 1);

    let mut push = |kind: SpriteKind, pos: glam::Vec2, radius: f32, outline: [f32; 4]| {
        sprites.push(SpriteInstance {
            position: pos.to_array(),
            radius,
            sprite: kind as u32,
            z: kind.z(),
            tint: atlas.tint(kind),
            outline,
        });
    };

    if state.phase != GamePhase::Menu {
        for pickup in &pool.pickups {
            match pickup.kind {
                PickupKind::Health { .. } => {
                    push(SpriteKind::HealthPickup, pickup.pos, pickup.radius, colors::NONE)
                }
                PickupKind::PowerUp { rarity, .. } => {
                    let outline = rgba(config.rarity.tier(rarity).outline);
                    push(SpriteKind::PowerUp, pickup.pos, pickup.radius, outline)
                }
            }
        }
        for obstacle in &pool.obstacles {
            push(SpriteKind::Obstacle, obstacle.pos, obstacle.radius, colors::NONE);
        }
        for enemy in &pool.enemies {
            push(SpriteKind::EnemyShip, enemy.pos, enemy.radius, colors::NONE);
        }
        for bullet in &pool.bullets {
            let kind = match bullet.owner {
                BulletOwner::Player => SpriteKind::PlayerBullet,
                BulletOwner::Enemy => SpriteKind::EnemyBullet,
            };
            push(kind, bullet.pos, bullet.radius, colors::NONE);
        }

        let player = &pool.player;
        if player.is_alive() {
            let shielded = EffectiveStats::of(player, &config.powerups).shielded();
            let outline = if shielded { colors::SHIELD } else { colors::NONE };
            push(SpriteKind::PlayerShip, player.pos, player.radius, outline);
        }
    }

    sprites.sort_by_key(|s| s.z);

    let player = &pool.player;
    Frame {
        background: rgba(config.colors.black),
        stars: state.stars.iter().map(|s| s.to_array()).collect(),
        star_color: rgba(config.colors.white),
        sprites,
        hud: Hud {
            health: player.health,
            max_health: player.max_health,
            score: state.score as u32,
            level: difficulty_level(state.elapsed_ms, &config.difficulty),
            phase: state.phase,
            effects: player
                .effects
                .iter()
                .map(|e| (e.kind, e.fraction_left()))
                .collect(),
        },
        show_collision_circles: config.debug.show_collision_circles,
    }
}
