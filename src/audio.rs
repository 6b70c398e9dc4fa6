//! Sound cue mapping
//!
//! Game events become named cues, cue names become files from the config,
//! and an `AudioBackend` does the actual playback.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::config::AudioConfig;
use crate::error::AssetLoadError;
use crate::sim::effects::PowerUpKind;
use crate::sim::state::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SoundCue {
    /// Player volley
    Shoot,
    /// Enemy damaged but alive
    EnemyHit,
    EnemyDestroyed,
    ObstacleDestroyed,
    PlayerHit,
    PickupHealth,
    PowerUp(PowerUpKind),
    GameOver,
}

impl SoundCue {
    /// Key in the `audio.cues` config section
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::EnemyHit => "enemy_hit",
            SoundCue::EnemyDestroyed => "enemy_destroyed",
            SoundCue::ObstacleDestroyed => "obstacle_destroyed",
            SoundCue::PlayerHit => "player_hit",
            SoundCue::PickupHealth => "pickup_health",
            SoundCue::PowerUp(kind) => kind.cue_name(),
            SoundCue::GameOver => "game_over",
        }
    }
}

/// Cue for a game event, if it makes a sound
pub fn cue_for(event: &GameEvent) -> Option<SoundCue> {
    match event {
        GameEvent::PlayerFired { .. } => Some(SoundCue::Shoot),
        GameEvent::EnemyHit { .. } => Some(SoundCue::EnemyHit),
        GameEvent::EnemyDestroyed { .. } => Some(SoundCue::EnemyDestroyed),
        GameEvent::ObstacleDestroyed { .. } => Some(SoundCue::ObstacleDestroyed),
        GameEvent::PlayerHit { .. } => Some(SoundCue::PlayerHit),
        GameEvent::HealthCollected { .. } => Some(SoundCue::PickupHealth),
        GameEvent::PowerUpCollected { kind, .. } => Some(SoundCue::PowerUp(*kind)),
        GameEvent::GameOver { .. } => Some(SoundCue::GameOver),
        GameEvent::SessionStarted
        | GameEvent::WaveSpawned { .. }
        | GameEvent::ObstacleHit { .. }
        | GameEvent::PowerUpExpired { .. }
        | GameEvent::Nuke { .. } => None,
    }
}

/// Playback device
pub trait AudioBackend {
    /// Play the one-shot sound `name` from `path` at `volume` (0.0 - 1.0)
    fn play_file(&mut self, name: &str, path: &Path, volume: f32) -> Result<(), AssetLoadError>;
    /// Start looping background music, replacing any current track
    fn play_music(&mut self, name: &str, path: &Path, volume: f32) -> Result<(), AssetLoadError>;
}

/// Plays nothing, but still reports files that do not exist
#[derive(Debug, Default)]
pub struct SilentBackend;

impl SilentBackend {
    fn check(name: &str, path: &Path) -> Result<(), AssetLoadError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(AssetLoadError::Missing {
                name: name.to_string(),
                path: path.to_path_buf(),
            })
        }
    }
}

impl AudioBackend for SilentBackend {
    fn play_file(&mut self, name: &str, path: &Path, _volume: f32) -> Result<(), AssetLoadError> {
        Self::check(name, path)
    }

    fn play_music(&mut self, name: &str, path: &Path, _volume: f32) -> Result<(), AssetLoadError> {
        Self::check(name, path)
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    cues: BTreeMap<String, PathBuf>,
    music: Option<PathBuf>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Cues already reported as unplayable
    warned: BTreeSet<String>,
}

impl<B: AudioBackend> AudioManager<B> {
    /// Cue paths are resolved against `base_dir`
    pub fn new(config: &AudioConfig, base_dir: &Path, backend: B) -> Self {
        Self {
            backend,
            cues: config
                .cues
                .iter()
                .map(|(name, path)| (name.clone(), base_dir.join(path)))
                .collect(),
            music: config.music.as_ref().map(|path| base_dir.join(path)),
            master_volume: config.master_volume.clamp(0.0, 1.0),
            sfx_volume: config.sfx_volume.clamp(0.0, 1.0),
            music_volume: config.music_volume.clamp(0.0, 1.0),
            muted: false,
            warned: BTreeSet::new(),
        }
    }

    /// Overall gain applied to effects and music, clamped to 0.0 - 1.0
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Effects-only gain, clamped to 0.0 - 1.0
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Play a sound effect
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let name = cue.name();
        let result = match self.cues.get(name) {
            Some(path) => self.backend.play_file(name, path, vol),
            None => Err(AssetLoadError::NoPath {
                name: name.to_string(),
            }),
        };
        if let Err(err) = result {
            self.warn_once(name, &err);
        }
    }

    /// Play the cues for one frame's events, each cue at most once
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        let cues: BTreeSet<SoundCue> = events.iter().filter_map(cue_for).collect();
        for cue in cues {
            self.play(cue);
        }
    }

    /// Start the configured background track, if any
    pub fn start_music(&mut self) {
        if self.muted {
            return;
        }
        let Some(path) = self.music.clone() else {
            return;
        };
        let vol = self.master_volume * self.music_volume;
        if let Err(err) = self.backend.play_music("music", &path, vol) {
            self.warn_once("music", &err);
        }
    }

    fn warn_once(&mut self, name: &str, err: &AssetLoadError) {
        if self.warned.insert(name.to_string()) {
            log::warn!("Sound `{}` unavailable: {}", name, err);
        }
    }
}
