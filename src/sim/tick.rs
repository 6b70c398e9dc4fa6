//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session by one frame deterministically.

use glam::Vec2;

use super::autopilot::steer_target;
use super::collision::resolve_collisions;
use super::effects::{EffectiveStats, detonate_nuke};
use super::movement::{advance, retire_out_of_bounds, scroll_stars, steer_player};
use super::spawner::{difficulty_level, spawn_wave, wave_due};
use super::state::{GameEvent, GamePhase, GameState};
use super::weapons::{fire_enemies, try_fire_player};
use crate::tuning::Tuning;

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position the ship steers toward
    pub pointer: Option<Vec2>,
    /// Fire button (only needed when auto-fire is off)
    pub fire: bool,
    /// Start a session from the menu
    pub start: bool,
    /// Start over after game over
    pub restart: bool,
    /// Leave the game
    pub quit: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, tuning: &Tuning, input: &TickInput, dt_ms: f32) {
    let config = &tuning.config;
    let bounds = tuning.bounds();
    state.events.clear();

    if state.phase == GamePhase::Quit {
        return;
    }
    if input.quit {
        log::info!("Quit requested in {:?}", state.phase);
        state.phase = GamePhase::Quit;
        return;
    }

    match state.phase {
        GamePhase::Menu if input.start || input.idle_mode => state.start_session(config),
        GamePhase::GameOver if input.restart => state.start_session(config),
        GamePhase::Playing => {}
        _ => {
            scroll_stars(&mut state.stars, &bounds, &mut state.rng);
            return;
        }
    }

    state.frame += 1;
    state.elapsed_ms += dt_ms;
    state.score += config.scoring.passive_per_frame;
    scroll_stars(&mut state.stars, &bounds, &mut state.rng);

    let now = state.elapsed_ms;
    let level = difficulty_level(now, &config.difficulty);
    let GameState {
        rng,
        pool,
        events,
        last_wave_ms,
        score,
        ..
    } = &mut *state;

    // --- PLAYER ---
    let pointer = if input.idle_mode {
        Some(steer_target(pool, config))
    } else {
        input.pointer
    };
    let stats = EffectiveStats::of(&pool.player, &config.powerups);
    if let Some(target) = pointer {
        steer_player(&mut pool.player, target, stats.max_speed, &bounds);
    }
    if config.player.auto_fire || input.fire || input.idle_mode {
        let bullets = try_fire_player(pool, config, &stats, now);
        if bullets > 0 {
            events.push(GameEvent::PlayerFired { bullets });
        }
    }

    // --- SPAWNING ---
    if wave_due(now, *last_wave_ms, &config.difficulty) {
        let report = spawn_wave(pool, tuning, level, now, rng);
        *last_wave_ms = now;
        events.push(GameEvent::WaveSpawned {
            level,
            enemies: report.enemies,
            obstacles: report.obstacles,
        });
    }
    fire_enemies(pool, config, level, now);

    // --- MOVEMENT ---
    advance(pool);
    retire_out_of_bounds(pool, &bounds);

    // --- COLLISIONS ---
    let resolution = resolve_collisions(pool, tuning, rng, events);
    if resolution.nuke {
        detonate_nuke(pool, config.powerups.nuke.damage, events);
    }

    // --- EFFECTS ---
    for kind in pool.player.effects.tick(dt_ms) {
        events.push(GameEvent::PowerUpExpired { kind });
    }

    // --- SCORING ---
    let scoring = &config.scoring;
    *score += events
        .iter()
        .map(|event| match event {
            GameEvent::EnemyDestroyed { .. } => scoring.enemy_kill,
            GameEvent::ObstacleDestroyed { .. } => scoring.obstacle_kill,
            _ => 0.0,
        })
        .sum::<f32>();

    state.pool.normalize_order();
    state.end_session_if_dead();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::FRAME_MS;
    use crate::sim::effects::PowerUpKind;
    use crate::sim::state::{Enemy, Pickup, PickupKind, Rarity};

    fn tuning() -> Tuning {
        Tuning::new(GameConfig::default()).unwrap()
    }

    fn start() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_menu_to_playing() {
        let tuning = tuning();
        let mut state = GameState::new(12345, &tuning.config);

        tick(&mut state, &tuning, &TickInput::default(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.frame, 0);

        tick(&mut state, &tuning, &start(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.frame, 1);
        assert!(state.events.contains(&GameEvent::SessionStarted));
    }

    #[test]
    fn test_quit_is_terminal() {
        let tuning = tuning();
        let mut state = GameState::new(1, &tuning.config);
        tick(&mut state, &tuning, &start(), FRAME_MS);

        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &quit, FRAME_MS);
        assert_eq!(state.phase, GamePhase::Quit);

        tick(&mut state, &tuning, &start(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::Quit);
    }

    #[test]
    fn test_first_wave_after_start_interval() {
        let tuning = tuning();
        let mut state = GameState::new(5, &tuning.config);
        tick(&mut state, &tuning, &start(), 1000.0);
        tick(&mut state, &tuning, &TickInput::default(), 1000.0);
        assert!(state.pool.enemies.is_empty());

        tick(&mut state, &tuning, &TickInput::default(), 1000.0);
        assert_eq!(state.elapsed_ms, 3000.0);
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::WaveSpawned {
                level: 0,
                enemies: 1,
                obstacles: 1
            }
        )));
        assert_eq!(state.pool.enemies.len(), 1);
        assert_eq!(state.last_wave_ms, 3000.0);
    }

    #[test]
    fn test_auto_fire_spawns_player_bullets() {
        let tuning = tuning();
        let mut state = GameState::new(5, &tuning.config);
        tick(&mut state, &tuning, &start(), 400.0);
        assert!(
            state
                .events
                .contains(&GameEvent::PlayerFired { bullets: 1 })
        );
    }

    #[test]
    fn test_manual_fire_when_auto_fire_off() {
        let mut config = GameConfig::default();
        config.player.auto_fire = false;
        let tuning = Tuning::new(config).unwrap();
        let mut state = GameState::new(5, &tuning.config);
        tick(&mut state, &tuning, &start(), 400.0);
        assert!(state.pool.bullets.is_empty());

        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &fire, 400.0);
        assert_eq!(state.pool.bullets.len(), 1);
    }

    #[test]
    fn test_game_over_emitted_once_then_restart() {
        let tuning = tuning();
        let mut state = GameState::new(3, &tuning.config);
        tick(&mut state, &tuning, &start(), FRAME_MS);
        state.pool.player.health = 0;

        tick(&mut state, &tuning, &TickInput::default(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver { .. }))
        );

        tick(&mut state, &tuning, &TickInput::default(), FRAME_MS);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.is_empty());

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &restart, FRAME_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.pool.player.health, tuning.config.player.initial_health);
        assert_eq!(state.frame, 1);
    }

    #[test]
    fn test_kills_add_score() {
        let tuning = tuning();
        let mut state = GameState::new(3, &tuning.config);
        tick(&mut state, &tuning, &start(), FRAME_MS);
        let base = state.score;

        // Nuke pickup on the ship wipes an enemy parked out of the way
        let at = state.pool.player.pos;
        state.pool.push_pickup(Pickup {
            id: 0,
            pos: at,
            vel: Vec2::ZERO,
            radius: 10.0,
            kind: PickupKind::PowerUp {
                kind: PowerUpKind::Nuke,
                rarity: Rarity::Common,
            },
        });
        state.pool.push_enemy(Enemy {
            id: 0,
            pos: Vec2::new(50.0, 50.0),
            vel: Vec2::ZERO,
            radius: 15.0,
            health: 3,
            fire_delay_ms: 1_000_000.0,
            last_fire_ms: 0.0,
        });

        tick(&mut state, &tuning, &TickInput::default(), FRAME_MS);
        assert!(state.pool.enemies.is_empty());
        let scoring = &tuning.config.scoring;
        let expected = base + scoring.passive_per_frame + scoring.enemy_kill;
        assert!((state.score - expected).abs() < 1e-3);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::Nuke { enemies: 1, .. }))
        );
    }

    #[test]
    fn test_lethal_contact_beats_health_pickup_in_same_frame() {
        let tuning = tuning();
        let mut state = GameState::new(4, &tuning.config);
        tick(&mut state, &tuning, &start(), FRAME_MS);
        state.pool.player.health = 10;

        let at = state.pool.player.pos;
        state.pool.push_enemy(Enemy {
            id: 0,
            pos: at,
            vel: Vec2::ZERO,
            radius: 15.0,
            health: 3,
            fire_delay_ms: 1_000_000.0,
            last_fire_ms: 0.0,
        });
        state.pool.push_pickup(Pickup {
            id: 0,
            pos: at,
            vel: Vec2::ZERO,
            radius: 10.0,
            kind: PickupKind::Health { restore: 20 },
        });

        tick(&mut state, &tuning, &TickInput::default(), FRAME_MS);
        assert_eq!(state.pool.player.health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(
            !state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::HealthCollected { .. }))
        );
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed and inputs stay identical
        let tuning = tuning();
        let mut state1 = GameState::new(99999, &tuning.config);
        let mut state2 = GameState::new(99999, &tuning.config);

        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state1, &tuning, &idle, FRAME_MS);
            tick(&mut state2, &tuning, &idle, FRAME_MS);
        }

        assert_eq!(
            serde_json::to_string(&state1).unwrap(),
            serde_json::to_string(&state2).unwrap()
        );
    }
}
