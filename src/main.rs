//! Starfield Storm entry point
//!
//! Loads the settings file and runs a headless autopilot session at a fixed
//! frame step, logging the outcome.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use std::time::{SystemTime, UNIX_EPOCH};

    use starfield_storm::audio::{AudioManager, SilentBackend};
    use starfield_storm::consts::{DEFAULT_SEED, FRAME_MS, HEADLESS_FRAME_LIMIT};
    use starfield_storm::render::{HeadlessRenderer, RenderAdapter, SpriteAtlas, build_frame};
    use starfield_storm::sim::{GamePhase, GameState, TickInput, tick};
    use starfield_storm::{GameConfig, Tuning};

    env_logger::init();
    log::info!("Starfield Storm (headless) starting...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/settings.json"));
    let tuning = match GameConfig::load(&config_path).and_then(Tuning::new) {
        Ok(tuning) => tuning,
        Err(err) => {
            log::error!("Cannot start: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // Asset paths in the settings file are relative to the working directory
    let base_dir = Path::new(".");
    let atlas = SpriteAtlas::resolve(&tuning.config.sprites, base_dir);
    let mut audio = AudioManager::new(&tuning.config.audio, base_dir, SilentBackend);
    let mut renderer = HeadlessRenderer::default();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(DEFAULT_SEED);
    let mut state = GameState::new(seed, &tuning.config);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    audio.start_music();
    while state.frame < HEADLESS_FRAME_LIMIT {
        tick(&mut state, &tuning, &input, FRAME_MS);
        audio.handle_events(&state.events);
        renderer.draw(&build_frame(&state, &tuning, &atlas));
        if matches!(state.phase, GamePhase::GameOver | GamePhase::Quit) {
            break;
        }
    }

    log::info!(
        "Session ended in {:?} after {} frames ({:.1}s): score {}, peak {} sprites",
        state.phase,
        state.frame,
        state.elapsed_ms / 1000.0,
        state.score as u32,
        renderer.peak_sprites
    );
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is the whole wasm surface
}
