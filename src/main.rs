//! Space Skirmish headless driver
//!
//! Runs one autopilot session at a fixed frame rate and logs the result.
//!
//! Usage: `space-skirmish [seed] [settings.json]`

use space_skirmish::Settings;
use space_skirmish::assets::TextureTable;
use space_skirmish::audio::LogAudio;
use space_skirmish::sim::{FRAME_DT, TickInput, World, sprites, tick};

/// Give up on a session that hasn't ended after this long
const MAX_SESSION_SECS: f64 = 600.0;

fn main() {
    env_logger::init();
    log::info!("Space Skirmish (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Seed '{raw}' is not a number, using 1");
            1
        }),
        None => 1,
    };
    let settings = match args.next() {
        Some(path) => Settings::load(&path).unwrap_or_else(|e| {
            log::warn!("Failed to load settings: {e}, using defaults");
            Settings::default()
        }),
        None => Settings::default(),
    };

    let mut world = match World::build(seed, settings, &TextureTable::placeholder()) {
        Ok(world) => world,
        Err(e) => {
            log::error!("Cannot start session: {e}");
            std::process::exit(1);
        }
    };

    let mut audio = LogAudio::from_settings(&world.settings);
    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let mut frames: u64 = 0;
    while !world.is_over() && world.now < MAX_SESSION_SECS {
        tick(&mut world, &input, FRAME_DT);
        world.play_sounds(&mut audio);
        frames += 1;
        if frames % 600 == 0 {
            let hud = world.hud();
            log::debug!(
                "{} | {} | health {:.0}% | {} sprites",
                hud.time,
                hud.kills,
                hud.health * 100.0,
                sprites(&world).len()
            );
        }
    }

    let hud = world.hud();
    let reason = hud.reason.as_deref().unwrap_or("Time limit reached");
    log::info!("{reason}");
    log::info!(
        "{} | {} | level {} | {} sounds played",
        hud.time,
        hud.kills,
        hud.level,
        audio.played()
    );
}
