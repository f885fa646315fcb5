//! Session settings
//!
//! Tunables that vary per session. Physical constants that never change live
//! in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Per-session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Half-extent of the square play field
    pub world_bound: f32,

    // === Population ===
    /// Maximum simultaneous live enemies of each archetype
    pub population_cap: u32,
    /// Seconds between timed enemy spawn attempts
    pub enemy_spawn_interval: f32,
    /// Ambient collectible count, kept constant by 1-for-1 replacement
    pub collectible_count: u32,
    /// Number of asteroids placed at start
    pub asteroid_count: u32,

    // === Progression ===
    /// Kills needed for the level-two backdrop
    pub level_two_kills: u32,
    /// Kills needed for the boss to appear
    pub boss_kills: u32,
    /// Where the boss appears
    pub boss_spawn: [f32; 2],

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence every effect
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_bound: crate::consts::WORLD_BOUND,

            population_cap: 2,
            enemy_spawn_interval: 5.0,
            collectible_count: 5,
            asteroid_count: 5,

            level_two_kills: 5,
            boss_kills: 10,
            boss_spawn: [0.0, 0.0],

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        serde_json::from_str(json).map_err(|e| SetupError::SettingsParse(e.to_string()))
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SetupError> {
        serde_json::to_string_pretty(self).map_err(|e| SetupError::SettingsParse(e.to_string()))
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SetupError::SettingsIo(format!("{}: {e}", path.display())))?;
        let settings = Self::from_json(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SetupError> {
        fn invalid(field: &'static str, reason: &str) -> SetupError {
            SetupError::InvalidSettings {
                field,
                reason: reason.to_string(),
            }
        }

        if !self.world_bound.is_finite() || self.world_bound <= 0.0 {
            return Err(invalid("world_bound", "must be a positive number"));
        }
        if !self.enemy_spawn_interval.is_finite() || self.enemy_spawn_interval <= 0.0 {
            return Err(invalid("enemy_spawn_interval", "must be a positive number"));
        }
        if self.boss_kills < self.level_two_kills {
            return Err(invalid("boss_kills", "must not be below level_two_kills"));
        }
        let [x, y] = self.boss_spawn;
        if !(x.abs() <= self.world_bound && y.abs() <= self.world_bound) {
            return Err(invalid("boss_spawn", "must lie inside the world bound"));
        }
        Ok(())
    }
}
