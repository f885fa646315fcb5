//! Sound triggers
//!
//! The simulation only says *what* happened; an [`AudioSink`] decides how it
//! sounds. Triggers are fire-and-forget and carry no lifetime.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player laser or missile launched
    PlayerFire,
    /// Enemy or boss shot fired
    EnemyFire,
    /// Projectile hit something that survived
    Hit,
    /// Something started exploding
    Explosion,
    /// Collectible picked up
    Pickup,
    /// Invincibility kicked in
    InvincibleStart,
    /// Invincibility wore off
    InvincibleEnd,
    /// Player bounced off an obstacle
    Bump,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::PlayerFire => "player_fire",
            SoundEffect::EnemyFire => "enemy_fire",
            SoundEffect::Hit => "hit",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Pickup => "pickup",
            SoundEffect::InvincibleStart => "invincible_start",
            SoundEffect::InvincibleEnd => "invincible_end",
            SoundEffect::Bump => "bump",
        }
    }
}

/// Playback collaborator
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Discards every trigger
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Headless sink that logs triggers and keeps a tally
#[derive(Debug, Clone)]
pub struct LogAudio {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    played: u64,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    /// Sink with the session's volume levels applied
    pub fn from_settings(settings: &Settings) -> Self {
        let mut audio = Self::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            played: 0,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Number of triggers that would have been audible
    pub fn played(&self) -> u64 {
        self.played
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.played += 1;
        log::debug!("sfx {} at volume {:.2}", effect.as_str(), vol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muted_sink_plays_nothing() {
        let mut audio = LogAudio::new();
        audio.play(SoundEffect::Hit);
        audio.set_muted(true);
        audio.play(SoundEffect::Explosion);
        assert_eq!(audio.played(), 1);
    }

    #[test]
    fn test_settings_volume_applied() {
        let settings = Settings::from_json(r#"{ "master_volume": 0.0 }"#).unwrap();
        let mut audio = LogAudio::from_settings(&settings);
        audio.play(SoundEffect::Bump);
        assert_eq!(audio.played(), 0);

        let mut audio = LogAudio::from_settings(&Settings::default());
        audio.play(SoundEffect::Bump);
        assert_eq!(audio.played(), 1);

        let muted = Settings {
            muted: true,
            ..Settings::default()
        };
        let mut audio = LogAudio::from_settings(&muted);
        audio.play(SoundEffect::Bump);
        assert_eq!(audio.played(), 0);
    }

    #[test]
    fn test_zero_volume_is_silent() {
        let mut audio = LogAudio::new();
        audio.set_sfx_volume(-3.0);
        audio.play(SoundEffect::Pickup);
        assert_eq!(audio.played(), 0);
    }
}
