//! Heads-up display data
//!
//! Plain values for an external UI to draw; nothing here renders.

use serde::{Deserialize, Serialize};

use super::entity::Damageable;
use super::player::Weapon;
use super::state::World;

/// Running kill tally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KillCounter {
    count: u32,
}

impl KillCounter {
    pub fn increment(&mut self) {
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn label(&self) -> String {
        format!("Enemies Destroyed: {}", self.count)
    }
}

/// `Time: MM:SS`, minutes are not wrapped
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("Time: {:02}:{:02}", total / 60, total % 60)
}

/// Everything the HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub kills: String,
    pub time: String,
    /// 0..=1 for the health bar
    pub health: f32,
    pub level: u32,
    pub weapon: Weapon,
    pub invincible: bool,
    pub game_over: bool,
    pub reason: Option<String>,
}

impl HudSnapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            kills: world.kills.label(),
            time: format_time(world.survival_time()),
            health: world.player.health_fraction(),
            level: world.level,
            weapon: world.player.weapon,
            invincible: world.player.invincible,
            game_over: world.outcome.is_some(),
            reason: world.outcome.map(|o| o.reason().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_label() {
        let mut kills = KillCounter::default();
        assert_eq!(kills.label(), "Enemies Destroyed: 0");
        kills.increment();
        kills.increment();
        assert_eq!(kills.label(), "Enemies Destroyed: 2");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "Time: 00:00");
        assert_eq!(format_time(59.9), "Time: 00:59");
        assert_eq!(format_time(61.0), "Time: 01:01");
        assert_eq!(format_time(3725.0), "Time: 62:05");
        assert_eq!(format_time(-3.0), "Time: 00:00");
    }
}
