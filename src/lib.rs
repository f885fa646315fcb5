//! Space Skirmish - arcade space-combat simulation core
//!
//! Core modules:
//! - `sim`: Per-tick simulation (entities, AI, physics, collisions, spawning)
//! - `settings`: Per-session tunables loaded from JSON
//! - `assets`: Texture catalog checked at world construction
//! - `audio`: Fire-and-forget sound triggers emitted by the simulation
//! - `error`: Setup-time failures

pub mod assets;
pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

pub use error::SetupError;
pub use settings::Settings;

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Game configuration constants
pub mod consts {
    /// Half-extent of the square play field
    pub const WORLD_BOUND: f32 = 20.0;
    /// Velocity restitution when a free mover is reflected at the bound
    pub const BOUND_RESTITUTION: f32 = 0.5;

    /// Explosion animation length (seconds) before the entity goes inactive
    pub const EXPLOSION_DURATION: f32 = 5.0;
    /// Sprite scale while exploding
    pub const EXPLOSION_SCALE: f32 = 2.5;
    /// Per-tick drift damping for exploding movers
    pub const EXPLOSION_DRIFT: f32 = 0.97;

    /// Below this acceleration magnitude a mover is considered coasting
    pub const COAST_EPSILON: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_MAX_HEALTH: f32 = 20.0;
    pub const PLAYER_MAX_SPEED: f32 = 3.0;
    pub const PLAYER_THRUST: f32 = 6.0;
    pub const PLAYER_TURN_RATE: f32 = 2.5;
    pub const PLAYER_DRAG: f32 = 0.99;
    pub const PLAYER_RADIUS: f32 = 0.4;

    /// Knockback ("sliding") tuning
    pub const KNOCKBACK_MAX: f32 = 20.0;
    pub const KNOCKBACK_DAMPING: f32 = 0.97;
    pub const KNOCKBACK_STOP: f32 = 0.05;

    /// Power-ups
    pub const BUFF_DURATION: f32 = 10.0;
    pub const SPEED_BUFF: f32 = 1.5;
    pub const POWER_BUFF: f32 = 2.0;
    pub const INVINCIBILITY_ITEMS: u32 = 5;
    pub const INVINCIBILITY_DURATION: f32 = 10.0;

    /// Player weapons
    pub const LASER_COOLDOWN: f32 = 0.5;
    pub const LASER_DAMAGE: f32 = 1.0;
    pub const MISSILE_COOLDOWN: f32 = 0.8;
    pub const MISSILE_DAMAGE: f32 = 2.0;
    pub const WEAPON_SWITCH_COOLDOWN: f32 = 0.3;
    /// Distance from the hull centre where shots appear
    pub const MUZZLE_OFFSET: f32 = 0.5;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_LIFESPAN: f32 = 2.0;
    pub const PROJECTILE_SCALE: f32 = 0.3;
    pub const HEAVY_SHELL_SCALE: f32 = 0.5;
    /// Sweep length multiplier applied to speed * dt
    pub const SWEEP_FACTOR: f32 = 2.0;

    /// Homing missiles
    pub const HOMING_TURN_RATE: f32 = 3.0;
    pub const HOMING_RETARGET: f32 = 0.5;
    /// Steering stops inside this distance to avoid orbiting the target
    pub const HOMING_DEADZONE: f32 = 0.5;
    pub const HOMING_SEARCH_RADIUS: f32 = 15.0;

    /// Collision radii
    pub const PROJECTILE_HIT_RADIUS: f32 = 0.8;
    pub const CONTACT_RADIUS: f32 = 0.4;

    /// Collectibles
    pub const COLLECTIBLE_SPIN: f32 = 2.0;
    pub const COLLECTIBLE_SCALE: f32 = 0.5;
    pub const COLLECTIBLE_FADE: f32 = 2.0;

    /// Asteroids
    pub const ASTEROID_MIN_OVERLAP: f32 = 0.1;
}

/// Normalize an angle to (-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    PI - (PI - angle).rem_euclid(TAU)
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest signed rotation taking `from` onto `to`, in (-π, π]
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector in the XY plane for an angle
#[inline]
pub fn heading(angle: f32) -> Vec3 {
    Vec3::new(angle.cos(), angle.sin(), 0.0)
}

/// Planar angle of a vector (0 for the zero vector)
#[inline]
pub fn bearing_of(v: Vec3) -> f32 {
    v.y.atan2(v.x)
}

/// Left-hand perpendicular of a planar vector
#[inline]
pub fn perpendicular(v: Vec3) -> Vec3 {
    Vec3::new(-v.y, v.x, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_angle_edges() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!((wrap_angle(5.0 * PI) - PI).abs() < 1e-4);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert_eq!(wrap_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_shortest_arc_crosses_zero() {
        let arc = shortest_arc(TAU - 0.1, 0.1);
        assert!((arc - 0.2).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn wrap_angle_stays_in_range(angle in -1000.0f32..1000.0) {
            let wrapped = wrap_angle(angle);
            prop_assert!((0.0..TAU).contains(&wrapped));
        }

        #[test]
        fn normalize_angle_stays_in_range(angle in -1000.0f32..1000.0) {
            let n = normalize_angle(angle);
            prop_assert!(n > -PI - 1e-6 && n <= PI + 1e-6);
        }
    }
}
