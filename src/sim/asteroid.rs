//! Static asteroid obstacles
//!
//! Asteroids never move or take damage. They spin in place and bounce the
//! player away on contact, harder for bigger rocks and faster impacts.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId};
use crate::consts::*;
use crate::perpendicular;

const MIN_FORCE: f32 = 2.0;
const FORCE_RANGE: f32 = 8.0;
const SIZE_PER_FORCE: f32 = 0.8;
const RADIUS_PER_SCALE: f32 = 0.4;
/// Extra gap left between the surfaces after pushing the player out
const SEPARATION: f32 = 0.1;
const SPEED_BONUS_FACTOR: f32 = 0.5;
const SPEED_BONUS_MAX: f32 = 5.0;
const SIDEWAYS_JITTER: f32 = 0.2;
const LOCK_BASE: f32 = 0.2;
const LOCK_PER_FORCE: f32 = 1.0 / 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: EntityId,
    pub body: Body,
    /// Bounce strength, also decides the size
    pub force: f32,
    /// Radians per second
    pub spin: f32,
}

/// How a contact moves the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    /// Where the player is put back, just outside the rock
    pub position: Vec3,
    pub impulse: Vec3,
    /// Seconds of ignored controls
    pub lock: f32,
}

impl Asteroid {
    pub fn new(id: EntityId, position: Vec3, rng: &mut impl Rng) -> Self {
        let force = MIN_FORCE + rng.random::<f32>() * FORCE_RANGE;
        let spin = rng.random::<f32>() * 2.0 - 1.0;
        Self {
            id,
            body: Body::new(position, Vec2::splat(force * SIZE_PER_FORCE)),
            force,
            spin,
        }
    }

    /// Uniformly placed inside the world square
    pub fn scattered(id: EntityId, bound: f32, rng: &mut impl Rng) -> Self {
        let position = Vec3::new(
            rng.random_range(-bound..=bound),
            rng.random_range(-bound..=bound),
            0.0,
        );
        Self::new(id, position, rng)
    }

    pub fn radius(&self) -> f32 {
        self.body.scale.x * RADIUS_PER_SCALE
    }

    pub fn update(&mut self, dt: f32) {
        if self.body.active {
            self.body.rotate_by(self.spin * dt);
        }
    }

    /// Resolve a contact with a player at `position` moving at `velocity`.
    /// Grazes with less than [`ASTEROID_MIN_OVERLAP`] penetration are ignored.
    pub fn bounce(&self, position: Vec3, velocity: Vec3, rng: &mut impl Rng) -> Option<Bounce> {
        let offset = position - self.body.position;
        let distance = offset.length();
        let reach = self.radius() + PLAYER_RADIUS;
        if reach - distance <= ASTEROID_MIN_OVERLAP {
            return None;
        }

        let push = if distance > 0.001 {
            offset / distance
        } else {
            Vec3::X
        };
        let base = self.force * 2.0;
        let magnitude = base + (velocity.length() * SPEED_BONUS_FACTOR).min(SPEED_BONUS_MAX);
        let jitter = rng.random_range(-SIDEWAYS_JITTER..=SIDEWAYS_JITTER);
        let impulse = push * magnitude + perpendicular(push) * base * jitter;

        Some(Bounce {
            position: self.body.position + push * (reach + SEPARATION),
            impulse,
            lock: LOCK_BASE + magnitude * LOCK_PER_FORCE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rock(force: f32) -> Asteroid {
        Asteroid {
            id: EntityId(2),
            body: Body::new(Vec3::ZERO, Vec2::splat(force * SIZE_PER_FORCE)),
            force,
            spin: 0.5,
        }
    }

    #[test]
    fn test_random_rocks_stay_in_range() {
        let mut rng = Pcg32::seed_from_u64(4);
        for i in 0..50 {
            let a = Asteroid::scattered(EntityId(i), 20.0, &mut rng);
            assert!((2.0..=10.0).contains(&a.force));
            assert!((-1.0..=1.0).contains(&a.spin));
            assert!(a.body.position.x.abs() <= 20.0 && a.body.position.y.abs() <= 20.0);
            assert!((a.body.scale.x - a.force * 0.8).abs() < 1e-5);
        }
    }

    #[test]
    fn test_graze_is_ignored() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = rock(5.0);
        // radius 1.6 + 0.4, overlap of 0.05
        let graze = Vec3::new(1.95, 0.0, 0.0);
        assert!(a.bounce(graze, Vec3::ZERO, &mut rng).is_none());
    }

    #[test]
    fn test_bounce_pushes_out_and_locks() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = rock(5.0);
        let hit = a
            .bounce(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-4.0, 0.0, 0.0), &mut rng)
            .unwrap();
        assert!((hit.position - Vec3::new(2.1, 0.0, 0.0)).length() < 1e-5);
        // 2 * 5 + min(2, 5)
        assert!((hit.impulse.x - 12.0).abs() < 1e-4);
        assert!(hit.impulse.y.abs() <= 10.0 * 0.2 + 1e-5);
        assert!((hit.lock - (0.2 + 12.0 / 20.0)).abs() < 1e-5);
    }

    #[test]
    fn test_dead_centre_pushes_along_x() {
        let mut rng = Pcg32::seed_from_u64(1);
        let a = rock(3.0);
        let hit = a.bounce(Vec3::ZERO, Vec3::ZERO, &mut rng).unwrap();
        assert!(hit.position.x > 0.0);
        assert!(hit.position.y.abs() < 1e-6);
    }
}
