//! Entity model
//!
//! Every simulated object carries the same [`Body`] block (transform plus
//! lifecycle flags) next to a kind-specific payload. Behaviour shared across
//! kinds goes through the capability traits below instead of a class tree.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::asteroid::Asteroid;
use super::boss::Boss;
use super::collectible::Collectible;
use super::decor::{Backdrop, Exhaust};
use super::enemy::Enemy;
use super::physics::{self, MotionParams};
use super::player::Player;
use super::projectile::{Projectile, Volley};
use super::timer::Timer;
use crate::consts::*;
use crate::{heading, wrap_angle};

/// Stable identity of a simulated object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Transform and lifecycle state common to every entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec3,
    /// Radians in [0, 2π); private so the range can't be broken
    rotation: f32,
    pub scale: Vec2,
    /// Inactive bodies are skipped by update and collision, then removed
    pub active: bool,
    /// Exploding bodies still animate but no longer collide
    pub exploding: bool,
    pub explosion: Timer,
    /// Translucent post-collection look, no gameplay effect
    pub ghost: bool,
}

impl Body {
    pub fn new(position: Vec3, scale: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale,
            active: true,
            exploding: false,
            explosion: Timer::idle(),
            ghost: false,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = wrap_angle(angle);
    }

    pub fn rotate_by(&mut self, delta: f32) {
        self.set_rotation(self.rotation + delta);
    }

    /// Unit facing vector
    pub fn bearing(&self) -> Vec3 {
        heading(self.rotation)
    }

    /// Unit vector 90° clockwise from facing
    pub fn right(&self) -> Vec3 {
        heading(self.rotation - FRAC_PI_2)
    }

    /// Active and not exploding
    pub fn is_collidable(&self) -> bool {
        self.active && !self.exploding
    }

    /// Begin the explosion; returns false if it was already exploding or gone
    pub fn start_explosion(&mut self, now: f64) -> bool {
        if !self.is_collidable() {
            return false;
        }
        self.exploding = true;
        self.explosion.start(now, EXPLOSION_DURATION);
        self.scale = Vec2::splat(EXPLOSION_SCALE);
        true
    }

    /// Retire the body once its explosion has played out
    pub fn update_lifecycle(&mut self, now: f64) {
        if self.exploding && self.explosion.finished(now) {
            self.active = false;
        }
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

/// Velocity and per-tick acceleration impulse
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mover {
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target is already exploding, gone, or shielded
    Ignored,
    /// Health dropped but stayed above zero
    Wounded,
    /// This hit took health to zero and started the explosion
    Destroyed,
}

/// Anything with an identity and a body
pub trait Spatial {
    fn id(&self) -> EntityId;
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
}

/// Anything moved by the physics integrator
pub trait Movable: Spatial {
    fn mover(&self) -> &Mover;
    fn split_mut(&mut self) -> (&mut Body, &mut Mover);
    /// Integration limits for the current state
    fn motion(&self, now: f64) -> MotionParams;

    fn integrate(&mut self, now: f64, dt: f32) {
        let params = self.motion(now);
        let (body, mover) = self.split_mut();
        physics::integrate(body, mover, &params, dt);
    }
}

/// Anything with a health pool
pub trait Damageable: Spatial {
    fn health(&self) -> f32;
    fn max_health(&self) -> f32;
    fn take_damage(&mut self, amount: f32, now: f64) -> DamageOutcome;

    fn health_fraction(&self) -> f32 {
        if self.max_health() <= 0.0 {
            0.0
        } else {
            (self.health() / self.max_health()).clamp(0.0, 1.0)
        }
    }
}

/// Anything that shoots
pub trait Combatant: Spatial {
    /// Fire if the weapon is ready; the caller turns the volley into projectiles
    fn try_fire(&mut self, now: f64) -> Option<Volley>;
}

/// Shared health bookkeeping for kinds whose death is an explosion
pub(crate) fn apply_damage(
    body: &mut Body,
    health: &mut f32,
    amount: f32,
    now: f64,
) -> DamageOutcome {
    if !body.is_collidable() {
        return DamageOutcome::Ignored;
    }
    *health = (*health - amount).max(0.0);
    if *health <= 0.0 {
        body.start_explosion(now);
        DamageOutcome::Destroyed
    } else {
        DamageOutcome::Wounded
    }
}

/// Borrowed view of any entity, tagged by kind
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Player(&'a Player),
    Backdrop(&'a Backdrop),
    Enemy(&'a Enemy),
    Boss(&'a Boss),
    Projectile(&'a Projectile),
    Collectible(&'a Collectible),
    Asteroid(&'a Asteroid),
    Exhaust(&'a Exhaust),
}

impl<'a> EntityRef<'a> {
    pub fn id(&self) -> EntityId {
        match self {
            EntityRef::Player(p) => p.id(),
            EntityRef::Backdrop(b) => b.id,
            EntityRef::Enemy(e) => e.id(),
            EntityRef::Boss(b) => b.id(),
            EntityRef::Projectile(p) => p.id,
            EntityRef::Collectible(c) => c.id,
            EntityRef::Asteroid(a) => a.id,
            EntityRef::Exhaust(x) => x.id,
        }
    }

    pub fn body(&self) -> &'a Body {
        match self {
            EntityRef::Player(p) => &p.body,
            EntityRef::Backdrop(b) => &b.body,
            EntityRef::Enemy(e) => &e.body,
            EntityRef::Boss(b) => &b.body,
            EntityRef::Projectile(p) => &p.body,
            EntityRef::Collectible(c) => &c.body,
            EntityRef::Asteroid(a) => &a.body,
            EntityRef::Exhaust(x) => &x.body,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            EntityRef::Player(_) => "player",
            EntityRef::Backdrop(_) => "backdrop",
            EntityRef::Enemy(e) => e.kind.as_str(),
            EntityRef::Boss(_) => "boss",
            EntityRef::Projectile(_) => "projectile",
            EntityRef::Collectible(_) => "collectible",
            EntityRef::Asteroid(_) => "asteroid",
            EntityRef::Exhaust(_) => "exhaust",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_rotation_normalized() {
        let mut body = Body::new(Vec3::ZERO, Vec2::ONE);
        body.set_rotation(-PI / 2.0);
        assert!((body.rotation() - 1.5 * PI).abs() < 1e-5);
        body.set_rotation(0.0);
        assert_eq!(body.rotation(), 0.0);
        body.set_rotation(7.0 * PI);
        assert!((body.rotation() - PI).abs() < 1e-4);
    }

    #[test]
    fn test_bearing_and_right() {
        let mut body = Body::new(Vec3::ZERO, Vec2::ONE);
        body.set_rotation(FRAC_PI_2);
        assert!((body.bearing() - Vec3::Y).length() < 1e-6);
        assert!((body.right() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_explosion_lifecycle() {
        let mut body = Body::new(Vec3::ZERO, Vec2::ONE);
        assert!(body.start_explosion(1.0));
        assert!(!body.start_explosion(1.5));
        assert!(!body.is_collidable());
        assert_eq!(body.scale, Vec2::splat(EXPLOSION_SCALE));

        body.update_lifecycle(5.9);
        assert!(body.active);
        body.update_lifecycle(6.0);
        assert!(!body.active);
    }

    #[test]
    fn test_apply_damage_idempotent_after_death() {
        let mut body = Body::new(Vec3::ZERO, Vec2::ONE);
        let mut health = 1.0;
        assert_eq!(apply_damage(&mut body, &mut health, 1.5, 0.0), DamageOutcome::Destroyed);
        assert_eq!(health, 0.0);
        let timer = body.explosion;
        assert_eq!(apply_damage(&mut body, &mut health, 3.0, 0.5), DamageOutcome::Ignored);
        assert_eq!(body.explosion, timer);
    }

    proptest! {
        #[test]
        fn set_rotation_always_in_range(angle in -500.0f32..500.0) {
            let mut body = Body::new(Vec3::ZERO, Vec2::ONE);
            body.set_rotation(angle);
            prop_assert!(body.rotation() >= 0.0 && body.rotation() < TAU);
        }
    }
}
