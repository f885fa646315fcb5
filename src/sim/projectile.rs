//! Projectiles and homing missiles
//!
//! A homing missile never looks for targets itself. It holds a [`Target`]
//! that the world resolves to a position every tick, and a retarget timer
//! that tells the world when it may hand over a fresh one.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId};
use super::timer::Timer;
use crate::assets::SpriteKind;
use crate::consts::*;
use crate::{bearing_of, heading, shortest_arc};

/// Who fired it, which decides what it can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// Non-owning reference to whatever a missile is chasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Player,
    Enemy(EntityId),
    Boss,
}

/// Guidance requested by a shooter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotGuidance {
    Direct,
    Homing {
        target: Option<Target>,
        turning_speed: f32,
    },
}

/// One projectile a combatant wants created
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub scale: f32,
    pub lifespan: f32,
    pub faction: Faction,
    pub guidance: ShotGuidance,
    pub sprite: SpriteKind,
    /// Attach a trailing exhaust decoration
    pub exhaust: bool,
}

impl Shot {
    /// Plain straight-flying round
    pub fn direct(origin: Vec3, direction: Vec3, damage: f32, faction: Faction) -> Self {
        let sprite = match faction {
            Faction::Player => SpriteKind::Laser,
            Faction::Enemy => SpriteKind::EnemyShot,
        };
        Self {
            origin,
            direction: direction.normalize_or(Vec3::X),
            speed: PROJECTILE_SPEED,
            damage,
            scale: PROJECTILE_SCALE,
            lifespan: PROJECTILE_LIFESPAN,
            faction,
            guidance: ShotGuidance::Direct,
            sprite,
            exhaust: false,
        }
    }

    /// Guided missile with default speed, lifespan and turn rate
    pub fn homing(origin: Vec3, direction: Vec3, damage: f32, faction: Faction) -> Self {
        Self {
            scale: PROJECTILE_SCALE,
            guidance: ShotGuidance::Homing {
                target: None,
                turning_speed: HOMING_TURN_RATE,
            },
            sprite: SpriteKind::Missile,
            exhaust: true,
            ..Self::direct(origin, direction, damage, faction)
        }
    }
}

/// Everything one trigger pull produces
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Volley {
    pub shots: Vec<Shot>,
}

impl Volley {
    pub fn single(shot: Shot) -> Self {
        Self { shots: vec![shot] }
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    pub target: Option<Target>,
    /// Radians per second
    pub turning_speed: f32,
    pub retarget: Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Guidance {
    Direct,
    Homing(Homing),
}

/// A live projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub body: Body,
    /// Unit travel direction
    pub direction: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub faction: Faction,
    pub lifespan: Timer,
    pub expired: bool,
    pub guidance: Guidance,
    pub sprite: SpriteKind,
}

impl Projectile {
    pub fn from_shot(id: EntityId, shot: &Shot, now: f64) -> Self {
        let direction = shot.direction.normalize_or(Vec3::X);
        let mut body = Body::new(shot.origin, Vec2::splat(shot.scale));
        body.set_rotation(bearing_of(direction));

        let guidance = match shot.guidance {
            ShotGuidance::Direct => Guidance::Direct,
            ShotGuidance::Homing {
                target,
                turning_speed,
            } => Guidance::Homing(Homing {
                target,
                turning_speed,
                retarget: Timer::started(now, HOMING_RETARGET),
            }),
        };

        Self {
            id,
            body,
            direction,
            speed: shot.speed,
            damage: shot.damage,
            faction: shot.faction,
            lifespan: Timer::started(now, shot.lifespan),
            expired: false,
            guidance,
            sprite: shot.sprite,
        }
    }

    /// Active and not yet expired
    pub fn is_live(&self) -> bool {
        self.body.active && !self.expired
    }

    pub fn is_homing(&self) -> bool {
        matches!(self.guidance, Guidance::Homing(_))
    }

    pub fn target(&self) -> Option<Target> {
        match &self.guidance {
            Guidance::Homing(h) => h.target,
            Guidance::Direct => None,
        }
    }

    /// Whether the owner may supply a new target this tick
    pub fn wants_target(&self, now: f64) -> bool {
        match &self.guidance {
            Guidance::Homing(h) => h.target.is_none() || h.retarget.finished(now),
            Guidance::Direct => false,
        }
    }

    /// Hand over a (possibly new) target and restart the retarget timer
    pub fn retarget(&mut self, target: Option<Target>, now: f64) {
        if let Guidance::Homing(h) = &mut self.guidance {
            h.target = target;
            h.retarget.start(now, HOMING_RETARGET);
        }
    }

    /// Forget the target; the missile flies straight from here on
    pub fn lose_target(&mut self) {
        if let Guidance::Homing(h) = &mut self.guidance {
            h.target = None;
        }
    }

    /// Length of this tick's collision sweep
    pub fn sweep_length(&self, dt: f32) -> f32 {
        self.speed * dt * SWEEP_FACTOR
    }

    pub fn expire(&mut self) {
        self.expired = true;
        self.body.active = false;
    }

    /// Advance one tick. `target_pos` is the resolved target position, or
    /// `None` when there is nothing valid to steer toward.
    pub fn update(&mut self, now: f64, dt: f32, target_pos: Option<Vec3>) {
        if !self.is_live() {
            return;
        }
        if self.lifespan.finished(now) {
            self.expire();
            return;
        }

        if let (Guidance::Homing(h), Some(target)) = (&self.guidance, target_pos) {
            let to_target = target - self.body.position;
            if to_target.length() > HOMING_DEADZONE {
                self.direction = steer(self.direction, to_target, h.turning_speed * dt);
            }
        }

        self.body.set_rotation(bearing_of(self.direction));
        self.body.position += self.direction * self.speed * dt;
    }
}

/// Rotate `direction` toward `to_target` by at most `max_turn` radians
pub fn steer(direction: Vec3, to_target: Vec3, max_turn: f32) -> Vec3 {
    let current = bearing_of(direction);
    let error = shortest_arc(current, bearing_of(to_target));
    let turn = error.clamp(-max_turn, max_turn);
    heading(current + turn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missile_at_origin(now: f64) -> Projectile {
        let shot = Shot::homing(Vec3::ZERO, Vec3::X, MISSILE_DAMAGE, Faction::Player);
        Projectile::from_shot(EntityId(1), &shot, now)
    }

    #[test]
    fn test_direct_projectile_flies_straight_and_expires() {
        let shot = Shot::direct(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), 1.0, Faction::Enemy);
        let mut p = Projectile::from_shot(EntityId(7), &shot, 0.0);
        assert_eq!(p.sprite, SpriteKind::EnemyShot);

        p.update(0.5, 0.5, None);
        assert!((p.body.position.y - 4.0).abs() < 1e-5);
        assert!(p.is_live());

        p.update(2.0, 0.5, None);
        assert!(p.expired);
        assert!(!p.body.active);
    }

    #[test]
    fn test_homing_turn_is_clamped() {
        let mut missile = missile_at_origin(0.0);
        let error = 170f32.to_radians();
        let target = heading(error) * 5.0;

        missile.update(0.1, 0.1, Some(target));
        let turned = bearing_of(missile.direction);
        assert!((turned - 0.3).abs() < 1e-5, "turned {turned}");
        assert!((missile.body.rotation() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_homing_takes_shortest_way_round() {
        let mut missile = missile_at_origin(0.0);
        let target = heading(-100f32.to_radians()) * 5.0;
        missile.update(0.1, 0.1, Some(target));
        assert!((bearing_of(missile.direction) + 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_lost_target_flies_straight() {
        let mut missile = missile_at_origin(0.0);
        missile.update(0.1, 0.1, None);
        assert!((missile.direction - Vec3::X).length() < 1e-6);
        assert!((missile.body.position.x - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_no_steering_inside_deadzone() {
        let mut missile = missile_at_origin(0.0);
        missile.update(0.1, 0.1, Some(Vec3::new(0.0, 0.3, 0.0)));
        assert!((missile.direction - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_retarget_timer() {
        let mut missile = missile_at_origin(0.0);
        assert!(missile.wants_target(0.0));
        missile.retarget(Some(Target::Enemy(EntityId(3))), 0.0);
        assert!(!missile.wants_target(0.25));
        assert!(missile.wants_target(0.5));
        assert_eq!(missile.target(), Some(Target::Enemy(EntityId(3))));
    }
}
