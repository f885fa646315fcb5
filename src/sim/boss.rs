//! Boss: a three-part articulated turret with a one-way phase machine
//!
//! The base spins around the boss position, the lower arm hangs off the
//! base and the upper arm off the lower arm. Each joint oscillates inside
//! its own angular bounds. World transforms are composed as
//! `parent * Rz(angle) * T(offset)`.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_3, FRAC_PI_4, PI};

use super::entity::{Body, Combatant, DamageOutcome, Damageable, EntityId, Spatial};
use super::projectile::{Faction, Shot, ShotGuidance, Target, Volley};
use super::timer::Timer;
use crate::assets::SpriteKind;
use crate::{bearing_of, heading};

pub const BOSS_MAX_HEALTH: f32 = 40.0;
pub const BOSS_SCALE: f32 = 3.0;
const BASE_SPIN: f32 = 0.3;
const ENRAGED_SPIN: f32 = 0.6;

const BASE_RADIUS: f32 = 1.5;
const ARM_RADIUS_FACTOR: f32 = 0.4;

const FAN_SIZE: i32 = 2;
const FAN_STEP: f32 = PI / 12.0;
const FAN_SPEED: f32 = 5.0;
const FAN_DAMAGE: f32 = 1.0;
const FAN_FIRST: f32 = 2.0;
const FAN_INTERVAL: f32 = 2.0;
const FAN_ENRAGED_INTERVAL: f32 = 1.0;

const MISSILE_FIRST: f32 = 5.0;
const MISSILE_INTERVAL: f32 = 3.0;
const MISSILE_SPEED: f32 = 3.0;
const MISSILE_LIFESPAN: f32 = 7.0;
const MISSILE_TURN: f32 = 2.0;
const MISSILE_DAMAGE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    PhaseOne,
    PhaseTwo,
    Defeated,
}

/// Sub-parts in collision enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPart {
    Base,
    LowerArm,
    UpperArm,
}

impl BossPart {
    pub const ALL: [BossPart; 3] = [BossPart::Base, BossPart::LowerArm, BossPart::UpperArm];

    pub fn sprite(&self) -> SpriteKind {
        match self {
            BossPart::Base => SpriteKind::Boss,
            BossPart::LowerArm | BossPart::UpperArm => SpriteKind::BossArm,
        }
    }
}

/// One oscillating joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub angle: f32,
    /// Radians per second
    pub speed: f32,
    pub min: f32,
    pub max: f32,
    /// +1 or -1
    pub direction: f32,
    /// Translation from the joint to the part's centre, along local +Y
    pub reach: f32,
    pub scale: Vec2,
}

impl Joint {
    fn new(speed: f32, bound: f32, scale: Vec2, reach: f32) -> Self {
        Self {
            angle: 0.0,
            speed,
            min: -bound,
            max: bound,
            direction: 1.0,
            reach,
            scale,
        }
    }

    /// Advance the swing, reversing at either bound
    pub fn step(&mut self, dt: f32) {
        self.angle += self.direction * self.speed * dt;
        if self.angle > self.max {
            self.angle = self.max;
            self.direction = -1.0;
        } else if self.angle < self.min {
            self.angle = self.min;
            self.direction = 1.0;
        }
    }

    fn local(&self) -> Mat4 {
        Mat4::from_rotation_z(self.angle) * Mat4::from_translation(Vec3::new(0.0, self.reach, 0.0))
    }
}

/// World-space placement of one sub-part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartPose {
    pub part: BossPart,
    pub position: Vec3,
    pub rotation: f32,
    pub scale: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    /// Position plus base rotation
    pub body: Body,
    health: f32,
    max_health: f32,
    pub phase: BossPhase,
    pub spin: f32,
    pub lower_arm: Joint,
    pub upper_arm: Joint,
    pub projectile_timer: Timer,
    pub missile_timer: Timer,
}

impl Boss {
    pub fn new(id: EntityId, position: Vec3, now: f64) -> Self {
        let lower_scale = Vec2::new(1.0, 1.5);
        let upper_scale = Vec2::new(0.8, 1.6);
        Self {
            id,
            body: Body::new(position, Vec2::splat(BOSS_SCALE)),
            health: BOSS_MAX_HEALTH,
            max_health: BOSS_MAX_HEALTH,
            phase: BossPhase::PhaseOne,
            spin: BASE_SPIN,
            lower_arm: Joint::new(0.5, FRAC_PI_4, lower_scale, lower_scale.y / 1.7),
            upper_arm: Joint::new(0.8, FRAC_PI_3, upper_scale, upper_scale.y / 1.4),
            projectile_timer: Timer::started(now, FAN_FIRST),
            missile_timer: Timer::started(now, MISSILE_FIRST),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == BossPhase::Defeated
    }

    /// Animate joints and re-evaluate the phase
    pub fn update(&mut self, now: f64, dt: f32) {
        if !self.body.is_collidable() {
            return;
        }
        self.lower_arm.step(dt);
        self.upper_arm.step(dt);
        self.body.rotate_by(self.spin * dt);
        self.update_phase(now);
    }

    /// Apply at most one transition per call; transitions never go back
    fn update_phase(&mut self, now: f64) {
        if self.phase == BossPhase::PhaseOne && self.health <= self.max_health / 2.0 {
            self.phase = BossPhase::PhaseTwo;
            self.spin = ENRAGED_SPIN;
            self.projectile_timer.start(now, FAN_ENRAGED_INTERVAL);
            self.missile_timer.start(now, MISSILE_INTERVAL);
            log::info!("boss entering phase two ({:.1} hp)", self.health);
        }
        if self.health <= 0.0 && self.phase != BossPhase::Defeated {
            self.phase = BossPhase::Defeated;
            self.body.start_explosion(now);
            log::info!("boss defeated");
        }
    }

    fn transforms(&self) -> [Mat4; 3] {
        let base = Mat4::from_translation(self.body.position)
            * Mat4::from_rotation_z(self.body.rotation());
        let lower = base * self.lower_arm.local();
        let upper = lower * self.upper_arm.local();
        [base, lower, upper]
    }

    /// Sub-part placements in enumeration order
    pub fn parts(&self) -> [PartPose; 3] {
        let [base, lower, upper] = self.transforms();
        let base_rot = self.body.rotation();
        let lower_rot = base_rot + self.lower_arm.angle;
        let upper_rot = lower_rot + self.upper_arm.angle;
        [
            PartPose {
                part: BossPart::Base,
                position: base.w_axis.truncate(),
                rotation: base_rot,
                scale: self.body.scale,
                radius: BASE_RADIUS,
            },
            PartPose {
                part: BossPart::LowerArm,
                position: lower.w_axis.truncate(),
                rotation: lower_rot,
                scale: self.lower_arm.scale,
                radius: self.lower_arm.scale.x * ARM_RADIUS_FACTOR,
            },
            PartPose {
                part: BossPart::UpperArm,
                position: upper.w_axis.truncate(),
                rotation: upper_rot,
                scale: self.upper_arm.scale,
                radius: self.upper_arm.scale.x * ARM_RADIUS_FACTOR,
            },
        ]
    }

    /// Upper-arm tip and the direction the arm points
    pub fn muzzle(&self) -> (Vec3, Vec3) {
        let upper = self.transforms()[2];
        let along = upper.y_axis.truncate().normalize_or(Vec3::Y);
        let tip = upper.w_axis.truncate() + along * self.upper_arm.scale.y * 0.5;
        (tip, along)
    }

    fn fan(&self) -> Vec<Shot> {
        let (tip, along) = self.muzzle();
        let facing = bearing_of(along);
        (-FAN_SIZE..=FAN_SIZE)
            .map(|i| Shot {
                speed: FAN_SPEED,
                ..Shot::direct(
                    tip,
                    heading(facing + i as f32 * FAN_STEP),
                    FAN_DAMAGE,
                    Faction::Enemy,
                )
            })
            .collect()
    }

    fn missile(&self) -> Shot {
        Shot {
            speed: MISSILE_SPEED,
            lifespan: MISSILE_LIFESPAN,
            guidance: ShotGuidance::Homing {
                target: Some(Target::Player),
                turning_speed: MISSILE_TURN,
            },
            ..Shot::homing(
                self.body.position,
                self.body.bearing(),
                MISSILE_DAMAGE,
                Faction::Enemy,
            )
        }
    }
}

impl Spatial for Boss {
    fn id(&self) -> EntityId {
        self.id
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Damageable for Boss {
    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn take_damage(&mut self, amount: f32, now: f64) -> DamageOutcome {
        if !self.body.is_collidable() || self.is_defeated() {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount).max(0.0);
        log::debug!("boss hit for {amount:.1}, {:.1} left", self.health);
        self.update_phase(now);
        if self.is_defeated() {
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Wounded
        }
    }
}

impl Combatant for Boss {
    fn try_fire(&mut self, now: f64) -> Option<Volley> {
        if !self.body.is_collidable() || self.is_defeated() {
            return None;
        }
        let mut volley = Volley::default();

        if self.projectile_timer.finished(now) {
            volley.shots.extend(self.fan());
            let interval = match self.phase {
                BossPhase::PhaseOne => FAN_INTERVAL,
                _ => FAN_ENRAGED_INTERVAL,
            };
            self.projectile_timer.start(now, interval);
        }

        if self.phase == BossPhase::PhaseTwo && self.missile_timer.finished(now) {
            volley.shots.push(self.missile());
            self.missile_timer.start(now, MISSILE_INTERVAL);
        }

        (!volley.is_empty()).then_some(volley)
    }
}
