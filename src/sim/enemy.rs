//! Enemy archetypes and their behaviour state machine
//!
//! The world tells each enemy where the player is ([`Enemy::perceive`]),
//! lets it shoot ([`Combatant::try_fire`]) and then lets it move
//! ([`Enemy::think`]). Distances are always measured by the caller's
//! positions; an enemy never looks anything up itself.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use super::entity::{
    Body, Combatant, DamageOutcome, Damageable, EntityId, Movable, Mover, Spatial, apply_damage,
};
use super::physics::{self, Bound, BoundPolicy, Drag, MotionParams};
use super::projectile::{Faction, Shot, Volley};
use super::timer::Timer;
use crate::assets::SpriteKind;
use crate::consts::*;
use crate::{bearing_of, heading, perpendicular};

/// Seconds of player velocity added to the aim point
const LEAD_TIME: f32 = 0.5;
/// Attack inside this fraction of detection range
const ATTACK_FRACTION: f32 = 0.7;
/// Intercepting enemies give up beyond this multiple of detection range
const GIVE_UP_FACTOR: f32 = 1.5;
/// Cooldown applied when entering Attacking
const ENGAGE_DELAY: f32 = 1.0;
const FIRST_REAIM: f32 = 1.0;
const REAIM_INTERVAL: f32 = 2.0;
const INTERCEPT_BOOST: f32 = 1.5;

const STRAFE_FIRST: f32 = 1.0;
const STRAFE_MIN: f32 = 0.8;
const STRAFE_JITTER: f32 = 0.4;

const CHARGE_SPEED: f32 = 5.0;
const CHARGE_DURATION: f32 = 0.8;
const CHARGE_COOLDOWN: f32 = 5.0;
/// Cooldown after a charge that ran its full duration
const CHARGE_RECOVERY: f32 = 3.0;
/// Cooldown after a charge cut short by proximity
const CHARGE_ABORT_RECOVERY: f32 = 4.0;
const CHARGE_MIN_RANGE: f32 = 4.0;
const CHARGE_MAX_RANGE: f32 = 12.0;
/// Random aim offset spans ±half of this
const CHARGE_SPREAD: f32 = 1.5;
const CHARGE_REACH: f32 = 0.7;
const CHARGE_ARRIVED: f32 = 0.5;
const CHARGE_CLOSE: f32 = 2.0;
const CHARGE_ATTACK_DELAY: f32 = 2.0;

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Regular,
    Fast,
    Heavy,
}

/// Fixed per-archetype tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub speed: f32,
    pub detection_range: f32,
    pub health: f32,
    pub damage: f32,
    pub scale: f32,
    /// Preferred standoff distance from the target
    pub ideal_distance: f32,
    pub fire_cooldown: f32,
    /// Radius used by projectile sweeps
    pub hit_radius: f32,
    /// Speed cap multiplier while attacking
    pub attack_speed: f32,
    pub patrol_width: (f32, f32),
    pub patrol_height: (f32, f32),
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Regular, EnemyKind::Fast, EnemyKind::Heavy];

    pub fn profile(self) -> EnemyProfile {
        match self {
            EnemyKind::Regular => EnemyProfile {
                speed: 1.5,
                detection_range: 8.0,
                health: 1.0,
                damage: 1.0,
                scale: 1.0,
                ideal_distance: 2.5,
                fire_cooldown: 2.0,
                hit_radius: 0.8,
                attack_speed: 1.0,
                patrol_width: (1.0, 3.0),
                patrol_height: (1.0, 2.5),
            },
            EnemyKind::Fast => EnemyProfile {
                speed: 2.0,
                detection_range: 7.0,
                health: 0.7,
                damage: 0.5,
                scale: 1.0,
                ideal_distance: 1.8,
                fire_cooldown: 0.8,
                hit_radius: 0.8,
                attack_speed: 1.8,
                patrol_width: (0.8, 2.3),
                patrol_height: (0.8, 1.8),
            },
            EnemyKind::Heavy => EnemyProfile {
                speed: 1.0,
                detection_range: 10.0,
                health: 2.5,
                damage: 2.0,
                scale: 1.5,
                ideal_distance: 3.5,
                fire_cooldown: 3.0,
                hit_radius: 1.2,
                attack_speed: 1.2,
                patrol_width: (1.5, 4.0),
                patrol_height: (1.5, 3.5),
            },
        }
    }

    pub fn index(self) -> usize {
        match self {
            EnemyKind::Regular => 0,
            EnemyKind::Fast => 1,
            EnemyKind::Heavy => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Regular => "regular enemy",
            EnemyKind::Fast => "fast enemy",
            EnemyKind::Heavy => "heavy enemy",
        }
    }

    pub fn sprite(&self) -> SpriteKind {
        match self {
            EnemyKind::Regular => SpriteKind::EnemyRegular,
            EnemyKind::Fast => SpriteKind::EnemyFast,
            EnemyKind::Heavy => SpriteKind::EnemyHeavy,
        }
    }
}

/// Behaviour states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    Patrolling,
    Intercepting,
    Attacking,
}

/// Parametric patrol ellipse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patrol {
    pub center: Vec3,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl Patrol {
    /// An ellipse whose current point is `position`
    pub fn through(position: Vec3, width: f32, height: f32) -> Self {
        let mut patrol = Self {
            center: position,
            width,
            height,
            angle: 0.0,
        };
        patrol.recenter_on(position);
        patrol
    }

    pub fn point(&self) -> Vec3 {
        self.center
            + Vec3::new(
                self.width * self.angle.cos(),
                self.height * self.angle.sin(),
                0.0,
            )
    }

    /// Shift the ellipse so the current angle maps onto `position`
    pub fn recenter_on(&mut self, position: Vec3) {
        self.center = position - (self.point() - self.center);
    }

    /// Facing along the path, looking slightly ahead
    pub fn facing(&self) -> f32 {
        let ahead = self.angle + 0.1;
        (self.height * ahead.cos()).atan2(-self.width * ahead.sin())
    }
}

/// Heavy charge bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub charging: bool,
    pub timer: Timer,
    pub cooldown: Timer,
    pub target: Vec3,
}

/// Archetype-specific attack extras
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Tactic {
    /// Regular: hold position and fire the fan
    Hold,
    /// Fast: weave perpendicular to the target bearing
    Strafe { timer: Timer, right: bool },
    /// Heavy: orbit, occasionally charge
    Charger(Charge),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub body: Body,
    pub mover: Mover,
    health: f32,
    max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub detection_range: f32,
    pub state: EnemyState,
    pub patrol: Patrol,
    /// Where the enemy is aiming (player position plus lead)
    pub target: Vec3,
    /// Player inside detection range at the last [`Enemy::perceive`]
    pub in_range: bool,
    pub attack_cooldown: Timer,
    course: Timer,
    pub tactic: Tactic,
    world_bound: f32,
}

impl Enemy {
    pub fn new(
        id: EntityId,
        kind: EnemyKind,
        position: Vec3,
        patrol_size: Vec2,
        now: f64,
        world_bound: f32,
    ) -> Self {
        let profile = kind.profile();
        let mut body = Body::new(position, Vec2::splat(profile.scale));
        body.set_rotation(FRAC_PI_2);

        let tactic = match kind {
            EnemyKind::Regular => Tactic::Hold,
            EnemyKind::Fast => Tactic::Strafe {
                timer: Timer::started(now, STRAFE_FIRST),
                right: true,
            },
            EnemyKind::Heavy => Tactic::Charger(Charge {
                charging: false,
                timer: Timer::idle(),
                cooldown: Timer::started(now, CHARGE_COOLDOWN),
                target: position,
            }),
        };

        Self {
            id,
            kind,
            body,
            mover: Mover::default(),
            health: profile.health,
            max_health: profile.health,
            damage: profile.damage,
            speed: profile.speed,
            detection_range: profile.detection_range,
            state: EnemyState::Patrolling,
            patrol: Patrol::through(position, patrol_size.x, patrol_size.y),
            target: position,
            in_range: false,
            attack_cooldown: Timer::started(now, ENGAGE_DELAY),
            course: Timer::started(now, REAIM_INTERVAL),
            tactic,
            world_bound,
        }
    }

    pub fn profile(&self) -> EnemyProfile {
        self.kind.profile()
    }

    pub fn hit_radius(&self) -> f32 {
        self.kind.profile().hit_radius
    }

    pub fn is_charging(&self) -> bool {
        matches!(self.tactic, Tactic::Charger(Charge { charging: true, .. }))
    }

    /// Heavy with both cooldowns done and its aim point inside charge range
    pub fn charge_ready(&self, now: f64) -> bool {
        let Tactic::Charger(charge) = &self.tactic else {
            return false;
        };
        let distance = self.body.distance_to(self.target);
        !charge.charging
            && charge.cooldown.finished(now)
            && self.attack_cooldown.finished(now)
            && distance > CHARGE_MIN_RANGE
            && distance < CHARGE_MAX_RANGE
    }

    /// Update state and aim point from the player's position
    pub fn perceive(&mut self, player_pos: Vec3, player_vel: Vec3, now: f64) {
        if !self.body.is_collidable() {
            return;
        }
        let distance = self.body.distance_to(player_pos);
        self.in_range = distance < self.detection_range;

        if self.in_range {
            self.target = player_pos + player_vel * LEAD_TIME;
            let next = if distance < self.detection_range * ATTACK_FRACTION {
                EnemyState::Attacking
            } else {
                EnemyState::Intercepting
            };
            self.set_state(next, now);
        } else {
            match self.state {
                EnemyState::Intercepting if distance >= self.detection_range * GIVE_UP_FACTOR => {
                    self.set_state(EnemyState::Patrolling, now);
                }
                EnemyState::Intercepting => self.target = player_pos,
                EnemyState::Attacking | EnemyState::Patrolling => {}
            }
        }
    }

    /// Switch state, running the entry action once
    pub fn set_state(&mut self, next: EnemyState, now: f64) {
        if next == self.state {
            return;
        }
        log::debug!("{} {:?}: {:?} -> {:?}", self.kind.as_str(), self.id, self.state, next);
        self.state = next;

        match next {
            EnemyState::Intercepting => {
                let dir = (self.target - self.body.position).normalize_or_zero();
                if dir != Vec3::ZERO {
                    self.mover.velocity = dir * self.speed * INTERCEPT_BOOST;
                }
                self.course.start(now, FIRST_REAIM);
            }
            EnemyState::Attacking => {
                self.attack_cooldown.start(now, ENGAGE_DELAY);
            }
            EnemyState::Patrolling => {
                self.mover = Mover::default();
                self.patrol.recenter_on(self.body.position);
                if let Tactic::Charger(charge) = &mut self.tactic {
                    charge.charging = false;
                }
            }
        }
    }

    /// Move for one tick according to the current state
    pub fn think(&mut self, now: f64, dt: f32, rng: &mut impl Rng) {
        if !self.body.is_collidable() {
            return;
        }

        if let Tactic::Strafe { timer, right } = &mut self.tactic
            && timer.finished(now)
        {
            *right = !*right;
            timer.start(now, STRAFE_MIN + rng.random::<f32>() * STRAFE_JITTER);
        }

        if self.is_charging() {
            self.charge_step(now, dt);
            return;
        }

        if self.state != EnemyState::Patrolling {
            let to_target = self.target - self.body.position;
            if to_target.length() > 0.001 {
                self.body.set_rotation(bearing_of(to_target));
            }
        }

        match self.state {
            EnemyState::Patrolling => self.patrol_step(dt),
            EnemyState::Intercepting => self.intercept_step(now, dt),
            EnemyState::Attacking => self.attack_step(now, dt, rng),
        }
    }

    fn patrol_step(&mut self, dt: f32) {
        self.patrol.angle += dt * self.speed * 0.5;
        self.body.position = self.patrol.point();
        self.body.set_rotation(self.patrol.facing());
    }

    fn intercept_step(&mut self, now: f64, dt: f32) {
        let to_target = self.target - self.body.position;
        let distance = to_target.length();
        let dir = to_target.normalize_or_zero();

        if self.course.finished(now) {
            let speed = self.mover.velocity.length();
            self.mover.velocity = dir * speed;
            self.course.start(now, REAIM_INTERVAL);
        }

        let factor = distance_factor(distance, self.profile().ideal_distance);
        self.mover.acceleration = dir * self.speed * factor * 2.0;
        self.integrate(now, dt);
    }

    fn attack_step(&mut self, now: f64, dt: f32, rng: &mut impl Rng) {
        let to_target = self.target - self.body.position;
        let distance = to_target.length();
        let dir = to_target.normalize_or_zero();
        let ideal = self.profile().ideal_distance;
        let factor = distance_factor(distance, ideal);

        match self.tactic {
            Tactic::Hold => {
                self.mover = Mover::default();
            }
            Tactic::Strafe { right, .. } => {
                let side = if right { 1.0 } else { -1.0 };
                let approach = dir * self.speed * factor * 0.8;
                let strafe = perpendicular(dir) * self.speed * 1.2 * side;
                self.mover.acceleration = (approach + strafe) * 2.0;
                self.integrate(now, dt);
            }
            Tactic::Charger(_) => {
                if self.charge_ready(now) {
                    self.start_charge(now, dir, distance, rng);
                    return;
                }
                let movement = if factor.abs() > 0.1 {
                    dir * factor
                } else {
                    perpendicular(dir) * 0.5
                };
                self.mover.acceleration = movement * self.speed * 2.0;
                self.integrate(now, dt);
            }
        }
    }

    fn start_charge(&mut self, now: f64, dir: Vec3, distance: f32, rng: &mut impl Rng) {
        let offset = (rng.random::<f32>() - 0.5) * CHARGE_SPREAD;
        let aim = bearing_of(dir) + offset;
        let position = self.body.position;
        if let Tactic::Charger(charge) = &mut self.tactic {
            charge.charging = true;
            charge.timer.start(now, CHARGE_DURATION);
            charge.cooldown.start(now, CHARGE_COOLDOWN);
            charge.target = position + heading(aim) * distance * CHARGE_REACH;
        }
        self.body.set_rotation(aim);
        self.attack_cooldown.start(now, CHARGE_ATTACK_DELAY);
        log::debug!("heavy enemy {:?} charging", self.id);
    }

    fn charge_step(&mut self, now: f64, dt: f32) {
        let Tactic::Charger(charge) = &mut self.tactic else {
            return;
        };
        if charge.timer.finished(now) {
            charge.charging = false;
            charge.cooldown.start(now, CHARGE_RECOVERY);
            return;
        }

        let to_charge = charge.target - self.body.position;
        let near_target = self.body.distance_to(self.target) < CHARGE_CLOSE;
        if to_charge.length() < CHARGE_ARRIVED || near_target {
            charge.charging = false;
            charge.cooldown.start(now, CHARGE_ABORT_RECOVERY);
            self.mover = Mover::default();
            return;
        }

        let dir = to_charge.normalize_or_zero();
        self.mover.velocity = dir * CHARGE_SPEED;
        let next = self.body.position + self.mover.velocity * dt;
        let bound = Bound {
            half_extent: self.world_bound,
            policy: BoundPolicy::Reflect,
        };
        self.body.position =
            physics::apply_bound(self.body.position, next, &mut self.mover.velocity, bound);
        self.body.set_rotation(bearing_of(dir));
    }
}

/// -1 when too close, +1 when too far, linear in between
pub fn distance_factor(current: f32, ideal: f32) -> f32 {
    if current < ideal * 0.7 {
        -1.0
    } else if current > ideal * 1.3 {
        1.0
    } else {
        (current - ideal) / ideal
    }
}

impl Spatial for Enemy {
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

impl Movable for Enemy {
    fn mover(&self) -> &Mover {
        &self.mover
    }

    fn split_mut(&mut self) -> (&mut Body, &mut Mover) {
        (&mut self.body, &mut self.mover)
    }

    fn motion(&self, _now: f64) -> MotionParams {
        let params = match (self.state, self.kind) {
            (EnemyState::Attacking, EnemyKind::Fast) => {
                MotionParams::new(self.speed * self.profile().attack_speed)
                    .with_drag(Drag::Always(0.98))
            }
            (EnemyState::Attacking, EnemyKind::Heavy) => {
                MotionParams::new(self.speed * self.profile().attack_speed)
                    .with_drag(Drag::Always(0.97))
            }
            _ => MotionParams::new(self.speed * INTERCEPT_BOOST)
                .with_drag(Drag::WhenCoasting(0.98)),
        };
        params.bounded(self.world_bound, BoundPolicy::Reflect)
    }
}

impl Damageable for Enemy {
    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn take_damage(&mut self, amount: f32, now: f64) -> DamageOutcome {
        apply_damage(&mut self.body, &mut self.health, amount, now)
    }
}

impl Combatant for Enemy {
    fn try_fire(&mut self, now: f64) -> Option<Volley> {
        if !self.body.is_collidable()
            || self.state != EnemyState::Attacking
            || !self.in_range
            || self.is_charging()
            || self.charge_ready(now)
            || !self.attack_cooldown.finished(now)
        {
            return None;
        }
        self.attack_cooldown.start(now, self.profile().fire_cooldown);

        let rotation = self.body.rotation();
        let muzzle = self.body.position + self.body.bearing() * MUZZLE_OFFSET;
        let volley = match self.kind {
            EnemyKind::Regular => Volley {
                shots: (0..5)
                    .map(|i| {
                        let angle = rotation + PI * (i as f32 / 4.0 - 0.5);
                        Shot::direct(muzzle, heading(angle), self.damage, Faction::Enemy)
                    })
                    .collect(),
            },
            EnemyKind::Fast => Volley::single(Shot::direct(
                muzzle,
                self.body.bearing(),
                self.damage,
                Faction::Enemy,
            )),
            EnemyKind::Heavy => Volley::single(Shot {
                scale: HEAVY_SHELL_SCALE,
                sprite: SpriteKind::Missile,
                exhaust: true,
                ..Shot::direct(muzzle, self.body.bearing(), self.damage, Faction::Enemy)
            }),
        };
        Some(volley)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortest_arc;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn enemy(kind: EnemyKind) -> Enemy {
        Enemy::new(EntityId(5), kind, Vec3::ZERO, Vec2::new(2.0, 1.0), 0.0, WORLD_BOUND)
    }

    #[test]
    fn test_distance_factor() {
        assert_eq!(distance_factor(1.0, 2.5), -1.0);
        assert_eq!(distance_factor(4.0, 2.5), 1.0);
        assert!((distance_factor(3.0, 2.5) - 0.2).abs() < 1e-6);
        assert!(distance_factor(2.5, 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_state_transitions() {
        let mut e = enemy(EnemyKind::Regular);
        e.perceive(Vec3::new(7.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert_eq!(e.state, EnemyState::Intercepting);
        assert!((e.mover.velocity - Vec3::new(2.25, 0.0, 0.0)).length() < 1e-5);

        e.perceive(Vec3::new(5.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), 0.5);
        assert_eq!(e.state, EnemyState::Attacking);
        assert_eq!(e.target, Vec3::new(6.0, 0.0, 0.0));
        assert!(!e.attack_cooldown.finished(1.4));
        assert!(e.attack_cooldown.finished(1.5));

        // attacking enemies don't drop straight back to patrol
        e.perceive(Vec3::new(30.0, 0.0, 0.0), Vec3::ZERO, 2.0);
        assert_eq!(e.state, EnemyState::Attacking);
        assert!(!e.in_range);
        assert_eq!(e.target, Vec3::new(6.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_volley_with_player_out_of_range() {
        let mut e = enemy(EnemyKind::Regular);
        e.perceive(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert_eq!(e.state, EnemyState::Attacking);

        e.perceive(Vec3::new(25.0, 0.0, 0.0), Vec3::ZERO, 1.0);
        assert_eq!(e.state, EnemyState::Attacking);
        assert!(e.try_fire(1.0).is_none());
        assert!(e.try_fire(10.0).is_none());

        // back in range, the held cooldown fires straight away
        e.perceive(Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, 10.0);
        assert!(e.try_fire(10.0).is_some());
    }

    #[test]
    fn test_intercepting_gives_up_far_away() {
        let mut e = enemy(EnemyKind::Regular);
        e.perceive(Vec3::new(7.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        e.perceive(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 0.1);
        assert_eq!(e.state, EnemyState::Intercepting);
        assert_eq!(e.target, Vec3::new(10.0, 0.0, 0.0));

        e.body.position = Vec3::new(1.0, 1.0, 0.0);
        e.perceive(Vec3::new(13.0, 1.0, 0.0), Vec3::ZERO, 0.2);
        assert_eq!(e.state, EnemyState::Patrolling);
        assert!((e.patrol.point() - e.body.position).length() < 1e-5);
    }

    #[test]
    fn test_patrol_follows_ellipse() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = enemy(EnemyKind::Regular);
        let start = e.body.position;
        e.think(0.1, 0.1, &mut rng);
        assert!((e.patrol.angle - 0.075).abs() < 1e-6);
        assert!((e.body.position - e.patrol.point()).length() < 1e-6);
        assert!(e.body.position != start);
    }

    #[test]
    fn test_lethal_damage_explodes_once() {
        let mut e = enemy(EnemyKind::Regular);
        assert_eq!(e.take_damage(1.5, 2.0), DamageOutcome::Destroyed);
        assert!(e.health() <= 0.0);
        assert!(e.body.exploding);
        assert!(!e.body.is_collidable());

        let explosion = e.body.explosion;
        assert_eq!(e.take_damage(1.0, 2.5), DamageOutcome::Ignored);
        assert_eq!(e.body.explosion, explosion);
    }

    #[test]
    fn test_regular_fires_fan() {
        let mut e = enemy(EnemyKind::Regular);
        e.perceive(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert!(e.try_fire(0.5).is_none());
        let volley = e.try_fire(1.0).unwrap();
        assert_eq!(volley.shots.len(), 5);

        let centre = bearing_of(volley.shots[2].direction);
        assert!(shortest_arc(e.body.rotation(), centre).abs() < 1e-5);
        let span = shortest_arc(
            bearing_of(volley.shots[0].direction),
            bearing_of(volley.shots[4].direction),
        );
        assert!((span.abs() - PI).abs() < 1e-4);
        assert!(e.try_fire(2.9).is_none());
        assert!(e.try_fire(3.0).is_some());
    }

    #[test]
    fn test_fast_cooldown_and_strafe_flip() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut e = enemy(EnemyKind::Fast);
        e.perceive(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert_eq!(e.state, EnemyState::Attacking);
        assert!(e.try_fire(1.0).is_some());
        assert!(e.try_fire(1.7).is_none());
        assert!(e.try_fire(1.81).is_some());

        e.think(1.0, 0.016, &mut rng);
        assert!(matches!(e.tactic, Tactic::Strafe { right: false, .. }));
        assert!(e.mover.velocity.length() <= 2.0 * 1.8 + 1e-5);
        assert!(e.mover.velocity.y.abs() > 0.0);
    }

    #[test]
    fn test_heavy_charge_at_distance_eight() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut e = enemy(EnemyKind::Heavy);
        e.target = Vec3::new(8.0, 0.0, 0.0);
        e.set_state(EnemyState::Attacking, 0.0);
        let now = 6.0;
        assert!(e.attack_cooldown.finished(now));

        e.think(now, 0.016, &mut rng);
        assert!(e.is_charging());
        assert!(shortest_arc(0.0, e.body.rotation()).abs() <= 0.75 + 1e-5);
        let Tactic::Charger(charge) = e.tactic else {
            panic!("heavy enemy lost its charge state");
        };
        assert!((charge.target.length() - 8.0 * 0.7).abs() < 1e-4);
        assert!(e.try_fire(now).is_none());

        // player closes in: charge aborts
        e.think(now + 0.1, 0.1, &mut rng);
        assert!(e.is_charging());
        e.target = e.body.position + Vec3::new(1.5, 0.0, 0.0);
        e.think(now + 0.2, 0.1, &mut rng);
        assert!(!e.is_charging());
        assert_eq!(e.mover.velocity, Vec3::ZERO);
        let Tactic::Charger(charge) = e.tactic else {
            panic!("heavy enemy lost its charge state");
        };
        assert!(!charge.cooldown.finished(now + 4.1));
        assert!(charge.cooldown.finished(now + 4.3));
    }

    #[test]
    fn test_heavy_holds_fire_when_charge_is_ready() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut e = enemy(EnemyKind::Heavy);
        e.perceive(Vec3::new(6.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        assert_eq!(e.state, EnemyState::Attacking);

        // attack cooldown is done but the charge cooldown is not: shell
        assert!(!e.charge_ready(2.0));
        assert!(e.try_fire(2.0).is_some());

        e.perceive(Vec3::new(6.0, 0.0, 0.0), Vec3::ZERO, 6.0);
        assert!(e.charge_ready(6.0));
        assert!(e.try_fire(6.0).is_none());
        e.think(6.0, 0.016, &mut rng);
        assert!(e.is_charging());
    }

    #[test]
    fn test_heavy_charge_times_out() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut e = enemy(EnemyKind::Heavy);
        e.target = Vec3::new(11.5, 0.0, 0.0);
        e.set_state(EnemyState::Attacking, 0.0);
        e.think(6.0, 0.01, &mut rng);
        assert!(e.is_charging());
        e.think(6.9, 0.01, &mut rng);
        assert!(!e.is_charging());
    }

    #[test]
    fn test_heavy_no_charge_out_of_range() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut e = enemy(EnemyKind::Heavy);
        e.target = Vec3::new(3.0, 0.0, 0.0);
        e.set_state(EnemyState::Attacking, 0.0);
        e.think(6.0, 0.016, &mut rng);
        assert!(!e.is_charging());
    }

    #[test]
    fn test_heavy_shell() {
        let mut e = enemy(EnemyKind::Heavy);
        e.perceive(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, 0.0);
        let volley = e.try_fire(1.0).unwrap();
        let shot = &volley.shots[0];
        assert_eq!(shot.damage, 2.0);
        assert_eq!(shot.scale, HEAVY_SHELL_SCALE);
        assert!(shot.exhaust);
    }
}
