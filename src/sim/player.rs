//! The player's craft
//!
//! Holds health, power-up state, weapons and the knockback override. Input
//! arrives as [`Controls`]; the player turns it into acceleration and shots.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collectible::CollectibleKind;
use super::entity::{
    Body, Combatant, DamageOutcome, Damageable, EntityId, Movable, Mover, Spatial, apply_damage,
};
use super::physics::{BoundPolicy, Drag, Knockback, MotionParams};
use super::projectile::{Faction, Shot, Volley};
use super::timer::Timer;
use crate::consts::*;

/// Player weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weapon {
    #[default]
    Laser,
    Missile,
}

impl Weapon {
    pub fn other(self) -> Self {
        match self {
            Weapon::Laser => Weapon::Missile,
            Weapon::Missile => Weapon::Laser,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weapon::Laser => "Laser",
            Weapon::Missile => "Missile",
        }
    }
}

/// Held-key state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub thrust: bool,
    pub reverse: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
    pub switch_weapon: bool,
}

/// Timed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub multiplier: f32,
    pub active: bool,
    timer: Timer,
}

impl Buff {
    pub fn inactive() -> Self {
        Self {
            multiplier: 1.0,
            active: false,
            timer: Timer::idle(),
        }
    }

    /// Start or refresh the buff
    pub fn activate(&mut self, multiplier: f32, now: f64, duration: f32) {
        self.multiplier = multiplier;
        self.active = true;
        self.timer.start(now, duration);
    }

    /// Current multiplier (1.0 when off)
    pub fn factor(&self) -> f32 {
        if self.active { self.multiplier } else { 1.0 }
    }

    /// Switch off once the timer runs out; returns true on the tick it ends
    pub fn update(&mut self, now: f64) -> bool {
        if self.active && self.timer.finished(now) {
            self.active = false;
            self.multiplier = 1.0;
            return true;
        }
        false
    }

    pub fn remaining(&self, now: f64) -> f32 {
        if self.active { self.timer.remaining(now) } else { 0.0 }
    }
}

/// What a pickup did to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupEffect {
    SpeedBoost,
    PowerBoost,
    /// Counter advanced but threshold not reached
    InvinciblePart(u32),
    InvincibilityStarted,
}

/// Status changes noticed during [`Player::update_status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusChange {
    pub invincibility_ended: bool,
    pub speed_ended: bool,
    pub power_ended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub body: Body,
    pub mover: Mover,
    health: f32,
    max_health: f32,
    pub invincible: bool,
    pub invincibility: Timer,
    /// Invincibility parts collected toward the next shield
    pub invincible_items: u32,
    pub speed_buff: Buff,
    pub power_buff: Buff,
    pub weapon: Weapon,
    weapon_switch: Timer,
    switch_held: bool,
    pub knockback: Knockback,
    pub input_lock: Timer,
    fire_cooldown: Timer,
    world_bound: f32,
}

impl Player {
    pub fn new(id: EntityId, position: Vec3, world_bound: f32) -> Self {
        Self {
            id,
            body: Body::new(position, Vec2::ONE),
            mover: Mover::default(),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            invincible: false,
            invincibility: Timer::idle(),
            invincible_items: 0,
            speed_buff: Buff::inactive(),
            power_buff: Buff::inactive(),
            weapon: Weapon::Laser,
            weapon_switch: Timer::idle(),
            switch_held: false,
            knockback: Knockback::default(),
            input_lock: Timer::idle(),
            fire_cooldown: Timer::idle(),
            world_bound,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec3 {
        if self.knockback.active {
            self.knockback.velocity
        } else {
            self.mover.velocity
        }
    }

    /// Input is ignored while sliding, locked out, or exploding
    pub fn controls_locked(&self, now: f64) -> bool {
        !self.body.is_collidable()
            || self.knockback.active
            || (self.input_lock.is_started() && !self.input_lock.finished(now))
    }

    /// Turn held keys into rotation and acceleration
    pub fn apply_controls(&mut self, controls: &Controls, now: f64, dt: f32) {
        if self.controls_locked(now) {
            return;
        }
        let buff = self.speed_buff.factor();

        let turn = axis(controls.rotate_left, controls.rotate_right);
        self.body.rotate_by(turn * PLAYER_TURN_RATE * buff * dt);

        let forward = axis(controls.thrust, controls.reverse);
        let sideways = axis(controls.strafe_right, controls.strafe_left);
        self.mover.acceleration +=
            (self.body.bearing() * forward + self.body.right() * sideways) * PLAYER_THRUST;
    }

    /// Edge-triggered weapon toggle; returns true when the weapon changed
    pub fn switch_weapon(&mut self, pressed: bool, now: f64) -> bool {
        let edge = pressed && !self.switch_held;
        self.switch_held = pressed;
        let ready = !self.weapon_switch.is_started() || self.weapon_switch.finished(now);
        if !edge || !ready || !self.body.is_collidable() {
            return false;
        }
        self.weapon = self.weapon.other();
        self.weapon_switch.start(now, WEAPON_SWITCH_COOLDOWN);
        log::debug!("Weapon switched to {}", self.weapon.as_str());
        true
    }

    pub fn fire_ready(&self, now: f64) -> bool {
        !self.fire_cooldown.is_started() || self.fire_cooldown.finished(now)
    }

    /// Advance motion: explosion drift, knockback, or normal integration
    pub fn update_motion(&mut self, now: f64, dt: f32) {
        if !self.body.active {
            return;
        }
        if self.body.exploding {
            self.mover.velocity *= EXPLOSION_DRIFT;
            self.body.position += self.mover.velocity * dt;
            self.mover.acceleration = Vec3::ZERO;
            return;
        }
        if self.knockback.active {
            self.knockback.step(&mut self.body, dt, self.world_bound);
            self.mover.acceleration = Vec3::ZERO;
            return;
        }
        self.integrate(now, dt);
    }

    /// Enter sliding with an impulse and lock input for `lock` seconds
    pub fn knock(&mut self, impulse: Vec3, lock: f32, now: f64) {
        self.mover.velocity = Vec3::ZERO;
        self.mover.acceleration = Vec3::ZERO;
        self.knockback.start(impulse);
        self.input_lock.start(now, lock);
        log::debug!("Player knocked back, |v| = {:.2}", self.knockback.velocity.length());
    }

    /// Apply a collected item
    pub fn collect(&mut self, kind: CollectibleKind, now: f64) -> PickupEffect {
        match kind {
            CollectibleKind::Speed => {
                self.speed_buff.activate(SPEED_BUFF, now, BUFF_DURATION);
                PickupEffect::SpeedBoost
            }
            CollectibleKind::Power => {
                self.power_buff.activate(POWER_BUFF, now, BUFF_DURATION);
                PickupEffect::PowerBoost
            }
            CollectibleKind::Invincible => {
                self.invincible_items += 1;
                if self.invincible_items >= INVINCIBILITY_ITEMS {
                    self.invincible_items = 0;
                    self.invincible = true;
                    self.invincibility.start(now, INVINCIBILITY_DURATION);
                    log::info!("Player invincible for {INVINCIBILITY_DURATION}s");
                    PickupEffect::InvincibilityStarted
                } else {
                    PickupEffect::InvinciblePart(self.invincible_items)
                }
            }
        }
    }

    /// Expire buffs and invincibility
    pub fn update_status(&mut self, now: f64) -> StatusChange {
        let mut change = StatusChange {
            speed_ended: self.speed_buff.update(now),
            power_ended: self.power_buff.update(now),
            ..Default::default()
        };
        if self.invincible && self.invincibility.finished(now) {
            self.invincible = false;
            change.invincibility_ended = true;
            log::info!("Player invincibility ended");
        }
        change
    }
}

/// +1, -1 or 0 for a pair of opposing keys
fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

impl Spatial for Player {
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

impl Movable for Player {
    fn mover(&self) -> &Mover {
        &self.mover
    }

    fn split_mut(&mut self) -> (&mut Body, &mut Mover) {
        (&mut self.body, &mut self.mover)
    }

    fn motion(&self, _now: f64) -> MotionParams {
        MotionParams::new(PLAYER_MAX_SPEED)
            .with_buff(self.speed_buff.factor())
            .with_drag(Drag::WhenCoasting(PLAYER_DRAG))
            .bounded(self.world_bound, BoundPolicy::Clamp)
    }
}

impl Damageable for Player {
    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }

    fn take_damage(&mut self, amount: f32, now: f64) -> DamageOutcome {
        if self.invincible {
            return DamageOutcome::Ignored;
        }
        apply_damage(&mut self.body, &mut self.health, amount, now)
    }
}

impl Combatant for Player {
    fn try_fire(&mut self, now: f64) -> Option<Volley> {
        if !self.body.is_collidable() || !self.fire_ready(now) {
            return None;
        }
        let facing = self.body.bearing();
        let muzzle = self.body.position + facing * MUZZLE_OFFSET;
        let volley = match self.weapon {
            Weapon::Laser => {
                self.fire_cooldown
                    .start(now, LASER_COOLDOWN / self.power_buff.factor());
                Volley::single(Shot::direct(muzzle, facing, LASER_DAMAGE, Faction::Player))
            }
            Weapon::Missile => {
                self.fire_cooldown.start(now, MISSILE_COOLDOWN);
                Volley::single(Shot::homing(muzzle, facing, MISSILE_DAMAGE, Faction::Player))
            }
        };
        Some(volley)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::projectile::ShotGuidance;
    use proptest::prelude::*;

    fn player() -> Player {
        Player::new(EntityId(1), Vec3::ZERO, WORLD_BOUND)
    }

    #[test]
    fn test_fifth_invincible_item_triggers_shield() {
        let mut p = player();
        for i in 1..=4 {
            assert_eq!(
                p.collect(CollectibleKind::Invincible, 1.0),
                PickupEffect::InvinciblePart(i)
            );
        }
        assert!(!p.invincible);

        assert_eq!(
            p.collect(CollectibleKind::Invincible, 2.0),
            PickupEffect::InvincibilityStarted
        );
        assert_eq!(p.invincible_items, 0);
        assert!(p.invincible);
        assert!((p.invincibility.remaining(2.0) - 10.0).abs() < 1e-6);

        assert_eq!(p.take_damage(5.0, 3.0), DamageOutcome::Ignored);
        assert_eq!(p.health(), PLAYER_MAX_HEALTH);

        assert!(!p.update_status(11.9).invincibility_ended);
        assert!(p.update_status(12.0).invincibility_ended);
        assert!(!p.invincible);
    }

    #[test]
    fn test_buffs_expire() {
        let mut p = player();
        p.collect(CollectibleKind::Speed, 0.0);
        p.collect(CollectibleKind::Power, 5.0);
        assert_eq!(p.speed_buff.factor(), SPEED_BUFF);
        assert_eq!(p.power_buff.factor(), POWER_BUFF);

        let change = p.update_status(10.0);
        assert!(change.speed_ended && !change.power_ended);
        assert_eq!(p.speed_buff.factor(), 1.0);
        assert!(p.update_status(15.0).power_ended);
    }

    #[test]
    fn test_laser_cooldown_scales_with_power() {
        let mut p = player();
        assert!(p.try_fire(0.0).is_some());
        assert!(p.try_fire(0.4).is_none());
        assert!(p.try_fire(0.5).is_some());

        p.collect(CollectibleKind::Power, 0.5);
        assert!(p.try_fire(1.0).is_some());
        assert!(p.try_fire(1.1).is_none());
        assert!(p.try_fire(1.25).is_some());
    }

    #[test]
    fn test_laser_shot_leaves_from_nose() {
        let mut p = player();
        p.body.set_rotation(std::f32::consts::FRAC_PI_2);
        let volley = p.try_fire(0.0).unwrap();
        let shot = &volley.shots[0];
        assert!((shot.origin - Vec3::new(0.0, MUZZLE_OFFSET, 0.0)).length() < 1e-5);
        assert_eq!(shot.faction, Faction::Player);
    }

    #[test]
    fn test_weapon_switch_is_edge_triggered() {
        let mut p = player();
        assert!(p.switch_weapon(true, 0.0));
        assert_eq!(p.weapon, Weapon::Missile);
        // held key does nothing
        assert!(!p.switch_weapon(true, 1.0));
        assert!(!p.switch_weapon(false, 1.0));
        assert!(p.switch_weapon(true, 1.1));
        // pressed again inside the cooldown
        assert!(!p.switch_weapon(false, 1.2));
        assert!(!p.switch_weapon(true, 1.3));
        assert_eq!(p.weapon, Weapon::Laser);
    }

    #[test]
    fn test_missile_volley_is_homing() {
        let mut p = player();
        p.weapon = Weapon::Missile;
        let volley = p.try_fire(0.0).unwrap();
        let shot = &volley.shots[0];
        assert!(shot.exhaust);
        assert!(matches!(shot.guidance, ShotGuidance::Homing { .. }));
    }

    #[test]
    fn test_knockback_locks_controls() {
        let mut p = player();
        p.knock(Vec3::new(5.0, 0.0, 0.0), 0.3, 0.0);
        assert!(p.controls_locked(0.1));

        let controls = Controls {
            thrust: true,
            ..Default::default()
        };
        p.apply_controls(&controls, 0.1, 0.1);
        assert_eq!(p.mover.acceleration, Vec3::ZERO);

        p.update_motion(0.1, 0.1);
        assert!(p.body.position.x > 0.0);
    }

    #[test]
    fn test_thrust_moves_forward_and_clamps_at_bound() {
        let mut p = Player::new(EntityId(1), Vec3::new(19.95, 0.0, 0.0), WORLD_BOUND);
        let controls = Controls {
            thrust: true,
            ..Default::default()
        };
        for i in 0..30 {
            let now = f64::from(i) * 0.1;
            p.apply_controls(&controls, now, 0.1);
            p.update_motion(now, 0.1);
        }
        assert!(p.body.position.x <= WORLD_BOUND);
        assert_eq!(p.mover.velocity.x, 0.0);
    }

    #[test]
    fn test_dies_at_zero_health() {
        let mut p = player();
        assert_eq!(p.take_damage(19.0, 0.0), DamageOutcome::Wounded);
        assert_eq!(p.take_damage(1.0, 0.0), DamageOutcome::Destroyed);
        assert!(p.body.exploding);
        assert_eq!(p.health_fraction(), 0.0);
        assert!(p.try_fire(10.0).is_none());
    }

    proptest! {
        #[test]
        fn player_speed_respects_buffed_cap(steps in 1usize..200, speed in any::<bool>()) {
            let mut p = player();
            if speed {
                p.collect(CollectibleKind::Speed, 0.0);
            }
            let controls = Controls { thrust: true, strafe_left: true, ..Default::default() };
            for i in 0..steps {
                let now = i as f64 / 60.0;
                p.apply_controls(&controls, now, 1.0 / 60.0);
                p.update_motion(now, 1.0 / 60.0);
                let cap = PLAYER_MAX_SPEED * p.speed_buff.factor();
                prop_assert!(p.mover.velocity.length() <= cap * (1.0 + 1e-5));
            }
        }
    }
}
