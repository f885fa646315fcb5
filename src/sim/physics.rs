//! Motion integration
//!
//! Acceleration is an impulse: it is consumed by one integration step and
//! then reset. Knockback temporarily replaces normal integration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Mover};
use crate::consts::*;

/// Velocity damping policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drag {
    None,
    /// Damp only when acceleration is negligible, so the mover coasts to rest
    WhenCoasting(f32),
    /// Damp every step
    Always(f32),
}

/// What happens when a step would leave the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundPolicy {
    /// Reject the move on that axis (player controls)
    Clamp,
    /// Stop at the edge and bounce the velocity component back at half speed
    Reflect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub half_extent: f32,
    pub policy: BoundPolicy,
}

/// Integration limits for one mover
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub max_speed: f32,
    pub speed_buff: f32,
    pub drag: Drag,
    pub bound: Option<Bound>,
}

impl MotionParams {
    pub fn new(max_speed: f32) -> Self {
        Self {
            max_speed,
            speed_buff: 1.0,
            drag: Drag::None,
            bound: None,
        }
    }

    pub fn with_buff(mut self, buff: f32) -> Self {
        self.speed_buff = buff;
        self
    }

    pub fn with_drag(mut self, drag: Drag) -> Self {
        self.drag = drag;
        self
    }

    pub fn bounded(mut self, half_extent: f32, policy: BoundPolicy) -> Self {
        self.bound = Some(Bound {
            half_extent,
            policy,
        });
        self
    }

    /// Effective speed cap
    pub fn speed_cap(&self) -> f32 {
        (self.max_speed * self.speed_buff).max(0.0)
    }
}

/// Advance one mover by `dt`
pub fn integrate(body: &mut Body, mover: &mut Mover, params: &MotionParams, dt: f32) {
    let buff = params.speed_buff.max(0.0);
    mover.velocity += mover.acceleration * dt * buff;
    mover.velocity = clamp_speed(mover.velocity, params.speed_cap());

    match params.drag {
        Drag::WhenCoasting(factor) if mover.acceleration.length() < COAST_EPSILON => {
            mover.velocity *= factor;
        }
        Drag::Always(factor) => mover.velocity *= factor,
        _ => {}
    }

    let next = body.position + mover.velocity * dt;
    body.position = match params.bound {
        Some(bound) => apply_bound(body.position, next, &mut mover.velocity, bound),
        None => next,
    };

    mover.acceleration = Vec3::ZERO;
}

/// Scale `v` down so its length does not exceed `max`
pub fn clamp_speed(v: Vec3, max: f32) -> Vec3 {
    if max <= 0.0 {
        return Vec3::ZERO;
    }
    v.clamp_length_max(max)
}

/// Resolve a step against the square world bound, axis by axis
pub fn apply_bound(current: Vec3, next: Vec3, velocity: &mut Vec3, bound: Bound) -> Vec3 {
    let limit = bound.half_extent;
    let mut out = next;
    for axis in 0..2 {
        if out[axis].abs() <= limit {
            continue;
        }
        match bound.policy {
            BoundPolicy::Clamp => {
                out[axis] = current[axis].clamp(-limit, limit);
                velocity[axis] = 0.0;
            }
            BoundPolicy::Reflect => {
                out[axis] = out[axis].clamp(-limit, limit);
                velocity[axis] = -velocity[axis] * BOUND_RESTITUTION;
            }
        }
    }
    out
}

/// Transient sliding motion imposed by a collision
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Knockback {
    pub velocity: Vec3,
    pub active: bool,
}

impl Knockback {
    /// Enter sliding with an impulse, capped at [`KNOCKBACK_MAX`]
    pub fn start(&mut self, impulse: Vec3) {
        self.velocity = impulse.clamp_length_max(KNOCKBACK_MAX);
        self.active = self.velocity.length() >= KNOCKBACK_STOP;
        if !self.active {
            self.velocity = Vec3::ZERO;
        }
    }

    /// Slide one step; returns whether sliding continues
    pub fn step(&mut self, body: &mut Body, dt: f32, half_extent: f32) -> bool {
        if !self.active {
            return false;
        }
        let next = body.position + self.velocity * dt;
        let bound = Bound {
            half_extent,
            policy: BoundPolicy::Reflect,
        };
        body.position = apply_bound(body.position, next, &mut self.velocity, bound);
        self.velocity *= KNOCKBACK_DAMPING;
        if self.velocity.length() < KNOCKBACK_STOP {
            self.velocity = Vec3::ZERO;
            self.active = false;
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec3::new(x, y, 0.0), Vec2::ONE)
    }

    #[test]
    fn test_acceleration_is_an_impulse() {
        let mut body = body_at(0.0, 0.0);
        let mut mover = Mover {
            velocity: Vec3::ZERO,
            acceleration: Vec3::new(2.0, 0.0, 0.0),
        };
        integrate(&mut body, &mut mover, &MotionParams::new(10.0), 0.5);
        assert!((mover.velocity.x - 1.0).abs() < 1e-6);
        assert!((body.position.x - 0.5).abs() < 1e-6);
        assert_eq!(mover.acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_coasting_drag_only_without_thrust() {
        let params = MotionParams::new(10.0).with_drag(Drag::WhenCoasting(0.5));
        let mut body = body_at(0.0, 0.0);
        let mut mover = Mover {
            velocity: Vec3::new(2.0, 0.0, 0.0),
            acceleration: Vec3::ZERO,
        };
        integrate(&mut body, &mut mover, &params, 0.1);
        assert!((mover.velocity.x - 1.0).abs() < 1e-6);

        mover.acceleration = Vec3::new(1.0, 0.0, 0.0);
        integrate(&mut body, &mut mover, &params, 0.1);
        assert!((mover.velocity.x - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_rejects_move_out_of_bounds() {
        let params = MotionParams::new(10.0).bounded(20.0, BoundPolicy::Clamp);
        let mut body = body_at(19.9, 0.0);
        let mut mover = Mover {
            velocity: Vec3::new(5.0, 1.0, 0.0),
            acceleration: Vec3::ZERO,
        };
        integrate(&mut body, &mut mover, &params, 0.1);
        assert_eq!(body.position.x, 19.9);
        assert_eq!(mover.velocity.x, 0.0);
        assert!((body.position.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_bounces_at_half_speed() {
        let params = MotionParams::new(10.0).bounded(20.0, BoundPolicy::Reflect);
        let mut body = body_at(-19.9, 0.0);
        let mut mover = Mover {
            velocity: Vec3::new(-4.0, 0.0, 0.0),
            acceleration: Vec3::ZERO,
        };
        integrate(&mut body, &mut mover, &params, 0.1);
        assert_eq!(body.position.x, -20.0);
        assert!((mover.velocity.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_knockback_decays_to_rest() {
        let mut body = body_at(0.0, 0.0);
        let mut knock = Knockback::default();
        knock.start(Vec3::new(100.0, 0.0, 0.0));
        assert!((knock.velocity.length() - KNOCKBACK_MAX).abs() < 1e-4);

        let mut steps = 0;
        while knock.step(&mut body, 1.0 / 60.0, 20.0) {
            steps += 1;
            assert!(steps < 1000, "knockback never settled");
        }
        assert_eq!(knock.velocity, Vec3::ZERO);
        assert!(body.position.x > 0.0 && body.position.x <= 20.0);
    }

    #[test]
    fn test_tiny_knockback_ignored() {
        let mut knock = Knockback::default();
        knock.start(Vec3::new(0.01, 0.0, 0.0));
        assert!(!knock.active);
    }

    proptest! {
        #[test]
        fn velocity_never_exceeds_cap(
            vx in -50.0f32..50.0, vy in -50.0f32..50.0,
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            max in 0.1f32..10.0, buff in 0.5f32..3.0,
            dt in 0.0f32..0.5,
        ) {
            let params = MotionParams::new(max)
                .with_buff(buff)
                .with_drag(Drag::WhenCoasting(0.98))
                .bounded(20.0, BoundPolicy::Reflect);
            let mut body = body_at(0.0, 0.0);
            let mut mover = Mover {
                velocity: Vec3::new(vx, vy, 0.0),
                acceleration: Vec3::new(ax, ay, 0.0),
            };
            integrate(&mut body, &mut mover, &params, dt);
            prop_assert!(mover.velocity.length() <= max * buff * (1.0 + 1e-5));
        }
    }
}
