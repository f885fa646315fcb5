//! Decorative entities: no collision, no gameplay effect

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId};
use crate::assets::SpriteKind;

/// How far behind the parent's centre the exhaust sits, in parent scales
const EXHAUST_TRAIL: f32 = 0.8;
const EXHAUST_SCALE: f32 = 0.3;
const BACKDROP_SCALE: f32 = 100.0;

/// Full-screen background; its skin changes with the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    pub id: EntityId,
    pub body: Body,
    pub skin: SpriteKind,
}

impl Backdrop {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            body: Body::new(Vec3::new(0.0, 0.0, -1.0), Vec2::splat(BACKDROP_SCALE)),
            skin: SpriteKind::BackdropLevelOne,
        }
    }
}

/// Engine flame trailing a projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhaust {
    pub id: EntityId,
    pub body: Body,
    pub parent: EntityId,
}

impl Exhaust {
    pub fn new(id: EntityId, parent: EntityId, parent_body: &Body) -> Self {
        let mut exhaust = Self {
            id,
            body: Body::new(parent_body.position, Vec2::splat(EXHAUST_SCALE)),
            parent,
        };
        exhaust.follow(Some(parent_body));
        exhaust
    }

    /// Track the parent, or switch off once it is gone
    pub fn follow(&mut self, parent: Option<&Body>) {
        match parent {
            Some(p) if p.active => {
                self.body.position = p.position - p.bearing() * p.scale.x * EXHAUST_TRAIL;
                self.body.set_rotation(p.rotation());
            }
            _ => self.body.active = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_exhaust_trails_parent() {
        let mut parent = Body::new(Vec3::new(1.0, 1.0, 0.0), Vec2::splat(0.5));
        parent.set_rotation(FRAC_PI_2);
        let mut flame = Exhaust::new(EntityId(2), EntityId(1), &parent);
        assert!((flame.body.position - Vec3::new(1.0, 0.6, 0.0)).length() < 1e-5);

        parent.position.x = 3.0;
        flame.follow(Some(&parent));
        assert!((flame.body.position.x - 3.0).abs() < 1e-5);
        assert!(flame.body.active);
    }

    #[test]
    fn test_exhaust_dies_with_parent() {
        let mut parent = Body::new(Vec3::ZERO, Vec2::ONE);
        let mut flame = Exhaust::new(EntityId(2), EntityId(1), &parent);
        parent.active = false;
        flame.follow(Some(&parent));
        assert!(!flame.body.active);

        let mut orphan = Exhaust::new(EntityId(3), EntityId(1), &Body::new(Vec3::ZERO, Vec2::ONE));
        orphan.follow(None);
        assert!(!orphan.body.active);
    }
}
