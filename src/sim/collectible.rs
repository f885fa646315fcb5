//! Power-up collectibles

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Body, EntityId};
use super::timer::Timer;
use crate::assets::SpriteKind;
use crate::consts::*;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Speed,
    Power,
    Invincible,
}

impl CollectibleKind {
    /// 60% invincibility parts, 20% each buff
    pub fn roll(rng: &mut impl Rng) -> Self {
        let roll = rng.random_range(0..10);
        match roll {
            0..=5 => CollectibleKind::Invincible,
            6 | 7 => CollectibleKind::Speed,
            _ => CollectibleKind::Power,
        }
    }

    pub fn sprite(&self) -> SpriteKind {
        match self {
            CollectibleKind::Speed => SpriteKind::CollectibleSpeed,
            CollectibleKind::Power => SpriteKind::CollectiblePower,
            CollectibleKind::Invincible => SpriteKind::CollectibleInvincible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: EntityId,
    pub body: Body,
    pub kind: CollectibleKind,
    pub collected: bool,
    /// Runs from pickup until the ghost fades out
    pub disappear: Timer,
}

impl Collectible {
    pub fn new(id: EntityId, kind: CollectibleKind, position: Vec3) -> Self {
        Self {
            id,
            body: Body::new(position, Vec2::splat(COLLECTIBLE_SCALE)),
            kind,
            collected: false,
            disappear: Timer::idle(),
        }
    }

    /// Can still be picked up
    pub fn is_available(&self) -> bool {
        self.body.is_collidable() && !self.collected
    }

    /// Mark as picked up; returns false if it already was
    pub fn collect(&mut self, now: f64) -> bool {
        if !self.is_available() {
            return false;
        }
        self.collected = true;
        self.body.ghost = true;
        self.disappear.start(now, COLLECTIBLE_FADE);
        true
    }

    pub fn update(&mut self, now: f64, dt: f32) {
        if !self.body.active {
            return;
        }
        if self.collected {
            if self.disappear.finished(now) {
                self.body.active = false;
            }
        } else {
            self.body.rotate_by(COLLECTIBLE_SPIN * dt);
        }
    }
}
