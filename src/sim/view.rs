//! Render list handed to an external renderer
//!
//! Back-to-front order: backdrop, obstacles, pickups, trails, shots,
//! enemies, boss, player.

use glam::{Vec2, Vec3};

use super::entity::Body;
use super::state::World;
use crate::assets::{SpriteKind, TextureHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteInstance {
    pub sprite: SpriteKind,
    pub texture: TextureHandle,
    pub position: Vec3,
    pub rotation: f32,
    pub scale: Vec2,
    /// Draw translucent
    pub ghost: bool,
}

/// Sprites for every active entity
pub fn sprites(world: &World) -> Vec<SpriteInstance> {
    let mut out = Vec::new();
    let mut push = |sprite: SpriteKind, body: &Body| {
        if !body.active {
            return;
        }
        let sprite = if body.exploding {
            SpriteKind::Explosion
        } else {
            sprite
        };
        out.push(SpriteInstance {
            sprite,
            texture: world.textures.get(sprite),
            position: body.position,
            rotation: body.rotation(),
            scale: body.scale,
            ghost: body.ghost,
        });
    };

    push(world.backdrop.skin, &world.backdrop.body);
    for a in &world.asteroids {
        push(SpriteKind::Asteroid, &a.body);
    }
    for c in &world.collectibles {
        push(c.kind.sprite(), &c.body);
    }
    for x in &world.decor {
        push(SpriteKind::Exhaust, &x.body);
    }
    for p in &world.projectiles {
        push(p.sprite, &p.body);
    }
    for e in &world.enemies {
        push(e.kind.sprite(), &e.body);
    }
    if let Some(boss) = &world.boss {
        if boss.body.is_collidable() {
            for part in boss.parts() {
                let mut body = Body::new(part.position, part.scale);
                body.set_rotation(part.rotation);
                push(part.part.sprite(), &body);
            }
        } else {
            push(SpriteKind::Boss, &boss.body);
        }
    }
    push(SpriteKind::Player, &world.player.body);
    out
}
