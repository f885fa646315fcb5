//! Collision detection and response
//!
//! Projectiles are tested as short swept rays so fast shots cannot tunnel
//! through a target between two ticks. Everything touching the player is a
//! plain circle overlap.

use glam::Vec3;

use super::boss::{BossPart, PartPose};
use super::collectible::Collectible;
use super::entity::{DamageOutcome, Damageable};
use super::player::PickupEffect;
use super::projectile::Faction;
use super::state::{Command, World};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Player radius used against boss parts and incoming fire
const PLAYER_HIT_RADIUS: f32 = 0.8;
const BOSS_PUSH: f32 = 12.0;
/// Gap kept beyond the player radius after a boss bump
const BOSS_SEPARATION: f32 = 1.2;
const BOSS_CONTACT_DAMAGE: f32 = 1.0;
const LOCK_BASE: f32 = 0.2;
const LOCK_PER_FORCE: f32 = 1.0 / 20.0;

/// Result of a circle-circle check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub hit: bool,
    /// Unit vector from the obstacle toward the mover
    pub normal: Vec3,
    pub penetration: f32,
}

impl Contact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// Does the segment `origin + t * direction`, `t` in `[0, length]`, touch
/// the circle? An origin already inside the circle counts as a hit.
pub fn ray_circle_intersects(
    origin: Vec3,
    direction: Vec3,
    length: f32,
    center: Vec3,
    radius: f32,
) -> bool {
    let m = origin - center;
    let a = direction.dot(direction);
    let b = m.dot(direction);
    let c = m.dot(m) - radius * radius;

    if a <= f32::EPSILON {
        return c <= 0.0;
    }

    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / a;
    let t2 = (-b + root) / a;

    if t2 < 0.0 {
        // circle entirely behind the origin
        return false;
    }
    if t1 < 0.0 {
        return true;
    }
    t1 <= length
}

/// Strict overlap: touching circles do not collide
#[inline]
pub fn circles_overlap(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Unit push from `obstacle` toward `mover`, +X when they coincide
pub fn push_direction(obstacle: Vec3, mover: Vec3) -> Vec3 {
    (mover - obstacle).normalize_or(Vec3::X)
}

/// Overlap test with push normal and depth
pub fn circle_contact(mover: Vec3, mover_radius: f32, obstacle: Vec3, radius: f32) -> Contact {
    let distance = mover.distance(obstacle);
    let reach = mover_radius + radius;
    if distance >= reach {
        return Contact::miss();
    }
    Contact {
        hit: true,
        normal: push_direction(obstacle, mover),
        penetration: reach - distance,
    }
}

/// First part, in enumeration order, swept by the ray
pub fn first_part_swept(
    parts: &[PartPose],
    origin: Vec3,
    direction: Vec3,
    length: f32,
) -> Option<BossPart> {
    parts
        .iter()
        .find(|p| ray_circle_intersects(origin, direction, length, p.position, p.radius))
        .map(|p| p.part)
}

/// First part, in enumeration order, overlapping a circle
pub fn first_part_touching(
    parts: &[PartPose],
    position: Vec3,
    radius: f32,
) -> Option<(PartPose, Contact)> {
    parts.iter().find_map(|p| {
        let contact = circle_contact(position, radius, p.position, p.radius);
        contact.hit.then_some((*p, contact))
    })
}

/// Sweep every live projectile against what its faction may hit
pub fn resolve_projectiles(world: &mut World, dt: f32) {
    let now = world.now;
    let power = world.player.power_buff.factor();

    for i in 0..world.projectiles.len() {
        let projectile = &world.projectiles[i];
        if !projectile.is_live() {
            continue;
        }
        let origin = projectile.body.position;
        let direction = projectile.direction;
        let length = projectile.sweep_length(dt);
        let base_damage = projectile.damage;
        let faction = projectile.faction;

        match faction {
            Faction::Player => {
                let damage = base_damage * power;
                let hit_enemy = world.enemies.iter().position(|e| {
                    e.body.is_collidable()
                        && ray_circle_intersects(
                            origin,
                            direction,
                            length,
                            e.body.position,
                            e.hit_radius(),
                        )
                });

                if let Some(j) = hit_enemy {
                    world.projectiles[i].body.active = false;
                    let enemy = &mut world.enemies[j];
                    match enemy.take_damage(damage, now) {
                        DamageOutcome::Destroyed => {
                            log::debug!("{} {:?} destroyed", enemy.kind.as_str(), enemy.id);
                            world.kills.increment();
                            world.emit(SoundEffect::Explosion);
                        }
                        _ => {
                            log::debug!(
                                "{} hit, {:.1}/{:.1} health",
                                enemy.kind.as_str(),
                                enemy.health(),
                                enemy.max_health()
                            );
                            world.emit(SoundEffect::Hit);
                        }
                    }
                    continue;
                }

                let Some(boss) = world.boss.as_mut().filter(|b| b.body.is_collidable()) else {
                    continue;
                };
                if let Some(part) = first_part_swept(&boss.parts(), origin, direction, length) {
                    world.projectiles[i].body.active = false;
                    log::debug!("boss {part:?} hit");
                    let sound = match boss.take_damage(damage, now) {
                        DamageOutcome::Destroyed => SoundEffect::Explosion,
                        _ => SoundEffect::Hit,
                    };
                    world.emit(sound);
                }
            }
            Faction::Enemy => {
                let player = &mut world.player;
                if !player.body.is_collidable()
                    || !ray_circle_intersects(
                        origin,
                        direction,
                        length,
                        player.body.position,
                        PLAYER_HIT_RADIUS,
                    )
                {
                    continue;
                }
                world.projectiles[i].body.active = false;
                // damage comes from the firing enemy's profile, not a flat 1
                match player.take_damage(base_damage, now) {
                    DamageOutcome::Ignored => log::debug!("Shot absorbed by invincibility"),
                    DamageOutcome::Wounded => world.emit(SoundEffect::Hit),
                    DamageOutcome::Destroyed => world.emit(SoundEffect::Explosion),
                }
            }
        }
    }
}

/// Player against collectibles, enemies, asteroids and the boss
pub fn resolve_player_contacts(world: &mut World) {
    let now = world.now;
    if !world.player.body.is_collidable() {
        return;
    }

    for i in 0..world.collectibles.len() {
        let item: &Collectible = &world.collectibles[i];
        if !item.is_available()
            || !circles_overlap(
                world.player.body.position,
                PLAYER_RADIUS,
                item.body.position,
                CONTACT_RADIUS,
            )
        {
            continue;
        }
        let kind = item.kind;
        world.collectibles[i].collect(now);
        let sound = match world.player.collect(kind, now) {
            PickupEffect::InvincibilityStarted => SoundEffect::InvincibleStart,
            _ => SoundEffect::Pickup,
        };
        world.emit(sound);
        world.queue(Command::SpawnCollectible);
    }

    for i in 0..world.enemies.len() {
        let enemy = &mut world.enemies[i];
        if !enemy.body.is_collidable()
            || !circles_overlap(
                world.player.body.position,
                PLAYER_RADIUS,
                enemy.body.position,
                CONTACT_RADIUS,
            )
        {
            continue;
        }
        // a ram destroys the enemy, counts as a kill and costs its contact damage
        enemy.body.start_explosion(now);
        let damage = enemy.damage;
        log::debug!("Rammed {} {:?}", enemy.kind.as_str(), enemy.id);
        world.kills.increment();
        world.emit(SoundEffect::Explosion);
        if world.player.take_damage(damage, now) == DamageOutcome::Destroyed {
            return;
        }
    }

    for i in 0..world.asteroids.len() {
        let position = world.player.body.position;
        let velocity = world.player.velocity();
        let Some(bounce) = world.asteroids[i].bounce(position, velocity, &mut world.rng) else {
            continue;
        };
        world.player.body.position = bounce.position;
        world.player.knock(bounce.impulse, bounce.lock, now);
        world.emit(SoundEffect::Bump);
    }

    let Some(boss) = world.boss.as_ref().filter(|b| b.body.is_collidable()) else {
        return;
    };
    let touching = first_part_touching(&boss.parts(), world.player.body.position, PLAYER_HIT_RADIUS);
    if let Some((part, contact)) = touching {
        let player = &mut world.player;
        let outcome = player.take_damage(BOSS_CONTACT_DAMAGE, now);
        player.body.position =
            part.position + contact.normal * (PLAYER_HIT_RADIUS + BOSS_SEPARATION);
        let impulse = contact.normal * BOSS_PUSH;
        player.knock(impulse, LOCK_BASE + BOSS_PUSH * LOCK_PER_FORCE, now);
        log::debug!("Player bumped boss {:?}", part.part);
        world.emit(match outcome {
            DamageOutcome::Ignored => SoundEffect::Bump,
            DamageOutcome::Wounded => SoundEffect::Hit,
            DamageOutcome::Destroyed => SoundEffect::Explosion,
        });
    }
}
