//! Per-frame simulation tick
//!
//! One call advances the world by the frame's elapsed time: AI and motion,
//! projectile hits, player contacts, outcome, then cleanup and deferred
//! spawns, in that order.

use super::collision;
use super::entity::Combatant;
use super::player::Controls;
use super::projectile::{Faction, Volley};
use super::state::{Command, Outcome, SessionPhase, World};
use crate::assets::SpriteKind;
use crate::audio::SoundEffect;
use crate::{bearing_of, shortest_arc};

/// Frame time used by the headless driver and tests
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Input for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub thrust: bool,
    pub reverse: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
    pub switch_weapon: bool,
    /// Pause toggle
    pub pause: bool,
    /// End the session now
    pub quit: bool,
    /// Demo mode - the autopilot flies the ship
    pub autopilot: bool,
}

impl TickInput {
    pub fn controls(&self) -> Controls {
        Controls {
            thrust: self.thrust,
            reverse: self.reverse,
            strafe_left: self.strafe_left,
            strafe_right: self.strafe_right,
            rotate_left: self.rotate_left,
            rotate_right: self.rotate_right,
            fire: self.fire,
            switch_weapon: self.switch_weapon,
        }
    }
}

/// Advance the world by `dt` seconds
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if !dt.is_finite() || dt < 0.0 {
        log::warn!("Ignoring tick with invalid dt {dt}");
        return;
    }

    // Handle pause toggle
    if input.pause {
        match world.phase {
            SessionPhase::Playing => {
                world.phase = SessionPhase::Paused;
                log::info!("Paused");
                return;
            }
            SessionPhase::Paused => {
                world.phase = SessionPhase::Playing;
                log::info!("Resumed");
            }
            SessionPhase::GameOver => {}
        }
    }
    if input.quit {
        world.end_session(Outcome::Aborted);
    }

    match world.phase {
        SessionPhase::Paused => return,
        SessionPhase::GameOver => {
            wind_down(world, dt);
            return;
        }
        SessionPhase::Playing => {}
    }

    let input = if input.autopilot {
        autopilot(world)
    } else {
        input.clone()
    };

    world.now += f64::from(dt);
    let mut volleys = Vec::new();

    progress(world);
    if let Some(request) = world.spawner.poll(world.now, &mut world.rng) {
        world.queue(Command::SpawnEnemy(request));
    }

    update_player(world, &input, dt, &mut volleys);
    update_hostiles(world, dt, &mut volleys);
    update_projectiles(world, dt);
    update_props(world, dt);

    collision::resolve_projectiles(world, dt);
    collision::resolve_player_contacts(world);

    if !world.player.body.is_collidable() {
        world.end_session(Outcome::Lost);
    } else if world.boss.as_ref().is_some_and(|b| b.is_defeated()) {
        world.end_session(Outcome::Won);
    }

    if !world.is_over() {
        for volley in volleys {
            world.queue(Command::Fire(volley));
        }
    }
    world.cleanup();
    if world.is_over() {
        return;
    }
    world.apply_commands();
}

/// After game over only explosions and lifecycle timers run
fn wind_down(world: &mut World, dt: f32) {
    world.now += f64::from(dt);
    let now = world.now;

    world.player.update_motion(now, dt);
    world.player.body.update_lifecycle(now);
    for enemy in &mut world.enemies {
        enemy.body.update_lifecycle(now);
    }
    if let Some(boss) = &mut world.boss {
        boss.body.update_lifecycle(now);
    }
    for item in &mut world.collectibles {
        item.update(now, dt);
    }
    world.cleanup();
}

/// One-shot level and boss thresholds
fn progress(world: &mut World) {
    let reached = world.spawner.progress(world.kills.count());
    if reached.level_two {
        world.level = 2;
        world.backdrop.skin = SpriteKind::BackdropLevelTwo;
        log::info!("Level 2 reached after {} kills", world.kills.count());
    }
    if reached.boss {
        world.queue(Command::SpawnBoss);
    }
}

fn update_player(world: &mut World, input: &TickInput, dt: f32, volleys: &mut Vec<Volley>) {
    let now = world.now;
    let player = &mut world.player;

    let change = player.update_status(now);
    player.switch_weapon(input.switch_weapon, now);
    player.apply_controls(&input.controls(), now, dt);

    let shot = if input.fire { player.try_fire(now) } else { None };
    player.update_motion(now, dt);
    player.body.update_lifecycle(now);

    if change.invincibility_ended {
        world.emit(SoundEffect::InvincibleEnd);
    }
    if let Some(volley) = shot {
        volleys.push(volley);
        world.emit(SoundEffect::PlayerFire);
    }
}

fn update_hostiles(world: &mut World, dt: f32, volleys: &mut Vec<Volley>) {
    let now = world.now;
    let player_visible = world.player.body.is_collidable();
    let player_pos = world.player.position();
    let player_vel = world.player.velocity();
    let mut shots_fired = 0;

    for enemy in &mut world.enemies {
        if player_visible {
            enemy.perceive(player_pos, player_vel, now);
        }
        if let Some(volley) = enemy.try_fire(now) {
            volleys.push(volley);
            shots_fired += 1;
        }
        enemy.think(now, dt, &mut world.rng);
        enemy.body.update_lifecycle(now);
    }

    if let Some(boss) = &mut world.boss {
        boss.update(now, dt);
        if let Some(volley) = boss.try_fire(now) {
            volleys.push(volley);
            shots_fired += 1;
        }
        boss.body.update_lifecycle(now);
    }

    for _ in 0..shots_fired {
        world.emit(SoundEffect::EnemyFire);
    }
}

/// Homing bookkeeping then movement
fn update_projectiles(world: &mut World, dt: f32) {
    let now = world.now;
    for i in 0..world.projectiles.len() {
        let projectile = &world.projectiles[i];
        if !projectile.is_live() {
            continue;
        }

        if projectile.wants_target(now) {
            let target = match projectile.faction {
                Faction::Player => world.nearest_target(projectile.body.position),
                Faction::Enemy => projectile.target(),
            };
            world.projectiles[i].retarget(target, now);
        }

        let target_pos = world.projectiles[i]
            .target()
            .and_then(|t| world.resolve_target(t));
        let projectile = &mut world.projectiles[i];
        if target_pos.is_none() {
            projectile.lose_target();
        }
        projectile.update(now, dt, target_pos);
    }
}

/// Collectibles, asteroids and decorations
fn update_props(world: &mut World, dt: f32) {
    let now = world.now;
    for item in &mut world.collectibles {
        item.update(now, dt);
    }
    for asteroid in &mut world.asteroids {
        asteroid.update(dt);
    }
    for exhaust in &mut world.decor {
        let parent = world
            .projectiles
            .iter()
            .find(|p| p.id == exhaust.parent)
            .map(|p| &p.body);
        exhaust.follow(parent);
    }
}

/// Demo pilot: face the nearest threat, keep a standoff distance and fire
/// when lined up. With nothing to fight it goes after the nearest pickup.
pub fn autopilot(world: &World) -> TickInput {
    let mut input = TickInput::default();
    let player = &world.player;
    let position = player.position();

    let threat = world
        .enemies
        .iter()
        .filter(|e| e.body.is_collidable())
        .map(|e| e.body.position)
        .chain(
            world
                .boss
                .iter()
                .filter(|b| b.body.is_collidable())
                .map(|b| b.body.position),
        )
        .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));

    let pickup = world
        .collectibles
        .iter()
        .filter(|c| c.is_available())
        .map(|c| c.body.position)
        .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));

    let Some(goal) = threat.or(pickup) else {
        return input;
    };

    // Wobble a little so the ship doesn't sit in perfect loops
    let time_factor = world.now as f32 * 0.6;
    let offset = time_factor.sin() * 0.15 + (time_factor * 0.7).sin() * 0.08;
    let to_goal = goal - position;
    let error = shortest_arc(player.body.rotation(), bearing_of(to_goal) + offset);
    input.rotate_left = error > 0.05;
    input.rotate_right = error < -0.05;

    let distance = to_goal.length();
    if threat.is_some() {
        input.fire = error.abs() < 0.3 && distance < 12.0;
        input.thrust = distance > 6.0 && error.abs() < 1.0;
        input.reverse = distance < 3.0;
        input.strafe_left = time_factor.sin() > 0.6;
        input.strafe_right = time_factor.sin() < -0.6;
    } else {
        input.thrust = error.abs() < 0.8;
    }
    input
}
