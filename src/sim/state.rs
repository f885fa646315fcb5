//! Session state
//!
//! The [`World`] owns every entity in typed registries, the session clock,
//! the seeded RNG and the deferred command buffer. Spawns requested while a
//! registry is being walked go through [`Command`] and land after cleanup.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::asteroid::Asteroid;
use super::boss::Boss;
use super::collectible::{Collectible, CollectibleKind};
use super::decor::{Backdrop, Exhaust};
use super::enemy::Enemy;
use super::entity::{EntityId, EntityRef, Spatial};
use super::hud::{HudSnapshot, KillCounter};
use super::player::Player;
use super::projectile::{Faction, Projectile, Target, Volley};
use super::spawner::{self, SpawnRequest, Spawner};
use crate::assets::{AssetCatalog, ResolvedTextures};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::*;
use crate::error::SetupError;
use crate::settings::Settings;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    Paused,
    /// Terminal; only explosions and lifecycle timers still run
    GameOver,
}

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    Aborted,
}

impl Outcome {
    pub fn reason(&self) -> &'static str {
        match self {
            Outcome::Won => "Boss defeated! You win!",
            Outcome::Lost => "Player destroyed! Game over. You lose.",
            Outcome::Aborted => "Session ended by player",
        }
    }
}

/// Structural change deferred until the end of the tick
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fire(Volley),
    SpawnEnemy(SpawnRequest),
    /// Replace a picked-up collectible somewhere random
    SpawnCollectible,
    SpawnBoss,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct World {
    /// Session seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub textures: ResolvedTextures,
    /// Seconds since the session began
    pub now: f64,
    ended_at: Option<f64>,
    pub phase: SessionPhase,
    pub outcome: Option<Outcome>,
    /// 1 until the kill threshold swaps the backdrop, then 2
    pub level: u32,
    pub kills: KillCounter,

    pub player: Player,
    pub backdrop: Backdrop,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub collectibles: Vec<Collectible>,
    pub asteroids: Vec<Asteroid>,
    pub decor: Vec<Exhaust>,

    pub spawner: Spawner,
    pub rng: Pcg32,
    commands: Vec<Command>,
    sounds: Vec<SoundEffect>,
    next_id: u32,
}

impl World {
    /// Validate inputs and lay out the opening population
    pub fn build(
        seed: u64,
        settings: Settings,
        catalog: &dyn AssetCatalog,
    ) -> Result<Self, SetupError> {
        settings.validate()?;
        let textures = ResolvedTextures::resolve(catalog)?;
        let bound = settings.world_bound;

        let mut world = Self {
            seed,
            textures,
            now: 0.0,
            ended_at: None,
            phase: SessionPhase::Playing,
            outcome: None,
            level: 1,
            kills: KillCounter::default(),
            player: Player::new(EntityId(1), Vec3::ZERO, bound),
            backdrop: Backdrop::new(EntityId(2)),
            enemies: Vec::new(),
            boss: None,
            projectiles: Vec::new(),
            collectibles: Vec::new(),
            asteroids: Vec::new(),
            decor: Vec::new(),
            spawner: Spawner::new(&settings, 0.0),
            rng: Pcg32::seed_from_u64(seed),
            commands: Vec::new(),
            sounds: Vec::new(),
            next_id: 3,
            settings,
        };

        for _ in 0..world.settings.asteroid_count {
            let id = world.next_entity_id();
            let asteroid = Asteroid::scattered(id, bound, &mut world.rng);
            world.asteroids.push(asteroid);
        }
        for _ in 0..world.settings.collectible_count {
            world.spawn_collectible();
        }
        for request in world.spawner.initial_wave(&mut world.rng) {
            world.spawn_enemy(request);
        }

        log::info!(
            "World built (seed {seed}): {} enemies, {} collectibles, {} asteroids",
            world.enemies.len(),
            world.collectibles.len(),
            world.asteroids.len()
        );
        Ok(world)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Seconds survived; frozen once the session ends
    pub fn survival_time(&self) -> f64 {
        self.ended_at.unwrap_or(self.now)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Enter the terminal state; later calls are ignored
    pub fn end_session(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        self.phase = SessionPhase::GameOver;
        self.ended_at = Some(self.now);
        log::info!("Game over: {}", outcome.reason());
    }

    pub fn emit(&mut self, effect: SoundEffect) {
        self.sounds.push(effect);
    }

    /// Take the sound triggers raised since the last drain
    pub fn drain_sounds(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.sounds)
    }

    pub fn play_sounds(&mut self, sink: &mut dyn AudioSink) {
        for effect in self.drain_sounds() {
            sink.play(effect);
        }
    }

    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn pending_commands(&self) -> &[Command] {
        &self.commands
    }

    /// Execute deferred structural changes in the order they were queued
    pub fn apply_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            match command {
                Command::Fire(volley) => self.launch(volley),
                Command::SpawnEnemy(request) => {
                    self.spawn_enemy(request);
                }
                Command::SpawnCollectible => self.spawn_collectible(),
                Command::SpawnBoss => self.spawn_boss(),
            }
        }
    }

    /// Create an enemy if its kind is under the population cap
    pub fn spawn_enemy(&mut self, request: SpawnRequest) -> Option<EntityId> {
        if !self.spawner.record_spawn(request.kind) {
            return None;
        }
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(
            id,
            request.kind,
            request.position,
            request.patrol,
            self.now,
            self.settings.world_bound,
        ));
        Some(id)
    }

    pub fn spawn_collectible(&mut self) {
        let id = self.next_entity_id();
        let kind = CollectibleKind::roll(&mut self.rng);
        let position = spawner::random_point(self.settings.world_bound, &mut self.rng);
        self.collectibles.push(Collectible::new(id, kind, position));
    }

    /// The boss is a singleton
    pub fn spawn_boss(&mut self) {
        if self.boss.is_some() {
            return;
        }
        let id = self.next_entity_id();
        let [x, y] = self.settings.boss_spawn;
        self.boss = Some(Boss::new(id, Vec3::new(x, y, 0.0), self.now));
        log::info!("Boss spawned at ({x:.1}, {y:.1})");
    }

    /// Turn a volley into projectiles, with exhausts where requested
    fn launch(&mut self, volley: Volley) {
        for shot in &volley.shots {
            let id = self.next_entity_id();
            let mut projectile = Projectile::from_shot(id, shot, self.now);
            if projectile.faction == Faction::Player && projectile.wants_target(self.now) {
                let target = self.nearest_target(projectile.body.position);
                projectile.retarget(target, self.now);
            }
            if shot.exhaust {
                let exhaust_id = self.next_entity_id();
                self.decor.push(Exhaust::new(exhaust_id, id, &projectile.body));
            }
            self.projectiles.push(projectile);
        }
    }

    /// Closest live hostile within homing range of `from`
    pub fn nearest_target(&self, from: Vec3) -> Option<Target> {
        let enemies = self
            .enemies
            .iter()
            .filter(|e| e.body.is_collidable())
            .map(|e| (Target::Enemy(e.id), e.body.position));
        let boss = self
            .boss
            .iter()
            .filter(|b| b.body.is_collidable())
            .map(|b| (Target::Boss, b.body.position));

        enemies
            .chain(boss)
            .map(|(target, pos)| (target, pos.distance(from)))
            .filter(|&(_, d)| d <= HOMING_SEARCH_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(target, _)| target)
    }

    /// Where a target is now, if it can still be chased
    pub fn resolve_target(&self, target: Target) -> Option<Vec3> {
        match target {
            Target::Player => self
                .player
                .body
                .is_collidable()
                .then_some(self.player.body.position),
            Target::Enemy(id) => self
                .enemies
                .iter()
                .find(|e| e.id == id && e.body.is_collidable())
                .map(|e| e.body.position),
            Target::Boss => self
                .boss
                .as_ref()
                .filter(|b| b.body.is_collidable())
                .map(|b| b.body.position),
        }
    }

    /// Drop inactive entities, keeping the population ledger in step
    pub fn cleanup(&mut self) {
        let spawner = &mut self.spawner;
        self.enemies.retain(|e| {
            if !e.body.active {
                spawner.record_despawn(e.kind);
            }
            e.body.active
        });
        self.projectiles.retain(|p| p.body.active);
        self.collectibles.retain(|c| c.body.active);
        self.asteroids.retain(|a| a.body.active);
        self.decor.retain(|x| x.body.active);
        if self.boss.as_ref().is_some_and(|b| !b.body.active) {
            self.boss = None;
        }
    }

    /// Every entity, player first and backdrop last
    pub fn entities(&self) -> Vec<EntityRef<'_>> {
        let mut all = Vec::with_capacity(
            3 + self.enemies.len()
                + self.projectiles.len()
                + self.collectibles.len()
                + self.asteroids.len()
                + self.decor.len(),
        );
        all.push(EntityRef::Player(&self.player));
        all.extend(self.enemies.iter().map(EntityRef::Enemy));
        all.extend(self.boss.iter().map(EntityRef::Boss));
        all.extend(self.projectiles.iter().map(EntityRef::Projectile));
        all.extend(self.collectibles.iter().map(EntityRef::Collectible));
        all.extend(self.asteroids.iter().map(EntityRef::Asteroid));
        all.extend(self.decor.iter().map(EntityRef::Exhaust));
        all.push(EntityRef::Backdrop(&self.backdrop));
        all
    }

    pub fn find(&self, id: EntityId) -> Option<EntityRef<'_>> {
        self.entities().into_iter().find(|e| e.id() == id)
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id() == id)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot::capture(self)
    }
}
