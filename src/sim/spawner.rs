//! Population ledger, timed spawns and level progression
//!
//! The spawner only decides *what* should appear and *where*; the world
//! allocates ids and builds the entities. Counters are kept in step with
//! the world by [`Spawner::record_spawn`] and [`Spawner::record_despawn`].

use glam::{Vec2, Vec3};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::enemy::EnemyKind;
use super::timer::Timer;
use crate::settings::Settings;

/// Initial ring radius for fast enemies
const RING_MIN: f32 = 8.0;
const RING_SPREAD: f32 = 4.0;
/// Corner distance for heavy enemies before the random pull-in
const CORNER: f32 = 15.0;
const CORNER_PULL_MIN: f32 = 3.0;
const CORNER_PULL_SPREAD: f32 = 4.0;
/// Regular enemies start inside this half-extent
const SCATTER_BOUND: f32 = 18.0;

/// One enemy the spawner wants created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: EnemyKind,
    pub position: Vec3,
    pub patrol: Vec2,
}

/// One-shot progression events reached this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Milestones {
    pub level_two: bool,
    pub boss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    /// Live enemies per kind, indexed by [`EnemyKind::index`]
    counts: [u32; 3],
    pub cap: u32,
    interval: f32,
    pub timer: Timer,
    world_bound: f32,
    level_two_kills: u32,
    boss_kills: u32,
    pub level_two_reached: bool,
    pub boss_spawned: bool,
}

impl Spawner {
    pub fn new(settings: &Settings, now: f64) -> Self {
        Self {
            counts: [0; 3],
            cap: settings.population_cap,
            interval: settings.enemy_spawn_interval,
            timer: Timer::started(now, settings.enemy_spawn_interval),
            world_bound: settings.world_bound,
            level_two_kills: settings.level_two_kills,
            boss_kills: settings.boss_kills,
            level_two_reached: false,
            boss_spawned: false,
        }
    }

    pub fn count(&self, kind: EnemyKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn has_room(&self, kind: EnemyKind) -> bool {
        self.count(kind) < self.cap
    }

    /// Book a new live enemy; refuses when the kind is at its cap
    pub fn record_spawn(&mut self, kind: EnemyKind) -> bool {
        if !self.has_room(kind) {
            log::debug!("{} refused, population cap {} reached", kind.as_str(), self.cap);
            return false;
        }
        self.counts[kind.index()] += 1;
        true
    }

    pub fn record_despawn(&mut self, kind: EnemyKind) {
        let count = &mut self.counts[kind.index()];
        *count = count.saturating_sub(1);
    }

    /// Structured opening population: a ring of fast enemies, heavies
    /// pulled in from the corners, regulars scattered at random
    pub fn initial_wave(&self, rng: &mut impl Rng) -> Vec<SpawnRequest> {
        let mut wave = Vec::with_capacity(self.cap as usize * 3);
        for i in 0..self.cap {
            let angle = i as f32 / self.cap as f32 * TAU;
            let radius = RING_MIN + rng.random::<f32>() * RING_SPREAD;
            let ring = Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0);
            wave.push(request(EnemyKind::Fast, ring, rng));

            let pull = CORNER_PULL_MIN + rng.random::<f32>() * CORNER_PULL_SPREAD;
            let (sx, sy) = match i % 4 {
                0 => (1.0, 1.0),
                1 => (-1.0, 1.0),
                2 => (-1.0, -1.0),
                _ => (1.0, -1.0),
            };
            let corner = Vec3::new(sx * (CORNER - pull), sy * (CORNER - pull), 0.0);
            wave.push(request(EnemyKind::Heavy, corner, rng));

            let scattered = random_point(SCATTER_BOUND.min(self.world_bound), rng);
            wave.push(request(EnemyKind::Regular, scattered, rng));
        }
        wave
    }

    /// On timer expiry, pick a kind still under its cap. The timer restarts
    /// whether or not anything is spawned.
    pub fn poll(&mut self, now: f64, rng: &mut impl Rng) -> Option<SpawnRequest> {
        if !self.timer.finished(now) {
            return None;
        }
        self.timer.start(now, self.interval);

        let open: Vec<EnemyKind> = EnemyKind::ALL
            .into_iter()
            .filter(|&kind| self.has_room(kind))
            .collect();
        let Some(&kind) = open.choose(rng) else {
            log::debug!("All enemy kinds at population cap, skipping spawn");
            return None;
        };
        let position = random_point(self.world_bound, rng);
        Some(request(kind, position, rng))
    }

    /// Report thresholds crossed for the first time
    pub fn progress(&mut self, kills: u32) -> Milestones {
        let mut reached = Milestones::default();
        if !self.level_two_reached && kills >= self.level_two_kills {
            self.level_two_reached = true;
            reached.level_two = true;
        }
        if !self.boss_spawned && kills >= self.boss_kills {
            self.boss_spawned = true;
            reached.boss = true;
        }
        reached
    }
}

fn request(kind: EnemyKind, position: Vec3, rng: &mut impl Rng) -> SpawnRequest {
    SpawnRequest {
        kind,
        position,
        patrol: patrol_size(kind, rng),
    }
}

/// Random patrol ellipse size within the kind's range
pub fn patrol_size(kind: EnemyKind, rng: &mut impl Rng) -> Vec2 {
    let profile = kind.profile();
    let (w_min, w_max) = profile.patrol_width;
    let (h_min, h_max) = profile.patrol_height;
    Vec2::new(
        w_min + rng.random::<f32>() * (w_max - w_min),
        h_min + rng.random::<f32>() * (h_max - h_min),
    )
}

/// Uniform point in the square `[-bound, bound]²`
pub fn random_point(bound: f32, rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.random_range(-bound..=bound),
        rng.random_range(-bound..=bound),
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawner() -> Spawner {
        Spawner::new(&Settings::default(), 0.0)
    }

    #[test]
    fn test_initial_wave_layout() {
        let mut rng = Pcg32::seed_from_u64(42);
        let wave = spawner().initial_wave(&mut rng);
        assert_eq!(wave.len(), 6);

        for req in &wave {
            let p = req.position;
            match req.kind {
                EnemyKind::Fast => assert!((8.0..=12.0).contains(&p.length())),
                EnemyKind::Heavy => {
                    assert!((8.0..=12.0).contains(&p.x.abs()));
                    assert_eq!(p.x.abs(), p.y.abs());
                }
                EnemyKind::Regular => assert!(p.x.abs() <= 18.0 && p.y.abs() <= 18.0),
            }
            let profile = req.kind.profile();
            assert!(req.patrol.x >= profile.patrol_width.0 && req.patrol.x <= profile.patrol_width.1);
        }
        // second heavy sits in the top-left corner
        let heavies: Vec<_> = wave.iter().filter(|r| r.kind == EnemyKind::Heavy).collect();
        assert!(heavies[0].position.x > 0.0 && heavies[0].position.y > 0.0);
        assert!(heavies[1].position.x < 0.0 && heavies[1].position.y > 0.0);
    }

    #[test]
    fn test_cap_refuses_spawn() {
        let mut s = spawner();
        assert!(s.record_spawn(EnemyKind::Heavy));
        assert!(s.record_spawn(EnemyKind::Heavy));
        assert!(!s.record_spawn(EnemyKind::Heavy));
        assert_eq!(s.count(EnemyKind::Heavy), 2);
        s.record_despawn(EnemyKind::Heavy);
        assert!(s.has_room(EnemyKind::Heavy));
    }

    #[test]
    fn test_timed_spawn_skips_full_kinds() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut s = spawner();
        for kind in [EnemyKind::Regular, EnemyKind::Heavy] {
            s.record_spawn(kind);
            s.record_spawn(kind);
        }
        assert!(s.poll(4.9, &mut rng).is_none());
        let req = s.poll(5.0, &mut rng).unwrap();
        assert_eq!(req.kind, EnemyKind::Fast);
        assert!(s.poll(5.1, &mut rng).is_none());
    }

    #[test]
    fn test_timer_restarts_when_all_capped() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut s = spawner();
        for kind in EnemyKind::ALL {
            s.record_spawn(kind);
            s.record_spawn(kind);
        }
        assert!(s.poll(5.0, &mut rng).is_none());
        assert!(!s.timer.finished(9.9));
        assert!(s.timer.finished(10.0));
    }

    #[test]
    fn test_milestones_fire_once() {
        let mut s = spawner();
        assert_eq!(s.progress(4), Milestones::default());
        assert!(s.progress(5).level_two);
        assert!(!s.progress(6).level_two);
        let m = s.progress(10);
        assert!(m.boss && !m.level_two);
        assert!(!s.progress(11).boss);
    }

    proptest! {
        #[test]
        fn counts_never_exceed_cap(ops in prop::collection::vec((0usize..3, any::<bool>()), 0..200)) {
            let mut s = spawner();
            for (kind, spawn) in ops {
                let kind = EnemyKind::ALL[kind];
                if spawn {
                    s.record_spawn(kind);
                } else {
                    s.record_despawn(kind);
                }
                for k in EnemyKind::ALL {
                    prop_assert!(s.count(k) <= s.cap);
                }
            }
        }
    }
}
