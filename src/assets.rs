//! Texture catalog
//!
//! The simulation never loads pixels. It only needs an opaque handle per
//! sprite so the render list can name what to draw, and it refuses to start
//! if any handle is missing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// Every sprite the simulation can ask a renderer to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Player,
    EnemyRegular,
    EnemyFast,
    EnemyHeavy,
    Boss,
    BossArm,
    Explosion,
    Laser,
    EnemyShot,
    Missile,
    Exhaust,
    CollectibleSpeed,
    CollectiblePower,
    CollectibleInvincible,
    Asteroid,
    BackdropLevelOne,
    BackdropLevelTwo,
}

impl SpriteKind {
    pub const COUNT: usize = 17;

    pub const ALL: [SpriteKind; Self::COUNT] = [
        SpriteKind::Player,
        SpriteKind::EnemyRegular,
        SpriteKind::EnemyFast,
        SpriteKind::EnemyHeavy,
        SpriteKind::Boss,
        SpriteKind::BossArm,
        SpriteKind::Explosion,
        SpriteKind::Laser,
        SpriteKind::EnemyShot,
        SpriteKind::Missile,
        SpriteKind::Exhaust,
        SpriteKind::CollectibleSpeed,
        SpriteKind::CollectiblePower,
        SpriteKind::CollectibleInvincible,
        SpriteKind::Asteroid,
        SpriteKind::BackdropLevelOne,
        SpriteKind::BackdropLevelTwo,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Opaque texture reference owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Source of texture handles, implemented by the rendering collaborator
pub trait AssetCatalog {
    fn texture(&self, kind: SpriteKind) -> Option<TextureHandle>;
}

/// Simple map-backed catalog
#[derive(Debug, Clone, Default)]
pub struct TextureTable {
    handles: HashMap<SpriteKind, TextureHandle>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with a distinct handle for every sprite (headless runs, tests)
    pub fn placeholder() -> Self {
        let mut table = Self::new();
        for (i, kind) in SpriteKind::ALL.iter().enumerate() {
            table.insert(*kind, TextureHandle(i as u32 + 1));
        }
        table
    }

    pub fn insert(&mut self, kind: SpriteKind, handle: TextureHandle) {
        self.handles.insert(kind, handle);
    }

    pub fn remove(&mut self, kind: SpriteKind) -> Option<TextureHandle> {
        self.handles.remove(&kind)
    }
}

impl AssetCatalog for TextureTable {
    fn texture(&self, kind: SpriteKind) -> Option<TextureHandle> {
        self.handles.get(&kind).copied()
    }
}

/// Every sprite resolved up front, so lookups during a session cannot fail
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTextures {
    handles: [TextureHandle; SpriteKind::COUNT],
}

impl ResolvedTextures {
    /// Resolve all sprites or report the first one missing
    pub fn resolve(catalog: &dyn AssetCatalog) -> Result<Self, SetupError> {
        let mut handles = [TextureHandle(0); SpriteKind::COUNT];
        for kind in SpriteKind::ALL {
            handles[kind.index()] = catalog
                .texture(kind)
                .ok_or(SetupError::MissingTexture(kind))?;
        }
        Ok(Self { handles })
    }

    pub fn get(&self, kind: SpriteKind) -> TextureHandle {
        self.handles[kind.index()]
    }
}
