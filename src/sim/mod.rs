//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Clock-based timers driven by the tick's `dt`
//! - Seeded RNG only
//! - Stable iteration order (registry insertion order)
//! - No rendering or audio backends, only render lists and sound triggers

pub mod asteroid;
pub mod boss;
pub mod collectible;
pub mod collision;
pub mod decor;
pub mod enemy;
pub mod entity;
pub mod hud;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod timer;
pub mod view;

pub use boss::{Boss, BossPhase};
pub use collision::{Contact, ray_circle_intersects};
pub use enemy::{Enemy, EnemyKind, EnemyState};
pub use entity::{Body, Combatant, Damageable, EntityId, EntityRef, Movable, Spatial};
pub use hud::HudSnapshot;
pub use player::{Player, Weapon};
pub use projectile::{Faction, Projectile, Target};
pub use state::{Command, Outcome, SessionPhase, World};
pub use tick::{FRAME_DT, TickInput, autopilot, tick};
pub use timer::Timer;
pub use view::{SpriteInstance, sprites};
