//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per call, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod entity;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Contact, ContactRule, Fate, contact_rule, find_contacts, masks_permit};
pub use entity::{Entity, EntityId, EntityKind};
pub use progression::{max_asteroids_for_level, tension_ratio};
pub use state::{
    EnemyPath, EnemySlot, EntityView, GameEvent, LevelPhase, PlayerState, Progress,
    SessionPhase, World, WorldSnapshot,
};
pub use tick::{InputEvent, TickInput, count_kind, tick};
