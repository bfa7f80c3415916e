//! Entity records shared by every moving object

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Stable entity identifier (never reused within a session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Entity taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    AsteroidLarge,
    AsteroidMedium,
    AsteroidSmall,
    EnemyLarge,
    EnemySmall,
    PlayerBullet,
    EnemyBullet,
}

impl EntityKind {
    /// Collision group this kind belongs to
    pub fn category(self) -> u8 {
        match self {
            EntityKind::AsteroidLarge | EntityKind::AsteroidMedium | EntityKind::AsteroidSmall => {
                CATEGORY_ASTEROID
            }
            EntityKind::EnemyLarge | EntityKind::EnemySmall => CATEGORY_ENEMY,
            EntityKind::EnemyBullet => CATEGORY_ENEMY_BULLET,
            EntityKind::Player => CATEGORY_PLAYER,
            EntityKind::PlayerBullet => CATEGORY_PLAYER_BULLET,
        }
    }

    /// Groups this kind reacts to on contact
    pub fn collides_with(self) -> u8 {
        match self.category() {
            CATEGORY_ASTEROID => {
                CATEGORY_ENEMY | CATEGORY_ENEMY_BULLET | CATEGORY_PLAYER | CATEGORY_PLAYER_BULLET
            }
            CATEGORY_ENEMY => CATEGORY_ASTEROID | CATEGORY_PLAYER | CATEGORY_PLAYER_BULLET,
            CATEGORY_ENEMY_BULLET => CATEGORY_ASTEROID | CATEGORY_PLAYER,
            CATEGORY_PLAYER => CATEGORY_ASTEROID | CATEGORY_ENEMY | CATEGORY_ENEMY_BULLET,
            CATEGORY_PLAYER_BULLET => CATEGORY_ASTEROID | CATEGORY_ENEMY,
            _ => 0,
        }
    }

    /// Collision circle radius
    pub fn radius(self) -> f32 {
        match self {
            EntityKind::Player => PLAYER_RADIUS,
            EntityKind::AsteroidLarge => ASTEROID_LARGE_RADIUS,
            EntityKind::AsteroidMedium => ASTEROID_MEDIUM_RADIUS,
            EntityKind::AsteroidSmall => ASTEROID_SMALL_RADIUS,
            EntityKind::EnemyLarge => ENEMY_LARGE_RADIUS,
            EntityKind::EnemySmall => ENEMY_SMALL_RADIUS,
            EntityKind::PlayerBullet | EntityKind::EnemyBullet => BULLET_RADIUS,
        }
    }

    /// Points for destroying this kind
    pub fn points(self) -> u32 {
        match self {
            EntityKind::AsteroidLarge => ASTEROID_LARGE_POINTS,
            EntityKind::AsteroidMedium => ASTEROID_MEDIUM_POINTS,
            EntityKind::AsteroidSmall => ASTEROID_SMALL_POINTS,
            EntityKind::EnemyLarge => ENEMY_LARGE_POINTS,
            EntityKind::EnemySmall => ENEMY_SMALL_POINTS,
            _ => 0,
        }
    }

    /// Kind of the two pieces an asteroid breaks into (None for small rocks)
    pub fn fragment(self) -> Option<EntityKind> {
        match self {
            EntityKind::AsteroidLarge => Some(EntityKind::AsteroidMedium),
            EntityKind::AsteroidMedium => Some(EntityKind::AsteroidSmall),
            _ => None,
        }
    }

    pub fn is_asteroid(self) -> bool {
        self.category() == CATEGORY_ASTEROID
    }

    pub fn is_enemy(self) -> bool {
        self.category() == CATEGORY_ENEMY
    }

    pub fn is_bullet(self) -> bool {
        matches!(self, EntityKind::PlayerBullet | EntityKind::EnemyBullet)
    }
}

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in degrees, [0, 360)
    pub rotation: f32,
    pub category: u8,
    pub collides_with: u8,
    pub radius: f32,
    pub alive: bool,
    /// Tick at which a bullet self-removes
    pub expires_at: Option<u64>,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            rotation: 0.0,
            category: kind.category(),
            collides_with: kind.collides_with(),
            radius: kind.radius(),
            alive: true,
            expires_at: None,
        }
    }

    /// Builder-style expiry for bullets
    pub fn with_expiry(mut self, tick: u64) -> Self {
        self.expires_at = Some(tick);
        self
    }

    /// True once the expiry tick has been reached
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|t| now >= t)
    }

    /// Circle overlap test
    pub fn overlaps(&self, other: &Entity) -> bool {
        let reach = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < reach * reach
    }
}
