//! Asteroids Sim - deterministic core of an arcade asteroid-field shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, progression)
//! - `session`: Session driver that ticks the world and runs post-update hooks
//! - `persistence`: Saved progress and hi score behind a store trait
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;

pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, SessionStore};
pub use session::{Frame, Session};
pub use tuning::{EnemySizePolicy, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_RATE: u32 = 60;

    /// Default world dimensions (world units)
    pub const WORLD_WIDTH: f32 = 2048.0;
    pub const WORLD_HEIGHT: f32 = 1536.0;

    /// Collision category bits
    pub const CATEGORY_ASTEROID: u8 = 1;
    pub const CATEGORY_ENEMY: u8 = 2;
    pub const CATEGORY_ENEMY_BULLET: u8 = 4;
    pub const CATEGORY_PLAYER: u8 = 8;
    pub const CATEGORY_PLAYER_BULLET: u8 = 16;

    /// Collision radii
    pub const ASTEROID_LARGE_RADIUS: f32 = 60.0;
    pub const ASTEROID_MEDIUM_RADIUS: f32 = 30.0;
    pub const ASTEROID_SMALL_RADIUS: f32 = 15.0;
    pub const ENEMY_LARGE_RADIUS: f32 = 40.0;
    pub const ENEMY_SMALL_RADIUS: f32 = 20.0;
    pub const PLAYER_RADIUS: f32 = 40.0;
    pub const BULLET_RADIUS: f32 = 4.0;

    /// Points awarded per kill
    pub const ASTEROID_LARGE_POINTS: u32 = 20;
    pub const ASTEROID_MEDIUM_POINTS: u32 = 50;
    pub const ASTEROID_SMALL_POINTS: u32 = 100;
    pub const ENEMY_LARGE_POINTS: u32 = 200;
    pub const ENEMY_SMALL_POINTS: u32 = 1000;

    /// Starting values for a fresh session
    pub const STARTING_LIVES: i32 = 3;
    pub const STARTING_LEVEL: u32 = 1;

    /// Asteroids seeded per wave are capped at this many
    pub const MAX_WAVE_ASTEROIDS: u32 = 11;

    /// Fragment tree size of one large asteroid (1 large + 2 medium + 4 small)
    pub const ASTEROIDS_PER_LARGE: u32 = 7;
    /// Tension ratio floor
    pub const MIN_TENSION: f32 = 0.2;
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Radians to degrees
#[inline]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

/// Normalize a heading to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit vector for a heading. Headings are offset by 90 degrees so that 0
/// points "up", matching the ship's drawn orientation.
#[inline]
pub fn heading_vector(angle_degrees: f32) -> Vec2 {
    let theta = deg_to_rad(angle_degrees + 90.0);
    Vec2::new(theta.cos(), theta.sin())
}

/// Point reached by travelling `distance` along `angle_degrees` from `origin`
#[inline]
pub fn project(origin: Vec2, angle_degrees: f32, distance: f32) -> Vec2 {
    origin + heading_vector(angle_degrees) * distance
}

/// Wrap a position onto the torus [0, width) x [0, height)
#[inline]
pub fn wrap_position(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, width), wrap_axis(pos.y, height))
}

#[inline]
fn wrap_axis(value: f32, size: f32) -> f32 {
    let wrapped = value.rem_euclid(size);
    if wrapped >= size { 0.0 } else { wrapped }
}
