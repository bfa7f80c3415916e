//! Game balance and world parameters
//!
//! Loaded from an optional JSON file; any field left out keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How the enemy's size is chosen when it spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnemySizePolicy {
    /// Fair coin flip between big and small
    #[default]
    CoinFlip,
    /// Coin flip until the score exceeds `small_above`, then always small
    ScoreBiased { small_above: u32 },
}

impl EnemySizePolicy {
    /// Decide bigness given the current score and a fair coin toss
    pub fn is_big(&self, score: u32, coin: bool) -> bool {
        match self {
            EnemySizePolicy::CoinFlip => coin,
            EnemySizePolicy::ScoreBiased { small_above } => coin && score <= *small_above,
        }
    }
}

/// Tunable simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Player ===
    /// Degrees turned per tick while rotating
    pub rotation_step_degrees: f32,
    /// Impulse per tick while thrusting
    pub thrust_factor: f32,
    /// Velocity retained per tick (1.0 = no drag)
    pub player_damping: f32,
    pub player_max_speed: f32,
    /// Minimum ticks between player shots
    pub player_fire_cooldown_ticks: u32,
    /// Delay before a destroyed ship reappears
    pub respawn_delay_ticks: u32,
    /// Length of the hyperspace window
    pub hyperspace_ticks: u32,
    /// Whether the ship ignores contacts while in hyperspace
    pub hyperspace_invulnerable: bool,

    // === Bullets ===
    /// Distance a bullet covers before it expires
    pub bullet_travel_distance: f32,
    pub bullet_lifetime_ticks: u32,

    // === Asteroids ===
    /// Per-axis velocity range for new asteroids (units per tick)
    pub asteroid_speed_min: f32,
    pub asteroid_speed_max: f32,

    // === Enemy ===
    pub enemy_spawn_min_ticks: u32,
    pub enemy_spawn_max_ticks: u32,
    /// Time to cross the world along the three-leg path
    pub enemy_path_ticks: u32,
    /// Max vertical drift per path leg
    pub enemy_path_jitter: f32,
    pub enemy_fire_interval_ticks: u32,
    /// Aim error bound at level 1 (shrinks with level)
    pub enemy_big_spread: f32,
    pub enemy_small_spread: f32,
    pub enemy_size_policy: EnemySizePolicy,

    // === Progression ===
    pub bonus_life_base: u32,
    pub level_transition_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            rotation_step_degrees: 4.0,
            thrust_factor: 0.25,
            player_damping: 0.99,
            player_max_speed: 14.0,
            player_fire_cooldown_ticks: 6,
            respawn_delay_ticks: 3 * TICK_RATE,
            hyperspace_ticks: TICK_RATE,
            hyperspace_invulnerable: false,

            bullet_travel_distance: 1000.0,
            bullet_lifetime_ticks: TICK_RATE / 2,

            asteroid_speed_min: -2.0,
            asteroid_speed_max: 4.0,

            enemy_spawn_min_ticks: 30 * TICK_RATE,
            enemy_spawn_max_ticks: 120 * TICK_RATE,
            enemy_path_ticks: 10 * TICK_RATE,
            enemy_path_jitter: 200.0,
            enemy_fire_interval_ticks: TICK_RATE,
            enemy_big_spread: 400.0,
            enemy_small_spread: 150.0,
            enemy_size_policy: EnemySizePolicy::CoinFlip,

            bonus_life_base: 10_000,
            level_transition_ticks: 5 * TICK_RATE,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Replace values the simulation cannot run with
    ///
    /// World dimensions below one unit fall back to the defaults; ranges,
    /// spreads and speeds are made finite and non-negative.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.world_width.is_finite() && self.world_width >= 1.0) {
            log::warn!(
                "world_width {} is unusable, using {}",
                self.world_width,
                defaults.world_width
            );
            self.world_width = defaults.world_width;
        }
        if !(self.world_height.is_finite() && self.world_height >= 1.0) {
            log::warn!(
                "world_height {} is unusable, using {}",
                self.world_height,
                defaults.world_height
            );
            self.world_height = defaults.world_height;
        }

        self.enemy_path_jitter = non_negative(self.enemy_path_jitter);
        self.enemy_big_spread = non_negative(self.enemy_big_spread);
        self.enemy_small_spread = non_negative(self.enemy_small_spread);
        self.player_max_speed = non_negative(self.player_max_speed);
        self.bullet_travel_distance = non_negative(self.bullet_travel_distance);

        if !(self.asteroid_speed_min.is_finite() && self.asteroid_speed_max.is_finite()) {
            self.asteroid_speed_min = defaults.asteroid_speed_min;
            self.asteroid_speed_max = defaults.asteroid_speed_max;
        }
        if self.asteroid_speed_max < self.asteroid_speed_min {
            std::mem::swap(&mut self.asteroid_speed_min, &mut self.asteroid_speed_max);
        }
        if self.enemy_spawn_max_ticks < self.enemy_spawn_min_ticks {
            std::mem::swap(&mut self.enemy_spawn_min_ticks, &mut self.enemy_spawn_max_ticks);
        }

        self.bullet_lifetime_ticks = self.bullet_lifetime_ticks.max(1);
        self.bonus_life_base = self.bonus_life_base.max(1);
        self
    }

    /// Load tuning from a JSON file, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(err) => {
                    log::warn!("Invalid tuning file {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Could not read tuning file {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Bullet speed so that a bullet covers its travel distance exactly at expiry
    pub fn bullet_speed(&self) -> f32 {
        self.bullet_travel_distance / self.bullet_lifetime_ticks.max(1) as f32
    }

    /// Aim error bound for an enemy at the given level
    pub fn enemy_spread(&self, big: bool, level: u32) -> f32 {
        let base = if big {
            self.enemy_big_spread
        } else {
            self.enemy_small_spread
        };
        base / level.max(1) as f32
    }

    /// World center, where the ship spawns
    pub fn world_center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.world_width / 2.0, self.world_height / 2.0)
    }
}

/// Finite and >= 0, with NaN mapped to 0
fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.abs() } else { 0.0 }
}
