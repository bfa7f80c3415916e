//! World state and core simulation types
//!
//! One `World` exists per session. Everything the tick driver mutates lives
//! here, including pending timed work expressed as deadline ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind};
use super::{progression, spawn};
use crate::consts::*;
use crate::tuning::Tuning;

/// Level lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Wave in play
    Active,
    /// Level cleared; next wave is seeded once `ends_at` is reached
    Transition { ends_at: u64 },
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Active,
    /// Terminal: lives dropped below zero
    GameOver,
}

/// Notifications for render/audio collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    AsteroidBroken { kind: EntityKind, pos: Vec2 },
    EntityDestroyed { kind: EntityKind },
    EnemySpawned { big: bool },
    EnemyEscaped,
    PlayerFired,
    EnemyFired,
    HyperspaceEntered,
    HyperspaceExited { pos: Vec2 },
    PlayerDied { lives: i32 },
    PlayerRespawned,
    BonusLifeAwarded { lives: i32 },
    HiScoreChanged { hi_score: u32 },
    LevelCleared { level: u32 },
    GameOver { score: u32 },
}

/// Persisted progress read at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    pub lives: i32,
    pub hi_score: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            level: STARTING_LEVEL,
            lives: STARTING_LIVES,
            hi_score: 0,
        }
    }
}

/// Player controls and timers (the ship entity itself lives in `World::entities`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Ship entity, None while dead or between levels
    pub id: Option<EntityId>,
    pub rotating_left: bool,
    pub rotating_right: bool,
    pub thrusting: bool,
    /// Hyperspace window deadline
    pub hyperspace_ends_at: Option<u64>,
    /// Respawn deadline after a death
    pub respawn_at: Option<u64>,
    /// Earliest tick the next shot may be fired
    pub fire_ready_at: u64,
}

impl PlayerState {
    pub fn is_alive(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_hyperspacing(&self) -> bool {
        self.hyperspace_ends_at.is_some()
    }

    /// Drop held controls (on death or level change)
    pub fn release_controls(&mut self) {
        self.rotating_left = false;
        self.rotating_right = false;
        self.thrusting = false;
        self.hyperspace_ends_at = None;
    }
}

/// Three-leg crossing path for the enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyPath {
    /// Entry point, two turn points, exit point
    pub waypoints: [Vec2; 4],
    pub started_at: u64,
    pub leg_ticks: u32,
}

impl EnemyPath {
    /// Position along the path, None once the far edge is reached
    pub fn position_at(&self, now: u64) -> Option<Vec2> {
        let leg_ticks = u64::from(self.leg_ticks.max(1));
        let elapsed = now.saturating_sub(self.started_at);
        let leg = (elapsed / leg_ticks) as usize;
        if leg >= 3 {
            return None;
        }
        let t = (elapsed % leg_ticks) as f32 / leg_ticks as f32;
        Some(self.waypoints[leg].lerp(self.waypoints[leg + 1], t))
    }

    /// Per-tick velocity of the leg active at `now`
    pub fn velocity_at(&self, now: u64) -> Vec2 {
        let leg_ticks = u64::from(self.leg_ticks.max(1));
        let leg = (now.saturating_sub(self.started_at) / leg_ticks).min(2) as usize;
        (self.waypoints[leg + 1] - self.waypoints[leg]) / leg_ticks as f32
    }
}

/// The single enemy slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySlot {
    pub id: EntityId,
    pub big: bool,
    pub path: EnemyPath,
    pub next_fire_at: u64,
}

/// Render view of one live entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub rotation: f32,
}

/// Per-tick snapshot handed to render/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time_ticks: u64,
    pub entities: Vec<EntityView>,
    pub score: u32,
    pub hi_score: u32,
    pub lives: i32,
    pub level: u32,
    /// Beat tempo hint in [0.2, 1]
    pub tension: f32,
    pub level_phase: LevelPhase,
    pub session_phase: SessionPhase,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Live entities (sorted by id for determinism)
    pub entities: Vec<Entity>,
    pub player: PlayerState,
    pub enemy: Option<EnemySlot>,
    /// Ticks until the next enemy appears (counts only while no enemy is alive)
    pub enemy_timer_ticks: u32,
    pub score: u32,
    pub hi_score: u32,
    pub lives: i32,
    pub level: u32,
    pub bonus_multiplier: u32,
    pub asteroids_spawned_this_level: u32,
    pub asteroids_destroyed_this_level: u32,
    pub level_phase: LevelPhase,
    pub session_phase: SessionPhase,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Fresh session at level 1
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::resume(seed, tuning, Progress::default())
    }

    /// Session starting from persisted progress
    pub fn resume(seed: u64, tuning: Tuning, progress: Progress) -> Self {
        let tuning = tuning.sanitized();
        let bonus_base = tuning.bonus_life_base.max(1);
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            time_ticks: 0,
            entities: Vec::new(),
            player: PlayerState::default(),
            enemy: None,
            enemy_timer_ticks: 0,
            score: progress.score,
            hi_score: progress.hi_score.max(progress.score),
            lives: progress.lives,
            level: progress.level.max(1),
            // Thresholds already passed by a carried-over score are not re-awarded
            bonus_multiplier: (progress.score / bonus_base).saturating_add(1),
            asteroids_spawned_this_level: 0,
            asteroids_destroyed_this_level: 0,
            level_phase: LevelPhase::Active,
            session_phase: SessionPhase::Active,
            events: Vec::new(),
            next_id: 1,
        };

        if world.hi_score > progress.hi_score {
            world.emit(GameEvent::HiScoreChanged {
                hi_score: world.hi_score,
            });
        }

        // A save written after the last life was lost has nothing left to play
        if world.lives < 0 {
            world.session_phase = SessionPhase::GameOver;
            world.emit(GameEvent::GameOver { score: world.score });
            log::info!("Saved session was already over ({} points)", world.score);
            return world;
        }

        spawn::spawn_player(&mut world);
        spawn::seed_wave(&mut world);
        spawn::arm_enemy_timer(&mut world);
        world.emit(GameEvent::LevelStarted { level: world.level });
        log::info!(
            "Session started: level {}, score {}, lives {}",
            world.level,
            world.score,
            world.lives
        );

        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity and return its id
    pub fn spawn_entity(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let pos = crate::wrap_position(pos, self.tuning.world_width, self.tuning.world_height);
        self.entities.push(Entity::new(id, kind, pos, vel));
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Live ship entity, if any
    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.id.and_then(|id| self.entity(id)).filter(|e| e.alive)
    }

    /// Live enemy entity, if any
    pub fn enemy_entity(&self) -> Option<&Entity> {
        self.enemy
            .as_ref()
            .and_then(|slot| self.entity(slot.id))
            .filter(|e| e.alive)
    }

    pub fn alive_asteroids(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.kind.is_asteroid())
            .count()
    }

    pub fn is_game_over(&self) -> bool {
        self.session_phase == SessionPhase::GameOver
    }

    /// Current beat tempo hint for the audio collaborator
    pub fn tension(&self) -> f32 {
        progression::tension_ratio(
            self.asteroids_destroyed_this_level,
            self.asteroids_spawned_this_level,
        )
    }

    /// Progress record for persistence
    pub fn progress(&self) -> Progress {
        Progress {
            score: self.score,
            level: self.level,
            lives: self.lives,
            hi_score: self.hi_score,
        }
    }

    pub(crate) fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Uniform point inside the world
    pub(crate) fn random_point(&mut self) -> Vec2 {
        let (w, h) = (self.tuning.world_width, self.tuning.world_height);
        Vec2::new(self.rng.random_range(0.0..w), self.rng.random_range(0.0..h))
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Pending notifications (oldest first)
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove destroyed entities and release slots that pointed at them
    pub fn prune_dead(&mut self) {
        self.entities.retain(|e| e.alive);
        let live = |id: EntityId| self.entities.iter().any(|e| e.id == id);
        let player_gone = self.player.id.is_some_and(|id| !live(id));
        let enemy_gone = self.enemy.as_ref().is_some_and(|slot| !live(slot.id));
        if player_gone {
            self.player.id = None;
        }
        if enemy_gone {
            self.enemy = None;
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Render snapshot of live entities and counters
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time_ticks: self.time_ticks,
            entities: self
                .entities
                .iter()
                .filter(|e| e.alive)
                .map(|e| EntityView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    rotation: e.rotation,
                })
                .collect(),
            score: self.score,
            hi_score: self.hi_score,
            lives: self.lives,
            level: self.level,
            tension: self.tension(),
            level_phase: self.level_phase,
            session_phase: self.session_phase,
        }
    }
}
