//! Session driver
//!
//! Owns the one `World` of a play session and the persistence collaborator.
//! Each step ticks the world first and only then runs the post-update hooks,
//! so state changes and their side effects stay separate.

use crate::persistence::SessionStore;
use crate::sim::{GameEvent, Progress, TickInput, World, WorldSnapshot, tick};
use crate::tuning::Tuning;

/// Everything render/audio collaborators need after one tick
#[derive(Debug, Clone)]
pub struct Frame {
    pub snapshot: WorldSnapshot,
    pub events: Vec<GameEvent>,
}

/// A play session backed by a store
pub struct Session<S: SessionStore> {
    world: World,
    store: S,
    tuning: Tuning,
    /// Last record handed to the store
    saved: Progress,
}

impl<S: SessionStore> Session<S> {
    /// Start from whatever progress the store holds
    pub fn start(store: S, tuning: Tuning, seed: u64) -> Self {
        let saved = store.load_or_default();
        let world = World::resume(seed, tuning.clone(), saved);
        Self {
            world,
            store,
            tuning,
            saved,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_over(&self) -> bool {
        self.world.is_game_over()
    }

    /// Tick once, run hooks, hand back the frame
    pub fn step(&mut self, input: &TickInput) -> Frame {
        tick(&mut self.world, input);
        let events = self.world.drain_events();
        self.run_hooks(&events);
        Frame {
            snapshot: self.world.snapshot(),
            events,
        }
    }

    /// Replace the world with a fresh level-1 game (hi score is kept)
    pub fn new_game(&mut self, seed: u64) {
        self.saved = Progress {
            hi_score: self.world.hi_score,
            ..Progress::default()
        };
        self.persist();
        self.world = World::resume(seed, self.tuning.clone(), self.saved);
        log::info!("New game (seed {seed})");
    }

    /// Forget the hi score
    pub fn reset_hi_score(&mut self) {
        self.world.hi_score = 0;
        self.saved.hi_score = 0;
        self.persist();
    }

    /// Post-update hooks, in event order
    fn run_hooks(&mut self, events: &[GameEvent]) {
        let mut dirty = false;
        for event in events {
            match *event {
                GameEvent::HiScoreChanged { hi_score } => {
                    self.saved.hi_score = hi_score;
                    dirty = true;
                }
                GameEvent::LevelStarted { .. } => {
                    self.saved = self.world.progress();
                    dirty = true;
                }
                GameEvent::GameOver { score } => {
                    // A finished game leaves nothing to resume
                    self.saved = Progress {
                        hi_score: self.world.hi_score.max(score),
                        ..Progress::default()
                    };
                    dirty = true;
                }
                _ => {}
            }
        }
        if dirty {
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.saved) {
            log::warn!("Failed to save progress: {err}");
        }
    }
}
