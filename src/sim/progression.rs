//! Score, lives and level progression
//!
//! Level flow: Active -> (clear detected) -> Transition { ends_at } -> Active at level + 1.
//! Session flow: Active -> GameOver once lives drop below zero.

use super::spawn;
use super::state::{GameEvent, LevelPhase, SessionPhase, World};
use crate::consts::*;

/// Large asteroids seeded at the start of `level`
pub fn max_asteroids_for_level(level: u32) -> u32 {
    if level > 4 {
        MAX_WAVE_ASTEROIDS
    } else {
        2 + level * 2
    }
}

/// Beat tempo hint: 1.0 at level start, sinking toward 0.2 as rocks are cleared
pub fn tension_ratio(destroyed: u32, spawned: u32) -> f32 {
    if spawned == 0 {
        return 1.0;
    }
    let total = (spawned * ASTEROIDS_PER_LARGE) as f32;
    (1.0 - destroyed as f32 / total).clamp(MIN_TENSION, 1.0)
}

/// Add points, then apply hi-score and bonus-life rules
pub fn add_score(world: &mut World, points: u32) {
    world.score = world.score.saturating_add(points);

    if world.score > world.hi_score {
        world.hi_score = world.score;
        world.emit(GameEvent::HiScoreChanged {
            hi_score: world.hi_score,
        });
    }

    // One life per threshold actually crossed, each threshold once.
    // Thresholds past u32::MAX can never be reached.
    let base = world.tuning.bonus_life_base.max(1);
    while let Some(threshold) = base.checked_mul(world.bonus_multiplier) {
        if world.score < threshold {
            break;
        }
        let Some(next) = world.bonus_multiplier.checked_add(1) else {
            break;
        };
        world.bonus_multiplier = next;
        world.lives = world.lives.saturating_add(1);
        world.emit(GameEvent::BonusLifeAwarded { lives: world.lives });
        log::info!("Bonus life awarded at {} (lives: {})", world.score, world.lives);
    }
}

/// Ship lost: spend a life and schedule a respawn, or end the session
pub fn on_player_destroyed(world: &mut World) {
    world.player.id = None;
    world.player.release_controls();
    world.lives -= 1;
    world.emit(GameEvent::PlayerDied { lives: world.lives });

    if world.lives < 0 {
        world.session_phase = SessionPhase::GameOver;
        world.player.respawn_at = None;
        world.emit(GameEvent::GameOver { score: world.score });
        log::info!("Game over at level {} with {} points", world.level, world.score);
    } else {
        world.player.respawn_at =
            Some(world.time_ticks + u64::from(world.tuning.respawn_delay_ticks));
        log::debug!("Player destroyed, {} lives left", world.lives);
    }
}

/// Enemy shot down: free the slot and re-arm the spawn timer
pub fn on_enemy_destroyed(world: &mut World) {
    world.enemy = None;
    spawn::arm_enemy_timer(world);
}

/// No rocks and no enemy left
pub fn is_level_clear(world: &World) -> bool {
    world.alive_asteroids() == 0 && world.enemy_entity().is_none()
}

/// Enter the level transition when the field is empty
pub fn check_level_clear(world: &mut World) {
    if world.level_phase != LevelPhase::Active || world.is_game_over() {
        return;
    }
    if !is_level_clear(world) {
        return;
    }

    world.emit(GameEvent::LevelCleared { level: world.level });
    log::info!("Level {} cleared", world.level);

    for entity in &mut world.entities {
        entity.alive = false;
    }
    world.player.id = None;
    world.player.respawn_at = None;
    world.player.release_controls();
    world.enemy = None;
    world.level_phase = LevelPhase::Transition {
        ends_at: world.time_ticks + u64::from(world.tuning.level_transition_ticks),
    };
}

/// Start the next level once the transition delay has elapsed
pub fn update_level_transition(world: &mut World) {
    let LevelPhase::Transition { ends_at } = world.level_phase else {
        return;
    };
    if world.time_ticks < ends_at {
        return;
    }

    world.level += 1;
    world.asteroids_spawned_this_level = 0;
    world.asteroids_destroyed_this_level = 0;
    world.level_phase = LevelPhase::Active;

    spawn::spawn_player(world);
    spawn::seed_wave(world);
    spawn::arm_enemy_timer(world);
    world.emit(GameEvent::LevelStarted { level: world.level });
}
