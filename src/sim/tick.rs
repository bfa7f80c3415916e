//! Fixed timestep simulation tick
//!
//! Phase order per tick is fixed: input, rotation, thrust, integration,
//! wrap, timers and spawns, collisions, progression. Wrapping runs before
//! the collision scan so nothing is ever tested outside the world bounds.

use serde::{Deserialize, Serialize};

use super::entity::EntityKind;
use super::state::{LevelPhase, World};
use super::{collision, progression, spawn};
use crate::{heading_vector, normalize_degrees, wrap_position};

/// Discrete control events from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    BeginRotateLeft,
    BeginRotateRight,
    EndRotate,
    BeginThrust,
    EndThrust,
    Fire,
    Hyperspace,
}

/// Input events received since the previous tick (applied in order)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &TickInput) {
    // Game over is terminal
    if world.is_game_over() {
        return;
    }

    world.time_ticks += 1;

    for &event in &input.events {
        apply_input(world, event);
    }

    steer_player(world);
    integrate(world);
    wrap_all(world);

    // Timers and spawns
    spawn::update_hyperspace(world);
    spawn::update_respawn(world);
    progression::update_level_transition(world);
    if world.level_phase == LevelPhase::Active {
        spawn::update_enemy_timer(world);
        spawn::enemy_fire(world);
    }

    collision::resolve_collisions(world);

    progression::check_level_clear(world);

    world.prune_dead();
    world.normalize_order();
}

/// Apply one control event to the player state
pub fn apply_input(world: &mut World, event: InputEvent) {
    match event {
        InputEvent::BeginRotateLeft => {
            world.player.rotating_left = true;
            world.player.rotating_right = false;
        }
        InputEvent::BeginRotateRight => {
            world.player.rotating_left = false;
            world.player.rotating_right = true;
        }
        InputEvent::EndRotate => {
            world.player.rotating_left = false;
            world.player.rotating_right = false;
        }
        InputEvent::BeginThrust => world.player.thrusting = true,
        InputEvent::EndThrust => world.player.thrusting = false,
        InputEvent::Fire => spawn::player_fire(world),
        InputEvent::Hyperspace => spawn::begin_hyperspace(world),
    }
}

/// Rotation then thrust impulse for the ship
fn steer_player(world: &mut World) {
    let Some(id) = world.player.id else {
        return;
    };
    let step = world.tuning.rotation_step_degrees;
    let turn = if world.player.rotating_left {
        step
    } else if world.player.rotating_right {
        -step
    } else {
        0.0
    };
    let thrusting = world.player.thrusting;
    let (thrust, damping, max_speed) = (
        world.tuning.thrust_factor,
        world.tuning.player_damping,
        world.tuning.player_max_speed,
    );

    let Some(ship) = world.entity_mut(id) else {
        return;
    };
    ship.rotation = normalize_degrees(ship.rotation + turn);
    if thrusting {
        ship.vel += heading_vector(ship.rotation) * thrust;
    }
    ship.vel = (ship.vel * damping).clamp_length_max(max_speed);
}

/// Move everything by its velocity; the enemy follows its path instead
fn integrate(world: &mut World) {
    let now = world.time_ticks;
    for entity in &mut world.entities {
        if !entity.alive || entity.kind.is_enemy() {
            continue;
        }
        if entity.is_expired(now) {
            entity.alive = false;
            continue;
        }
        entity.pos += entity.vel;
    }
    spawn::move_enemy(world);
}

/// Toroidal wrap for every entity
fn wrap_all(world: &mut World) {
    let (w, h) = (world.tuning.world_width, world.tuning.world_height);
    for entity in &mut world.entities {
        entity.pos = wrap_position(entity.pos, w, h);
    }
}

/// Live entities of one kind
pub fn count_kind(world: &World, kind: EntityKind) -> usize {
    world
        .entities
        .iter()
        .filter(|e| e.alive && e.kind == kind)
        .count()
}
