//! Spawn scheduling: asteroid waves, the enemy craft, bullets and hyperspace
//!
//! Every timer here is either a countdown decremented by the tick driver or
//! a deadline compared against `World::time_ticks`, so stopping the tick
//! source stops all of them together.

use glam::Vec2;
use rand::Rng;

use super::entity::{EntityId, EntityKind};
use super::progression::max_asteroids_for_level;
use super::state::{EnemyPath, EnemySlot, GameEvent, LevelPhase, World};
use crate::project;

/// Re-roll limit when a wave rock lands on the ship
const WAVE_PLACEMENT_ATTEMPTS: u32 = 20;
/// Wave rocks keep at least this far from the spawn point
const WAVE_SAFE_DISTANCE: f32 = 300.0;

/// Place the ship at world center
pub fn spawn_player(world: &mut World) -> EntityId {
    let center = world.tuning.world_center();
    let id = world.spawn_entity(EntityKind::Player, center, Vec2::ZERO);
    world.player.id = Some(id);
    world.player.respawn_at = None;
    world.player.release_controls();
    id
}

/// Independent per-axis asteroid velocity (fixed for the rock's lifetime)
fn random_asteroid_velocity(world: &mut World) -> Vec2 {
    let lo = world.tuning.asteroid_speed_min;
    let hi = world.tuning.asteroid_speed_max.max(lo);
    let rng = world.rng();
    Vec2::new(rng.random_range(lo..=hi), rng.random_range(lo..=hi))
}

/// Seed the level's wave of large asteroids
pub fn seed_wave(world: &mut World) {
    let count = max_asteroids_for_level(world.level);
    let avoid = world.tuning.world_center();

    for _ in 0..count {
        let mut pos = world.random_point();
        let mut attempts = 0;
        while attempts < WAVE_PLACEMENT_ATTEMPTS && pos.distance(avoid) < WAVE_SAFE_DISTANCE {
            pos = world.random_point();
            attempts += 1;
        }
        let vel = random_asteroid_velocity(world);
        world.spawn_entity(EntityKind::AsteroidLarge, pos, vel);
    }

    world.asteroids_spawned_this_level += count;
    log::info!("Level {}: seeded {} asteroids", world.level, count);
}

/// Two pieces of `kind` at `pos`, each with a fresh random velocity
pub fn spawn_fragments(world: &mut World, kind: EntityKind, pos: Vec2) {
    for _ in 0..2 {
        let vel = random_asteroid_velocity(world);
        world.spawn_entity(kind, pos, vel);
    }
}

/// Reset the enemy countdown to a random interval
pub fn arm_enemy_timer(world: &mut World) {
    let lo = world.tuning.enemy_spawn_min_ticks;
    let hi = world.tuning.enemy_spawn_max_ticks.max(lo);
    world.enemy_timer_ticks = world.rng().random_range(lo..=hi);
}

/// Count down toward the next enemy while none is alive
pub fn update_enemy_timer(world: &mut World) {
    if world.enemy.is_some() || world.level_phase != LevelPhase::Active {
        return;
    }
    world.enemy_timer_ticks = world.enemy_timer_ticks.saturating_sub(1);
    if world.enemy_timer_ticks == 0 {
        spawn_enemy(world);
    }
}

/// Launch the enemy from a random side edge (no-op if one is already alive)
pub fn spawn_enemy(world: &mut World) {
    if world.enemy.is_some() {
        return;
    }

    let (width, height) = (world.tuning.world_width, world.tuning.world_height);
    let jitter = world.tuning.enemy_path_jitter;
    let score = world.score;
    let policy = world.tuning.enemy_size_policy;

    let rng = world.rng();
    let big = policy.is_big(score, rng.random_bool(0.5));
    let from_left = rng.random_bool(0.5);
    let mut y = rng.random_range(0.0..height);

    let right_edge = (width - 1.0).max(0.0);
    let (start_x, end_x) = if from_left {
        (0.0, right_edge)
    } else {
        (right_edge, 0.0)
    };

    let mut waypoints = [Vec2::ZERO; 4];
    for (leg, point) in waypoints.iter_mut().enumerate() {
        if leg > 0 {
            y = (y + rng.random_range(-jitter..=jitter)).clamp(0.0, height - 1.0);
        }
        let t = leg as f32 / 3.0;
        *point = Vec2::new(start_x + (end_x - start_x) * t, y);
    }

    let now = world.time_ticks;
    let path = EnemyPath {
        waypoints,
        started_at: now,
        leg_ticks: (world.tuning.enemy_path_ticks / 3).max(1),
    };
    let kind = if big {
        EntityKind::EnemyLarge
    } else {
        EntityKind::EnemySmall
    };
    let vel = path.velocity_at(now);
    let id = world.spawn_entity(kind, waypoints[0], vel);

    world.enemy = Some(EnemySlot {
        id,
        big,
        path,
        next_fire_at: now + u64::from(world.tuning.enemy_fire_interval_ticks),
    });
    world.emit(GameEvent::EnemySpawned { big });
    log::info!(
        "Enemy spawned ({}) from the {} edge",
        if big { "big" } else { "small" },
        if from_left { "left" } else { "right" }
    );
}

/// Move the enemy along its path; an enemy that reaches the far edge leaves
pub fn move_enemy(world: &mut World) {
    let Some(slot) = world.enemy.clone() else {
        return;
    };
    let now = world.time_ticks;

    match slot.path.position_at(now) {
        Some(pos) => {
            let vel = slot.path.velocity_at(now);
            if let Some(enemy) = world.entity_mut(slot.id) {
                enemy.pos = pos;
                enemy.vel = vel;
            }
        }
        None => {
            if let Some(enemy) = world.entity_mut(slot.id) {
                enemy.alive = false;
            }
            world.enemy = None;
            arm_enemy_timer(world);
            world.emit(GameEvent::EnemyEscaped);
            log::debug!("Enemy left the field; next in {} ticks", world.enemy_timer_ticks);
        }
    }
}

/// Fire at the ship on a fixed cadence, with aim error shrinking by level
pub fn enemy_fire(world: &mut World) {
    let Some(slot) = world.enemy.clone() else {
        return;
    };
    let now = world.time_ticks;
    if now < slot.next_fire_at {
        return;
    }
    if let Some(enemy) = world.enemy.as_mut() {
        enemy.next_fire_at = now + u64::from(world.tuning.enemy_fire_interval_ticks);
    }

    // No target while the ship is gone or jumping
    if world.player.is_hyperspacing() {
        return;
    }
    let (Some(origin), Some(target)) = (
        world.enemy_entity().map(|e| e.pos),
        world.player_entity().map(|p| p.pos),
    ) else {
        return;
    };

    let spread = world.tuning.enemy_spread(slot.big, world.level);
    let rng = world.rng();
    let aim = target
        + Vec2::new(
            rng.random_range(-spread..=spread),
            rng.random_range(-spread..=spread),
        );
    let vel = (aim - origin).normalize_or_zero() * world.tuning.bullet_speed();
    spawn_bullet(world, EntityKind::EnemyBullet, origin, vel);
    world.emit(GameEvent::EnemyFired);
}

/// Player shot along the current heading (silently ignored when not allowed)
pub fn player_fire(world: &mut World) {
    let now = world.time_ticks;
    if world.player.is_hyperspacing() || now < world.player.fire_ready_at {
        return;
    }
    let Some(ship) = world.player_entity() else {
        return;
    };
    let (pos, rotation, radius) = (ship.pos, ship.rotation, ship.radius);

    let nose = project(pos, rotation, radius);
    let target = project(nose, rotation, world.tuning.bullet_travel_distance);
    let vel = (target - nose) / world.tuning.bullet_lifetime_ticks.max(1) as f32;

    spawn_bullet(world, EntityKind::PlayerBullet, nose, vel);
    world.player.fire_ready_at = now + u64::from(world.tuning.player_fire_cooldown_ticks);
    world.emit(GameEvent::PlayerFired);
}

fn spawn_bullet(world: &mut World, kind: EntityKind, pos: Vec2, vel: Vec2) {
    let expires_at = world.time_ticks + u64::from(world.tuning.bullet_lifetime_ticks);
    let id = world.spawn_entity(kind, pos, vel);
    if let Some(bullet) = world.entity_mut(id) {
        bullet.expires_at = Some(expires_at);
        bullet.rotation = crate::normalize_degrees(crate::rad_to_deg(vel.to_angle()) - 90.0);
    }
}

/// Start the hyperspace window (ignored while dead or already jumping)
pub fn begin_hyperspace(world: &mut World) {
    if !world.player.is_alive() || world.player.is_hyperspacing() {
        return;
    }
    world.player.hyperspace_ends_at =
        Some(world.time_ticks + u64::from(world.tuning.hyperspace_ticks));
    world.emit(GameEvent::HyperspaceEntered);
}

/// Finish a hyperspace jump once its window has elapsed
pub fn update_hyperspace(world: &mut World) {
    let Some(ends_at) = world.player.hyperspace_ends_at else {
        return;
    };
    if world.time_ticks < ends_at {
        return;
    }
    world.player.hyperspace_ends_at = None;

    let dest = world.random_point();
    let Some(id) = world.player.id else {
        return;
    };
    if let Some(ship) = world.entity_mut(id) {
        ship.pos = dest;
        ship.vel = Vec2::ZERO;
    }
    world.emit(GameEvent::HyperspaceExited { pos: dest });
}

/// Bring the ship back once its respawn deadline passes
pub fn update_respawn(world: &mut World) {
    let Some(at) = world.player.respawn_at else {
        return;
    };
    if world.time_ticks < at || world.level_phase != LevelPhase::Active {
        return;
    }
    spawn_player(world);
    world.emit(GameEvent::PlayerRespawned);
    log::debug!("Player respawned at tick {}", world.time_ticks);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::World;
    use crate::tuning::{EnemySizePolicy, Tuning};

    fn world() -> World {
        World::new(42, Tuning::default())
    }

    #[test]
    fn test_wave_size_follows_level() {
        let mut w = world();
        w.entities.clear();
        w.level = 3;
        seed_wave(&mut w);
        assert_eq!(w.alive_asteroids(), 8);
    }

    #[test]
    fn test_wave_velocities_in_range() {
        let w = world();
        for rock in w.entities.iter().filter(|e| e.kind.is_asteroid()) {
            assert!(rock.vel.x >= -2.0 && rock.vel.x <= 4.0);
            assert!(rock.vel.y >= -2.0 && rock.vel.y <= 4.0);
        }
    }

    #[test]
    fn test_fragments_spawn_in_pairs() {
        let mut w = world();
        let before = w.entities.len();
        spawn_fragments(&mut w, EntityKind::AsteroidMedium, Vec2::new(500.0, 500.0));
        assert_eq!(w.entities.len(), before + 2);
        assert!(
            w.entities[before..]
                .iter()
                .all(|e| e.kind == EntityKind::AsteroidMedium && e.pos == Vec2::new(500.0, 500.0))
        );
    }

    #[test]
    fn test_only_one_enemy() {
        let mut w = world();
        spawn_enemy(&mut w);
        spawn_enemy(&mut w);
        let enemies = w.entities.iter().filter(|e| e.kind.is_enemy()).count();
        assert_eq!(enemies, 1);
    }

    #[test]
    fn test_enemy_timer_spawns_at_zero() {
        let mut w = world();
        w.enemy_timer_ticks = 2;
        update_enemy_timer(&mut w);
        assert!(w.enemy.is_none());
        update_enemy_timer(&mut w);
        assert!(w.enemy.is_some());
        assert!(w.events().contains(&GameEvent::EnemySpawned {
            big: w.enemy.as_ref().unwrap().big
        }));
    }

    #[test]
    fn test_score_biased_policy_spawns_small() {
        let mut tuning = Tuning::default();
        tuning.enemy_size_policy = EnemySizePolicy::ScoreBiased { small_above: 100 };
        for seed in 0..16 {
            let mut w = World::new(seed, tuning.clone());
            w.score = 5000;
            spawn_enemy(&mut w);
            assert!(!w.enemy.as_ref().unwrap().big);
        }
    }

    #[test]
    fn test_enemy_path_crosses_world() {
        let mut w = world();
        spawn_enemy(&mut w);
        let slot = w.enemy.clone().unwrap();
        let start = slot.path.waypoints[0];
        let end = slot.path.waypoints[3];
        assert!((start.x - end.x).abs() >= w.tuning.world_width - 1.0);
        for p in slot.path.waypoints {
            assert!(p.y >= 0.0 && p.y < w.tuning.world_height);
        }
    }

    #[test]
    fn test_enemy_escapes_and_rearms() {
        let mut w = world();
        spawn_enemy(&mut w);
        w.time_ticks += u64::from(w.tuning.enemy_path_ticks) + 1;
        move_enemy(&mut w);
        assert!(w.enemy.is_none());
        assert!(w.enemy_timer_ticks >= 1800);
        assert!(w.events().contains(&GameEvent::EnemyEscaped));
    }

    #[test]
    fn test_enemy_fires_each_interval() {
        let mut w = world();
        spawn_enemy(&mut w);
        let bullets = |w: &World| {
            w.entities
                .iter()
                .filter(|e| e.kind == EntityKind::EnemyBullet)
                .count()
        };
        enemy_fire(&mut w);
        assert_eq!(bullets(&w), 0);
        w.time_ticks += 60;
        enemy_fire(&mut w);
        assert_eq!(bullets(&w), 1);
        enemy_fire(&mut w);
        assert_eq!(bullets(&w), 1);
    }

    #[test]
    fn test_enemy_holds_fire_during_hyperspace() {
        let mut w = world();
        spawn_enemy(&mut w);
        begin_hyperspace(&mut w);
        w.time_ticks += 60;
        enemy_fire(&mut w);
        assert!(!w.entities.iter().any(|e| e.kind == EntityKind::EnemyBullet));
    }

    #[test]
    fn test_player_fire_guards() {
        let mut w = world();
        player_fire(&mut w);
        player_fire(&mut w); // cooldown
        let shots = |w: &World| {
            w.entities
                .iter()
                .filter(|e| e.kind == EntityKind::PlayerBullet)
                .count()
        };
        assert_eq!(shots(&w), 1);

        w.time_ticks += 10;
        begin_hyperspace(&mut w);
        player_fire(&mut w);
        assert_eq!(shots(&w), 1);
    }

    #[test]
    fn test_player_bullet_follows_heading() {
        let mut w = world();
        player_fire(&mut w);
        let bullet = w
            .entities
            .iter()
            .find(|e| e.kind == EntityKind::PlayerBullet)
            .unwrap();
        // Heading 0 points up (+y)
        assert!(bullet.vel.x.abs() < 1e-3);
        assert!(bullet.vel.y > 0.0);
        assert_eq!(bullet.expires_at, Some(w.time_ticks + 30));
    }

    #[test]
    fn test_hyperspace_teleports_after_window() {
        let mut w = world();
        begin_hyperspace(&mut w);
        assert!(w.player.is_hyperspacing());
        w.time_ticks += 59;
        update_hyperspace(&mut w);
        assert!(w.player.is_hyperspacing());
        w.time_ticks += 1;
        update_hyperspace(&mut w);
        assert!(!w.player.is_hyperspacing());
        let ship = w.player_entity().unwrap();
        assert_eq!(ship.vel, Vec2::ZERO);
        assert!(ship.pos.x < w.tuning.world_width && ship.pos.y < w.tuning.world_height);
    }
}
