//! Contact detection and category-driven resolution
//!
//! Detection is a pairwise circle-overlap scan gated by collision masks.
//! Each entity takes part in at most one contact per tick, so a rock can
//! never be scored twice by two bullets arriving on the same frame.

use super::entity::{Entity, EntityKind};
use super::state::{GameEvent, World};
use super::{progression, spawn};

/// A first-contact pair for this tick (indices into `World::entities`).
/// `first` holds the lower category value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub first: usize,
    pub second: usize,
}

/// What happens to one side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Survives,
    Destroyed,
    /// Asteroid breaks (small rocks leave nothing behind)
    Fragments,
}

/// Outcome of a contact between two kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRule {
    pub first: Fate,
    pub second: Fate,
    pub points: u32,
}

/// Both sides must list the other's category
#[inline]
pub fn masks_permit(a: &Entity, b: &Entity) -> bool {
    (a.category & b.collides_with) != 0 && (b.category & a.collides_with) != 0
}

/// Scan live entities for first-contact pairs
pub fn find_contacts(entities: &[Entity], skip_player: bool) -> Vec<Contact> {
    let mut engaged = vec![false; entities.len()];
    let mut contacts = Vec::new();

    let eligible = |e: &Entity| e.alive && !(skip_player && e.kind == EntityKind::Player);

    for i in 0..entities.len() {
        if engaged[i] || !eligible(&entities[i]) {
            continue;
        }
        for j in (i + 1)..entities.len() {
            if engaged[j] || !eligible(&entities[j]) {
                continue;
            }
            let (a, b) = (&entities[i], &entities[j]);
            if masks_permit(a, b) && a.overlaps(b) {
                engaged[i] = true;
                engaged[j] = true;
                contacts.push(if a.category <= b.category {
                    Contact { first: i, second: j }
                } else {
                    Contact { first: j, second: i }
                });
                break;
            }
        }
    }

    contacts
}

/// Resolution table, keyed by the lower-category member first
pub fn contact_rule(first: EntityKind, second: EntityKind) -> ContactRule {
    use EntityKind::*;

    match (first, second) {
        // Rocks breaking on enemy fire or the enemy hull score nothing
        (AsteroidLarge | AsteroidMedium | AsteroidSmall, EnemyLarge | EnemySmall) => ContactRule {
            first: Fate::Fragments,
            second: Fate::Survives,
            points: 0,
        },
        (AsteroidLarge | AsteroidMedium | AsteroidSmall, EnemyBullet) => ContactRule {
            first: Fate::Fragments,
            second: Fate::Destroyed,
            points: 0,
        },
        (AsteroidLarge | AsteroidMedium | AsteroidSmall, Player | PlayerBullet) => ContactRule {
            first: Fate::Fragments,
            second: Fate::Destroyed,
            points: first.points(),
        },
        (EnemyLarge | EnemySmall, Player | PlayerBullet) => ContactRule {
            first: Fate::Destroyed,
            second: Fate::Destroyed,
            points: first.points(),
        },
        (EnemyBullet, Player) => ContactRule {
            first: Fate::Destroyed,
            second: Fate::Destroyed,
            points: 0,
        },
        // Unknown pairing: remove both, no score
        _ => ContactRule {
            first: Fate::Destroyed,
            second: Fate::Destroyed,
            points: 0,
        },
    }
}

/// Detect and resolve this tick's contacts
pub fn resolve_collisions(world: &mut World) {
    let skip_player = world.tuning.hyperspace_invulnerable && world.player.is_hyperspacing();
    let contacts = find_contacts(&world.entities, skip_player);

    // Fragments are spawned after the scan so new rocks never join this tick
    let mut fragments = Vec::new();

    for contact in contacts {
        let first = world.entities[contact.first].clone();
        let second = world.entities[contact.second].clone();
        let rule = contact_rule(first.kind, second.kind);
        log::debug!(
            "Contact {:?}#{} x {:?}#{} -> {:?}",
            first.kind,
            first.id.0,
            second.kind,
            second.id.0,
            rule
        );

        for (index, entity, fate) in [
            (contact.first, &first, rule.first),
            (contact.second, &second, rule.second),
        ] {
            match fate {
                Fate::Survives => {}
                Fate::Destroyed => {
                    world.entities[index].alive = false;
                    world.emit(GameEvent::EntityDestroyed { kind: entity.kind });
                }
                Fate::Fragments => {
                    world.entities[index].alive = false;
                    world.asteroids_destroyed_this_level += 1;
                    world.emit(GameEvent::AsteroidBroken {
                        kind: entity.kind,
                        pos: entity.pos,
                    });
                    if let Some(kind) = entity.kind.fragment() {
                        fragments.push((kind, entity.pos));
                    }
                }
            }
        }

        if rule.points > 0 {
            progression::add_score(world, rule.points);
        }

        for (entity, fate) in [(&first, rule.first), (&second, rule.second)] {
            if fate != Fate::Destroyed {
                continue;
            }
            if entity.kind == EntityKind::Player {
                progression::on_player_destroyed(world);
            } else if entity.kind.is_enemy() {
                progression::on_enemy_destroyed(world);
            }
        }
    }

    for (kind, pos) in fragments {
        spawn::spawn_fragments(world, kind, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityId;
    use crate::sim::state::{EnemyPath, EnemySlot};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    /// World with the wave removed; only the ship at center remains
    fn empty_world() -> World {
        let mut w = World::new(17, Tuning::default());
        for e in w.entities.iter_mut().filter(|e| e.kind.is_asteroid()) {
            e.alive = false;
        }
        w.prune_dead();
        w.drain_events();
        w
    }

    fn count(w: &World, kind: EntityKind) -> usize {
        w.entities.iter().filter(|e| e.alive && e.kind == kind).count()
    }

    /// Park an enemy of `kind` in the enemy slot at `pos`
    fn park_enemy(w: &mut World, kind: EntityKind, pos: Vec2) {
        let id = w.spawn_entity(kind, pos, Vec2::ZERO);
        w.enemy = Some(EnemySlot {
            id,
            big: kind == EntityKind::EnemyLarge,
            path: EnemyPath {
                waypoints: [pos; 4],
                started_at: w.time_ticks,
                leg_ticks: 600,
            },
            next_fire_at: u64::MAX,
        });
    }

    fn at(id: u32, kind: EntityKind, x: f32, y: f32) -> Entity {
        Entity::new(EntityId(id), kind, Vec2::new(x, y), Vec2::ZERO)
    }

    const KINDS: [EntityKind; 8] = [
        EntityKind::Player,
        EntityKind::AsteroidLarge,
        EntityKind::AsteroidMedium,
        EntityKind::AsteroidSmall,
        EntityKind::EnemyLarge,
        EntityKind::EnemySmall,
        EntityKind::PlayerBullet,
        EntityKind::EnemyBullet,
    ];

    #[test]
    fn test_bullet_hits_asteroid() {
        let entities = vec![
            at(1, EntityKind::PlayerBullet, 100.0, 100.0),
            at(2, EntityKind::AsteroidLarge, 120.0, 100.0),
        ];
        let contacts = find_contacts(&entities, false);
        // Asteroid has the lower category, so it is listed first
        assert_eq!(contacts, vec![Contact { first: 1, second: 0 }]);
    }

    #[test]
    fn test_asteroids_pass_through_each_other() {
        let entities = vec![
            at(1, EntityKind::AsteroidLarge, 100.0, 100.0),
            at(2, EntityKind::AsteroidLarge, 110.0, 100.0),
        ];
        assert!(find_contacts(&entities, false).is_empty());
    }

    #[test]
    fn test_one_contact_per_entity() {
        // Two bullets on one rock: only the first scores
        let entities = vec![
            at(1, EntityKind::AsteroidSmall, 100.0, 100.0),
            at(2, EntityKind::PlayerBullet, 100.0, 105.0),
            at(3, EntityKind::PlayerBullet, 100.0, 95.0),
        ];
        let contacts = find_contacts(&entities, false);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0], Contact { first: 0, second: 1 });
    }

    #[test]
    fn test_dead_entities_ignored() {
        let mut rock = at(1, EntityKind::AsteroidSmall, 100.0, 100.0);
        rock.alive = false;
        let entities = vec![rock, at(2, EntityKind::PlayerBullet, 100.0, 100.0)];
        assert!(find_contacts(&entities, false).is_empty());
    }

    #[test]
    fn test_skip_player_while_shielded() {
        let entities = vec![
            at(1, EntityKind::AsteroidLarge, 100.0, 100.0),
            at(2, EntityKind::Player, 100.0, 100.0),
        ];
        assert!(find_contacts(&entities, true).is_empty());
        assert_eq!(find_contacts(&entities, false).len(), 1);
    }

    #[test]
    fn test_rule_table() {
        let rule = contact_rule(EntityKind::AsteroidMedium, EntityKind::PlayerBullet);
        assert_eq!(rule.first, Fate::Fragments);
        assert_eq!(rule.second, Fate::Destroyed);
        assert_eq!(rule.points, 50);

        let rule = contact_rule(EntityKind::AsteroidLarge, EntityKind::EnemyBullet);
        assert_eq!(rule.points, 0);
        assert_eq!(rule.first, Fate::Fragments);

        let rule = contact_rule(EntityKind::AsteroidSmall, EntityKind::EnemySmall);
        assert_eq!(rule.second, Fate::Survives);
        assert_eq!(rule.points, 0);

        let rule = contact_rule(EntityKind::EnemySmall, EntityKind::PlayerBullet);
        assert_eq!(rule.points, 1000);
        let rule = contact_rule(EntityKind::EnemyLarge, EntityKind::Player);
        assert_eq!(rule.points, 200);
        assert_eq!(rule.second, Fate::Destroyed);

        let rule = contact_rule(EntityKind::EnemyBullet, EntityKind::Player);
        assert_eq!((rule.first, rule.second, rule.points), (Fate::Destroyed, Fate::Destroyed, 0));
    }

    #[test]
    fn test_unknown_pair_defaults_to_both_destroyed() {
        let rule = contact_rule(EntityKind::PlayerBullet, EntityKind::PlayerBullet);
        assert_eq!((rule.first, rule.second, rule.points), (Fate::Destroyed, Fate::Destroyed, 0));
    }

    #[test]
    fn test_medium_rock_splits_into_two_smalls() {
        let mut w = empty_world();
        let at = Vec2::new(300.0, 300.0);
        w.spawn_entity(EntityKind::AsteroidMedium, at, Vec2::ZERO);
        w.spawn_entity(EntityKind::PlayerBullet, at, Vec2::ZERO);

        resolve_collisions(&mut w);
        w.prune_dead();

        assert_eq!(count(&w, EntityKind::AsteroidMedium), 0);
        assert_eq!(count(&w, EntityKind::AsteroidSmall), 2);
        assert_eq!(count(&w, EntityKind::PlayerBullet), 0);
        assert_eq!(w.score, 50);
        assert_eq!(w.asteroids_destroyed_this_level, 1);
    }

    #[test]
    fn test_small_rock_leaves_nothing() {
        let mut w = empty_world();
        let at = Vec2::new(300.0, 300.0);
        w.spawn_entity(EntityKind::AsteroidSmall, at, Vec2::ZERO);
        w.spawn_entity(EntityKind::PlayerBullet, at, Vec2::ZERO);

        resolve_collisions(&mut w);
        w.prune_dead();

        assert_eq!(w.alive_asteroids(), 0);
        assert_eq!(w.score, 100);
        assert!(w.events().contains(&GameEvent::AsteroidBroken {
            kind: EntityKind::AsteroidSmall,
            pos: at,
        }));
    }

    #[test]
    fn test_shot_enemy_frees_slot_and_rearms_timer() {
        let mut w = empty_world();
        let at = Vec2::new(300.0, 300.0);
        park_enemy(&mut w, EntityKind::EnemySmall, at);
        w.enemy_timer_ticks = 0;
        w.spawn_entity(EntityKind::PlayerBullet, at, Vec2::ZERO);

        resolve_collisions(&mut w);
        w.prune_dead();

        assert!(w.enemy.is_none());
        assert!(w.enemy_entity().is_none());
        assert_eq!(w.score, 1000);
        assert!((1800..=7200).contains(&w.enemy_timer_ticks));
        assert!(w.events().contains(&GameEvent::EntityDestroyed {
            kind: EntityKind::EnemySmall
        }));
    }

    #[test]
    fn test_ramming_big_enemy_scores_and_costs_a_life() {
        let mut w = empty_world();
        let ship = w.player_entity().unwrap().pos;
        park_enemy(&mut w, EntityKind::EnemyLarge, ship);

        resolve_collisions(&mut w);
        w.prune_dead();

        assert!(w.enemy.is_none());
        assert!(w.player.id.is_none());
        assert_eq!(w.score, 200);
        assert_eq!(w.lives, 2);
        assert!(w.player.respawn_at.is_some());
    }

    #[test]
    fn test_enemy_survives_rock_without_score() {
        let mut w = empty_world();
        let at = Vec2::new(300.0, 300.0);
        park_enemy(&mut w, EntityKind::EnemyLarge, at);
        w.spawn_entity(EntityKind::AsteroidLarge, at, Vec2::ZERO);

        resolve_collisions(&mut w);
        w.prune_dead();

        assert!(w.enemy_entity().is_some());
        assert_eq!(count(&w, EntityKind::AsteroidMedium), 2);
        assert_eq!(w.score, 0);
    }

    proptest! {
        #[test]
        fn contact_requires_mutual_masks(a in 0usize..8, b in 0usize..8) {
            let entities = vec![
                at(1, KINDS[a], 500.0, 500.0),
                at(2, KINDS[b], 500.0, 500.0),
            ];
            let contacts = find_contacts(&entities, false);
            let permitted = masks_permit(&entities[0], &entities[1]);
            prop_assert_eq!(!contacts.is_empty(), permitted);
            // Mask check is symmetric
            prop_assert_eq!(permitted, masks_permit(&entities[1], &entities[0]));
        }
    }
}
