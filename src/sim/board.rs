//! Adjacency and connectivity queries over the board
//!
//! The board has no explicit grid: adjacency is recomputed from entity
//! positions on demand. Board sizes stay small (tens of balls), so the
//! linear scans here beat maintaining an incremental structure that every
//! attach/detach/drift would have to patch up.

use std::collections::HashSet;

use glam::Vec2;

use crate::consts::*;
use crate::dot2;

use super::entity::Entity;

fn find(entities: &[Entity], id: u32) -> Option<&Entity> {
    entities.iter().find(|e| e.id == id)
}

/// Ids of board balls adjacent to `of` (self and projectile excluded).
///
/// Two balls are neighbours when their centers sit closer than
/// `NEIGHBOUR_TOLERANCE * (r1 + r2)`.
pub fn neighbours(entities: &[Entity], of: u32) -> Vec<u32> {
    let Some(origin) = find(entities, of) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    for e in entities {
        if !e.is_board_ball() || e.id == of {
            continue;
        }

        let limit = NEIGHBOUR_TOLERANCE * (origin.radius + e.radius);
        if dot2(origin.pos - e.pos) < limit * limit {
            result.push(e.id);
        }
    }

    result
}

/// Connected component of same-colored balls reachable from `seed`.
///
/// Always contains `seed` itself, so the result is never empty for a live
/// board ball. A match is declared when the component outgrows
/// `MATCH_THRESHOLD`.
pub fn linked_same_color(entities: &[Entity], seed: u32) -> Vec<u32> {
    let Some(origin) = find(entities, seed) else {
        return Vec::new();
    };
    let color = origin.color;

    let mut result = vec![seed];
    let mut checked: HashSet<u32> = HashSet::new();
    checked.insert(seed);

    let mut queue = vec![seed];
    while let Some(id) = queue.pop() {
        for n in neighbours(entities, id) {
            if checked.insert(n) {
                let same = find(entities, n).is_some_and(|e| e.color == color);
                if same {
                    result.push(n);
                    queue.push(n);
                }
            }
        }
    }

    result
}

/// Connected component reachable from `seed` across any colors, treating
/// every id in `except` as already removed. Support analysis runs this with
/// the match set (and later the detached set) excluded to see what would be
/// left hanging.
pub fn linked(entities: &[Entity], seed: u32, except: &[u32]) -> Vec<u32> {
    if find(entities, seed).is_none() {
        return Vec::new();
    }

    let mut result = vec![seed];
    let mut checked: HashSet<u32> = HashSet::new();
    checked.insert(seed);

    let mut queue = vec![seed];
    while let Some(id) = queue.pop() {
        for n in neighbours(entities, id) {
            if except.contains(&n) {
                continue;
            }
            if checked.insert(n) {
                result.push(n);
                queue.push(n);
            }
        }
    }

    result
}

/// First board ball covering `point`, if any. Uses a tight squared-radius
/// test: raycasts sample the board densely enough that grazing hits are
/// caught on a later sample.
pub fn ball_at(entities: &[Entity], point: Vec2) -> Option<&Entity> {
    entities
        .iter()
        .filter(|e| e.is_board_ball())
        .find(|e| dot2(point - e.pos) < 1.25 * e.radius * e.radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Row of `n` touching balls starting at the origin, all color `color`
    fn row(n: usize, color: u8) -> Vec<Entity> {
        (0..n)
            .map(|i| {
                Entity::ball(
                    i as u32 + 1,
                    Vec2::new(2.0 * BALL_RADIUS * i as f32, BALL_RADIUS),
                    0.0,
                    color,
                )
            })
            .collect()
    }

    #[test]
    fn test_neighbours_excludes_self_and_projectile() {
        let mut entities = row(2, 0);
        let mut proj = Entity::projectile(99, 0);
        proj.pos = entities[0].pos;
        entities.push(proj);

        let n = neighbours(&entities, 1);
        assert_eq!(n, vec![2]);
    }

    #[test]
    fn test_neighbours_distance_cutoff() {
        let mut entities = row(1, 0);
        // 2.5 radii apart: exactly the neighbour limit, which is exclusive
        entities.push(Entity::ball(
            2,
            Vec2::new(NEIGHBOUR_TOLERANCE * 2.0 * BALL_RADIUS, BALL_RADIUS),
            0.0,
            0,
        ));
        assert!(neighbours(&entities, 1).is_empty());

        entities[1].pos.x -= 0.1;
        assert_eq!(neighbours(&entities, 1), vec![2]);
    }

    #[test]
    fn test_linked_same_color_contains_seed() {
        let entities = row(1, 3);
        assert_eq!(linked_same_color(&entities, 1), vec![1]);
    }

    #[test]
    fn test_linked_same_color_stops_at_color_boundary() {
        let mut entities = row(3, 0);
        entities[2].color = 1;

        let mut set = linked_same_color(&entities, 1);
        set.sort_unstable();
        assert_eq!(set, vec![1, 2]);
    }

    #[test]
    fn test_linked_same_color_spans_gaps_of_other_colors() {
        // red, blue, red in a row: the two reds are not directly adjacent,
        // so the blue ball splits them
        let mut entities = row(3, 0);
        entities[1].color = 1;

        assert_eq!(linked_same_color(&entities, 1), vec![1]);
    }

    #[test]
    fn test_linked_except_simulates_removal() {
        // 1-2-3 chain: removing 2 cuts 3 off from 1
        let entities = row(3, 0);

        let mut whole = linked(&entities, 1, &[]);
        whole.sort_unstable();
        assert_eq!(whole, vec![1, 2, 3]);

        assert_eq!(linked(&entities, 1, &[2]), vec![1]);
    }

    #[test]
    fn test_ball_at_misses_empty_space() {
        let entities = row(2, 0);
        assert!(ball_at(&entities, Vec2::new(50.0, 50.0)).is_none());
        assert!(ball_at(&entities, entities[0].pos).is_some());
    }

    /// Arbitrary small board on a loose grid with random colors
    fn arb_board() -> impl Strategy<Value = Vec<Entity>> {
        prop::collection::vec(((0i32..5, 0i32..5), 0u8..4), 1..12).prop_map(|cells| {
            let mut entities = Vec::new();
            for (i, ((gx, gy), color)) in cells.into_iter().enumerate() {
                entities.push(Entity::ball(
                    i as u32 + 1,
                    Vec2::new(2.0 * BALL_RADIUS * gx as f32, BALL_RADIUS * (1 + 2 * gy) as f32),
                    0.0,
                    color,
                ));
            }
            let mut proj = Entity::projectile(1000, 0);
            proj.pos = Vec2::new(0.0, BALL_RADIUS);
            entities.push(proj);
            entities
        })
    }

    proptest! {
        #[test]
        fn prop_neighbour_relation_is_symmetric(entities in arb_board()) {
            for e in entities.iter().filter(|e| e.is_board_ball()) {
                for n in neighbours(&entities, e.id) {
                    prop_assert!(neighbours(&entities, n).contains(&e.id));
                }
            }
        }

        #[test]
        fn prop_linked_contains_seed_never_projectile(entities in arb_board()) {
            for e in entities.iter().filter(|e| e.is_board_ball()) {
                let same = linked_same_color(&entities, e.id);
                prop_assert!(same.contains(&e.id));
                prop_assert!(!same.contains(&1000));

                let all = linked(&entities, e.id, &[]);
                prop_assert!(all.contains(&e.id));
                prop_assert!(!all.contains(&1000));
            }
        }
    }
}
