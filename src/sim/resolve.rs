//! Turn resolution: what happens when the shot meets the board
//!
//! The whole pass runs against one snapshot of the board. Removals are only
//! queued, so every flood fill below sees the same pre-removal entity set;
//! "already removed" balls are simulated through the `except` lists instead.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

use super::board::{linked, linked_same_color, neighbours};
use super::entity::Entity;
use super::state::{GameEvent, GamePhase, GameState};

/// Resolve the projectile striking board ball `hit_id`: attach, then run the
/// match / detachment / orphan cascade. Ends the shot either way; the
/// projectile respawn is deferred to the next tick.
pub fn resolve_impact(state: &mut GameState, hit_id: u32) {
    let Some(proj) = state.projectile().cloned() else {
        return;
    };
    let Some(hit) = state.entity(hit_id).cloned() else {
        return;
    };

    // Snap to a lattice slot next to the struck ball. A mostly-vertical
    // approach takes the diagonal slot below, otherwise the horizontal slot
    // on the side the shot came from.
    let offset = proj.pos - hit.pos;
    let mut attach = hit.pos;
    if offset.y * offset.y > offset.x * offset.x {
        attach.x += if offset.x > 0.0 { hit.radius } else { -hit.radius };
        attach.y += 2.0 * hit.radius;
    } else {
        attach.x += if offset.x > 0.0 {
            2.0 * hit.radius
        } else {
            -2.0 * hit.radius
        };
    }

    state.push_event(GameEvent::Impact);

    let added_id = state.next_entity_id();
    let mut added = Entity::ball(added_id, attach, 0.0, proj.color);
    added.vel = hit.vel;
    state.entities.push(added);

    let matched = linked_same_color(&state.entities, added_id);
    if matched.len() > MATCH_THRESHOLD {
        pop_match(state, &matched, attach);
        let detached = drop_unsupported(state, &matched);
        drop_orphans(state, &matched, &detached);
    }

    state.queue_removal(proj.id);
    state.respawn_queued = true;
    state.phase = GamePhase::Idle;
}

/// Remove the matched cluster, crediting score and spawning an exploding
/// ball per member. Pops farther from the impact point fuse later, so the
/// cluster bursts outward in a wave.
fn pop_match(state: &mut GameState, matched: &[u32], impact: Vec2) {
    for id in matched {
        let Some(ball) = state.entity(*id).cloned() else {
            continue;
        };
        state.queue_removal(*id);
        state.score += ball.score_value();

        let explode_after = 5.0 * (impact - ball.pos).length();
        let eid = state.next_entity_id();
        state.entities.push(Entity::exploding(
            eid,
            ball.pos,
            ball.vel,
            ball.color,
            explode_after,
        ));
    }

    let mut delay = 0.0;
    for _ in 0..matched.len().min(3) {
        delay += 75.0 + 50.0 * state.rng.random::<f32>();
        state.push_event(GameEvent::Pop { delay_ms: delay });
    }
}

/// Detachment cascade: every component adjacent to the removed match that no
/// longer reaches the first layer falls off the board. Returns the detached
/// ids.
fn drop_unsupported(state: &mut GameState, matched: &[u32]) -> Vec<u32> {
    let mut frontier: Vec<u32> = Vec::new();
    for id in matched {
        for n in neighbours(&state.entities, *id) {
            if !matched.contains(&n) && !frontier.contains(&n) {
                frontier.push(n);
            }
        }
    }

    let anchored: Vec<u32> = state
        .first_layer
        .iter()
        .copied()
        .filter(|id| !matched.contains(id))
        .collect();

    let mut detached: Vec<u32> = Vec::new();
    for n in &frontier {
        let component = linked(&state.entities, *n, matched);
        if component.iter().any(|id| anchored.contains(id)) {
            continue;
        }
        for id in component {
            if !detached.contains(&id) {
                detached.push(id);
            }
        }
    }

    for id in &detached {
        let Some(ball) = state.entity(*id).cloned() else {
            continue;
        };
        state.queue_removal(*id);
        state.score += ball.score_value();

        // Small random sideways drift as the component tumbles off
        let vx = (2.0 * state.rng.random::<f32>() - 1.0) * 0.001;
        let fid = state.next_entity_id();
        state.entities.push(Entity::falling(
            fid,
            ball.pos,
            Vec2::new(vx, ball.vel.y),
            ball.color,
        ));
    }

    detached
}

/// Orphan pass: a first-layer ball whose component (ignoring everything the
/// cascade already removed) is just itself has nothing left hanging on it
/// and falls too.
fn drop_orphans(state: &mut GameState, matched: &[u32], detached: &[u32]) {
    let mut except: Vec<u32> = matched.to_vec();
    except.extend_from_slice(detached);

    let candidates: Vec<u32> = state
        .first_layer
        .iter()
        .copied()
        .filter(|id| !matched.contains(id) && !detached.contains(id))
        .collect();

    for id in candidates {
        if linked(&state.entities, id, &except).len() != 1 {
            continue;
        }
        let Some(ball) = state.entity(id).cloned() else {
            continue;
        };
        state.queue_removal(id);
        state.score += ball.score_value();

        let fid = state.next_entity_id();
        state
            .entities
            .push(Entity::falling(fid, ball.pos, ball.vel, ball.color));
    }
}
