//! Level construction and projectile management
//!
//! Levels are hex-packed rows hanging from above the ceiling: row `y` of the
//! lattice sits at world `y = r + 2r·y`, odd rows shifted half a ball right.
//! Higher difficulty adds rows above the visible board and widens the
//! palette, up to all eight colors.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::{dot2, safe_normalize};

use super::board::{ball_at, linked_same_color};
use super::entity::Entity;
use super::state::GameState;

/// Rebuild the board for the current difficulty. Transients (falling balls,
/// particles) survive; the lattice and projectile are recreated.
pub fn build_level(state: &mut GameState) {
    state.entities.retain(|e| !e.is_board_ball());
    state.first_layer.clear();

    state.fall_speed = FALL_SPEED_BASE * 1.1f32.powi(state.difficulty as i32);
    let colors = (state.difficulty + 3).min(PALETTE_SIZE as u32);

    let min_row = -(state.difficulty as i32);
    for row in min_row..5 {
        let odd = row.rem_euclid(2) == 1;
        let slots = if odd { 2 } else { 3 };
        for col in -2..slots {
            let x = 2.0 * BALL_RADIUS * col as f32 + if odd { BALL_RADIUS } else { 0.0 };
            let y = BALL_RADIUS + 2.0 * BALL_RADIUS * row as f32;
            let color = state.rng.random_range(0..colors) as u8;

            let id = state.next_entity_id();
            state
                .entities
                .push(Entity::ball(id, Vec2::new(x, y), state.fall_speed, color));

            if row == min_row {
                state.first_layer.push(id);
            }
        }
    }

    log::info!(
        "level {} built: {} balls, {} colors, fall speed {:.5}",
        state.difficulty,
        state.entities.iter().filter(|e| e.is_board_ball()).count(),
        colors,
        state.fall_speed,
    );

    create_or_reset_projectile(state);
}

/// Replace the projectile with a fresh one docked at the launch position.
///
/// The previously predicted color is kept as the new shot's color while that
/// color still exists on the board; otherwise both current and next are
/// re-predicted.
pub fn create_or_reset_projectile(state: &mut GameState) {
    if let Some(id) = state.projectile_id.take() {
        state.entities.retain(|e| e.id != id);
    }

    let on_board = state.colors_on_board();
    let current = if !on_board.is_empty() && on_board.contains(&state.next_color) {
        state.next_color
    } else {
        predict_color(state)
    };
    state.next_color = predict_color(state);

    let id = state.next_entity_id();
    state.entities.push(Entity::projectile(id, current));
    state.projectile_id = Some(id);
}

/// March a ray from `pos` in half-radius steps, reflecting off the side
/// walls, until it covers a board ball or gives up.
fn raycast_ball(state: &GameState, mut pos: Vec2, mut dir: Vec2) -> Option<u32> {
    let half = LEVEL_WIDTH / 2.0;
    for _ in 0..128 {
        if let Some(ball) = ball_at(&state.entities, pos) {
            return Some(ball.id);
        }

        pos += dir * (BALL_RADIUS / 2.0);
        if pos.x - BALL_RADIUS < -half || pos.x + BALL_RADIUS > half {
            dir.x = -dir.x;
        }
    }

    None
}

/// Predict a color for an upcoming shot by sampling what the player can
/// actually reach: a fan of upward rays from the danger line, each reachable
/// ball weighted by the size of its same-color cluster. Falls back to a
/// random on-board color, then to color 0 on an empty board.
pub fn predict_color(state: &mut GameState) -> u8 {
    let mut reachable: Vec<u32> = Vec::new();
    for x0 in -10..10 {
        let dir = safe_normalize(Vec2::new(x0 as f32, -5.0));
        if let Some(id) = raycast_ball(state, Vec2::new(0.0, DANGER_LINE_Y), dir) {
            if !reachable.contains(&id) {
                reachable.push(id);
            }
        }
    }

    let mut weighted: Vec<u8> = Vec::new();
    for id in reachable {
        let weight = linked_same_color(&state.entities, id).len();
        if let Some(ball) = state.entity(id) {
            for _ in 0..weight {
                weighted.push(ball.color);
            }
        }
    }

    if weighted.is_empty() {
        let on_board = state.colors_on_board();
        if on_board.is_empty() {
            return 0;
        }
        let pick = state.rng.random_range(0..on_board.len());
        return on_board[pick];
    }

    let pick = state.rng.random_range(0..weighted.len());
    weighted[pick]
}

/// Dots of the aiming preview: sample the shot ray with wall reflection,
/// one dot every five world units, stopping short of the first ball it
/// would hit.
pub fn trajectory_preview(state: &GameState, aim: Vec2) -> Vec<Vec2> {
    let Some(proj) = state.projectile() else {
        return Vec::new();
    };

    let offset = Vec2::new(aim.x, aim.y.min(LAUNCH_Y) - WORLD_HEIGHT);
    let mut dir = safe_normalize(offset);
    let mut pos = proj.pos;
    let radius = proj.radius;
    let half = LEVEL_WIDTH / 2.0;

    let mut dots = Vec::new();
    for i in 1..=1000 {
        pos += dir / 10.0;

        if pos.x - radius < -half || pos.x + radius > half {
            dir.x = -dir.x;
        }

        if i % 50 == 0 {
            let blocked = state
                .entities
                .iter()
                .filter(|e| e.is_board_ball())
                .any(|b| dot2(pos - b.pos) < 1.5 * BALL_RADIUS * BALL_RADIUS);
            if blocked {
                break;
            }

            dots.push(pos);
        }
    }

    dots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityKind;

    #[test]
    fn test_build_level_difficulty_one_layout() {
        let mut state = GameState::new(42);
        build_level(&mut state);

        // Rows -1..5: three odd rows of 4 and three even rows of 5
        let balls: Vec<&Entity> = state
            .entities
            .iter()
            .filter(|e| e.is_board_ball())
            .collect();
        assert_eq!(balls.len(), 27);
        assert_eq!(state.first_layer.len(), 4);

        // Colors limited to difficulty + 3
        assert!(balls.iter().all(|b| b.color < 4));

        // Every ball drifts at the level fall speed
        assert!(balls.iter().all(|b| b.vel.y == state.fall_speed));
    }

    #[test]
    fn test_build_level_first_layer_is_topmost_row() {
        let mut state = GameState::new(42);
        state.difficulty = 3;
        build_level(&mut state);

        let top_y = BALL_RADIUS + 2.0 * BALL_RADIUS * -3.0;
        for id in &state.first_layer {
            let ball = state.entity(*id).unwrap();
            assert_eq!(ball.pos.y, top_y);
        }
    }

    #[test]
    fn test_build_level_palette_caps_at_eight() {
        let mut state = GameState::new(42);
        state.difficulty = 20;
        build_level(&mut state);
        assert!(
            state
                .entities
                .iter()
                .filter(|e| e.is_board_ball())
                .all(|b| (b.color as usize) < PALETTE_SIZE)
        );
    }

    #[test]
    fn test_projectile_docked_after_build() {
        let mut state = GameState::new(42);
        build_level(&mut state);

        let proj = state.projectile().unwrap();
        assert_eq!(proj.pos, Vec2::new(LAUNCH_X, LAUNCH_Y));
        assert_eq!(proj.vel, Vec2::ZERO);
        assert!(matches!(proj.kind, EntityKind::Projectile { .. }));

        // Exactly one projectile
        let count = state
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Projectile { .. }))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_respawn_replaces_projectile() {
        let mut state = GameState::new(42);
        build_level(&mut state);
        let old_id = state.projectile_id.unwrap();

        create_or_reset_projectile(&mut state);
        let new_id = state.projectile_id.unwrap();
        assert_ne!(old_id, new_id);
        assert!(state.entity(old_id).is_none());
    }

    #[test]
    fn test_predict_color_empty_board() {
        let mut state = GameState::new(42);
        assert_eq!(predict_color(&mut state), 0);
    }

    #[test]
    fn test_predict_color_monochrome_board() {
        let mut state = GameState::new(42);
        build_level(&mut state);
        for e in &mut state.entities {
            if e.is_board_ball() {
                e.color = 5;
            }
        }
        assert_eq!(predict_color(&mut state), 5);
    }

    #[test]
    fn test_next_color_always_on_board_or_zero() {
        let mut state = GameState::new(7);
        build_level(&mut state);
        let on_board = state.colors_on_board();
        assert!(on_board.contains(&state.next_color));
    }

    #[test]
    fn test_trajectory_stops_at_board() {
        let mut state = GameState::new(42);
        build_level(&mut state);

        // Aim straight up: the preview must terminate before the lattice
        let dots = trajectory_preview(&state, Vec2::new(0.0, 50.0));
        assert!(!dots.is_empty());
        assert!(dots.len() < 20);
        let lowest_board_y = state.max_ball_y();
        for dot in &dots {
            assert!(dot.y > lowest_board_y - 2.0 * BALL_RADIUS);
        }
    }

    #[test]
    fn test_trajectory_empty_board_runs_out() {
        let mut state = GameState::new(42);
        create_or_reset_projectile(&mut state);
        let dots = trajectory_preview(&state, Vec2::new(10.0, 50.0));
        // 1000 steps, one dot per 50
        assert_eq!(dots.len(), 20);
    }
}
