//! Shape generation and scene assembly
//!
//! The whole frame is flat-colored triangles: one vertex list assembled from
//! the simulation state, uploaded and drawn in a single pass.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors, palette_color};
use crate::consts::*;
use crate::sim::{EntityKind, GamePhase, GameState};

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for an axis-aligned quad centered on `center`
pub fn quad(center: Vec2, width: f32, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let hw = width / 2.0;
    let hh = height / 2.0;

    vec![
        Vertex::new(center.x - hw, center.y - hh, color),
        Vertex::new(center.x + hw, center.y - hh, color),
        Vertex::new(center.x + hw, center.y + hh, color),
        Vertex::new(center.x - hw, center.y - hh, color),
        Vertex::new(center.x + hw, center.y + hh, color),
        Vertex::new(center.x - hw, center.y + hh, color),
    ]
}

/// Background tint index for a difficulty level
pub fn background_index(difficulty: u32) -> usize {
    (difficulty / 3) as usize % colors::BACKGROUNDS.len()
}

/// Assemble the full scene from the simulation state.
///
/// `trajectory` holds the precomputed aiming-preview dots (empty when not
/// aiming). Vertices are in world coordinates; the pipeline maps them to NDC.
pub fn scene(state: &GameState, trajectory: &[Vec2]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(4096);

    // Playfield tint strip
    let background = colors::BACKGROUNDS[background_index(state.difficulty)];
    vertices.extend(quad(
        Vec2::new(0.0, WORLD_HEIGHT / 2.0),
        LEVEL_WIDTH,
        WORLD_HEIGHT,
        background,
    ));

    if state.phase == GamePhase::Menu {
        return vertices;
    }

    for e in &state.entities {
        let segments = match e.kind {
            EntityKind::Particle { .. } => 8,
            _ => 24,
        };
        let color = palette_color(e.color, e.alpha());
        vertices.extend(circle(e.pos + e.offset, e.radius, color, segments));
    }

    // Next-shot indicator beside the launcher
    vertices.extend(circle(
        Vec2::new(-7.0, LAUNCH_Y),
        BALL_RADIUS * 0.5,
        palette_color(state.next_color, 1.0),
        24,
    ));

    for dot in trajectory {
        vertices.extend(circle(
            *dot,
            BALL_RADIUS / 3.0,
            colors::TRAJECTORY_DOT,
            12,
        ));
    }

    // Danger line
    vertices.extend(quad(
        Vec2::new(0.0, DANGER_LINE_Y),
        LEVEL_WIDTH,
        0.2,
        colors::DANGER_LINE,
    ));

    // Dim the board behind the start/win/fail text
    if matches!(
        state.phase,
        GamePhase::Start | GamePhase::Win | GamePhase::Fail
    ) {
        vertices.extend(quad(
            Vec2::new(0.0, WORLD_HEIGHT / 2.0),
            LEVEL_WIDTH * 4.0,
            WORLD_HEIGHT,
            colors::OVERLAY,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::build_level;

    #[test]
    fn test_circle_vertex_count() {
        let v = circle(Vec2::ZERO, 1.0, [1.0; 4], 16);
        assert_eq!(v.len(), 48);
    }

    #[test]
    fn test_quad_is_two_triangles() {
        let v = quad(Vec2::new(1.0, 2.0), 4.0, 2.0, [1.0; 4]);
        assert_eq!(v.len(), 6);
        assert!(v.iter().all(|p| (p.position[0] - 1.0).abs() <= 2.0));
        assert!(v.iter().all(|p| (p.position[1] - 2.0).abs() <= 1.0));
    }

    #[test]
    fn test_background_cycles_every_three_levels() {
        assert_eq!(background_index(1), 0);
        assert_eq!(background_index(3), 1);
        assert_eq!(background_index(11), 3);
        assert_eq!(background_index(12), 0);
    }

    #[test]
    fn test_scene_menu_hides_board() {
        let mut state = GameState::new(1);
        build_level(&mut state);

        state.phase = GamePhase::Menu;
        let menu = scene(&state, &[]);

        state.phase = GamePhase::Idle;
        let idle = scene(&state, &[]);

        assert!(menu.len() < idle.len());
    }

    #[test]
    fn test_scene_includes_trajectory_dots() {
        let mut state = GameState::new(1);
        build_level(&mut state);
        state.phase = GamePhase::Idle;

        let without = scene(&state, &[]).len();
        let with = scene(&state, &[Vec2::new(0.0, 60.0), Vec2::new(0.0, 55.0)]).len();
        assert_eq!(with - without, 2 * 12 * 3);
    }
}
