//! Per-frame simulation tick
//!
//! The tick is frame-driven with a clamped variable delta: velocities are in
//! units per millisecond and long stalls (tab switches, GC pauses) are capped
//! at MAX_DELTA_TIME so nothing teleports. All entity destruction funnels
//! through the state's removal queue, applied once at the end of the tick.

use glam::Vec2;

use crate::consts::*;
use crate::safe_normalize;

use super::entity::UpdateCtx;
use super::level::{build_level, create_or_reset_projectile};
use super::resolve::resolve_impact;
use super::state::{GameEvent, GamePhase, GameState};

/// Input gathered by the host for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Pointer position in world coordinates
    pub aim: Option<Vec2>,
    /// Primary button released
    pub fire: bool,
    /// Secondary button released; swaps projectile colors while idle
    pub swap: bool,
    /// Click on the start/menu/win/fail screens
    pub confirm: bool,
    /// Menu only: discard saved progress and start from level 1
    pub new_game: bool,
}

/// Advance the game by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    let dt = dt_ms.clamp(0.0, MAX_DELTA_TIME);

    if state.paused || state.hidden {
        return;
    }

    // Projectile respawn deferred from the previous frame's resolution
    if state.respawn_queued {
        state.respawn_queued = false;
        create_or_reset_projectile(state);
    }

    handle_input(state, input);

    update_entities(state, dt);
    pull_board_down(state, dt);

    if state.is_shot() {
        check_projectile_hit(state);
    }
    check_projectile_bounds(state);

    state.apply_removals();

    check_fail(state);
    check_win(state);
}

fn handle_input(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Start if input.confirm => {
            state.phase = GamePhase::Idle;
        }
        GamePhase::Menu => {
            if input.new_game {
                state.difficulty = 1;
                state.score = 0;
                state.level_start_score = 0;
                build_level(state);
                state.phase = GamePhase::Idle;
            } else if input.confirm {
                // Continue: keep the board built from saved progress
                state.phase = GamePhase::Idle;
            }
        }
        GamePhase::Win | GamePhase::Fail if input.confirm => {
            build_level(state);
            state.phase = GamePhase::Start;
        }
        GamePhase::Idle => {
            if input.fire {
                match input.aim {
                    // A primary release in the bottom strip swaps instead
                    Some(aim) if aim.y < DANGER_LINE_Y => fire(state, aim),
                    Some(_) => swap_colors(state),
                    None => {}
                }
            } else if input.swap {
                swap_colors(state);
            }
        }
        _ => {}
    }
}

/// Launch the projectile toward `aim`. The aim point is clamped to just
/// above the launcher so shots always travel upward.
fn fire(state: &mut GameState, aim: Vec2) {
    let offset = Vec2::new(aim.x, aim.y.min(LAUNCH_Y) - WORLD_HEIGHT);
    let vel = safe_normalize(offset) * PROJECTILE_SPEED;

    let Some(id) = state.projectile_id else {
        return;
    };
    if let Some(proj) = state.entity_mut(id) {
        proj.vel = vel;
    }
    state.phase = GamePhase::Shot;
}

/// Swap the docked projectile's color with the predicted next color
fn swap_colors(state: &mut GameState) {
    let Some(id) = state.projectile_id else {
        return;
    };
    let next = state.next_color;
    let Some(proj) = state.entity_mut(id) else {
        return;
    };
    let current = proj.color;
    proj.color = next;
    state.next_color = current;
}

fn update_entities(state: &mut GameState, dt: f32) {
    let ctx = UpdateCtx {
        idle: state.phase == GamePhase::Idle,
        shot: state.is_shot(),
        projectile_pos: state.projectile().map(|p| p.pos),
    };

    let mut bursts: Vec<(Vec2, u8)> = Vec::new();
    let mut expired: Vec<u32> = Vec::new();
    let mut bounced = false;

    for e in &mut state.entities {
        let out = e.update(dt, &ctx);
        if out.burst {
            bursts.push((e.pos, e.color));
        }
        if out.expired {
            expired.push(e.id);
        }
        bounced |= out.bounced;
    }

    for id in expired {
        state.queue_removal(id);
    }
    for (pos, color) in bursts {
        state.spawn_burst(pos, color);
    }
    if bounced {
        state.push_event(GameEvent::Impact);
    }
}

/// While the whole board sits above the visible top, drag it down so the
/// player is not left shooting at an empty screen.
fn pull_board_down(state: &mut GameState, dt: f32) {
    if state.phase != GamePhase::Idle {
        return;
    }

    let max_y = state.max_ball_y();
    if max_y < 4.0 * BALL_RADIUS && max_y < 50.0 {
        for e in &mut state.entities {
            if e.is_board_ball() {
                e.pos.y += dt / 100.0;
            }
        }
    }
}

/// Overlap scan between the shot and the board; resolves the first hit
fn check_projectile_hit(state: &mut GameState) {
    let Some(proj) = state.projectile() else {
        return;
    };
    let (ppos, pradius) = (proj.pos, proj.radius);

    let hit = state
        .entities
        .iter()
        .filter(|e| e.is_board_ball())
        .find(|e| (ppos - e.pos).length() < HIT_TOLERANCE * (e.radius + pradius))
        .map(|e| e.id);

    if let Some(hit_id) = hit {
        resolve_impact(state, hit_id);
    }
}

/// A shot that leaves the board vertically respawns without resolution
fn check_projectile_bounds(state: &mut GameState) {
    let Some(proj) = state.projectile() else {
        return;
    };
    if proj.pos.y >= 0.0 && proj.pos.y <= WORLD_HEIGHT {
        return;
    }

    let id = proj.id;
    state.queue_removal(id);
    state.respawn_queued = true;
    if state.is_shot() {
        state.phase = GamePhase::Idle;
    }
}

fn check_fail(state: &mut GameState) {
    if state.phase != GamePhase::Idle {
        return;
    }

    let crossed = state
        .entities
        .iter()
        .any(|e| e.is_board_ball() && e.pos.y + e.radius > DANGER_LINE_Y);
    if !crossed {
        return;
    }

    state.score = state.level_start_score;
    state.phase = GamePhase::Fail;
    state.push_event(GameEvent::LevelFailed {
        difficulty: state.difficulty,
    });
    log::info!("level {} failed, score rolled back to {}", state.difficulty, state.score);
}

fn check_win(state: &mut GameState) {
    if state.phase != GamePhase::Idle || state.live_level_entities() != 0 {
        return;
    }

    state.difficulty += 1;
    state.level_start_score = state.score;
    state.phase = GamePhase::Win;
    state.push_event(GameEvent::LevelCleared {
        difficulty: state.difficulty,
        score: state.score,
    });
    log::info!("level cleared, next difficulty {}, score {}", state.difficulty, state.score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Entity, EntityKind};

    const DT: f32 = 16.0;

    fn add_ball(state: &mut GameState, pos: Vec2, color: u8) -> u32 {
        let id = state.next_entity_id();
        state.entities.push(Entity::ball(id, pos, 0.0, color));
        id
    }

    /// Idle state with a docked projectile of the given color
    fn idle_state(proj_color: u8) -> GameState {
        let mut state = GameState::new(1234);
        state.phase = GamePhase::Idle;
        create_or_reset_projectile(&mut state);
        if let Some(id) = state.projectile_id {
            if let Some(p) = state.entity_mut(id) {
                p.color = proj_color;
            }
        }
        state
    }

    fn fire_input(aim: Vec2) -> TickInput {
        TickInput {
            aim: Some(aim),
            fire: true,
            ..Default::default()
        }
    }

    fn run_until(state: &mut GameState, max_ticks: usize, done: impl Fn(&GameState) -> bool) {
        for _ in 0..max_ticks {
            tick(state, &TickInput::default(), DT);
            if done(state) {
                return;
            }
        }
        panic!("condition not reached in {max_ticks} ticks");
    }

    #[test]
    fn test_clearing_three_reds_wins_the_level() {
        let mut state = idle_state(0);
        let b1 = add_ball(&mut state, Vec2::new(-8.0, 4.0), 0);
        let b2 = add_ball(&mut state, Vec2::new(0.0, 4.0), 0);
        let b3 = add_ball(&mut state, Vec2::new(8.0, 4.0), 0);
        state.first_layer = vec![b1, b2, b3];

        // Straight up into the middle of the row
        tick(&mut state, &fire_input(Vec2::new(0.0, 50.0)), DT);
        assert_eq!(state.phase, GamePhase::Shot);

        let mut events = Vec::new();
        for _ in 0..500 {
            tick(&mut state, &TickInput::default(), DT);
            events.extend(state.drain_events());
            if state.phase == GamePhase::Win {
                break;
            }
        }

        // All three reds plus the attached shot pop: four color-0 removals
        assert_eq!(state.phase, GamePhase::Win);
        assert_eq!(state.difficulty, 2);
        assert_eq!(state.score, 4);
        assert_eq!(state.level_start_score, 4);
        assert!(state.first_layer.is_empty());
        assert!(!state.entities.iter().any(|e| e.is_board_ball()));
        assert!(events.contains(&GameEvent::LevelCleared {
            difficulty: 2,
            score: 4
        }));
    }

    #[test]
    fn test_attach_without_match_keeps_board() {
        let mut state = idle_state(3);
        let b1 = add_ball(&mut state, Vec2::new(0.0, 30.0), 0);
        state.first_layer = vec![b1];

        tick(&mut state, &fire_input(Vec2::new(0.0, 50.0)), DT);
        run_until(&mut state, 500, |s| !s.is_shot());

        let balls = state
            .entities
            .iter()
            .filter(|e| e.is_board_ball())
            .count();
        assert_eq!(balls, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_straight_miss_respawns_projectile() {
        let mut state = idle_state(0);
        let b1 = add_ball(&mut state, Vec2::new(-18.0, 4.0), 0);
        state.first_layer = vec![b1];
        let first_proj = state.projectile_id.unwrap();

        // Aim up and to the right, clear of the lone ball
        tick(&mut state, &fire_input(Vec2::new(10.0, 10.0)), DT);
        assert_eq!(state.phase, GamePhase::Shot);

        run_until(&mut state, 400, |s| {
            !s.is_shot() && s.projectile().is_some_and(|p| p.vel == Vec2::ZERO)
        });

        let proj = state.projectile().unwrap();
        assert_ne!(proj.id, first_proj);
        assert_eq!(proj.pos, Vec2::new(LAUNCH_X, LAUNCH_Y));
        assert_eq!(state.score, 0);
        assert!(state.entity(b1).is_some());
    }

    #[test]
    fn test_fail_rolls_back_score() {
        let mut state = idle_state(0);
        state.score = 10;
        state.level_start_score = 4;
        let low = add_ball(&mut state, Vec2::new(0.0, 88.0), 0);
        state.first_layer = vec![low];

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::Fail);
        assert_eq!(state.score, 4);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::LevelFailed { difficulty: 1 })
        );
    }

    #[test]
    fn test_confirm_cycles_screens() {
        let mut state = GameState::new(9);
        build_level(&mut state);
        assert_eq!(state.phase, GamePhase::Start);

        let confirm = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut state, &confirm, DT);
        assert_eq!(state.phase, GamePhase::Idle);

        state.phase = GamePhase::Win;
        tick(&mut state, &confirm, DT);
        assert_eq!(state.phase, GamePhase::Start);
        // Board rebuilt for the next level
        assert!(state.entities.iter().any(|e| e.is_board_ball()));
    }

    #[test]
    fn test_menu_new_game_resets_progress() {
        let mut state = GameState::new(9);
        state.difficulty = 7;
        state.score = 300;
        state.level_start_score = 300;
        build_level(&mut state);
        state.phase = GamePhase::Menu;

        let input = TickInput {
            new_game: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.difficulty, 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_menu_continue_preserves_progress() {
        let mut state = GameState::new(9);
        state.difficulty = 7;
        state.score = 300;
        build_level(&mut state);
        state.phase = GamePhase::Menu;

        let input = TickInput {
            confirm: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.difficulty, 7);
        assert_eq!(state.score, 300);
    }

    #[test]
    fn test_swap_exchanges_colors() {
        let mut state = idle_state(2);
        add_ball(&mut state, Vec2::new(0.0, 4.0), 5);
        state.next_color = 5;

        let input = TickInput {
            swap: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        assert_eq!(state.projectile().unwrap().color, 5);
        assert_eq!(state.next_color, 2);
    }

    #[test]
    fn test_bottom_strip_tap_swaps_instead_of_firing() {
        let mut state = idle_state(2);
        add_ball(&mut state, Vec2::new(0.0, 4.0), 5);
        state.next_color = 5;

        tick(&mut state, &fire_input(Vec2::new(0.0, 95.0)), DT);

        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.projectile().unwrap().color, 5);
    }

    #[test]
    fn test_paused_freezes_everything() {
        let mut state = idle_state(0);
        let b1 = add_ball(&mut state, Vec2::new(0.0, 30.0), 0);
        state.first_layer = vec![b1];
        state.paused = true;

        let before = state.entity(b1).unwrap().pos;
        tick(&mut state, &fire_input(Vec2::new(0.0, 50.0)), DT);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.entity(b1).unwrap().pos, before);
    }

    #[test]
    fn test_board_pulled_down_when_all_balls_high() {
        let mut state = idle_state(0);
        let b1 = add_ball(&mut state, Vec2::new(0.0, 4.0), 0);
        state.first_layer = vec![b1];

        tick(&mut state, &TickInput::default(), DT);
        let y = state.entity(b1).unwrap().pos.y;
        assert!(y > 4.0);
        assert!((y - (4.0 + DT / 100.0)).abs() < 1e-4);
    }

    #[test]
    fn test_no_pull_down_once_board_reaches_play_area() {
        let mut state = idle_state(0);
        let b1 = add_ball(&mut state, Vec2::new(0.0, 20.0), 0);
        state.first_layer = vec![b1];

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.entity(b1).unwrap().pos.y, 20.0);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = GameState::new(777);
        let mut b = GameState::new(777);
        build_level(&mut a);
        build_level(&mut b);
        a.phase = GamePhase::Idle;
        b.phase = GamePhase::Idle;

        let shots = [Vec2::new(-5.0, 40.0), Vec2::new(8.0, 30.0)];
        for aim in shots {
            tick(&mut a, &fire_input(aim), DT);
            tick(&mut b, &fire_input(aim), DT);
            for _ in 0..300 {
                tick(&mut a, &TickInput::default(), DT);
                tick(&mut b, &TickInput::default(), DT);
            }
        }

        assert_eq!(a.score, b.score);
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.entities.len(), b.entities.len());
        for (ea, eb) in a.entities.iter().zip(b.entities.iter()) {
            assert_eq!(ea.id, eb.id);
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.color, eb.color);
        }
    }

    #[test]
    fn test_projectile_count_never_exceeds_one() {
        let mut state = GameState::new(31);
        build_level(&mut state);
        state.phase = GamePhase::Idle;

        for i in 0..600 {
            let input = if i % 150 == 0 {
                fire_input(Vec2::new((i % 300) as f32 / 20.0 - 7.0, 30.0))
            } else {
                TickInput::default()
            };
            tick(&mut state, &input, DT);

            let projectiles = state
                .entities
                .iter()
                .filter(|e| matches!(e.kind, EntityKind::Projectile { .. }))
                .count();
            assert!(projectiles <= 1);
        }
    }
}
