//! Game state and core simulation types

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::safe_normalize;

use super::entity::{Entity, EntityKind};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Splash screen before the first (or next) level
    Start,
    /// Continue / new game menu, shown when saved progress exists
    Menu,
    /// Aiming; the board drifts, input is live
    Idle,
    /// A shot is in flight
    Shot,
    /// Level cleared, waiting for confirm
    Win,
    /// A ball crossed the danger line, waiting for confirm
    Fail,
}

/// Observable things that happened during a tick. The host drains these
/// each frame and fans them out to audio/persistence; the simulation never
/// touches either directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Projectile hit a wall or stuck to the board
    Impact,
    /// One ball of a match popped; play after `delay_ms`
    Pop { delay_ms: f32 },
    /// Level cleared; `difficulty` is the next level to play
    LevelCleared { difficulty: u32, score: u32 },
    /// A ball crossed the danger line
    LevelFailed { difficulty: u32 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// All live entities, insertion order
    pub entities: Vec<Entity>,
    /// Ids of the ceiling row; always a subset of live board balls
    pub first_layer: Vec<u32>,
    /// Id of the live projectile, if one exists
    pub projectile_id: Option<u32>,
    /// Predicted color of the shot after the current one
    pub next_color: u8,
    /// Level number, 1-based
    pub difficulty: u32,
    pub score: u32,
    /// Score snapshot at level start; failing rolls back to this
    pub level_start_score: u32,
    pub phase: GamePhase,
    pub paused: bool,
    /// Document/tab hidden; gates updates like `paused`
    pub hidden: bool,
    /// Downward board drift for the current level, units/ms
    pub fall_speed: f32,
    /// Recreate the projectile at the start of the next tick
    pub respawn_queued: bool,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
    pending_removals: Vec<u32>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            first_layer: Vec::new(),
            projectile_id: None,
            next_color: 0,
            difficulty: 1,
            score: 0,
            level_start_score: 0,
            phase: GamePhase::Start,
            paused: false,
            hidden: false,
            fall_speed: FALL_SPEED_BASE,
            respawn_queued: false,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            pending_removals: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn projectile(&self) -> Option<&Entity> {
        self.projectile_id.and_then(|id| self.entity(id))
    }

    /// True while a shot is in flight
    pub fn is_shot(&self) -> bool {
        self.phase == GamePhase::Shot
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take this frame's events; called once per frame by the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Defer removal of an entity until [`apply_removals`](Self::apply_removals).
    /// Resolution queues removals while flood fills are still walking the
    /// pre-removal board.
    pub fn queue_removal(&mut self, id: u32) {
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    /// Drop queued entities from the live set and the first layer in the
    /// same pass, keeping `first_layer ⊆ live` in one step.
    pub fn apply_removals(&mut self) {
        if self.pending_removals.is_empty() {
            return;
        }

        let removed = std::mem::take(&mut self.pending_removals);
        self.entities.retain(|e| !removed.contains(&e.id));
        self.first_layer.retain(|id| !removed.contains(id));
        if self.projectile_id.is_some_and(|id| removed.contains(&id)) {
            self.projectile_id = None;
        }
    }

    /// Distinct colors of balls still on the board, ascending
    pub fn colors_on_board(&self) -> Vec<u8> {
        let mut colors: Vec<u8> = self
            .entities
            .iter()
            .filter(|e| e.is_board_ball())
            .map(|e| e.color)
            .collect();
        colors.sort_unstable();
        colors.dedup();
        colors
    }

    /// Lowest point of any board ball, 0.0 on an empty board
    pub fn max_ball_y(&self) -> f32 {
        self.entities
            .iter()
            .filter(|e| e.is_board_ball())
            .map(|e| e.pos.y)
            .fold(0.0, f32::max)
    }

    /// Spawn the debris of a popped ball
    pub fn spawn_burst(&mut self, pos: Vec2, color: u8) {
        for _ in 0..PARTICLES_PER_BURST {
            let dir = safe_normalize(Vec2::new(
                2.0 * self.rng.random::<f32>() - 1.0,
                2.0 * self.rng.random::<f32>() - 1.0,
            ));
            let lifetime = PARTICLE_LIFETIME_MS * self.rng.random::<f32>();
            let id = self.next_entity_id();
            self.entities
                .push(Entity::particle(id, pos, dir * PARTICLE_SPEED, color, lifetime));
        }
    }

    /// Entities that keep a level alive: board balls plus any transient
    /// still animating. The projectile does not count.
    pub fn live_level_entities(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| !matches!(e.kind, EntityKind::Projectile { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_is_deferred_until_applied() {
        let mut state = GameState::new(1);
        let id = state.next_entity_id();
        state.entities.push(Entity::ball(id, Vec2::ZERO, 0.0, 0));
        state.first_layer.push(id);

        state.queue_removal(id);
        assert!(state.entity(id).is_some());

        state.apply_removals();
        assert!(state.entity(id).is_none());
        assert!(state.first_layer.is_empty());
    }

    #[test]
    fn test_first_layer_stays_subset_of_live() {
        let mut state = GameState::new(1);
        for i in 0..4 {
            let id = state.next_entity_id();
            state
                .entities
                .push(Entity::ball(id, Vec2::new(i as f32 * 10.0, 4.0), 0.0, 0));
            state.first_layer.push(id);
        }

        state.queue_removal(2);
        state.queue_removal(4);
        state.apply_removals();

        for id in &state.first_layer {
            assert!(state.entity(*id).is_some());
        }
        assert_eq!(state.first_layer, vec![1, 3]);
    }

    #[test]
    fn test_duplicate_queue_removal_is_harmless() {
        let mut state = GameState::new(1);
        let id = state.next_entity_id();
        state.entities.push(Entity::ball(id, Vec2::ZERO, 0.0, 0));

        state.queue_removal(id);
        state.queue_removal(id);
        state.apply_removals();
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_spawn_burst_particle_count() {
        let mut state = GameState::new(7);
        state.spawn_burst(Vec2::new(0.0, 50.0), 3);
        let particles = state
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Particle { .. }))
            .count();
        assert_eq!(particles, PARTICLES_PER_BURST);
    }

    #[test]
    fn test_colors_on_board_deduped() {
        let mut state = GameState::new(1);
        for color in [2u8, 0, 2, 1] {
            let id = state.next_entity_id();
            state
                .entities
                .push(Entity::ball(id, Vec2::new(id as f32 * 20.0, 4.0), 0.0, color));
        }
        assert_eq!(state.colors_on_board(), vec![0, 1, 2]);
    }
}
