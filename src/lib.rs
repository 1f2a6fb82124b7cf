//! Bubble Pop - a bubble shooter puzzle game
//!
//! Core modules:
//! - `sim`: Board simulation (entities, flood fills, turn resolution, game state)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Viewport and screen/world coordinate mapping
//! - `persistence`: Saved progress (difficulty + score)
//! - `settings`: Language and audio preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use persistence::Progress;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Board ball radius in world units
    pub const BALL_RADIUS: f32 = 4.0;
    /// Playfield width; side walls sit at x = ±LEVEL_WIDTH/2
    pub const LEVEL_WIDTH: f32 = 45.0;
    /// World height; y grows downward from the ceiling at 0
    pub const WORLD_HEIGHT: f32 = 100.0;
    /// Balls crossing this line while idle lose the level
    pub const DANGER_LINE_Y: f32 = 90.0;

    /// Projectile launch position
    pub const LAUNCH_X: f32 = 0.0;
    pub const LAUNCH_Y: f32 = 95.0;
    /// Projectile speed in world units per millisecond
    pub const PROJECTILE_SPEED: f32 = 0.05;
    /// Projectile spin in radians per millisecond while in flight
    pub const SPIN_PER_MS: f32 = 0.01;

    /// Two balls are neighbours within this multiple of their summed radii.
    /// Looser than tangency so the hex lattice tolerates float drift.
    pub const NEIGHBOUR_TOLERANCE: f32 = 1.25;
    /// The projectile must visibly overlap a ball before attaching
    pub const HIT_TOLERANCE: f32 = 0.9;
    /// A match needs strictly more linked balls than this
    pub const MATCH_THRESHOLD: usize = 2;

    /// Number of ball colors
    pub const PALETTE_SIZE: usize = 8;

    /// Downward board drift scales as FALL_SPEED_BASE * 1.1^difficulty
    pub const FALL_SPEED_BASE: f32 = 0.0005;
    /// Gravity applied to particles and falling balls per update
    pub const DROP_GRAVITY: f32 = 0.000_002;

    /// Transient entity lifetimes in milliseconds
    pub const EXPLODE_LIFETIME_MS: f32 = 200.0;
    pub const FALLING_LIFETIME_MS: f32 = 5000.0;
    pub const PARTICLE_LIFETIME_MS: f32 = 250.0;
    /// Particles spawned per exploding ball
    pub const PARTICLES_PER_BURST: usize = 10;
    pub const PARTICLE_SPEED: f32 = 0.025;

    /// Frame delta clamp (ms); long pauses never teleport entities
    pub const MAX_DELTA_TIME: f32 = 1000.0 / 30.0;
    /// Reserved UI strip below the playfield, in world units
    pub const PADDING_BOTTOM: f32 = 0.0;
}

/// Normalize a vector, falling back to straight up for degenerate input.
///
/// Aim vectors can collapse to zero length; dividing through would inject
/// NaN velocities into the simulation, so clamp here instead.
#[inline]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    if v.length_squared() < 1e-6 {
        Vec2::new(0.0, -1.0)
    } else {
        v / v.length()
    }
}

/// Squared magnitude; the board engine compares squared distances
#[inline]
pub fn dot2(v: Vec2) -> f32 {
    v.dot(v)
}
