//! Board simulation module
//!
//! All gameplay logic lives here. The module is pure and host-agnostic:
//! - No rendering, audio, or platform dependencies
//! - Seeded RNG only; a fixed seed and input sequence replays identically
//! - All entity destruction goes through the deferred removal queue
//!
//! The host feeds [`TickInput`] frames into [`tick`] and drains
//! [`GameEvent`]s back out.

pub mod board;
pub mod entity;
pub mod level;
pub mod resolve;
pub mod state;
pub mod tick;

pub use board::{ball_at, linked, linked_same_color, neighbours};
pub use entity::{Entity, EntityKind, UpdateCtx, UpdateOutcome};
pub use level::{build_level, create_or_reset_projectile, predict_color, trajectory_preview};
pub use resolve::resolve_impact;
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
