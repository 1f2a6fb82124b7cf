//! Entity variants and per-variant update rules
//!
//! Every object on the playfield is an [`Entity`]: a shared payload
//! (position, velocity, radius, color) plus a variant tag. Updates never
//! touch the entity collection; they report what happened through
//! [`UpdateOutcome`] and the tick loop applies spawns/removals afterwards.

use glam::Vec2;

use crate::consts::*;
use crate::safe_normalize;

/// Variant tag with per-variant state
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Ball attached to the board lattice
    Ball,
    /// The player's shot; at most one alive at a time
    Projectile { angle: f32 },
    /// Burst debris
    Particle { lifetime: f32 },
    /// Detached ball dropping off the board
    FallingBall { lifetime: f32 },
    /// Matched ball mid-pop; dormant until `explode_after` elapses
    ExplodingBall {
        lifetime: f32,
        explode_after: f32,
        burst_done: bool,
    },
}

/// A playfield entity
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    /// World units per millisecond
    pub vel: Vec2,
    pub radius: f32,
    /// Palette index, always < PALETTE_SIZE
    pub color: u8,
    /// Cosmetic magnet-wobble displacement, render-only
    pub offset: Vec2,
    pub kind: EntityKind,
}

/// What a single entity update produced
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOutcome {
    /// Entity should be removed this frame
    pub expired: bool,
    /// Exploding ball just released its particles
    pub burst: bool,
    /// Projectile reflected off a side wall
    pub bounced: bool,
}

/// Read-only frame context shared by all entity updates
#[derive(Debug, Clone, Copy)]
pub struct UpdateCtx {
    /// Board balls drift only while the game is idle
    pub idle: bool,
    /// A shot is in flight
    pub shot: bool,
    /// Projectile position, when one exists
    pub projectile_pos: Option<Vec2>,
}

impl Entity {
    pub fn ball(id: u32, pos: Vec2, fall_speed: f32, color: u8) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::new(0.0, fall_speed),
            radius: BALL_RADIUS,
            color,
            offset: Vec2::ZERO,
            kind: EntityKind::Ball,
        }
    }

    /// Docked projectile at the launch position
    pub fn projectile(id: u32, color: u8) -> Self {
        Self {
            id,
            pos: Vec2::new(LAUNCH_X, LAUNCH_Y),
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            color,
            offset: Vec2::ZERO,
            kind: EntityKind::Projectile { angle: 0.0 },
        }
    }

    pub fn particle(id: u32, pos: Vec2, vel: Vec2, color: u8, lifetime: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS * 0.25,
            color,
            offset: Vec2::ZERO,
            kind: EntityKind::Particle { lifetime },
        }
    }

    pub fn falling(id: u32, pos: Vec2, vel: Vec2, color: u8) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            color,
            offset: Vec2::ZERO,
            kind: EntityKind::FallingBall {
                lifetime: FALLING_LIFETIME_MS,
            },
        }
    }

    pub fn exploding(id: u32, pos: Vec2, vel: Vec2, color: u8, explode_after: f32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            color,
            offset: Vec2::ZERO,
            kind: EntityKind::ExplodingBall {
                lifetime: EXPLODE_LIFETIME_MS,
                explode_after,
                burst_done: false,
            },
        }
    }

    /// True for balls attached to the board (not the projectile)
    pub fn is_board_ball(&self) -> bool {
        matches!(self.kind, EntityKind::Ball)
    }

    /// Points credited when this ball is removed
    pub fn score_value(&self) -> u32 {
        self.color as u32 + 1
    }

    /// Render alpha; transients fade out over their lifetime
    pub fn alpha(&self) -> f32 {
        match self.kind {
            EntityKind::FallingBall { lifetime } => (lifetime / FALLING_LIFETIME_MS).clamp(0.0, 1.0),
            EntityKind::ExplodingBall { lifetime, .. } => {
                (lifetime / EXPLODE_LIFETIME_MS).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Advance this entity by `dt` milliseconds
    pub fn update(&mut self, dt: f32, ctx: &UpdateCtx) -> UpdateOutcome {
        let mut out = UpdateOutcome::default();

        match &mut self.kind {
            EntityKind::Ball => {
                if ctx.idle {
                    self.pos += self.vel * dt;
                }

                // Magnet wobble: nearby shots push the sprite away a little
                match ctx.projectile_pos {
                    Some(proj) if ctx.shot => {
                        let delta = proj - self.pos;
                        let dist2 = delta.length_squared();
                        if dist2 < 30.0 * 30.0 {
                            let push = safe_normalize(delta) * (-250.0 / dist2);
                            self.offset = 0.9 * self.offset + 0.1 * push;
                        } else {
                            self.offset *= 0.975;
                        }
                    }
                    _ => self.offset *= 0.975,
                }
            }
            EntityKind::Projectile { angle } => {
                self.pos += self.vel * dt;

                // One reflection per crossing: the velocity sign test keeps a
                // ball that is still overlapping the wall from re-bouncing
                let half = LEVEL_WIDTH / 2.0;
                if (self.pos.x - self.radius < -half && self.vel.x < 0.0)
                    || (self.pos.x + self.radius > half && self.vel.x > 0.0)
                {
                    self.vel.x = -self.vel.x;
                    out.bounced = true;
                }

                if ctx.shot {
                    *angle += dt * SPIN_PER_MS;
                }
            }
            EntityKind::Particle { lifetime } | EntityKind::FallingBall { lifetime } => {
                self.pos += self.vel * dt;
                self.vel.y += DROP_GRAVITY * dt * dt;

                *lifetime -= dt;
                if *lifetime <= 0.0 || self.pos.y - self.radius > WORLD_HEIGHT {
                    out.expired = true;
                }
            }
            EntityKind::ExplodingBall {
                lifetime,
                explode_after,
                burst_done,
            } => {
                self.pos += self.vel * dt;

                if *explode_after > 0.0 {
                    *explode_after -= dt;
                } else {
                    if !*burst_done {
                        *burst_done = true;
                        out.burst = true;
                    }

                    self.radius *= 1.05;
                    *lifetime -= dt;
                    if *lifetime <= 0.0 || self.pos.y - self.radius > WORLD_HEIGHT {
                        out.expired = true;
                    }
                }
            }
        }

        out
    }
}
