//! Viewport and coordinate mapping
//!
//! The board is 100 world units tall with y growing downward; the viewport
//! always fits the full board height and centers it horizontally. All pointer
//! input goes through [`Viewport::screen_to_world`] before it reaches the
//! simulation.

use glam::Vec2;

use crate::consts::{PADDING_BOTTOM, WORLD_HEIGHT};

/// Viewport in physical pixels
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Pixels per world unit
    fn scale(&self) -> f32 {
        self.height / WORLD_HEIGHT
    }

    fn offset(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, -PADDING_BOTTOM)
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        (p - self.offset()) / self.scale()
    }

    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p * self.scale() + self.offset()
    }
}
