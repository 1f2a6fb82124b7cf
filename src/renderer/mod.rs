//! WebGPU rendering module
//!
//! Flat-colored triangle geometry assembled on the CPU each frame and drawn
//! through a single pipeline.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::{background_index, circle, quad, scene};
pub use vertex::{Vertex, colors, palette_color};
