//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    /// Ball palette, indexed by color id; score value grows with the index
    pub const PALETTE: [[f32; 4]; 8] = [
        [0.90, 0.25, 0.21, 1.0], // red
        [1.00, 0.76, 0.03, 1.0], // yellow
        [0.30, 0.69, 0.31, 1.0], // green
        [0.13, 0.59, 0.95, 1.0], // blue
        [0.61, 0.15, 0.69, 1.0], // purple
        [1.00, 0.44, 0.00, 1.0], // orange
        [0.00, 0.74, 0.83, 1.0], // cyan
        [0.96, 0.56, 0.69, 1.0], // pink
    ];

    /// Background tints cycled every three levels
    pub const BACKGROUNDS: [[f32; 4]; 4] = [
        [0.36, 0.60, 0.78, 1.0],
        [0.30, 0.52, 0.42, 1.0],
        [0.52, 0.42, 0.60, 1.0],
        [0.62, 0.48, 0.34, 1.0],
    ];

    pub const DANGER_LINE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const TRAJECTORY_DOT: [f32; 4] = [1.0, 1.0, 1.0, 0.7];
    pub const OVERLAY: [f32; 4] = [0.0, 0.0, 0.0, 0.75];
}

/// Palette color with an alpha override
pub fn palette_color(color: u8, alpha: f32) -> [f32; 4] {
    let mut c = colors::PALETTE[color as usize % colors::PALETTE.len()];
    c[3] = alpha;
    c
}
