//! Rendering seam for terrain patches
//!
//! The crate never talks to a graphics API directly. Terrain patches hand a
//! non-indexed triangle list plus their transforms to a [`RenderBackend`],
//! which binds them to a named shading technique.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Interleaved terrain vertex, laid out for direct upload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl TerrainVertex {
    pub fn new(position: Vec3, normal: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }
}

/// Light-space camera shared by every patch in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// Per-draw shader parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderParams {
    pub world: Mat4,
    pub normal_matrix: Mat4,
    pub light_matrix: Mat4,
}

impl ShaderParams {
    pub fn new(world: Mat4, lighting: &Lighting) -> Self {
        Self {
            world,
            normal_matrix: world.inverse().transpose(),
            light_matrix: lighting.projection * lighting.view * world,
        }
    }
}

pub trait RenderBackend {
    /// Draw `vertices` as a triangle list, three vertices per triangle
    fn draw_triangle_list(&mut self, technique: &str, params: &ShaderParams, vertices: &[TerrainVertex]);
}

/// A recorded draw call
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub technique: String,
    pub params: ShaderParams,
    pub vertex_count: usize,
}

/// Backend that records draw calls instead of issuing them
#[derive(Debug, Default)]
pub struct DrawRecorder {
    pub calls: Vec<DrawCall>,
}

impl DrawRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.calls.iter().map(|c| c.vertex_count / 3).sum()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for DrawRecorder {
    fn draw_triangle_list(&mut self, technique: &str, params: &ShaderParams, vertices: &[TerrainVertex]) {
        self.calls.push(DrawCall {
            technique: technique.to_string(),
            params: *params,
            vertex_count: vertices.len(),
        });
    }
}
