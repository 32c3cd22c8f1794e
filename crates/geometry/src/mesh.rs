use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default vertex colour. The shader's geometry colour tints it.
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// GPU-uploadable vertex: position, normal, RGBA colour.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color: WHITE,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Errors from mesh generation and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("index {index} at position {position} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("vertex {0} has a non-finite position")]
    NonFiniteVertex(usize),
}

/// Indexed triangle mesh. Every consecutive index triple is one triangle,
/// wound counter-clockwise when viewed from outside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Iterate over index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Replace every vertex colour.
    pub fn set_color(&mut self, color: [f32; 4]) {
        for v in &mut self.vertices {
            v.color = color;
        }
    }

    /// Largest distance from `center` to any vertex.
    pub fn bounding_radius(&self, center: Vec3) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.position().distance(center))
            .fold(0.0, f32::max)
    }

    /// Check the structural invariants: whole triangles, in-range indices,
    /// finite positions.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            });
        }
        if let Some(i) = self
            .vertices
            .iter()
            .position(|v| !v.position().is_finite())
        {
            return Err(MeshError::NonFiniteVertex(i));
        }
        Ok(())
    }
}
