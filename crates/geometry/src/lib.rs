//! Procedural geometry: indexed triangle meshes for an icosphere, a cube and a square.
//!
//! # Invariants
//! - Every index is less than the vertex count.
//! - Triangles wind counter-clockwise when viewed from outside.
//! - Generation is pure: the same parameters always yield the same mesh.

mod icosphere;
mod mesh;
mod primitives;

pub use icosphere::{
    Icosphere, MAX_ICOSPHERE_LEVEL, icosphere, icosphere_triangle_count, icosphere_vertex_count,
};
pub use mesh::{Mesh, MeshError, Vertex, WHITE};
pub use primitives::{cube, square};

pub fn crate_info() -> &'static str {
    "shapeview-geometry v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("geometry"));
    }
}
