use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::mesh::{Mesh, MeshError, Vertex};

/// Highest subdivision level accepted. Vertex count grows as 4^level.
pub const MAX_ICOSPHERE_LEVEL: u32 = 8;

/// Golden ratio.
const PHI: f32 = 1.618_034;

#[rustfmt::skip]
const BASE_POSITIONS: [[f32; 3]; 12] = [
    [-1.0,  PHI,  0.0], [ 1.0,  PHI,  0.0], [-1.0, -PHI,  0.0], [ 1.0, -PHI,  0.0],
    [ 0.0, -1.0,  PHI], [ 0.0,  1.0,  PHI], [ 0.0, -1.0, -PHI], [ 0.0,  1.0, -PHI],
    [ PHI,  0.0, -1.0], [ PHI,  0.0,  1.0], [-PHI,  0.0, -1.0], [-PHI,  0.0,  1.0],
];

#[rustfmt::skip]
const BASE_FACES: [[u32; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// Vertex count after `level` subdivisions: `10 * 4^level + 2`.
pub fn icosphere_vertex_count(level: u32) -> usize {
    10 * 4usize.pow(level) + 2
}

/// Triangle count after `level` subdivisions: `20 * 4^level`.
pub fn icosphere_triangle_count(level: u32) -> usize {
    20 * 4usize.pow(level)
}

/// Parameters of a subdivided icosahedron. Immutable; a level change means
/// building a new mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Icosphere {
    pub center: Vec3,
    pub radius: f32,
    pub level: u32,
}

impl Icosphere {
    /// Levels above [`MAX_ICOSPHERE_LEVEL`] are clamped.
    pub fn new(center: Vec3, radius: f32, level: u32) -> Self {
        if level > MAX_ICOSPHERE_LEVEL {
            tracing::warn!(
                requested = level,
                max = MAX_ICOSPHERE_LEVEL,
                "icosphere level clamped"
            );
        }
        Self {
            center,
            radius,
            level: level.min(MAX_ICOSPHERE_LEVEL),
        }
    }

    pub fn generate(&self) -> Result<Mesh, MeshError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(MeshError::InvalidRadius(self.radius));
        }
        let _span = tracing::debug_span!("icosphere", level = self.level).entered();

        let mut builder = UnitSphere::icosahedron();
        for _ in 0..self.level {
            builder.subdivide();
        }

        // All points are on the unit sphere, so the unit position is also the
        // outward normal.
        let vertices = builder
            .points
            .iter()
            .map(|&unit| Vertex::new(self.center + unit * self.radius, unit))
            .collect::<Vec<_>>();
        let indices = builder.faces.into_iter().flatten().collect::<Vec<_>>();

        tracing::debug!(
            vertices = vertices.len(),
            triangles = indices.len() / 3,
            "icosphere generated"
        );
        Ok(Mesh::new(vertices, indices))
    }
}

/// Generate an icosphere mesh. See [`Icosphere`].
pub fn icosphere(center: Vec3, radius: f32, level: u32) -> Result<Mesh, MeshError> {
    Icosphere::new(center, radius, level).generate()
}

/// Working topology on the unit sphere.
struct UnitSphere {
    points: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
}

impl UnitSphere {
    fn icosahedron() -> Self {
        Self {
            points: BASE_POSITIONS
                .iter()
                .map(|p| Vec3::from_array(*p).normalize())
                .collect(),
            faces: BASE_FACES.to_vec(),
        }
    }

    /// Split every triangle into four. Midpoints on shared edges are created
    /// once, keyed by the unordered pair of parent indices.
    fn subdivide(&mut self) {
        let parents = std::mem::take(&mut self.faces);
        let mut midpoints: HashMap<(u32, u32), u32> =
            HashMap::with_capacity(parents.len() * 3 / 2);
        let mut faces = Vec::with_capacity(parents.len() * 4);

        for &[a, b, c] in &parents {
            let ab = self.midpoint(&mut midpoints, a, b);
            let bc = self.midpoint(&mut midpoints, b, c);
            let ca = self.midpoint(&mut midpoints, c, a);
            faces.push([a, ab, ca]);
            faces.push([b, bc, ab]);
            faces.push([c, ca, bc]);
            faces.push([ab, bc, ca]);
        }

        self.faces = faces;
    }

    fn midpoint(&mut self, cache: &mut HashMap<(u32, u32), u32>, a: u32, b: u32) -> u32 {
        let key = (a.min(b), a.max(b));
        if let Some(&index) = cache.get(&key) {
            return index;
        }
        let mid = (self.points[a as usize] + self.points[b as usize]).normalize();
        let index = self.points.len() as u32;
        self.points.push(mid);
        cache.insert(key, index);
        index
    }
}
