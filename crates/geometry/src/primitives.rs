use glam::Vec3;

use crate::mesh::{Mesh, Vertex};

/// Axis-aligned cube with half-extent 1 around `center`. Four vertices per
/// face so every face shades flat.
pub fn cube(center: Vec3) -> Mesh {
    let p = 1.0_f32;
    let v = |x: f32, y: f32, z: f32, normal: Vec3| {
        Vertex::new(center + Vec3::new(x, y, z), normal)
    };
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        v(-p, -p,  p, Vec3::Z), v( p, -p,  p, Vec3::Z),
        v( p,  p,  p, Vec3::Z), v(-p,  p,  p, Vec3::Z),
        // -Z face
        v( p, -p, -p, Vec3::NEG_Z), v(-p, -p, -p, Vec3::NEG_Z),
        v(-p,  p, -p, Vec3::NEG_Z), v( p,  p, -p, Vec3::NEG_Z),
        // +X face
        v( p, -p,  p, Vec3::X), v( p, -p, -p, Vec3::X),
        v( p,  p, -p, Vec3::X), v( p,  p,  p, Vec3::X),
        // -X face
        v(-p, -p, -p, Vec3::NEG_X), v(-p, -p,  p, Vec3::NEG_X),
        v(-p,  p,  p, Vec3::NEG_X), v(-p,  p, -p, Vec3::NEG_X),
        // +Y face
        v(-p,  p,  p, Vec3::Y), v( p,  p,  p, Vec3::Y),
        v( p,  p, -p, Vec3::Y), v(-p,  p, -p, Vec3::Y),
        // -Y face
        v(-p, -p, -p, Vec3::NEG_Y), v( p, -p, -p, Vec3::NEG_Y),
        v( p, -p,  p, Vec3::NEG_Y), v(-p, -p,  p, Vec3::NEG_Y),
    ];
    let indices = (0..6u32)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();

    let mesh = Mesh::new(vertices, indices);
    tracing::debug!(vertices = mesh.vertex_count(), "cube generated");
    mesh
}

/// Square with half-extent 1 in the XY plane around `center`, facing +Z.
pub fn square(center: Vec3) -> Mesh {
    let corners = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
    ];
    let vertices = corners
        .iter()
        .map(|c| Vertex::new(center + *c, Vec3::Z))
        .collect();
    Mesh::new(vertices, vec![0, 1, 2, 0, 2, 3])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ccw(mesh: &Mesh) {
        for [a, b, c] in mesh.triangles() {
            let va = mesh.vertices[a as usize];
            let pa = va.position();
            let pb = mesh.vertices[b as usize].position();
            let pc = mesh.vertices[c as usize].position();
            let face_normal = (pb - pa).cross(pc - pa).normalize();
            assert!(
                face_normal.abs_diff_eq(va.normal(), 1e-5),
                "triangle {a},{b},{c} winds against its normal"
            );
        }
    }

    #[test]
    fn cube_topology() {
        let mesh = cube(Vec3::ZERO);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.validate().is_ok());
        assert_ccw(&mesh);
    }

    #[test]
    fn cube_is_offset_by_center() {
        let center = Vec3::new(2.0, 0.0, -1.0);
        let mesh = cube(center);
        for v in &mesh.vertices {
            let local = v.position() - center;
            assert_eq!(local.abs(), Vec3::ONE);
        }
    }

    #[test]
    fn square_topology() {
        let mesh = square(Vec3::ZERO);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.validate().is_ok());
        assert_ccw(&mesh);
    }

    #[test]
    fn square_has_half_extent_one() {
        let center = Vec3::new(0.5, -1.0, 3.0);
        let mesh = square(center);
        for v in &mesh.vertices {
            let local = v.position() - center;
            assert_eq!(local.abs(), Vec3::new(1.0, 1.0, 0.0));
            assert_eq!(v.normal(), Vec3::Z);
        }
    }

    #[test]
    fn primitives_are_deterministic() {
        assert_eq!(cube(Vec3::ONE), cube(Vec3::ONE));
        assert_eq!(square(Vec3::ZERO), square(Vec3::ZERO));
    }
}
