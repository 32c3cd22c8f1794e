use glam::Vec3;
use shapeview_geometry::{Icosphere, Mesh, cube, square};
use shapeview_render::Renderer;

use crate::app::SceneError;
use crate::controls::GeometryKind;

pub const SCENE_CENTER: Vec3 = Vec3::ZERO;
pub const SPHERE_RADIUS: f32 = 1.0;

/// CPU mesh plus its uploaded drawable.
#[derive(Debug)]
pub struct MeshSlot<D> {
    pub mesh: Mesh,
    pub drawable: D,
}

impl<D> MeshSlot<D> {
    fn upload<R>(renderer: &mut R, kind: GeometryKind, mesh: Mesh) -> Result<Self, SceneError>
    where
        R: Renderer<Drawable = D>,
    {
        let drawable = renderer.create_drawable(&kind.name().to_lowercase(), &mesh)?;
        Ok(Self { mesh, drawable })
    }
}

/// The three demo meshes, indexed by [`GeometryKind`].
#[derive(Debug)]
pub struct SceneMeshes<D> {
    slots: [MeshSlot<D>; 3],
    sphere_level: u32,
}

impl<D> SceneMeshes<D> {
    /// Generate and upload every mesh from scratch.
    pub fn load<R>(renderer: &mut R, sphere_level: u32) -> Result<Self, SceneError>
    where
        R: Renderer<Drawable = D>,
    {
        let sphere = Icosphere::new(SCENE_CENTER, SPHERE_RADIUS, sphere_level);
        let slots = [
            MeshSlot::upload(renderer, GeometryKind::Cube, cube(SCENE_CENTER))?,
            MeshSlot::upload(renderer, GeometryKind::Sphere, sphere.generate()?)?,
            MeshSlot::upload(renderer, GeometryKind::Square, square(SCENE_CENTER))?,
        ];
        tracing::info!(sphere_level = sphere.level, "scene loaded");
        Ok(Self {
            slots,
            sphere_level: sphere.level,
        })
    }

    /// Replace the sphere with a freshly generated one. The old mesh is
    /// dropped, not edited.
    pub fn rebuild_sphere<R>(&mut self, renderer: &mut R, level: u32) -> Result<(), SceneError>
    where
        R: Renderer<Drawable = D>,
    {
        let sphere = Icosphere::new(SCENE_CENTER, SPHERE_RADIUS, level);
        let slot = MeshSlot::upload(renderer, GeometryKind::Sphere, sphere.generate()?)?;
        tracing::debug!(
            level = sphere.level,
            vertices = slot.mesh.vertex_count(),
            "sphere rebuilt"
        );
        self.slots[GeometryKind::Sphere.index()] = slot;
        self.sphere_level = sphere.level;
        Ok(())
    }

    pub fn slot(&self, kind: GeometryKind) -> &MeshSlot<D> {
        &self.slots[kind.index()]
    }

    pub fn mesh(&self, kind: GeometryKind) -> &Mesh {
        &self.slot(kind).mesh
    }

    pub fn drawable(&self, kind: GeometryKind) -> &D {
        &self.slot(kind).drawable
    }

    pub fn sphere_level(&self) -> u32 {
        self.sphere_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapeview_geometry::icosphere_vertex_count;
    use shapeview_render::{DebugTextRenderer, Drawable};

    #[test]
    fn load_uploads_all_three() {
        let mut renderer = DebugTextRenderer::default();
        let meshes = SceneMeshes::load(&mut renderer, 2).unwrap();
        assert_eq!(renderer.uploads(), 3);
        assert_eq!(meshes.mesh(GeometryKind::Cube).vertex_count(), 24);
        assert_eq!(meshes.mesh(GeometryKind::Square).vertex_count(), 4);
        assert_eq!(
            meshes.mesh(GeometryKind::Sphere).vertex_count(),
            icosphere_vertex_count(2)
        );
        assert_eq!(meshes.drawable(GeometryKind::Sphere).label(), "sphere");
    }

    #[test]
    fn rebuild_replaces_only_sphere() {
        let mut renderer = DebugTextRenderer::default();
        let mut meshes = SceneMeshes::load(&mut renderer, 0).unwrap();
        let cube_before = meshes.mesh(GeometryKind::Cube).clone();

        meshes.rebuild_sphere(&mut renderer, 1).unwrap();

        assert_eq!(renderer.uploads(), 4);
        assert_eq!(meshes.sphere_level(), 1);
        assert_eq!(meshes.drawable(GeometryKind::Sphere).vertex_count(), 42);
        assert_eq!(meshes.mesh(GeometryKind::Cube), &cube_before);
    }
}
