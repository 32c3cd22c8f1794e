use glam::{Vec3, Vec4};
use shapeview_geometry::MeshError;
use shapeview_render::{Camera, RenderError, Renderer, ShaderKind, ShaderProgram};

use crate::controls::{Controls, GeometryKind};
use crate::meshes::SceneMeshes;

pub const CLEAR_COLOR: Vec4 = Vec4::new(0.2, 0.2, 0.2, 1.0);

/// Period of the time uniform. `f32` counts every integer up to 2^24, so the
/// frame counter wraps here before conversion and time keeps advancing.
pub const TIME_PERIOD: u64 = 1 << 24;

/// Time uniform value for a frame number.
pub fn frame_time(frame: u64) -> f32 {
    (frame % TIME_PERIOD) as f32
}

/// Errors from scene setup and frame updates.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("mesh generation failed: {0}")]
    Mesh(#[from] MeshError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

/// Control values seen by the previous frame, used for change detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCache {
    pub tessellation: u32,
    pub color: Vec4,
}

/// What one [`App::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub sphere_rebuilt: bool,
    pub color_changed: bool,
    pub shader: ShaderKind,
    pub geometry: GeometryKind,
}

/// Application state: camera, renderer, one program per shader variant, the
/// scene meshes, and the previous frame's control values.
pub struct App<R: Renderer> {
    renderer: R,
    camera: Camera,
    programs: [ShaderProgram; 2],
    meshes: SceneMeshes<R::Drawable>,
    cache: FrameCache,
    frame: u64,
    sphere_rebuilds: u64,
}

impl<R: Renderer> App<R> {
    pub fn new(mut renderer: R, controls: &Controls) -> Result<Self, SceneError> {
        let controls = controls.clamped();
        renderer.set_clear_color(CLEAR_COLOR);

        let color = controls.color.normalized();
        let programs = ShaderKind::ALL.map(|kind| {
            let mut program = ShaderProgram::new(kind);
            program.set_geometry_color(color);
            program
        });
        let meshes = SceneMeshes::load(&mut renderer, controls.tessellation)?;

        Ok(Self {
            renderer,
            camera: Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO),
            programs,
            meshes,
            cache: FrameCache {
                tessellation: controls.tessellation,
                color,
            },
            frame: 0,
            sphere_rebuilds: 0,
        })
    }

    /// Run one frame: update the camera, apply control changes, push
    /// per-frame uniforms, and draw the selected geometry with the selected
    /// shader. Scheduling the next frame is the host's job.
    pub fn tick(
        &mut self,
        controls: &Controls,
        target: &R::Target,
    ) -> Result<FrameReport, SceneError> {
        let _span = tracing::trace_span!("tick", frame = self.frame + 1).entered();
        let controls = controls.clamped();

        self.camera.update();
        self.renderer.clear();

        let sphere_rebuilt = controls.tessellation != self.cache.tessellation;
        if sphere_rebuilt {
            self.meshes.rebuild_sphere(&mut self.renderer, controls.tessellation)?;
            self.cache.tessellation = controls.tessellation;
            self.sphere_rebuilds += 1;
        }

        let color = controls.color.normalized();
        let color_changed = color != self.cache.color;
        if color_changed {
            self.cache.color = color;
        }
        let program = &mut self.programs[controls.shader.index()];
        // A program that was inactive when the colour changed catches up here.
        if color_changed || program.values().color != color {
            program.set_geometry_color(color);
        }

        self.frame += 1;
        program.set_camera_forward(self.camera.forward());
        program.set_time(frame_time(self.frame));

        let drawable = self.meshes.drawable(controls.geometry);
        self.renderer.render(target, &self.camera, program, &[drawable])?;

        tracing::trace!(
            shader = %controls.shader,
            geometry = %controls.geometry,
            sphere_rebuilt,
            color_changed,
            "frame rendered"
        );

        Ok(FrameReport {
            frame: self.frame,
            sphere_rebuilt,
            color_changed,
            shader: controls.shader,
            geometry: controls.geometry,
        })
    }

    /// Regenerate every mesh from scratch.
    pub fn reload_scene(&mut self, controls: &Controls) -> Result<(), SceneError> {
        let controls = controls.clamped();
        self.meshes = SceneMeshes::load(&mut self.renderer, controls.tessellation)?;
        self.cache.tessellation = controls.tessellation;
        Ok(())
    }

    /// Respond to a viewport change. Zero dimensions are treated as 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.renderer.set_size(width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.camera.update_projection_matrix();
        tracing::debug!(width, height, "viewport resized");
    }

    pub fn program(&self, kind: ShaderKind) -> &ShaderProgram {
        &self.programs[kind.index()]
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn meshes(&self) -> &SceneMeshes<R::Drawable> {
        &self.meshes
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn cache(&self) -> FrameCache {
        self.cache
    }

    /// Frames rendered so far. The time uniform is this value modulo
    /// [`TIME_PERIOD`].
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Sphere rebuilds triggered by tessellation changes. Scene reloads are
    /// not counted.
    pub fn sphere_rebuilds(&self) -> u64 {
        self.sphere_rebuilds
    }
}
