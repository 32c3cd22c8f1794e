use glam::{Mat4, Vec4};
use shapeview_geometry::{Mesh, MeshError};

use crate::camera::Camera;
use crate::shader::ShaderProgram;

/// Errors from render backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    #[error("cannot upload empty mesh `{0}`")]
    EmptyMesh(String),
    #[error("invalid mesh `{label}`: {source}")]
    InvalidMesh {
        label: String,
        #[source]
        source: MeshError,
    },
    #[error("surface error: {0}")]
    Surface(String),
}

/// A mesh uploaded to a backend, ready to bind and draw.
pub trait Drawable {
    fn label(&self) -> &str;
    fn vertex_count(&self) -> u32;
    fn index_count(&self) -> u32;
}

/// Renderer-agnostic interface. All backends implement this trait.
///
/// A frame is `clear` followed by `render`. `clear` may be deferred until the
/// next `render` call.
pub trait Renderer {
    type Drawable: Drawable;
    /// Where a frame is drawn: a texture view for GPU backends, `()` for the
    /// debug renderer.
    type Target: ?Sized;

    /// Upload a mesh. Meshes with no triangles or broken indices are rejected.
    fn create_drawable(
        &mut self,
        label: &str,
        mesh: &Mesh,
    ) -> Result<Self::Drawable, RenderError>;

    fn set_clear_color(&mut self, color: Vec4);

    fn set_size(&mut self, width: u32, height: u32);

    /// Clear colour and depth.
    fn clear(&mut self);

    /// Bind `program`, upload the camera matrices, then draw each drawable.
    fn render(
        &mut self,
        target: &Self::Target,
        camera: &Camera,
        program: &mut ShaderProgram,
        drawables: &[&Self::Drawable],
    ) -> Result<(), RenderError>;
}

/// Push the camera's view-projection and an identity model matrix.
pub fn upload_camera(program: &mut ShaderProgram, camera: &Camera) {
    program.set_model_matrix(Mat4::IDENTITY);
    program.set_view_proj_matrix(camera.view_projection());
}

/// Reject meshes a backend cannot draw.
pub fn check_upload(label: &str, mesh: &Mesh) -> Result<(), RenderError> {
    if mesh.is_empty() {
        return Err(RenderError::EmptyMesh(label.to_string()));
    }
    mesh.validate().map_err(|source| RenderError::InvalidMesh {
        label: label.to_string(),
        source,
    })
}

/// Counts-only drawable produced by [`DebugTextRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugDrawable {
    label: String,
    vertex_count: u32,
    index_count: u32,
}

impl Drawable for DebugDrawable {
    fn label(&self) -> &str {
        &self.label
    }

    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Debug text renderer.
///
/// Produces a human-readable description of each frame instead of pixels.
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug)]
pub struct DebugTextRenderer {
    clear_color: Vec4,
    width: u32,
    height: u32,
    pending_clear: bool,
    frames_rendered: u64,
    uploads: u64,
    last_frame: String,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl DebugTextRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            width,
            height,
            pending_clear: false,
            frames_rendered: 0,
            uploads: 0,
            last_frame: String::new(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Number of successful [`Renderer::create_drawable`] calls.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Text of the most recent frame.
    pub fn last_frame(&self) -> &str {
        &self.last_frame
    }
}

impl Renderer for DebugTextRenderer {
    type Drawable = DebugDrawable;
    type Target = ();

    fn create_drawable(&mut self, label: &str, mesh: &Mesh) -> Result<DebugDrawable, RenderError> {
        check_upload(label, mesh)?;
        self.uploads += 1;
        tracing::debug!(label, vertices = mesh.vertex_count(), "drawable created");
        Ok(DebugDrawable {
            label: label.to_string(),
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.index_count() as u32,
        })
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.pending_clear = true;
    }

    fn render(
        &mut self,
        _target: &(),
        camera: &Camera,
        program: &mut ShaderProgram,
        drawables: &[&DebugDrawable],
    ) -> Result<(), RenderError> {
        upload_camera(program, camera);
        self.frames_rendered += 1;

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({}x{}) ===\n",
            self.frames_rendered, self.width, self.height
        ));
        if std::mem::take(&mut self.pending_clear) {
            let c = self.clear_color;
            out.push_str(&format!(
                "clear: ({:.2}, {:.2}, {:.2}, {:.2})\n",
                c.x, c.y, c.z, c.w
            ));
        } else {
            out.push_str("clear: none\n");
        }
        let u = program.values();
        out.push_str(&format!(
            "program: {} color=({:.2}, {:.2}, {:.2}, {:.2}) ",
            program.kind(),
            u.color.x,
            u.color.y,
            u.color.z,
            u.color.w
        ));
        out.push_str(&format!(
            "forward=({:.2}, {:.2}, {:.2}) time={}\n",
            u.camera_forward.x, u.camera_forward.y, u.camera_forward.z, u.time
        ));
        let eye = camera.position;
        out.push_str(&format!(
            "camera: eye=({:.1}, {:.1}, {:.1})\n",
            eye.x, eye.y, eye.z
        ));
        for d in drawables {
            out.push_str(&format!(
                "  draw {} vertices={} indices={}\n",
                d.label(),
                d.vertex_count(),
                d.index_count()
            ));
        }

        self.last_frame = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderKind;
    use glam::Vec3;
    use shapeview_geometry::{Vertex, cube, square};

    #[test]
    fn debug_renderer_draws_frame() {
        let mut renderer = DebugTextRenderer::new(640, 480);
        let drawable = renderer.create_drawable("cube", &cube(Vec3::ZERO)).unwrap();
        let camera = Camera::default();
        let mut program = ShaderProgram::new(ShaderKind::Lambert);

        renderer.set_clear_color(Vec4::new(0.2, 0.2, 0.2, 1.0));
        renderer.clear();
        renderer.render(&(), &camera, &mut program, &[&drawable]).unwrap();

        let out = renderer.last_frame();
        assert!(out.contains("Frame 1 (640x480)"));
        assert!(out.contains("clear: (0.20, 0.20, 0.20, 1.00)"));
        assert!(out.contains("program: Lambert"));
        assert!(out.contains("draw cube vertices=24 indices=36"));
    }

    #[test]
    fn frame_text_has_one_line_per_item() {
        let mut renderer = DebugTextRenderer::new(320, 240);
        let cube_drawable = renderer.create_drawable("cube", &cube(Vec3::ZERO)).unwrap();
        let square_drawable = renderer
            .create_drawable("square", &square(Vec3::ZERO))
            .unwrap();
        let camera = Camera::default();
        let mut program = ShaderProgram::new(ShaderKind::Lambert);
        renderer
            .render(&(), &camera, &mut program, &[&cube_drawable, &square_drawable])
            .unwrap();

        let lines: Vec<&str> = renderer.last_frame().lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "=== Frame 1 (320x240) ===");
        assert_eq!(lines[1], "clear: none");
        assert!(lines[2].starts_with("program: Lambert color=(1.00, 1.00, 1.00, 1.00)"));
        assert_eq!(lines[3], "camera: eye=(0.0, 0.0, 5.0)");
        assert_eq!(lines[4], "  draw cube vertices=24 indices=36");
        assert_eq!(lines[5], "  draw square vertices=4 indices=6");
        assert!(renderer.last_frame().ends_with('\n'));
    }

    #[test]
    fn clear_applies_to_one_frame() {
        let mut renderer = DebugTextRenderer::default();
        let camera = Camera::default();
        let mut program = ShaderProgram::new(ShaderKind::Special);
        renderer.clear();
        renderer.render(&(), &camera, &mut program, &[]).unwrap();
        renderer.render(&(), &camera, &mut program, &[]).unwrap();
        assert!(renderer.last_frame().contains("clear: none"));
        assert_eq!(renderer.frames_rendered(), 2);
    }

    #[test]
    fn render_uploads_camera() {
        let mut renderer = DebugTextRenderer::default();
        let camera = Camera::default();
        let mut program = ShaderProgram::new(ShaderKind::Lambert);
        renderer.render(&(), &camera, &mut program, &[]).unwrap();
        assert_eq!(program.values().view_proj, camera.view_projection());
    }

    #[test]
    fn rejects_empty_and_broken_meshes() {
        let mut renderer = DebugTextRenderer::default();
        assert!(matches!(
            renderer.create_drawable("empty", &Mesh::default()),
            Err(RenderError::EmptyMesh(_))
        ));
        let broken = Mesh::new(vec![Vertex::new(Vec3::ZERO, Vec3::Z)], vec![0, 0, 3]);
        assert!(matches!(
            renderer.create_drawable("broken", &broken),
            Err(RenderError::InvalidMesh { .. })
        ));
        assert_eq!(renderer.uploads(), 0);
    }

    #[test]
    fn set_size_is_reported() {
        let mut renderer = DebugTextRenderer::default();
        renderer.set_size(1920, 1080);
        assert_eq!(renderer.size(), (1920, 1080));
    }
}
