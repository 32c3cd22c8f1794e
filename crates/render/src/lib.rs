//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate meshes; they only read uploaded buffers.
//! - Uniform writes go through [`ShaderProgram`] setters. A setter for a
//!   uniform the shader variant does not declare is ignored.
//!
//! Backends implement [`Renderer`]. [`DebugTextRenderer`] is the CPU-only
//! implementation used by headless tooling and tests.

mod camera;
mod renderer;
mod shader;

pub use camera::Camera;
pub use renderer::{
    DebugDrawable, DebugTextRenderer, Drawable, RenderError, Renderer, check_upload, upload_camera,
};
pub use shader::{
    ParseShaderKindError, ShaderKind, ShaderProgram, ShaderSource, ShaderStage, Uniform,
    UniformSet, UniformValues,
};

pub fn crate_info() -> &'static str {
    "shapeview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
