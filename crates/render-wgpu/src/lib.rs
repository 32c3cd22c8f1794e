//! wgpu render backend.
//!
//! Compiles every shader variant once at construction and draws uploaded
//! meshes with the program selected for the frame.
//!
//! # Invariants
//! - Shader sources are embedded at build time and never reloaded.
//! - A program's uniform buffer is rewritten only when its revision changed.
//! - Triangles are counter-clockwise front faces; back faces are culled.

mod gpu;
mod shaders;

pub use gpu::{GpuDrawable, WgpuRenderer};
pub use shaders::sources;
