//! Scene: render controls, the three demo meshes, and the frame loop.
//!
//! # Invariants
//! - The previous frame's tessellation and colour live in [`App`], never in
//!   globals.
//! - A tessellation change rebuilds the sphere once; nothing else is regenerated.
//! - Selection is by closed enum; the sphere slot always holds the latest mesh.
//!
//! The host owns scheduling: call [`App::tick`] once per display refresh and
//! request the next frame when it returns.

mod app;
mod controls;
mod meshes;
mod timer;

pub use app::{App, CLEAR_COLOR, FrameCache, FrameReport, SceneError, TIME_PERIOD, frame_time};
pub use controls::{Controls, ControlsError, GeometryKind, ParseGeometryKindError, Rgb8};
pub use meshes::{MeshSlot, SCENE_CENTER, SPHERE_RADIUS, SceneMeshes};
pub use shapeview_render::ShaderKind;
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "shapeview-scene v0.1.0"
}
