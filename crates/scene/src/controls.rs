use std::fmt;
use std::path::Path;
use std::str::FromStr;

use glam::Vec4;
use serde::{Deserialize, Serialize};
use shapeview_geometry::MAX_ICOSPHERE_LEVEL;
use shapeview_render::ShaderKind;

/// The meshes a user can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryKind {
    #[default]
    Cube,
    Sphere,
    Square,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 3] = [
        GeometryKind::Cube,
        GeometryKind::Sphere,
        GeometryKind::Square,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Cube => "Cube",
            GeometryKind::Sphere => "Sphere",
            GeometryKind::Square => "Square",
        }
    }

    /// Position in [`Self::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown geometry `{0}` (expected Cube, Sphere or Square)")]
pub struct ParseGeometryKindError(pub String);

impl FromStr for GeometryKind {
    type Err = ParseGeometryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseGeometryKindError(s.to_string()))
    }
}

/// 8-bit RGB colour as edited in the panel. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8(pub [u8; 3]);

impl Rgb8 {
    pub const RED: Rgb8 = Rgb8([255, 0, 0]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Channels scaled to 0..=1 with alpha 1.
    pub fn normalized(self) -> Vec4 {
        let [r, g, b] = self.0;
        Vec4::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::RED
    }
}

/// Errors loading a controls preset.
#[derive(Debug, thiserror::Error)]
pub enum ControlsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot of the control panel, read once per frame.
///
/// Missing fields in a JSON preset fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    pub tessellation: u32,
    pub shader: ShaderKind,
    pub geometry: GeometryKind,
    pub color: Rgb8,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            tessellation: 5,
            shader: ShaderKind::Lambert,
            geometry: GeometryKind::Cube,
            color: Rgb8::RED,
        }
    }
}

impl Controls {
    /// Tessellation bounded to the supported subdivision range.
    pub fn clamped(self) -> Self {
        Self {
            tessellation: self.tessellation.min(MAX_ICOSPHERE_LEVEL),
            ..self
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ControlsError> {
        let controls: Controls = serde_json::from_str(json)?;
        Ok(controls.clamped())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ControlsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let controls = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), ?controls, "controls preset loaded");
        Ok(controls)
    }

    pub fn to_json(&self) -> Result<String, ControlsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
