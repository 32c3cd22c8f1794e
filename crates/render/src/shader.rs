use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Pipeline stage a shader source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Source text for one stage of a shader variant.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    pub label: &'static str,
    pub source: Cow<'static, str>,
}

impl ShaderSource {
    pub const fn vertex(label: &'static str, source: &'static str) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            label,
            source: Cow::Borrowed(source),
        }
    }

    pub const fn fragment(label: &'static str, source: &'static str) -> Self {
        Self {
            stage: ShaderStage::Fragment,
            label,
            source: Cow::Borrowed(source),
        }
    }
}

/// Named shader inputs that stay constant across one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Uniform {
    Model,
    ModelInvTr,
    ViewProj,
    Color,
    CameraForward,
    Time,
}

impl Uniform {
    pub const ALL: [Uniform; 6] = [
        Uniform::Model,
        Uniform::ModelInvTr,
        Uniform::ViewProj,
        Uniform::Color,
        Uniform::CameraForward,
        Uniform::Time,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Uniform::Model => "u_Model",
            Uniform::ModelInvTr => "u_ModelInvTr",
            Uniform::ViewProj => "u_ViewProj",
            Uniform::Color => "u_Color",
            Uniform::CameraForward => "u_CameraForward",
            Uniform::Time => "u_Time",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Small bit set of [`Uniform`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UniformSet(u8);

impl UniformSet {
    pub const EMPTY: Self = Self(0);

    pub const fn of(uniforms: &[Uniform]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < uniforms.len() {
            bits |= uniforms[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, uniform: Uniform) -> bool {
        self.0 & uniform.bit() != 0
    }

    pub fn insert(&mut self, uniform: Uniform) {
        self.0 |= uniform.bit();
    }

    pub fn iter(self) -> impl Iterator<Item = Uniform> {
        Uniform::ALL.into_iter().filter(move |u| self.contains(*u))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// The shader variants the demo ships. Closed set; dispatch is by `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaderKind {
    /// Diffuse shading with a fixed light.
    #[default]
    Lambert,
    /// Animated variant driven by time and the camera axis.
    Special,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 2] = [ShaderKind::Lambert, ShaderKind::Special];

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Lambert => "Lambert",
            ShaderKind::Special => "Special",
        }
    }

    /// Position in [`Self::ALL`], for array-indexed dispatch tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn declared_uniforms(self) -> UniformSet {
        match self {
            ShaderKind::Lambert => UniformSet::of(&[
                Uniform::Model,
                Uniform::ModelInvTr,
                Uniform::ViewProj,
                Uniform::Color,
            ]),
            ShaderKind::Special => UniformSet::of(&Uniform::ALL),
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shader `{0}` (expected Lambert or Special)")]
pub struct ParseShaderKindError(pub String);

impl FromStr for ShaderKind {
    type Err = ParseShaderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShaderKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseShaderKindError(s.to_string()))
    }
}

/// CPU-side copy of every uniform a program can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformValues {
    pub model: Mat4,
    pub model_inv_tr: Mat4,
    pub view_proj: Mat4,
    pub color: Vec4,
    pub camera_forward: Vec4,
    pub time: f32,
}

impl Default for UniformValues {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            model_inv_tr: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            color: Vec4::ONE,
            camera_forward: Vec4::new(0.0, 0.0, 1.0, 0.0),
            time: 0.0,
        }
    }
}

/// Uniform front for one compiled shader variant.
///
/// Backends own the compiled program; this type owns the values fed to it.
/// Each accepted write bumps [`Self::revision`] so a backend can skip
/// re-uploading unchanged state.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    kind: ShaderKind,
    declared: UniformSet,
    values: UniformValues,
    revision: u64,
}

impl ShaderProgram {
    pub fn new(kind: ShaderKind) -> Self {
        Self {
            kind,
            declared: kind.declared_uniforms(),
            values: UniformValues::default(),
            revision: 0,
        }
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn declares(&self, uniform: Uniform) -> bool {
        self.declared.contains(uniform)
    }

    pub fn values(&self) -> &UniformValues {
        &self.values
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Sets the model matrix and, where declared, its inverse transpose.
    pub fn set_model_matrix(&mut self, model: Mat4) {
        if self.accept(Uniform::Model) {
            self.values.model = model;
        }
        if self.accept(Uniform::ModelInvTr) {
            self.values.model_inv_tr = model.inverse().transpose();
        }
    }

    pub fn set_view_proj_matrix(&mut self, view_proj: Mat4) {
        if self.accept(Uniform::ViewProj) {
            self.values.view_proj = view_proj;
        }
    }

    pub fn set_geometry_color(&mut self, color: Vec4) {
        if self.accept(Uniform::Color) {
            self.values.color = color;
        }
    }

    pub fn set_camera_forward(&mut self, forward: Vec4) {
        if self.accept(Uniform::CameraForward) {
            self.values.camera_forward = forward;
        }
    }

    pub fn set_time(&mut self, time: f32) {
        if self.accept(Uniform::Time) {
            self.values.time = time;
        }
    }

    fn accept(&mut self, uniform: Uniform) -> bool {
        if !self.declared.contains(uniform) {
            tracing::trace!(
                shader = %self.kind,
                uniform = uniform.name(),
                "uniform not declared, ignored"
            );
            return false;
        }
        self.revision += 1;
        true
    }
}
