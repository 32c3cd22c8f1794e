use shapeview_render::{ShaderKind, ShaderSource};

const LAMBERT_VERT: &str = include_str!("../shaders/lambert.vert.wgsl");
const LAMBERT_FRAG: &str = include_str!("../shaders/lambert.frag.wgsl");
const SPECIAL_VERT: &str = include_str!("../shaders/special.vert.wgsl");
const SPECIAL_FRAG: &str = include_str!("../shaders/special.frag.wgsl");

/// Vertex and fragment sources for a shader variant, in that order.
pub fn sources(kind: ShaderKind) -> [ShaderSource; 2] {
    match kind {
        ShaderKind::Lambert => [
            ShaderSource::vertex("lambert.vert", LAMBERT_VERT),
            ShaderSource::fragment("lambert.frag", LAMBERT_FRAG),
        ],
        ShaderKind::Special => [
            ShaderSource::vertex("special.vert", SPECIAL_VERT),
            ShaderSource::fragment("special.frag", SPECIAL_FRAG),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapeview_render::ShaderStage;

    #[test]
    fn every_variant_has_both_stages() {
        for kind in ShaderKind::ALL {
            let [vert, frag] = sources(kind);
            assert_eq!(vert.stage, ShaderStage::Vertex);
            assert_eq!(frag.stage, ShaderStage::Fragment);
            assert!(vert.source.contains("@vertex"));
            assert!(frag.source.contains("@fragment"));
        }
    }

    #[test]
    fn stages_share_uniform_layout() {
        for kind in ShaderKind::ALL {
            for src in sources(kind) {
                assert!(src.source.contains("struct Uniforms"));
                assert!(src.source.contains("camera_forward: vec4<f32>"));
                assert!(src.source.contains("@group(0) @binding(0)"));
            }
        }
    }
}
