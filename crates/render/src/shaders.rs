use crate::program::ProgramSource;

/// Name the built-in program is registered under.
pub const SIMPLE_PROGRAM: &str = "simple";

/// Uniform block shared by both stages of the simple program.
///
/// `flags.x` is 1.0 when a texture is bound for the current draw.
const UNIFORMS: &str = r#"
struct Uniforms {
    perspective: mat4x4<f32>,
    camera_rotation: mat4x4<f32>,
    model_view: mat4x4<f32>,
    input_color: vec4<f32>,
    flags: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};
"#;

const SIMPLE_VERTEX: &str = r#"
struct VertexInput {
    @location(0) vertex_position: vec3<f32>,
    @location(1) texture_coordinate: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.perspective
        * uniforms.camera_rotation
        * uniforms.model_view
        * vec4<f32>(in.vertex_position, 1.0);
    out.uv = in.texture_coordinate;
    return out;
}
"#;

const SIMPLE_FRAGMENT: &str = r#"
@group(1) @binding(0)
var texture1: texture_2d<f32>;
@group(1) @binding(1)
var texture1_sampler: sampler;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let sampled = textureSample(texture1, texture1_sampler, in.uv);
    if (uniforms.flags.x > 0.5) {
        return sampled * uniforms.input_color;
    }
    return uniforms.input_color;
}
"#;

/// Sources for the textured, colored program every cube draws with.
pub fn simple_program() -> ProgramSource {
    ProgramSource::standard(
        format!("{UNIFORMS}{SIMPLE_VERTEX}"),
        format!("{UNIFORMS}{SIMPLE_FRAGMENT}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_have_their_entry_points() {
        let source = simple_program();
        assert!(source.vertex.contains("fn vs_main"));
        assert!(source.fragment.contains("fn fs_main"));
        assert!(!source.vertex.contains("fs_main"));
    }
}
