/// Depth-only shader for the shadow pass. Reads the vertex position and the
/// per-draw world, light view and light projection matrices.
pub const SHADOW_SHADER: &str = r#"
struct ShadowUniforms {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> shadow: ShadowUniforms;

@vertex
fn vs_shadow(@location(0) position: vec4<f32>) -> @builtin(position) vec4<f32> {
    return shadow.proj * shadow.view * shadow.world * vec4<f32>(position.xyz, 1.0);
}
"#;

/// Frame uniform block and depth linearisation shared by the scene and
/// debug shaders.
const FRAME_COMMON: &str = r#"
struct FrameUniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    light_space: mat4x4<f32>,
    camera_dir: vec4<f32>,
    light_pos: vec4<f32>,
    // near, far, 1.0 when orthographic, compare bias
    light_params: vec4<f32>,
    // shading mode, debug view, unused, unused
    mode: vec4<u32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

// Map a light-space depth in [0, 1] back to a linear [0, 1] range between
// the light's near and far planes.
fn linear_depth(depth: f32) -> f32 {
    let near = frame.light_params.x;
    let far = frame.light_params.y;
    if (frame.light_params.z > 0.5) {
        return depth;
    }
    let z = near * far / (far - depth * (far - near));
    return clamp((z - near) / (far - near), 0.0, 1.0);
}
"#;

const SCENE_BODY: &str = r#"
struct DrawUniforms {
    world: mat4x4<f32>,
    normal: mat4x4<f32>,
};

@group(1) @binding(0)
var<uniform> draw: DrawUniforms;

@group(2) @binding(0)
var diffuse_tex: texture_2d<f32>;
@group(2) @binding(1)
var normal_tex: texture_2d<f32>;
@group(2) @binding(2)
var material_sampler: sampler;
@group(2) @binding(3)
var shadow_map: texture_depth_2d;
@group(2) @binding(4)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec4<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) world_tangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) light_clip: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_position = draw.world * vec4<f32>(vertex.position.xyz, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.proj * frame.view * world_position;
    out.world_position = world_position.xyz;
    out.world_normal = (draw.normal * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.world_tangent = (draw.world * vec4<f32>(vertex.tangent, 0.0)).xyz;
    out.uv = vertex.uv;
    out.light_clip = frame.light_space * world_position;
    return out;
}

// 1.0 when lit, 0.0 when fully shadowed. Fragments outside the light
// frustum are treated as lit.
fn shadow_factor(light_clip: vec4<f32>) -> f32 {
    if (light_clip.w <= 0.0) {
        return 1.0;
    }
    let ndc = light_clip.xyz / light_clip.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z > 1.0) {
        return 1.0;
    }
    return textureSampleCompareLevel(shadow_map, shadow_sampler, uv, ndc.z - frame.light_params.w);
}

fn light_space_depth(light_clip: vec4<f32>) -> f32 {
    if (light_clip.w <= 0.0) {
        return 1.0;
    }
    return linear_depth(clamp(light_clip.z / light_clip.w, 0.0, 1.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_tex, material_sampler, in.uv).rgb;
    let mapped = textureSample(normal_tex, material_sampler, in.uv).xyz * 2.0 - 1.0;

    let n = normalize(in.world_normal);
    let projected = in.world_tangent - n * dot(n, in.world_tangent);
    var t = vec3<f32>(0.0);
    if (length(projected) > 1e-5) {
        t = normalize(projected);
    }
    let b = cross(n, t);
    let normal = normalize(t * mapped.x + b * mapped.y + n * mapped.z);

    let to_light = normalize(frame.light_pos.xyz - in.world_position);
    let to_eye = normalize(frame.camera_dir.xyz);
    let diffuse = max(dot(normal, to_light), 0.0);
    let half_dir = normalize(to_light + to_eye);
    let specular = pow(max(dot(normal, half_dir), 0.0), 32.0) * 0.25;
    let shadow = shadow_factor(in.light_clip);

    let ambient = 0.2;
    var color: vec3<f32>;
    switch frame.mode.x {
        case 1u: {
            color = albedo;
        }
        case 2u: {
            color = normal * 0.5 + vec3<f32>(0.5);
        }
        case 3u: {
            color = vec3<f32>(shadow);
        }
        case 4u: {
            color = vec3<f32>(light_space_depth(in.light_clip));
        }
        default: {
            color = albedo * (ambient + (1.0 - ambient) * diffuse * shadow) + vec3<f32>(specular * shadow);
        }
    }
    return vec4<f32>(color, 1.0);
}
"#;

const DEBUG_BODY: &str = r#"
@group(1) @binding(0)
var shadow_map: texture_depth_2d;

struct DebugOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// One triangle covering the viewport; uv (0, 0) is the top-left corner.
@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> DebugOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: DebugOutput;
    out.clip_position = vec4<f32>(uv * vec2<f32>(2.0, -2.0) + vec2<f32>(-1.0, 1.0), 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_depth(in: DebugOutput) -> @location(0) vec4<f32> {
    let size = vec2<f32>(textureDimensions(shadow_map));
    let texel = vec2<i32>(clamp(in.uv, vec2<f32>(0.0), vec2<f32>(0.999999)) * size);
    let depth = textureLoad(shadow_map, texel, 0);
    return vec4<f32>(vec3<f32>(linear_depth(depth)), 1.0);
}
"#;

/// Lit, textured, normal-mapped scene shader with shadow lookups.
pub fn scene_shader() -> String {
    format!("{FRAME_COMMON}{SCENE_BODY}")
}

/// Full-screen shadow map visualisation.
pub fn debug_shader() -> String {
    format!("{FRAME_COMMON}{DEBUG_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_match_pipelines() {
        assert!(SHADOW_SHADER.contains("fn vs_shadow"));
        assert!(!SHADOW_SHADER.contains("@fragment"));
        let scene = scene_shader();
        assert!(scene.contains("fn vs_main") && scene.contains("fn fs_main"));
        let debug = debug_shader();
        assert!(debug.contains("fn vs_fullscreen") && debug.contains("fn fs_depth"));
    }

    #[test]
    fn frame_block_is_shared() {
        assert_eq!(scene_shader().matches("struct FrameUniforms").count(), 1);
        assert_eq!(debug_shader().matches("struct FrameUniforms").count(), 1);
    }
}
