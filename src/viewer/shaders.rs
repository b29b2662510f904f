use bytemuck::{Pod, Zeroable};

/// Lit scene shader used by both the opaque and the glass pipelines. One
/// directional light plus four distance-attenuated spot cones, Blinn-Phong
/// style, with roughness steering the specular exponent and metalness
/// steering how much of the albedo tints the highlight.
pub(super) const SCENE_SHADER_SOURCE: &str = r#"
struct Spot {
    position: vec4<f32>,
    direction: vec4<f32>,
    color: vec4<f32>,
};

struct SceneUniform {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    sun_dir: vec4<f32>,
    sun_color: vec4<f32>,
    spots: array<Spot, 4>,
};

struct MeshUniform {
    model: mat4x4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniform;
@group(1) @binding(0)
var<uniform> mesh: MeshUniform;
@group(1) @binding(1)
var base_color: texture_2d<f32>;
@group(1) @binding(2)
var base_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = mesh.model * vec4<f32>(input.position, 1.0);
    out.world_pos = world.xyz;
    out.normal = normalize((mesh.model * vec4<f32>(input.normal, 0.0)).xyz);
    out.uv = input.uv;
    out.clip_position = scene.view_proj * world;
    return out;
}

fn shade(
    light_color: vec3<f32>,
    light_dir: vec3<f32>,
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    albedo: vec3<f32>,
    roughness: f32,
    metalness: f32,
) -> vec3<f32> {
    let n_dot_l = max(dot(normal, light_dir), 0.0);
    if n_dot_l <= 0.0 {
        return vec3<f32>(0.0);
    }
    let half_dir = normalize(light_dir + view_dir);
    let shininess = mix(128.0, 8.0, roughness);
    let spec = pow(max(dot(normal, half_dir), 0.0), shininess);
    let diffuse = albedo * (1.0 - metalness) * n_dot_l;
    let spec_tint = mix(vec3<f32>(0.04), albedo, metalness);
    return light_color * (diffuse + spec_tint * spec);
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let sample = textureSample(base_color, base_sampler, input.uv);
    let albedo = sample.rgb;
    let roughness = mesh.params.x;
    let metalness = mesh.params.y;
    let opacity = mesh.params.z;

    var normal = normalize(input.normal);
    // Double-sided surfaces: flip toward the camera.
    let view_dir = normalize(scene.camera_pos.xyz - input.world_pos);
    if dot(normal, view_dir) < 0.0 {
        normal = -normal;
    }

    var color = scene.ambient.rgb * scene.ambient.a * albedo;
    color += shade(
        scene.sun_color.rgb * scene.sun_color.a,
        -normalize(scene.sun_dir.xyz),
        normal,
        view_dir,
        albedo,
        roughness,
        metalness,
    );

    for (var i = 0u; i < 4u; i = i + 1u) {
        let spot = scene.spots[i];
        let to_light = spot.position.xyz - input.world_pos;
        let dist = length(to_light);
        if dist <= 0.0 {
            continue;
        }
        let light_dir = to_light / dist;
        let cos_angle = dot(-light_dir, normalize(spot.direction.xyz));
        let cone = smoothstep(spot.direction.w, spot.position.w, cos_angle);
        if cone <= 0.0 {
            continue;
        }
        let attenuated = spot.color.rgb * spot.color.a / (dist * dist);
        color += shade(attenuated, light_dir, normal, view_dir, albedo, roughness, metalness)
            * cone;
    }

    return vec4<f32>(color, sample.a * opacity);
}
"#;

/// Screen-space panel shader: a unit quad stretched over whatever viewport
/// the render pass sets, sampling the panel texture.
pub(super) const OVERLAY_SHADER_SOURCE: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    return out;
}

@group(0) @binding(0)
var panel_texture: texture_2d<f32>;
@group(0) @binding(1)
var panel_sampler: sampler;

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(panel_texture, panel_sampler, input.uv);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-1.0, 1.0],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [1.0, 1.0],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [-1.0, -1.0],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, -1.0],
        uv: [1.0, 1.0],
    },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];
