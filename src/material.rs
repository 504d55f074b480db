//! Host lit material for the text mesh.
//!
//! [`host_shader`] generates the complete WGSL module (vertex + fragment) for a
//! [`MaterialStyle`]. The generated source is the surface the holographic
//! override is spliced into (see [`shader_override`](crate::shader_override)),
//! so the three anchor lines below are part of its contract and must appear
//! verbatim exactly once.
//!
//! Bind groups:
//!
//! | Group | Binding | Contents |
//! |---|---|---|
//! | 0 | 0 | `Camera` |
//! | 0 | 1 | `Lights` |
//! | 1 | 0 | `Model` |
//! | 1 | 1 | `Material` |

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::CAMERA_WGSL;
use crate::config::TextConfig;
use crate::lights::{color_from_hex, LIGHTS_WGSL};

/// Opening line of the vertex-to-fragment struct.
pub const VERTEX_OUTPUT_ANCHOR: &str = "struct VertexOutput {";
/// Declaration of the vertex stage's output value.
pub const VERTEX_MAIN_ANCHOR: &str = "var out: VertexOutput;";
/// Base diffuse colour assignment in the fragment stage.
pub const DIFFUSE_ANCHOR: &str = "var diffuse_color = vec4<f32>(material.diffuse, material.opacity);";

/// Shading model of the text mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStyle {
    /// Metallic/rough PBR with a clearcoat layer, holographic diffuse.
    #[default]
    Physical,
    /// Unlit, holographic diffuse.
    Basic,
    /// Metallic/rough PBR, plain diffuse colour.
    Standard,
}

impl MaterialStyle {
    /// Whether the holographic colour override is applied to this style.
    pub fn uses_override(self) -> bool {
        matches!(self, MaterialStyle::Physical | MaterialStyle::Basic)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub diffuse: [f32; 3],
    pub opacity: f32,
    pub emissive: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub _padding: f32,
}

impl MaterialUniforms {
    pub fn from_config(text: &TextConfig) -> Self {
        Self {
            diffuse: color_from_hex(text.color).to_array(),
            opacity: 1.0,
            emissive: [0.0; 3],
            metalness: text.metalness.clamp(0.0, 1.0),
            roughness: text.roughness.clamp(0.0, 1.0),
            clearcoat: text.clearcoat.clamp(0.0, 1.0),
            clearcoat_roughness: text.clearcoat_roughness.clamp(0.0, 1.0),
            _padding: 0.0,
        }
    }
}

/// Model transform and the matching normal matrix.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Model matrix for text at `translation` tilted by `rotation` (x, y Euler angles).
pub fn text_transform(translation: Vec3, rotation_x: f32, rotation_y: f32) -> Mat4 {
    Mat4::from_translation(translation) * Mat4::from_rotation_x(rotation_x) * Mat4::from_rotation_y(rotation_y)
}

const BRDF_WGSL: &str = r#"
const PI: f32 = 3.14159265;

fn d_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn g_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = r * r / 8.0;
    let gv = n_dot_v / (n_dot_v * (1.0 - k) + k);
    let gl = n_dot_l / (n_dot_l * (1.0 - k) + k);
    return gv * gl;
}

fn f_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - cos_theta, 5.0);
}
"#;

fn lighting_body(style: MaterialStyle) -> &'static str {
    match style {
        MaterialStyle::Basic => "    let color = diffuse_color.rgb;\n",
        MaterialStyle::Standard => STANDARD_LIGHTING,
        MaterialStyle::Physical => PHYSICAL_LIGHTING,
    }
}

const STANDARD_LIGHTING: &str = r#"    let normal = normalize(in.world_normal);
    let view_dir = normalize(camera.position.xyz - in.world_position);
    let roughness = clamp(material.roughness, 0.04, 1.0);
    let f0 = mix(vec3<f32>(0.04), diffuse_color.rgb, material.metalness);
    let albedo = diffuse_color.rgb * (1.0 - material.metalness);
    let n_dot_v = max(dot(normal, view_dir), 1e-4);
    var color = lights.ambient.rgb * lights.ambient.w * diffuse_color.rgb;
    for (var i = 0u; i < 3u; i = i + 1u) {
        let l = normalize(lights.directions[i].xyz);
        let radiance = lights.colors[i].rgb * lights.colors[i].w;
        let h = normalize(l + view_dir);
        let n_dot_l = max(dot(normal, l), 0.0);
        let n_dot_h = max(dot(normal, h), 0.0);
        let f = f_schlick(max(dot(view_dir, h), 0.0), f0);
        let specular = d_ggx(n_dot_h, roughness) * g_smith(n_dot_v, n_dot_l, roughness) * f
            / max(4.0 * n_dot_v * n_dot_l, 1e-4);
        color += ((vec3<f32>(1.0) - f) * albedo / PI + specular) * radiance * n_dot_l;
    }
    color += material.emissive;
"#;

const PHYSICAL_LIGHTING: &str = r#"    let normal = normalize(in.world_normal);
    let view_dir = normalize(camera.position.xyz - in.world_position);
    let roughness = clamp(material.roughness, 0.04, 1.0);
    let coat_roughness = clamp(material.clearcoat_roughness, 0.04, 1.0);
    let f0 = mix(vec3<f32>(0.04), diffuse_color.rgb, material.metalness);
    let albedo = diffuse_color.rgb * (1.0 - material.metalness);
    let n_dot_v = max(dot(normal, view_dir), 1e-4);
    let coat_fresnel = f_schlick(n_dot_v, vec3<f32>(0.04)).x * material.clearcoat;
    var base_light = lights.ambient.rgb * lights.ambient.w * diffuse_color.rgb;
    var coat_light = vec3<f32>(0.0);
    for (var i = 0u; i < 3u; i = i + 1u) {
        let l = normalize(lights.directions[i].xyz);
        let radiance = lights.colors[i].rgb * lights.colors[i].w;
        let h = normalize(l + view_dir);
        let n_dot_l = max(dot(normal, l), 0.0);
        let n_dot_h = max(dot(normal, h), 0.0);
        let v_dot_h = max(dot(view_dir, h), 0.0);
        let f = f_schlick(v_dot_h, f0);
        let denom = max(4.0 * n_dot_v * n_dot_l, 1e-4);
        let specular = d_ggx(n_dot_h, roughness) * g_smith(n_dot_v, n_dot_l, roughness) * f / denom;
        base_light += ((vec3<f32>(1.0) - f) * albedo / PI + specular) * radiance * n_dot_l;
        let coat_f = f_schlick(v_dot_h, vec3<f32>(0.04)).x * material.clearcoat;
        let coat_spec = d_ggx(n_dot_h, coat_roughness) * g_smith(n_dot_v, n_dot_l, coat_roughness) * coat_f / denom;
        coat_light += vec3<f32>(coat_spec) * radiance * n_dot_l;
    }
    let color = base_light * (1.0 - coat_fresnel) + coat_light + material.emissive;
"#;

/// Generate the WGSL module for `style`.
pub fn host_shader(style: MaterialStyle) -> String {
    format!(
        r#"{camera}
{lights}
struct Model {{
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
}};

struct Material {{
    diffuse: vec3<f32>,
    opacity: f32,
    emissive: vec3<f32>,
    metalness: f32,
    roughness: f32,
    clearcoat: f32,
    clearcoat_roughness: f32,
    _padding: f32,
}};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(0) @binding(1) var<uniform> lights: Lights;
@group(1) @binding(0) var<uniform> model: Model;
@group(1) @binding(1) var<uniform> material: Material;
{brdf}
struct VertexInput {{
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}};

{vertex_output_anchor}
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
}};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {{
    {vertex_main_anchor}
    let world = model.model * vec4<f32>(in.position, 1.0);
    out.world_position = world.xyz;
    out.world_normal = normalize((model.normal * vec4<f32>(in.normal, 0.0)).xyz);
    out.clip_position = camera.view_proj * world;
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    {diffuse_anchor}
{lighting}    return vec4<f32>(color, diffuse_color.a);
}}
"#,
        camera = CAMERA_WGSL,
        lights = LIGHTS_WGSL,
        brdf = if style == MaterialStyle::Basic { "" } else { BRDF_WGSL },
        vertex_output_anchor = VERTEX_OUTPUT_ANCHOR,
        vertex_main_anchor = VERTEX_MAIN_ANCHOR,
        diffuse_anchor = DIFFUSE_ANCHOR,
        lighting = lighting_body(style),
    )
}
