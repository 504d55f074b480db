//! Holographic colour override for the host material shader.
//!
//! The host shader exposes no colour hook, so the override is spliced in as
//! text at fixed anchor lines (see [`material`](crate::material)). All splicing
//! goes through [`apply_patches`], which checks every anchor before touching the
//! source: a missing anchor is an [`ShaderError::AnchorNotFound`], never a
//! silently unmodified shader.
//!
//! The colour itself lives in a standalone WGSL function, `holographic_color`,
//! mirrored on the CPU by [`holographic_color`].

use glam::{Vec2, Vec3};

use crate::error::{ShaderError, ShaderStage};
use crate::material::{DIFFUSE_ANCHOR, VERTEX_MAIN_ANCHOR, VERTEX_OUTPUT_ANCHOR};
use crate::shader_utils::{hsv_to_rgb, simplex2, COLOR_WGSL, NOISE_WGSL};

/// Bind group holding the time uniform.
pub const TIME_GROUP: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    /// Keep the anchor and insert text right after it.
    InsertAfter,
    /// Replace the anchor with the text.
    Replace,
}

/// One textual edit keyed on an anchor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPatch {
    pub stage: ShaderStage,
    pub anchor: &'static str,
    pub op: PatchOp,
    pub text: String,
}

impl ShaderPatch {
    pub fn insert_after(stage: ShaderStage, anchor: &'static str, text: impl Into<String>) -> Self {
        Self {
            stage,
            anchor,
            op: PatchOp::InsertAfter,
            text: text.into(),
        }
    }

    pub fn replace(stage: ShaderStage, anchor: &'static str, text: impl Into<String>) -> Self {
        Self {
            stage,
            anchor,
            op: PatchOp::Replace,
            text: text.into(),
        }
    }
}

/// Apply `patches` in order, each at the first occurrence of its anchor.
///
/// Fails without modifying anything if any anchor is absent from `source`.
pub fn apply_patches(source: &str, patches: &[ShaderPatch]) -> Result<String, ShaderError> {
    if let Some(missing) = patches.iter().find(|p| !source.contains(p.anchor)) {
        return Err(ShaderError::AnchorNotFound {
            stage: missing.stage,
            anchor: missing.anchor,
        });
    }

    let mut out = source.to_string();
    for patch in patches {
        let replacement = match patch.op {
            PatchOp::InsertAfter => format!("{}{}", patch.anchor, patch.text),
            PatchOp::Replace => patch.text.clone(),
        };
        out = out.replacen(patch.anchor, &replacement, 1);
    }
    Ok(out)
}

/// Time uniform layout, padded to 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TimeUniform {
    pub time: f32,
    pub _pad: [f32; 3],
}

impl TimeUniform {
    pub fn new(time: f32) -> Self {
        Self { time, _pad: [0.0; 3] }
    }
}

const TIME_WGSL: &str = r#"
struct TimeUniform {
    time: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(2) @binding(0) var<uniform> time_uniform: TimeUniform;
"#;

const HOLOGRAPHIC_WGSL: &str = r#"
fn holographic_color(uv: vec2<f32>, time: f32) -> vec3<f32> {
    let t = time * 0.2;
    let scaled_uv = uv * 1.1;

    let noise1 = snoise(scaled_uv + vec2<f32>(t));
    let noise2 = snoise(scaled_uv * 0.05 - vec2<f32>(t * 0.1));
    let noise3 = snoise(scaled_uv * 0.08 + vec2<f32>(t * 0.14));

    let base_hue = uv.x * 0.4;
    let hue1 = base_hue + noise1 * 0.2 + t * 0.1;
    let hue2 = base_hue + noise2 * 0.2 + t * 0.15;
    let hue3 = base_hue + noise3 * 0.2 + t * 0.2;

    let color1 = hsv2rgb(vec3<f32>(hue1, 1.0, 2.0));
    let color2 = hsv2rgb(vec3<f32>(hue2 + 0.33, 0.8, 1.8));
    let color3 = hsv2rgb(vec3<f32>(hue3 + 0.66, 0.8, 1.9));

    let mix1 = sin(uv.y * 6.28 + noise1 * 3.0) * 0.5 + 0.5;
    let mix2 = cos(uv.x * 6.28 + noise2 * 3.0) * 0.5 + 0.5;
    var color = mix(color1, mix(color2, color3, vec3<f32>(mix1)), vec3<f32>(mix2));

    // horizontal shimmer bands
    var shimmer = pow(sin(noise1 * 10.0 + t * 3.0) * 0.5 + 0.5, 1.2);
    shimmer = shimmer * (sin(uv.x * 10.0) * 0.5 + 0.5);
    color = color + vec3<f32>(shimmer * 1.2);

    return color * 1.5;
}
"#;

/// CPU mirror of the WGSL `holographic_color`.
pub fn holographic_color(uv: Vec2, time: f32) -> Vec3 {
    let t = time * 0.2;
    let scaled_uv = uv * 1.1;

    let noise1 = simplex2(scaled_uv + Vec2::splat(t));
    let noise2 = simplex2(scaled_uv * 0.05 - Vec2::splat(t * 0.1));
    let noise3 = simplex2(scaled_uv * 0.08 + Vec2::splat(t * 0.14));

    let base_hue = uv.x * 0.4;
    let hue1 = base_hue + noise1 * 0.2 + t * 0.1;
    let hue2 = base_hue + noise2 * 0.2 + t * 0.15;
    let hue3 = base_hue + noise3 * 0.2 + t * 0.2;

    let color1 = hsv_to_rgb(Vec3::new(hue1, 1.0, 2.0));
    let color2 = hsv_to_rgb(Vec3::new(hue2 + 0.33, 0.8, 1.8));
    let color3 = hsv_to_rgb(Vec3::new(hue3 + 0.66, 0.8, 1.9));

    let mix1 = (uv.y * 6.28 + noise1 * 3.0).sin() * 0.5 + 0.5;
    let mix2 = (uv.x * 6.28 + noise2 * 3.0).cos() * 0.5 + 0.5;
    let mut color = color1.lerp(color2.lerp(color3, mix1), mix2);

    let shimmer = ((noise1 * 10.0 + t * 3.0).sin() * 0.5 + 0.5).powf(1.2) * ((uv.x * 10.0).sin() * 0.5 + 0.5);
    color += Vec3::splat(shimmer * 1.2);

    color * 1.5
}

/// Patches that route UVs to the fragment stage and swap the diffuse colour.
pub fn holographic_patches() -> Vec<ShaderPatch> {
    vec![
        ShaderPatch::insert_after(
            ShaderStage::Vertex,
            VERTEX_OUTPUT_ANCHOR,
            "\n    @location(3) v_uv: vec2<f32>,",
        ),
        ShaderPatch::insert_after(ShaderStage::Vertex, VERTEX_MAIN_ANCHOR, "\n    out.v_uv = in.uv;"),
        ShaderPatch::replace(
            ShaderStage::Fragment,
            DIFFUSE_ANCHOR,
            "var diffuse_color = vec4<f32>(holographic_color(in.v_uv, time_uniform.time), material.opacity);",
        ),
    ]
}

/// Splice the holographic colour into a host material shader.
///
/// Adds the time uniform at `@group(2) @binding(0)` and the noise/colour
/// helpers ahead of the host source; the host's lighting is left untouched.
pub fn inject_holographic(host: &str) -> Result<String, ShaderError> {
    let patched = apply_patches(host, &holographic_patches())?;
    Ok(format!(
        "{}{}{}{}\n{}",
        TIME_WGSL, NOISE_WGSL, COLOR_WGSL, HOLOGRAPHIC_WGSL, patched
    ))
}
