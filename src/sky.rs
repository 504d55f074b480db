//! Gradient sky dome.
//!
//! A large sphere around the origin, seen from inside. The fragment colour
//! blends from the bottom colour at the horizon to the top colour along the
//! direction's `z` component.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::camera::CAMERA_WGSL;
use crate::config::SkyConfig;
use crate::lights::color_from_hex;
use crate::mesh::{MeshData, MeshVertex};

pub const WIDTH_SEGMENTS: u32 = 32;
pub const HEIGHT_SEGMENTS: u32 = 15;

/// UV sphere with outward normals and counter-clockwise faces seen from outside.
///
/// Rows run from the +Y pole to the −Y pole; the degenerate triangles at the
/// poles are skipped.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut mesh = MeshData::default();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.vertices
                .push(MeshVertex::new(normal * radius, normal, Vec2::new(u, 1.0 - v)));
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend([a, b, d]);
            }
            if iy != height_segments - 1 {
                mesh.indices.extend([b, c, d]);
            }
        }
    }

    mesh
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SkyUniform {
    pub top: [f32; 4],
    pub bottom: [f32; 4],
}

impl SkyUniform {
    pub fn from_config(sky: &SkyConfig) -> Self {
        Self {
            top: color_from_hex(sky.top_color).extend(1.0).to_array(),
            bottom: color_from_hex(sky.bottom_color).extend(1.0).to_array(),
        }
    }
}

/// Sky dome shader. Camera at `@group(0) @binding(0)`, colours at `@group(1) @binding(0)`.
pub fn sky_shader() -> String {
    format!(
        r#"{camera}
struct Sky {{
    top: vec4<f32>,
    bottom: vec4<f32>,
}};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(1) @binding(0) var<uniform> sky: Sky;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
}};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {{
    var out: VertexOutput;
    out.world_position = position;
    out.clip_position = camera.view_proj * vec4<f32>(position, 1.0);
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
    let h = normalize(in.world_position).z;
    return vec4<f32>(mix(sky.bottom.rgb, sky.top.rgb, max(h, 0.0)), 1.0);
}}
"#,
        camera = CAMERA_WGSL
    )
}
