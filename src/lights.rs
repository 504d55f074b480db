//! Scene lighting: one ambient term and three directional lights.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Linear RGB from a `0xRRGGBB` sRGB hex colour.
pub fn color_from_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Light arriving from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: AmbientLight,
    /// Key, fill and rim lights.
    pub directional: [DirectionalLight; 3],
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: color_from_hex(0x4522c3),
                intensity: 0.3,
            },
            directional: [
                DirectionalLight {
                    color: Vec3::ONE,
                    intensity: 1.2,
                    position: Vec3::new(5.0, 5.0, 5.0),
                },
                DirectionalLight {
                    color: Vec3::ONE,
                    intensity: 0.5,
                    position: Vec3::new(-5.0, 2.0, -5.0),
                },
                // bluish rim from behind the text
                DirectionalLight {
                    color: color_from_hex(0x88ccff),
                    intensity: 1.0,
                    position: Vec3::new(0.0, 5.0, -30.0),
                },
            ],
        }
    }
}

/// GPU layout of [`Lights`]; `w` carries intensity.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    pub directions: [[f32; 4]; 3],
    pub colors: [[f32; 4]; 3],
}

impl Lights {
    pub fn to_uniform(&self) -> LightsUniform {
        let mut directions = [[0.0; 4]; 3];
        let mut colors = [[0.0; 4]; 3];
        for (i, light) in self.directional.iter().enumerate() {
            directions[i] = light.position.normalize_or_zero().extend(0.0).to_array();
            colors[i] = light.color.extend(light.intensity).to_array();
        }
        LightsUniform {
            ambient: self.ambient.color.extend(self.ambient.intensity).to_array(),
            directions,
            colors,
        }
    }
}

/// WGSL declaration matching [`LightsUniform`].
pub const LIGHTS_WGSL: &str = r#"
struct Lights {
    ambient: vec4<f32>,
    directions: array<vec4<f32>, 3>,
    colors: array<vec4<f32>, 3>,
};
"#;
