//! WGSL helpers shared by the generated shaders, with CPU mirrors.
//!
//! # Available Functions
//!
//! - `snoise(v: vec2<f32>) -> f32` - permutation-based 2D simplex noise in roughly `[-1, 1]`
//! - `hsv2rgb(c: vec3<f32>) -> vec3<f32>` - HSV (all channels `0..1`, value may exceed 1) to RGB
//!
//! The CPU versions ([`simplex2`], [`hsv_to_rgb`]) follow the WGSL line for line
//! so colour output can be checked without a GPU.

use glam::{Vec2, Vec3, Vec4};

/// WGSL 2D simplex noise.
pub const NOISE_WGSL: &str = r#"
fn mod289_2(x: vec2<f32>) -> vec2<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute3(x: vec3<f32>) -> vec3<f32> {
    return mod289_3(((x * 34.0) + 1.0) * x);
}

fn snoise(v: vec2<f32>) -> f32 {
    let C = vec4<f32>(0.211324865405187, 0.366025403784439, -0.577350269189626, 0.024390243902439);
    var i = floor(v + dot(v, C.yy));
    let x0 = v - i + dot(i, C.xx);
    var i1 = vec2<f32>(0.0, 1.0);
    if x0.x > x0.y {
        i1 = vec2<f32>(1.0, 0.0);
    }
    var x12 = x0.xyxy + C.xxzz;
    x12 = vec4<f32>(x12.xy - i1, x12.zw);
    i = mod289_2(i);
    let p = permute3(permute3(i.y + vec3<f32>(0.0, i1.y, 1.0)) + i.x + vec3<f32>(0.0, i1.x, 1.0));
    var m = max(vec3<f32>(0.5) - vec3<f32>(dot(x0, x0), dot(x12.xy, x12.xy), dot(x12.zw, x12.zw)), vec3<f32>(0.0));
    m = m * m;
    m = m * m;
    let x = 2.0 * fract(p * C.www) - 1.0;
    let h = abs(x) - 0.5;
    let ox = floor(x + 0.5);
    let a0 = x - ox;
    m = m * (1.79284291400159 - 0.85373472095314 * (a0 * a0 + h * h));
    let g = vec3<f32>(a0.x * x0.x + h.x * x0.y, a0.yz * x12.xz + h.yz * x12.yw);
    return 130.0 * dot(m, g);
}
"#;

/// WGSL HSV to RGB.
pub const COLOR_WGSL: &str = r#"
fn hsv2rgb(c: vec3<f32>) -> vec3<f32> {
    let K = vec4<f32>(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);
    let p = abs(fract(c.xxx + K.xyz) * 6.0 - K.www);
    return c.z * mix(K.xxx, clamp(p - K.xxx, vec3<f32>(0.0), vec3<f32>(1.0)), vec3<f32>(c.y));
}
"#;

fn mod289(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: Vec3) -> Vec3 {
    mod289(((x * 34.0) + 1.0) * x)
}

fn fract(x: Vec3) -> Vec3 {
    x - x.floor()
}

/// CPU mirror of `snoise`.
pub fn simplex2(v: Vec2) -> f32 {
    let c = Vec4::new(0.211_324_87, 0.366_025_42, -0.577_350_26, 0.024_390_243);

    let mut i = (v + v.dot(Vec2::splat(c.y))).floor();
    let x0 = v - i + i.dot(Vec2::splat(c.x));
    let i1 = if x0.x > x0.y { Vec2::new(1.0, 0.0) } else { Vec2::new(0.0, 1.0) };
    let x12 = Vec4::new(x0.x + c.x - i1.x, x0.y + c.x - i1.y, x0.x + c.z, x0.y + c.z);
    i = i - (i * (1.0 / 289.0)).floor() * 289.0;

    let p = permute(permute(i.y + Vec3::new(0.0, i1.y, 1.0)) + i.x + Vec3::new(0.0, i1.x, 1.0));
    let mut m = (Vec3::splat(0.5)
        - Vec3::new(
            x0.dot(x0),
            x12.x * x12.x + x12.y * x12.y,
            x12.z * x12.z + x12.w * x12.w,
        ))
    .max(Vec3::ZERO);
    m *= m;
    m *= m;

    let x = 2.0 * fract(p * c.w) - 1.0;
    let h = x.abs() - 0.5;
    let ox = (x + 0.5).floor();
    let a0 = x - ox;
    m *= 1.792_842_9 - 0.853_734_7 * (a0 * a0 + h * h);

    let g = Vec3::new(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x12.x + h.y * x12.y,
        a0.z * x12.z + h.z * x12.w,
    );
    130.0 * m.dot(g)
}

/// CPU mirror of `hsv2rgb`.
pub fn hsv_to_rgb(c: Vec3) -> Vec3 {
    let k = Vec4::new(1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0);
    let p = (fract(Vec3::splat(c.x) + k.truncate()) * 6.0 - k.w).abs();
    let t = (p - k.x).clamp(Vec3::ZERO, Vec3::ONE);
    c.z * Vec3::ONE.lerp(t, c.y)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        let red = hsv_to_rgb(Vec3::new(0.0, 1.0, 1.0));
        assert!((red - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        let green = hsv_to_rgb(Vec3::new(1.0 / 3.0, 1.0, 1.0));
        assert!((green - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
        let blue = hsv_to_rgb(Vec3::new(2.0 / 3.0, 1.0, 1.0));
        assert!((blue - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_hsv_saturation_and_value() {
        // no saturation: grey at the given value
        let grey = hsv_to_rgb(Vec3::new(0.4, 0.0, 0.5));
        assert!((grey - Vec3::splat(0.5)).length() < 1e-5);
        // value above one scales past one
        let bright = hsv_to_rgb(Vec3::new(0.0, 1.0, 2.0));
        assert!((bright.x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_hue_wraps() {
        let a = hsv_to_rgb(Vec3::new(0.25, 0.8, 1.0));
        let b = hsv_to_rgb(Vec3::new(1.25, 0.8, 1.0));
        assert!((a - b).length() < 1e-4);
    }

    #[test]
    fn test_simplex_range_and_variation() {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for i in 0..200 {
            for j in 0..200 {
                let n = simplex2(Vec2::new(i as f32 * 0.073 - 7.0, j as f32 * 0.091 - 9.0));
                assert!(n.is_finite());
                min = min.min(n);
                max = max.max(n);
            }
        }
        assert!(min >= -1.05 && max <= 1.05, "range {}..{}", min, max);
        assert!(max - min > 1.0, "noise barely varies: {}..{}", min, max);
    }

    #[test]
    fn test_simplex_is_continuous() {
        let a = simplex2(Vec2::new(3.2, -1.7));
        let b = simplex2(Vec2::new(3.2001, -1.7));
        assert!((a - b).abs() < 1e-2);
    }

    #[test]
    fn test_helpers_are_valid_wgsl() {
        validate::assert_valid(&format!(
            "{}\n{}\n@fragment\nfn fs_main() -> @location(0) vec4<f32> {{\n    return vec4<f32>(hsv2rgb(vec3<f32>(snoise(vec2<f32>(0.3, 0.7)), 1.0, 1.0)), 1.0);\n}}\n",
            NOISE_WGSL, COLOR_WGSL
        ));
    }
}
