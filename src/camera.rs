//! Perspective camera looking down −Z.
//!
//! The scene camera never orbits: it sits at `(0, 0, z)` and faces the
//! particle field, so the view matrix is a pure translation.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Perspective camera used for rendering and pointer unprojection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width / height of the viewport.
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// World position of the eye.
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
        }
    }

    /// Builder-style camera placement.
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Update the aspect ratio from a viewport size. Zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Transform a normalized device coordinate back into world space.
    ///
    /// `ndc.z` uses wgpu's `[0, 1]` depth range.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection().inverse().project_point3(ndc)
    }

    /// Normalized device depth of a point `distance` units in front of the eye.
    pub fn ndc_depth(&self, distance: f32) -> f32 {
        self.projection_matrix()
            .project_point3(Vec3::new(0.0, 0.0, -distance))
            .z
    }

    /// World-space point under the pointer, halfway through the clip depth range.
    ///
    /// "Halfway" is measured in a `[-1, 1]` depth convention (NDC z = 0.5 there),
    /// which lands `4·far·near / (far + 3·near)` units in front of the eye. The
    /// pointer's reach across the particle field is calibrated against this plane.
    pub fn pointer_probe(&self, ndc: Vec2) -> Vec3 {
        let distance = 4.0 * self.far * self.near / (self.far + 3.0 * self.near);
        self.unproject(ndc.extend(self.ndc_depth(distance)))
    }
}

impl PerspectiveCamera {
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            view: self.view_matrix().to_cols_array_2d(),
            proj: self.projection_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

/// Camera block shared by every scene pipeline at `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

/// WGSL declaration matching [`CameraUniform`].
pub const CAMERA_WGSL: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    position: vec4<f32>,
};
"#;

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(75.0, 16.0 / 9.0, 0.1, 4000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unproject_center_stays_on_axis() {
        let camera = PerspectiveCamera::default();
        let p = camera.unproject(Vec3::new(0.0, 0.0, 0.5));
        assert!(p.x.abs() < 1e-4);
        assert!(p.y.abs() < 1e-4);
        assert!(p.z < 0.0);
    }

    #[test]
    fn test_ndc_depth_roundtrips_through_unproject() {
        let camera = PerspectiveCamera::default().at(Vec3::new(0.0, 0.0, 2.0));
        let z = camera.ndc_depth(10.0);
        let p = camera.unproject(Vec3::new(0.0, 0.0, z));
        assert!((p.z - (2.0 - 10.0)).abs() < 1e-2);
    }

    #[test]
    fn test_pointer_probe_depth() {
        let camera = PerspectiveCamera::default();
        let p = camera.pointer_probe(Vec2::ZERO);
        // 4 * 4000 * 0.1 / (4000 + 0.3)
        assert!((p.z + 0.39997).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_probe_right_edge_matches_frustum_width() {
        let camera = PerspectiveCamera::default();
        let p = camera.pointer_probe(Vec2::new(1.0, 0.0));
        let half_fov = (camera.fov_degrees.to_radians() * 0.5).tan();
        let expected = -p.z * half_fov * camera.aspect;
        assert!((p.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_set_viewport_ignores_zero() {
        let mut camera = PerspectiveCamera::default();
        camera.set_viewport(0.0, 100.0);
        assert_eq!(camera.aspect, 16.0 / 9.0);
        camera.set_viewport(800.0, 800.0);
        assert_eq!(camera.aspect, 1.0);
    }
}
