//! Visible cross-section of the camera frustum at a fixed depth.

use glam::Vec2;

use crate::camera::PerspectiveCamera;

/// Axis-aligned rectangle of the view plane visible at some depth, centred on the view axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl VisibleRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.bottom && point.y <= self.top
    }
}

/// Compute the visible rectangle at `target_z` for a camera at `camera_z`.
///
/// Zero FOV or zero aspect produce a zero-area rectangle; callers avoid those.
pub fn visible_rect(vertical_fov_degrees: f32, aspect: f32, camera_z: f32, target_z: f32) -> VisibleRect {
    let fov = vertical_fov_degrees.to_radians();
    let height = 2.0 * (fov / 2.0).tan() * (target_z - camera_z).abs();
    let width = height * aspect;

    VisibleRect {
        left: -width / 2.0,
        right: width / 2.0,
        top: height / 2.0,
        bottom: -height / 2.0,
    }
}

impl PerspectiveCamera {
    /// Visible rectangle at world depth `z` for this camera's current aspect.
    pub fn visible_rect_at(&self, z: f32) -> VisibleRect {
        visible_rect(self.fov_degrees, self.aspect, self.position.z, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_symmetric_and_positive() {
        for fov in [1.0_f32, 30.0, 75.0, 120.0, 179.0] {
            for aspect in [0.25_f32, 1.0, 16.0 / 9.0, 4.0] {
                let r = visible_rect(fov, aspect, 0.0, -25.0);
                assert_eq!(r.right, -r.left);
                assert_eq!(r.top, -r.bottom);
                assert!(r.right > 0.0);
                assert!(r.top > 0.0);
            }
        }
    }

    #[test]
    fn test_rect_dimensions() {
        // 90 degrees: height = 2 * distance
        let r = visible_rect(90.0, 2.0, 5.0, -5.0);
        assert!((r.height() - 20.0).abs() < 1e-4);
        assert!((r.width() - 40.0).abs() < 1e-4);
        assert_eq!(r.center(), Vec2::ZERO);
    }

    #[test]
    fn test_degenerate_inputs_give_zero_area() {
        let r = visible_rect(0.0, 1.0, 0.0, -25.0);
        assert_eq!(r.width(), 0.0);
        let r = visible_rect(75.0, 0.0, 0.0, -25.0);
        assert_eq!(r.width(), 0.0);
        let r = visible_rect(75.0, 1.0, 0.0, 0.0);
        assert_eq!(r.height(), 0.0);
    }

    #[test]
    fn test_camera_rect_follows_aspect() {
        let mut camera = PerspectiveCamera::default();
        let wide = camera.visible_rect_at(-25.0);
        camera.set_viewport(500.0, 1000.0);
        let tall = camera.visible_rect_at(-25.0);
        assert_eq!(wide.height(), tall.height());
        assert!(tall.width() < wide.width());
    }
}
