//! Pointer-driven force laws acting on the particle field.
//!
//! The pointer is projected into the scene once per frame with
//! [`pointer_to_scene`]; each [`ForceLaw`] then turns a particle position and
//! that projected point into a planar displacement for the frame.
//!
//! ```ignore
//! let pointer = pointer_to_scene(&camera, ndc, POINTER_SCALE);
//! let mut law = Repulsion::default();
//! let push = law.displacement(slot, particle_pos, pointer);
//! ```

use glam::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::camera::PerspectiveCamera;

/// Scale from the unprojected pointer point to the particles' working plane.
pub const POINTER_SCALE: f32 = 25.0;

/// Project a pointer position (normalized device coordinates) into the scene's
/// working plane.
pub fn pointer_to_scene(camera: &PerspectiveCamera, ndc: Vec2, scale: f32) -> Vec2 {
    camera.pointer_probe(ndc).truncate() * scale
}

/// Repulsion for one particle from a pointer given in screen pixels.
///
/// Convenience wrapper over [`pointer_to_scene`] and [`Repulsion::force`] for
/// callers holding raw pointer coordinates.
pub fn compute_repulsion(
    particle: Vec3,
    pointer_px: Vec2,
    viewport: Vec2,
    camera: &PerspectiveCamera,
) -> Vec2 {
    let ndc = crate::pointer::PointerSample::new(pointer_px.x, pointer_px.y).to_ndc(viewport);
    Repulsion::default().force(particle, pointer_to_scene(camera, ndc, POINTER_SCALE))
}

/// A force law applied to every particle slot once per tick.
///
/// Laws may keep per-slot state (see [`Orbit`]); the particle system calls
/// [`resize`](ForceLaw::resize) once when the pool is created and
/// [`recycle`](ForceLaw::recycle) whenever a slot wraps.
pub trait ForceLaw: Send {
    /// Planar displacement to add to the particle's `(x, y)` this tick.
    fn displacement(&mut self, slot: usize, particle: Vec3, pointer: Vec2) -> Vec2;

    /// Prepare per-slot state for a pool of `count` particles.
    fn resize(&mut self, _count: usize) {}

    /// Forget per-slot state for a recycled particle.
    fn recycle(&mut self, _slot: usize) {}
}

/// Pushes particles away from the pointer, strongest at the pointer and fading
/// linearly to zero at `radius`. Particles deeper than `max_depth` are ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repulsion {
    pub radius: f32,
    pub strength: f32,
    pub max_depth: f32,
}

impl Default for Repulsion {
    fn default() -> Self {
        Self {
            radius: 6.0,
            strength: 0.1,
            max_depth: 40.0,
        }
    }
}

impl Repulsion {
    pub fn force(&self, particle: Vec3, pointer: Vec2) -> Vec2 {
        let depth = particle.z.abs();
        if depth > self.max_depth {
            return Vec2::ZERO;
        }

        let offset = particle.truncate() - pointer;
        let distance = offset.length();
        if distance >= self.radius {
            return Vec2::ZERO;
        }

        let depth_factor = 1.0 - depth / self.max_depth;
        let magnitude = (1.0 - distance / self.radius) * self.strength * depth_factor;
        let direction = if distance > 0.0 { offset / distance } else { Vec2::X };
        direction * magnitude
    }
}

impl ForceLaw for Repulsion {
    fn displacement(&mut self, _slot: usize, particle: Vec3, pointer: Vec2) -> Vec2 {
        self.force(particle, pointer)
    }
}

/// Spring toward the pointer plus a tangential swirl, integrated into a damped
/// per-slot velocity.
///
/// Inside `min_distance` the spring reverses so particles orbit instead of
/// collapsing onto the pointer. Out of range the velocity just decays.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    pub strength: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_depth: f32,
    /// Tangential force as a fraction of the spring force.
    pub swirl: f32,
    velocities: Vec<Vec2>,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius: 8.0,
            strength: 0.05,
            damping: 0.88,
            min_distance: 5.0,
            max_depth: 25.0,
            swirl: 0.5,
            velocities: Vec::new(),
        }
    }
}

impl Orbit {
    /// Advance one particle's velocity. Particles beyond `max_depth` keep their
    /// velocity unchanged.
    pub fn step(&self, particle: Vec3, pointer: Vec2, velocity: Vec2) -> Vec2 {
        let depth = particle.z.abs();
        if depth > self.max_depth {
            return velocity;
        }

        let to_pointer = pointer - particle.truncate();
        let distance = to_pointer.length();
        if distance >= self.radius {
            return velocity * self.damping;
        }

        let depth_factor = 1.0 - depth / self.max_depth;
        let force = if distance > self.min_distance {
            (1.0 - distance / self.radius) * self.strength * depth_factor
        } else {
            -self.strength * depth_factor
        };

        let angle = to_pointer.y.atan2(to_pointer.x);
        let radial = Vec2::from_angle(angle);
        let tangential = Vec2::from_angle(angle + FRAC_PI_2);

        (velocity + radial * force + tangential * force * self.swirl) * self.damping
    }

    pub fn velocity(&self, slot: usize) -> Vec2 {
        self.velocities.get(slot).copied().unwrap_or(Vec2::ZERO)
    }
}

impl ForceLaw for Orbit {
    fn displacement(&mut self, slot: usize, particle: Vec3, pointer: Vec2) -> Vec2 {
        let velocity = self.step(particle, pointer, self.velocity(slot));
        if let Some(v) = self.velocities.get_mut(slot) {
            *v = velocity;
        }
        velocity
    }

    fn resize(&mut self, count: usize) {
        self.velocities = vec![Vec2::ZERO; count];
    }

    fn recycle(&mut self, slot: usize) {
        if let Some(v) = self.velocities.get_mut(slot) {
            *v = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repulsion_zero_beyond_max_depth() {
        let law = Repulsion::default();
        for pointer in [Vec2::ZERO, Vec2::new(3.0, -2.0), Vec2::new(100.0, 100.0)] {
            assert_eq!(law.force(Vec3::new(0.0, 0.0, -40.5), pointer), Vec2::ZERO);
            assert_eq!(law.force(Vec3::new(pointer.x, pointer.y, -75.0), pointer), Vec2::ZERO);
        }
    }

    #[test]
    fn test_repulsion_zero_at_and_beyond_radius() {
        let law = Repulsion::default();
        assert_eq!(law.force(Vec3::new(6.0, 0.0, -10.0), Vec2::ZERO), Vec2::ZERO);
        assert_eq!(law.force(Vec3::new(0.0, 9.0, -10.0), Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_repulsion_monotonic_in_distance() {
        let law = Repulsion::default();
        let mut last = f32::INFINITY;
        for i in 0..=70 {
            let d = i as f32 * 0.1;
            let f = law.force(Vec3::new(d, 0.0, -5.0), Vec2::ZERO).length();
            assert!(f <= last, "force grew at distance {}", d);
            last = f;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_repulsion_points_away_and_fades_with_depth() {
        let law = Repulsion::default();
        let pointer = Vec2::new(1.0, 1.0);
        let shallow = law.force(Vec3::new(3.0, 1.0, -1.0), pointer);
        let deep = law.force(Vec3::new(3.0, 1.0, -30.0), pointer);
        assert!(shallow.x > 0.0);
        assert!(shallow.y.abs() < 1e-6);
        assert!(deep.length() < shallow.length());
    }

    #[test]
    fn test_repulsion_magnitude() {
        let law = Repulsion::default();
        // distance 3 of 6, depth 20 of 40: 0.5 * 0.1 * 0.5
        let f = law.force(Vec3::new(0.0, 3.0, -20.0), Vec2::ZERO);
        assert!((f.length() - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_keeps_velocity_when_too_deep() {
        let law = Orbit::default();
        let v = Vec2::new(0.3, -0.2);
        assert_eq!(law.step(Vec3::new(0.0, 0.0, -30.0), Vec2::ZERO, v), v);
    }

    #[test]
    fn test_orbit_damps_out_of_range() {
        let law = Orbit::default();
        let v = Vec2::new(1.0, 0.0);
        let next = law.step(Vec3::new(50.0, 0.0, -1.0), Vec2::ZERO, v);
        assert!((next.x - 0.88).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_pulls_and_swirls() {
        let law = Orbit::default();
        // particle at +x, pointer at origin, distance 6 (between min and radius)
        let v = law.step(Vec3::new(6.0, 0.0, 0.0), Vec2::ZERO, Vec2::ZERO);
        assert!(v.x < 0.0, "spring should pull toward pointer");
        assert!(v.y.abs() > 0.0, "tangential component expected");
    }

    #[test]
    fn test_orbit_pushes_inside_min_distance() {
        let law = Orbit::default();
        let v = law.step(Vec3::new(2.0, 0.0, 0.0), Vec2::ZERO, Vec2::ZERO);
        assert!(v.x > 0.0);
    }

    #[test]
    fn test_orbit_state_persists_and_recycles() {
        let mut law = Orbit::default();
        law.resize(2);
        let p = Vec3::new(6.0, 0.0, -1.0);
        let first = law.displacement(0, p, Vec2::ZERO);
        assert_eq!(law.velocity(0), first);
        assert_eq!(law.velocity(1), Vec2::ZERO);
        let second = law.displacement(0, p, Vec2::ZERO);
        assert!(second.length() > first.length());
        law.recycle(0);
        assert_eq!(law.velocity(0), Vec2::ZERO);
    }

    #[test]
    fn test_compute_repulsion_uses_screen_pointer() {
        let camera = PerspectiveCamera::default();
        let viewport = Vec2::new(1920.0, 1080.0);
        // pointer at screen centre maps to the scene origin
        let f = compute_repulsion(Vec3::new(1.0, 0.0, -5.0), viewport * 0.5, viewport, &camera);
        assert!(f.x > 0.0);
        let far = compute_repulsion(Vec3::new(1.0, 0.0, -45.0), viewport * 0.5, viewport, &camera);
        assert_eq!(far, Vec2::ZERO);
    }
}
