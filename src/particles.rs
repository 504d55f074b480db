//! Fixed-size particle pool simulated on the CPU.
//!
//! Particle state lives in flat parallel buffers indexed by slot, matching the
//! vertex buffers the renderer uploads each frame:
//!
//! - `positions`: `x, y, z` per slot
//! - `colors`: `r, g, b, a` per slot (alpha is the fade-in)
//! - `fall_speeds`: one `f32` per slot
//!
//! Particles drift toward the camera (+Z). Once a particle crosses `z = 0` its
//! slot is recycled in place: new position on the interaction-depth rectangle,
//! new depth, alpha back to zero. The pool never grows or shrinks.

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::camera::PerspectiveCamera;
use crate::config::ParticleMotion;
use crate::force::ForceLaw;
use crate::gaussian::sample_in_rect;

/// The particle pool and its per-tick update.
pub struct ParticleSystem {
    positions: Vec<f32>,
    colors: Vec<f32>,
    fall_speeds: Vec<f32>,
    motion: ParticleMotion,
    force: Box<dyn ForceLaw>,
    rng: SmallRng,
}

impl ParticleSystem {
    /// Spawn `count` particles clustered on the visible rectangle at the spawn depth.
    pub fn spawn(
        count: usize,
        motion: ParticleMotion,
        force: Box<dyn ForceLaw>,
        camera: &PerspectiveCamera,
    ) -> Self {
        Self::spawn_with_rng(count, motion, force, camera, SmallRng::from_entropy())
    }

    /// Like [`spawn`](Self::spawn) with a fixed seed, for reproducible runs.
    pub fn spawn_seeded(
        count: usize,
        motion: ParticleMotion,
        force: Box<dyn ForceLaw>,
        camera: &PerspectiveCamera,
        seed: u64,
    ) -> Self {
        Self::spawn_with_rng(count, motion, force, camera, SmallRng::seed_from_u64(seed))
    }

    fn spawn_with_rng(
        count: usize,
        motion: ParticleMotion,
        mut force: Box<dyn ForceLaw>,
        camera: &PerspectiveCamera,
        mut rng: SmallRng,
    ) -> Self {
        let mut positions = vec![0.0; count * 3];
        let mut colors = vec![0.0; count * 4];
        let mut fall_speeds = vec![0.0; count];
        let rect = camera.visible_rect_at(motion.spawn_depth);

        for i in 0..count {
            let xy = sample_in_rect(&mut rng, &rect);
            positions[i * 3] = xy.x;
            positions[i * 3 + 1] = xy.y;
            positions[i * 3 + 2] = uniform(&mut rng, motion.initial_depth);
            fall_speeds[i] = uniform(&mut rng, motion.fall_speed);
            colors[i * 4] = 1.0;
            colors[i * 4 + 1] = 1.0;
            colors[i * 4 + 2] = 1.0;
            colors[i * 4 + 3] = 0.0;
        }

        force.resize(count);

        Self {
            positions,
            colors,
            fall_speeds,
            motion,
            force,
            rng,
        }
    }

    /// Advance every particle by one frame.
    ///
    /// `pointer` is the pointer projected into the scene (see
    /// [`pointer_to_scene`](crate::force::pointer_to_scene)). The recycle
    /// rectangle is recomputed from `camera` so aspect changes are honoured.
    pub fn tick(&mut self, camera: &PerspectiveCamera, pointer: Vec2) {
        let rect = camera.visible_rect_at(self.motion.interaction_depth);
        let fade = self.motion.fade_increment;

        for i in 0..self.len() {
            let p = i * 3;
            let c = i * 4;
            let position = Vec3::new(self.positions[p], self.positions[p + 1], self.positions[p + 2]);
            let push = self.force.displacement(i, position, pointer);

            self.positions[p + 2] += self.fall_speeds[i];
            self.positions[p] += push.x;
            self.positions[p + 1] += push.y;

            if self.colors[c + 3] < 1.0 {
                self.colors[c + 3] = (self.colors[c + 3] + fade).min(1.0);
            }

            if self.positions[p + 2] > 0.0 {
                let xy = sample_in_rect(&mut self.rng, &rect);
                self.positions[p] = xy.x;
                self.positions[p + 1] = xy.y;
                self.positions[p + 2] = uniform(&mut self.rng, self.motion.wrap_depth);
                self.colors[c + 3] = 0.0;
                self.force.recycle(i);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.fall_speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fall_speeds.is_empty()
    }

    pub fn position(&self, slot: usize) -> Vec3 {
        Vec3::from_slice(&self.positions[slot * 3..slot * 3 + 3])
    }

    pub fn alpha(&self, slot: usize) -> f32 {
        self.colors[slot * 4 + 3]
    }

    pub fn fall_speed(&self, slot: usize) -> f32 {
        self.fall_speeds[slot]
    }

    /// Flat `xyz` buffer, one triple per slot.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat `rgba` buffer, one quadruple per slot.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Overwrite a slot's state. Intended for tests and scripted scenes.
    pub fn set_particle(&mut self, slot: usize, position: Vec3, alpha: f32) {
        self.positions[slot * 3..slot * 3 + 3].copy_from_slice(&position.to_array());
        self.colors[slot * 4 + 3] = alpha.clamp(0.0, 1.0);
    }
}

/// Uniform draw from `[start, end)`; an empty range yields `start`.
fn uniform<R: Rng + ?Sized>(rng: &mut R, bounds: [f32; 2]) -> f32 {
    if bounds[0] < bounds[1] {
        rng.gen_range(bounds[0]..bounds[1])
    } else {
        bounds[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForceLawKind;
    use crate::force::Repulsion;

    // Pointer far outside every particle's reach.
    const AWAY: Vec2 = Vec2::new(1.0e6, 1.0e6);

    fn pool(count: usize, seed: u64) -> (ParticleSystem, PerspectiveCamera) {
        let camera = PerspectiveCamera::default();
        let system = ParticleSystem::spawn_seeded(
            count,
            ParticleMotion::default(),
            Box::new(Repulsion::default()),
            &camera,
            seed,
        );
        (system, camera)
    }

    #[test]
    fn test_spawn_state() {
        let (system, camera) = pool(500, 1);
        let motion = ParticleMotion::default();
        let rect = camera.visible_rect_at(motion.spawn_depth);
        assert_eq!(system.len(), 500);
        assert_eq!(system.positions().len(), 1500);
        assert_eq!(system.colors().len(), 2000);
        for i in 0..system.len() {
            let p = system.position(i);
            assert!(rect.contains(p.truncate()));
            assert!(p.z >= -40.0 && p.z < 0.0);
            assert!(system.fall_speed(i) >= 0.05 && system.fall_speed(i) < 0.17);
            assert_eq!(system.alpha(i), 0.0);
        }
    }

    #[test]
    fn test_fade_in_increments_and_clamps() {
        let (mut system, camera) = pool(1, 2);
        system.set_particle(0, Vec3::new(0.0, 0.0, -70.0), 0.0);
        system.tick(&camera, AWAY);
        assert!((system.alpha(0) - 0.005).abs() < 1e-7);

        system.set_particle(0, Vec3::new(0.0, 0.0, -70.0), 0.998);
        system.tick(&camera, AWAY);
        assert_eq!(system.alpha(0), 1.0);
        for _ in 0..10 {
            system.tick(&camera, AWAY);
            assert!(system.alpha(0) <= 1.0);
        }
    }

    #[test]
    fn test_depth_advances_by_fall_speed() {
        let (mut system, camera) = pool(50, 3);
        for i in 0..system.len() {
            system.set_particle(i, Vec3::new(0.0, 0.0, -60.0), 0.0);
        }
        system.tick(&camera, AWAY);
        for i in 0..system.len() {
            let expected = -60.0 + system.fall_speed(i);
            assert!((system.position(i).z - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_wrap_recycles_slot() {
        let (mut system, mut camera) = pool(1, 4);
        camera.set_viewport(1000.0, 500.0);
        let rect = camera.visible_rect_at(ParticleMotion::default().interaction_depth);

        for _ in 0..2000 {
            system.set_particle(0, Vec3::new(0.0, 0.0, -0.01), 1.0);
            system.tick(&camera, AWAY);
            let p = system.position(0);
            assert!(p.z < 0.0);
            assert!(p.z >= -80.0 && p.z < -40.0);
            assert_eq!(system.alpha(0), 0.0);
            assert!(rect.contains(p.truncate()), "{:?} outside {:?}", p, rect);
        }
    }

    #[test]
    fn test_repulsion_moves_particle_away_from_pointer() {
        let (mut system, camera) = pool(1, 5);
        system.set_particle(0, Vec3::new(2.0, 0.0, -10.0), 0.5);
        system.tick(&camera, Vec2::ZERO);
        assert!(system.position(0).x > 2.0);
    }

    #[test]
    fn test_pool_size_is_invariant() {
        for kind in [ForceLawKind::Repulsion, ForceLawKind::Orbit] {
            let mut camera = PerspectiveCamera::default();
            let mut system =
                ParticleSystem::spawn_seeded(300, ParticleMotion::default(), kind.build(), &camera, 6);
            for frame in 0..1500 {
                if frame % 200 == 0 {
                    camera.set_viewport(800.0 + frame as f32, 600.0);
                }
                let pointer = Vec2::new((frame as f32 * 0.01).sin() * 5.0, 0.0);
                system.tick(&camera, pointer);
                assert_eq!(system.len(), 300);
                assert_eq!(system.positions().len(), 900);
                assert_eq!(system.colors().len(), 1200);
            }
            for i in 0..system.len() {
                let a = system.alpha(i);
                assert!((0.0..=1.0).contains(&a));
                assert!(system.position(i).z <= 0.0);
            }
        }
    }
}
