//! End-to-end properties of the scene's CPU side.
//!
//! These exercise the public API the window loop uses: pool sizing, the
//! particle tick, the pointer force, and the holographic shader splice.

use driftfield::config::ParticleMotion;
use driftfield::material::DIFFUSE_ANCHOR;
use driftfield::{
    compute_repulsion, host_shader, inject_holographic, pointer_to_scene, visible_rect, ForceLawKind, MaterialStyle,
    ParticleCountPolicy, ParticleSystem, PerspectiveCamera, PointerSample, Repulsion, SceneConfig, ShaderError,
    Vec2, Vec3, POINTER_SCALE,
};

// ============================================================================
// Pool sizing
// ============================================================================

#[test]
fn test_pool_size_at_reference_viewport() {
    let policy = ParticleCountPolicy::default();
    assert_eq!(policy.resolve(1920.0, 1080.0), 2500);
}

#[test]
fn test_pool_size_clamps_small_viewport() {
    let policy = ParticleCountPolicy::default();
    assert_eq!(policy.resolve(100.0, 100.0), 1000);
    assert_eq!(policy.resolve(0.0, 0.0), 1000);
}

#[test]
fn test_pool_size_clamps_large_viewport() {
    let policy = ParticleCountPolicy::default();
    assert_eq!(policy.resolve(3840.0, 2160.0), 3000);
}

#[test]
fn test_config_json_overrides_pool_size() {
    let config = SceneConfig::from_json_str(r#"{ "particles": { "count": { "fixed": 64 } } }"#).unwrap();
    assert_eq!(config.particles.count.resolve(1920.0, 1080.0), 64);
    // untouched sections keep their defaults
    assert_eq!(config.text, SceneConfig::default().text);
}

// ============================================================================
// Particle pool
// ============================================================================

fn camera() -> PerspectiveCamera {
    PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 4000.0)
}

#[test]
fn test_pool_size_is_invariant_over_many_ticks() {
    let camera = camera();
    let mut system = ParticleSystem::spawn_seeded(
        500,
        ParticleMotion::default(),
        ForceLawKind::Repulsion.build(),
        &camera,
        7,
    );

    let pointer = pointer_to_scene(&camera, Vec2::new(0.2, -0.3), POINTER_SCALE);
    for _ in 0..2000 {
        system.tick(&camera, pointer);
        assert_eq!(system.len(), 500);
        assert_eq!(system.positions().len(), 500 * 3);
        assert_eq!(system.colors().len(), 500 * 4);
    }

    for slot in 0..system.len() {
        let alpha = system.alpha(slot);
        assert!((0.0..=1.0).contains(&alpha));
        assert!(system.position(slot).z <= 0.0);
    }
}

#[test]
fn test_recycled_particles_fade_in_from_behind() {
    let camera = camera();
    let motion = ParticleMotion::default();
    let mut system = ParticleSystem::spawn_seeded(
        1,
        motion.clone(),
        ForceLawKind::Repulsion.build(),
        &camera,
        3,
    );
    system.set_particle(0, Vec3::new(0.0, 0.0, -0.001), 1.0);

    system.tick(&camera, Vec2::splat(1000.0));

    let z = system.position(0).z;
    assert!(z >= motion.wrap_depth[0] && z < motion.wrap_depth[1], "wrapped to {}", z);
    assert_eq!(system.alpha(0), 0.0);
}

#[test]
fn test_pool_survives_resize() {
    let mut camera = camera();
    let mut system = ParticleSystem::spawn_seeded(
        1200,
        ParticleMotion::default(),
        ForceLawKind::Orbit.build(),
        &camera,
        11,
    );

    for (width, height) in [(800.0, 600.0), (400.0, 1200.0), (2560.0, 1080.0)] {
        camera.set_viewport(width, height);
        for _ in 0..300 {
            system.tick(&camera, Vec2::ZERO);
        }
        assert_eq!(system.len(), 1200);
    }
}

// ============================================================================
// Frustum and pointer
// ============================================================================

#[test]
fn test_visible_rect_is_symmetric() {
    let rect = visible_rect(75.0, 16.0 / 9.0, 0.0, -25.0);
    assert!((rect.left + rect.right).abs() < 1e-5);
    assert!((rect.top + rect.bottom).abs() < 1e-5);
    assert!((rect.width() / rect.height() - 16.0 / 9.0).abs() < 1e-4);
}

#[test]
fn test_centre_pointer_projects_to_origin() {
    let camera = camera();
    let ndc = PointerSample::new(960.0, 540.0).to_ndc(Vec2::new(1920.0, 1080.0));
    assert_eq!(ndc, Vec2::ZERO);
    let scene = pointer_to_scene(&camera, ndc, POINTER_SCALE);
    assert!(scene.length() < 1e-3);
}

#[test]
fn test_repulsion_is_zero_beyond_max_depth() {
    let law = Repulsion::default();
    for pointer in [Vec2::ZERO, Vec2::new(0.5, 0.5), Vec2::new(-3.0, 2.0)] {
        let deep = Vec3::new(pointer.x + 0.1, pointer.y, -(law.max_depth + 1.0));
        assert_eq!(law.force(deep, pointer), Vec2::ZERO);
    }
}

#[test]
fn test_repulsion_decays_with_distance() {
    let law = Repulsion::default();
    let mut previous = f32::MAX;
    for i in 1..=20 {
        let distance = law.radius * i as f32 / 20.0;
        let magnitude = law.force(Vec3::new(distance, 0.0, -10.0), Vec2::ZERO).length();
        assert!(magnitude <= previous);
        previous = magnitude;
    }
    assert_eq!(previous, 0.0);
}

#[test]
fn test_screen_pointer_repulsion_matches_scene_pointer() {
    let camera = camera();
    let viewport = Vec2::new(1920.0, 1080.0);
    let pointer_px = Vec2::new(1200.0, 400.0);
    let ndc = PointerSample::new(pointer_px.x, pointer_px.y).to_ndc(viewport);
    let pointer = pointer_to_scene(&camera, ndc, POINTER_SCALE);

    let particle = Vec3::new(pointer.x + 1.0, pointer.y - 0.5, -10.0);
    let from_screen = compute_repulsion(particle, pointer_px, viewport, &camera);
    let from_scene = Repulsion::default().force(particle, pointer);
    assert!(from_screen.length() > 0.0);
    assert!((from_screen - from_scene).length() < 1e-6);

    let deep = Vec3::new(particle.x, particle.y, -100.0);
    assert_eq!(compute_repulsion(deep, pointer_px, viewport, &camera), Vec2::ZERO);
}

// ============================================================================
// Holographic shader splice
// ============================================================================

#[test]
fn test_injection_declares_time_and_replaces_diffuse() {
    let host = host_shader(MaterialStyle::Physical);
    assert!(host.contains(DIFFUSE_ANCHOR));

    let injected = inject_holographic(&host).unwrap();
    assert!(injected.contains("var<uniform> time_uniform: TimeUniform;"));
    assert!(!injected.contains(DIFFUSE_ANCHOR));
    assert!(injected.contains("holographic_color(in.v_uv, time_uniform.time)"));
}

#[test]
fn test_injection_reports_missing_anchor() {
    let host = host_shader(MaterialStyle::Standard).replace(DIFFUSE_ANCHOR, "");
    match inject_holographic(&host) {
        Err(ShaderError::AnchorNotFound { anchor, .. }) => assert_eq!(anchor, DIFFUSE_ANCHOR),
        other => panic!("expected a missing anchor, got {:?}", other.map(|s| s.len())),
    }
}
