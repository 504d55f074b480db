//! Scene configuration.
//!
//! Every tunable lives in [`SceneConfig`]. Defaults reproduce the richest
//! variant of the scene (viewport-sized pool, repulsion, bloom + vignette,
//! physical material with the holographic override); the enums select the
//! leaner variants.
//!
//! Configs can be built in code with the `with_*` methods or loaded from JSON,
//! where every field is optional:
//!
//! ```json
//! {
//!   "particles": { "count": { "fixed": 1500 }, "force_law": "orbit" },
//!   "post": { "chain": "bloom_only" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::force::{ForceLaw, Orbit, Repulsion};
use crate::material::MaterialStyle;
use crate::text::Bevel;

/// Viewport area the `ViewportArea` policy's `base_count` is calibrated for.
pub const REFERENCE_AREA: f64 = 1920.0 * 1080.0;

/// How many particles the pool holds. Resolved once at mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleCountPolicy {
    Fixed(usize),
    /// `floor(area / REFERENCE_AREA * base_count)`, clamped to `[min, max]`.
    ViewportArea { base_count: usize, min: usize, max: usize },
}

impl Default for ParticleCountPolicy {
    fn default() -> Self {
        ParticleCountPolicy::ViewportArea {
            base_count: 2500,
            min: 1000,
            max: 3000,
        }
    }
}

impl ParticleCountPolicy {
    /// Pool size for a viewport of `width` × `height` logical pixels.
    pub fn resolve(&self, width: f64, height: f64) -> usize {
        match *self {
            ParticleCountPolicy::Fixed(n) => n,
            ParticleCountPolicy::ViewportArea { base_count, min, max } => {
                let count = (width * height / REFERENCE_AREA * base_count as f64).floor();
                // an empty range resolves to `max` instead of panicking
                (count.max(0.0) as usize).max(min).min(max)
            }
        }
    }

    /// Reject a `ViewportArea` range with `min > max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ParticleCountPolicy::ViewportArea { min, max, .. } if min > max => {
                Err(ConfigError::InvalidCountRange { min, max })
            }
            _ => Ok(()),
        }
    }
}

/// Which force law the pointer applies to particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceLawKind {
    #[default]
    Repulsion,
    Orbit,
}

impl ForceLawKind {
    pub fn build(self) -> Box<dyn ForceLaw> {
        match self {
            ForceLawKind::Repulsion => Box::new(Repulsion::default()),
            ForceLawKind::Orbit => Box::new(Orbit::default()),
        }
    }
}

/// Post-processing passes between the scene render and the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostChain {
    #[default]
    BloomVignette,
    BloomOnly,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub z: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 4000.0,
            z: 0.0,
        }
    }
}

/// Per-tick particle motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleMotion {
    /// Depth whose visible rectangle seeds the initial spawn.
    pub spawn_depth: f32,
    /// Depth whose visible rectangle seeds recycled particles.
    pub interaction_depth: f32,
    /// Initial depth range, `[start, end)`.
    pub initial_depth: [f32; 2],
    /// Depth range for recycled particles, `[start, end)`.
    pub wrap_depth: [f32; 2],
    /// Per-tick advance along +Z, `[start, end)`.
    pub fall_speed: [f32; 2],
    /// Alpha gained per tick until fully opaque.
    pub fade_increment: f32,
}

impl Default for ParticleMotion {
    fn default() -> Self {
        Self {
            spawn_depth: -25.0,
            interaction_depth: -25.0,
            initial_depth: [-40.0, 0.0],
            wrap_depth: [-80.0, -40.0],
            fall_speed: [0.05, 0.17],
            fade_increment: 0.005,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: ParticleCountPolicy,
    pub force_law: ForceLawKind,
    /// Sprite edge length in world units.
    pub size: f32,
    pub sprite_path: PathBuf,
    pub motion: ParticleMotion,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: ParticleCountPolicy::default(),
            force_law: ForceLawKind::default(),
            size: 0.1,
            sprite_path: PathBuf::from("assets/img/circle.png"),
            motion: ParticleMotion::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub content: String,
    pub font_path: PathBuf,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    /// `null` in JSON gives square edges.
    pub bevel: Option<Bevel>,
    pub z: f32,
    /// Largest tilt toward the pointer, in radians.
    pub max_rotation: f32,
    pub material: MaterialStyle,
    pub color: u32,
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "mobinh.dev".to_string(),
            font_path: PathBuf::from("assets/fonts/lexend_giga_regular.typeface.json"),
            size: 3.0,
            depth: 0.5,
            curve_segments: 12,
            bevel: Some(Bevel::default()),
            z: -25.0,
            max_rotation: 0.1,
            material: MaterialStyle::default(),
            color: 0xffffff,
            metalness: 0.9,
            roughness: 0.2,
            clearcoat: 1.0,
            clearcoat_roughness: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub top_color: u32,
    pub bottom_color: u32,
    pub radius: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            top_color: 0x111112,
            bottom_color: 0x27273b,
            radius: 2000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    pub strength: f32,
    /// Blur spread; 0 keeps the kernel at one texel per tap.
    pub radius: f32,
    /// Luminance above which pixels bloom.
    pub threshold: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            strength: 1.0,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteConfig {
    /// Distance from the centre (in UV units) where darkening starts.
    pub offset: f32,
    /// Distance where the image is fully dark. Must exceed `offset`.
    pub darkness: f32,
}

impl Default for VignetteConfig {
    fn default() -> Self {
        Self {
            offset: 0.3,
            darkness: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub chain: PostChain,
    pub bloom: BloomConfig,
    pub vignette: VignetteConfig,
}

/// Complete scene configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub text: TextConfig,
    pub sky: SkyConfig,
    pub post: PostConfig,
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.particles.count.validate()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_particle_count(mut self, policy: ParticleCountPolicy) -> Self {
        self.particles.count = policy;
        self
    }

    pub fn with_force_law(mut self, kind: ForceLawKind) -> Self {
        self.particles.force_law = kind;
        self
    }

    pub fn with_post_chain(mut self, chain: PostChain) -> Self {
        self.post.chain = chain;
        self
    }

    pub fn with_material(mut self, style: MaterialStyle) -> Self {
        self.text.material = style;
        self
    }

    pub fn with_text(mut self, content: impl Into<String>) -> Self {
        self.text.content = content.into();
        self
    }

    pub fn with_font<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.text.font_path = path.into();
        self
    }

    pub fn with_sprite<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.particles.sprite_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_area_policy() {
        let policy = ParticleCountPolicy::default();
        assert_eq!(policy.resolve(1920.0, 1080.0), 2500);
        assert_eq!(policy.resolve(100.0, 100.0), 1000);
        assert_eq!(policy.resolve(3840.0, 2160.0), 3000);
        // 1280x720 -> 1111.1 -> floor
        assert_eq!(policy.resolve(1280.0, 720.0), 1111);
    }

    #[test]
    fn test_fixed_policy_ignores_viewport() {
        let policy = ParticleCountPolicy::Fixed(1234);
        assert_eq!(policy.resolve(1.0, 1.0), 1234);
        assert_eq!(policy.resolve(5000.0, 5000.0), 1234);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(
            r#"{
                "particles": { "count": { "fixed": 1500 }, "force_law": "orbit" },
                "post": { "chain": "bloom_only" },
                "text": { "material": "basic" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.particles.count, ParticleCountPolicy::Fixed(1500));
        assert_eq!(config.particles.force_law, ForceLawKind::Orbit);
        assert_eq!(config.post.chain, PostChain::BloomOnly);
        assert_eq!(config.text.material, MaterialStyle::Basic);
        assert_eq!(config.text.content, "mobinh.dev");
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_null_bevel_disables_it() {
        let config = SceneConfig::from_json_str(r#"{ "text": { "bevel": null } }"#).unwrap();
        assert_eq!(config.text.bevel, None);
        assert_eq!(SceneConfig::default().text.bevel, Some(Bevel::default()));

        let config = SceneConfig::from_json_str(r#"{ "text": { "bevel": { "segments": 2 } } }"#).unwrap();
        assert_eq!(config.text.bevel, Some(Bevel { segments: 2, ..Bevel::default() }));
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let json = serde_json::to_string(&SceneConfig::default()).unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            SceneConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SceneConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_inverted_count_range_is_an_error() {
        let json = r#"{ "particles": { "count": { "viewport_area": { "base_count": 2500, "min": 3000, "max": 1000 } } } }"#;
        match SceneConfig::from_json_str(json) {
            Err(ConfigError::InvalidCountRange { min, max }) => {
                assert_eq!((min, max), (3000, 1000));
            }
            other => panic!("expected an invalid range, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_count_range_resolves_without_panic() {
        let policy = ParticleCountPolicy::ViewportArea {
            base_count: 2500,
            min: 3000,
            max: 1000,
        };
        assert_eq!(policy.resolve(1920.0, 1080.0), 1000);
        assert_eq!(policy.resolve(0.0, 0.0), 1000);
        assert!(SceneConfig::new().with_particle_count(policy).validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = SceneConfig::new()
            .with_post_chain(PostChain::None)
            .with_material(MaterialStyle::Standard)
            .with_text("hello")
            .with_force_law(ForceLawKind::Orbit);
        assert_eq!(config.post.chain, PostChain::None);
        assert_eq!(config.text.material, MaterialStyle::Standard);
        assert_eq!(config.text.content, "hello");
        assert_eq!(config.particles.force_law, ForceLawKind::Orbit);
    }
}
