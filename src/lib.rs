//! # driftfield
//!
//! A mouse-reactive particle field behind a slab of extruded holographic text,
//! rendered natively with wgpu.
//!
//! ## Quick Start
//!
//! ```ignore
//! use driftfield::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let config = SceneConfig::new()
//!         .with_text("hello")
//!         .with_font("assets/fonts/helvetiker_regular.typeface.json")
//!         .with_sprite("assets/textures/circle.png");
//!     run(config)
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle field
//!
//! A fixed pool of particles ([`ParticleSystem`]) drifts toward the camera.
//! Positions are drawn from a Gaussian cluster on the rectangle the camera
//! sees at the interaction depth ([`VisibleRect`]); a particle that passes the
//! camera is recycled in place behind the field and fades back in.
//!
//! ### Pointer forces
//!
//! The pointer is projected into the scene once per frame and handed to a
//! [`ForceLaw`]. [`Repulsion`] pushes nearby particles away; [`Orbit`] swirls
//! them around the pointer instead.
//!
//! ### Holographic text
//!
//! Text is extruded from a typeface JSON font on a background thread. Its
//! material is a lit WGSL shader generated by [`host_shader`]; the
//! holographic colour is spliced into it at known anchor points by
//! [`inject_holographic`]. A missing anchor is reported as a
//! [`ShaderError`] and the plain material is used instead.
//!
//! ## Feature Overview
//!
//! | Category | Options |
//! |----------|---------|
//! | Pool size | [`ParticleCountPolicy::Fixed`], [`ParticleCountPolicy::ViewportArea`] |
//! | Forces | [`ForceLawKind::Repulsion`], [`ForceLawKind::Orbit`] |
//! | Materials | [`MaterialStyle::Physical`], [`MaterialStyle::Standard`], [`MaterialStyle::Basic`] |
//! | Post | [`PostChain::BloomVignette`], [`PostChain::BloomOnly`], [`PostChain::None`] |

pub mod camera;
pub mod composer;
pub mod config;
pub mod error;
pub mod force;
pub mod frustum;
pub mod gaussian;
pub mod gpu;
pub mod lights;
pub mod material;
pub mod mesh;
pub mod particles;
pub mod pointer;
pub mod shader_override;
pub mod shader_utils;
pub mod sky;
pub mod text;
pub mod time;
mod window;

pub use camera::PerspectiveCamera;
pub use composer::{text_rotation, ComposerState};
pub use config::{
    ForceLawKind, ParticleCountPolicy, ParticleMotion, PostChain, SceneConfig, TextConfig,
};
pub use error::{ConfigError, FontError, GpuError, SceneError, ShaderError, ShaderStage, TextureError};
pub use force::{compute_repulsion, pointer_to_scene, ForceLaw, Orbit, Repulsion, POINTER_SCALE};
pub use frustum::{visible_rect, VisibleRect};
pub use glam::{Vec2, Vec3};
pub use material::{host_shader, MaterialStyle};
pub use mesh::{MeshData, MeshVertex};
pub use particles::ParticleSystem;
pub use pointer::{PointerHandle, PointerSample, PointerTracker};
pub use shader_override::{apply_patches, inject_holographic, ShaderPatch};
pub use text::{TextLoader, TextStyle, Typeface};
pub use time::FrameClock;
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use driftfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ForceLawKind, ParticleCountPolicy, PostChain, SceneConfig};
    pub use crate::error::SceneError;
    pub use crate::material::MaterialStyle;
    pub use crate::window::run;
    pub use crate::{Vec2, Vec3};
}
