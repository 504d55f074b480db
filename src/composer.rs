//! Scene lifecycle and per-frame ordering.
//!
//! ```text
//! Uninitialized --mount--> Mounted --first frame--> Running
//!                             |                        |
//!                             +-------unmount----------+--> Unmounted
//! ```
//!
//! Each frame runs in a fixed order:
//!
//! 1. advance the shader `time` uniform
//! 2. tilt the text toward the pointer ([`text_rotation`])
//! 3. tick the particle pool
//! 4. render through the post-processing chain
//!
//! Once unmounted, no frame runs and no further redraw is requested.

use glam::Vec2;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposerState {
    #[default]
    Uninitialized,
    /// Scene built; text may still be loading.
    Mounted,
    /// At least one frame has been rendered.
    Running,
    /// Torn down. Terminal.
    Unmounted,
}

impl ComposerState {
    /// `Uninitialized -> Mounted`. Returns whether the transition happened.
    pub fn mount(&mut self) -> bool {
        self.transition(ComposerState::Mounted, matches!(self, ComposerState::Uninitialized))
    }

    /// `Mounted -> Running` on the first frame; `Running` stays put.
    ///
    /// Returns whether a frame may run.
    pub fn begin_frame(&mut self) -> bool {
        match self {
            ComposerState::Mounted => self.transition(ComposerState::Running, true),
            ComposerState::Running => true,
            _ => false,
        }
    }

    /// `Mounted | Running -> Unmounted`.
    pub fn unmount(&mut self) -> bool {
        let legal = matches!(self, ComposerState::Mounted | ComposerState::Running);
        self.transition(ComposerState::Unmounted, legal)
    }

    /// Whether frames, pointer and resize events should still be processed.
    pub fn accepts_frame(&self) -> bool {
        matches!(self, ComposerState::Mounted | ComposerState::Running)
    }

    fn transition(&mut self, to: ComposerState, legal: bool) -> bool {
        if legal {
            debug!("Composer {:?} -> {:?}", self, to);
            *self = to;
        }
        legal
    }
}

/// Text tilt `(rotation_x, rotation_y)` for a pointer in normalized device
/// coordinates (`+y` up): `rotation_y = x * max`, `rotation_x = -y * max`.
pub fn text_rotation(pointer_ndc: Vec2, max_rotation: f32) -> (f32, f32) {
    let p = pointer_ndc.clamp(Vec2::NEG_ONE, Vec2::ONE);
    // pointer above centre tips the top of the text away
    (-p.y * max_rotation, p.x * max_rotation)
}
