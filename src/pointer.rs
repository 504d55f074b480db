//! Latest pointer position shared between the input handler and the frame loop.
//!
//! The window's cursor events are the only writer ([`PointerTracker::record`]);
//! the frame loop reads one snapshot per frame through a [`PointerHandle`].
//! Both live on the event-loop thread, so a `Cell` is enough. A multi-threaded
//! renderer would need to publish the sample as one atomic snapshot instead, since
//! readers must never see `x` from one event and `y` from another.

use glam::Vec2;
use std::cell::Cell;
use std::rc::Rc;

/// Raw pointer coordinates in window pixels, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalized device coordinates: `[-1, 1]` on both axes, +Y up.
    ///
    /// A zero-sized viewport maps everything to the centre.
    pub fn to_ndc(&self, viewport: Vec2) -> Vec2 {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (self.x / viewport.x) * 2.0 - 1.0,
            -(self.y / viewport.y) * 2.0 + 1.0,
        )
    }
}

/// Owner and single writer of the pointer state.
#[derive(Debug, Default)]
pub struct PointerTracker {
    latest: Rc<Cell<PointerSample>>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the latest sample.
    pub fn record(&self, x: f32, y: f32) {
        self.latest.set(PointerSample::new(x, y));
    }

    pub fn latest(&self) -> PointerSample {
        self.latest.get()
    }

    /// Read-only view for the frame loop.
    pub fn handle(&self) -> PointerHandle {
        PointerHandle {
            latest: Rc::clone(&self.latest),
        }
    }
}

/// Read-only view of the pointer state.
#[derive(Debug, Clone)]
pub struct PointerHandle {
    latest: Rc<Cell<PointerSample>>,
}

impl PointerHandle {
    pub fn latest(&self) -> PointerSample {
        self.latest.get()
    }
}
