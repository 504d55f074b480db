//! Monotonic frame clock.
//!
//! The holographic shader's `time` uniform is seconds since the scene was
//! mounted, read once per rendered frame. It does not depend on how many
//! simulation ticks have run.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! // once per frame:
//! let time = clock.tick();
//! queue.write_buffer(&time_buffer, 0, bytemuck::bytes_of(&TimeUniform::new(time)));
//! ```

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_updated: bool,
}

/// How often the FPS estimate refreshes.
const FPS_INTERVAL: Duration = Duration::from_millis(500);

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_updated: false,
        }
    }

    /// Advance to the current instant. Returns seconds since start.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.saturating_duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let since_fps = now.saturating_duration_since(self.fps_update_time);
        self.fps_updated = since_fps >= FPS_INTERVAL;
        if self.fps_updated {
            self.fps = (self.frame_count - self.fps_frame_count) as f32 / since_fps.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_secs
    }

    /// Seconds since start, as of the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the last two ticks.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// True when the last tick refreshed [`fps`](Self::fps).
    #[inline]
    pub fn fps_updated(&self) -> bool {
        self.fps_updated
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
