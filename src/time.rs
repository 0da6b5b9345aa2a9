//! Frame timing.
//!
//! The [`Clock`] is ticked once per rendered frame and decides how far
//! particles move that frame. With [`StepMode::Fixed`] every tick moves by
//! the same increment, so on a 120 Hz display particles drift twice as fast
//! as on a 60 Hz one. [`StepMode::DeltaTime`] scales by real elapsed time
//! instead, normalized so that one frame at `reference_fps` is a scale of 1.0.
//!
//! ```ignore
//! let mut clock = Clock::new(StepMode::Fixed { increment: 1.0 });
//!
//! // In your frame callback:
//! let tick = clock.tick();
//! motion::step(&mut set, tick.scale, EdgeMode::Bounce);
//! println!("FPS: {:.1}", clock.fps());
//! ```

use std::time::{Duration, Instant};

use crate::config::StepMode;

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Seconds of unpaused time since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous tick (0 while paused).
    pub delta: f32,
    /// Motion multiplier for this tick (0 while paused).
    pub scale: f32,
    /// Frames ticked so far, including this one.
    pub frame: u64,
}

/// Frame clock with pause support and FPS measurement.
#[derive(Debug)]
pub struct Clock {
    mode: StepMode,
    /// When the last real-time tick occurred.
    last_instant: Option<Instant>,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    /// Frames and seconds accumulated since the last FPS update.
    fps_frames: u32,
    fps_secs: f32,
    fps_update_interval: Duration,
    paused: bool,
}

impl Clock {
    pub fn new(mode: StepMode) -> Self {
        Self {
            mode,
            last_instant: None,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_secs: 0.0,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
        }
    }

    #[inline]
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: StepMode) {
        self.mode = mode;
    }

    /// Tick using the wall clock.
    ///
    /// The first tick after creation or [`Clock::resume`] has a zero delta.
    pub fn tick(&mut self) -> Tick {
        let now = Instant::now();
        let delta = self
            .last_instant
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_instant = Some(now);
        self.advance(delta)
    }

    /// Tick with an explicit delta in seconds. Deterministic; used by
    /// headless rendering and tests.
    pub fn advance(&mut self, delta: f32) -> Tick {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.frame_count += 1;

        if self.paused {
            self.delta_secs = 0.0;
            return self.snapshot(0.0);
        }

        self.delta_secs = delta;
        self.elapsed_secs += delta;

        self.fps_frames += 1;
        self.fps_secs += delta;
        if self.fps_secs >= self.fps_update_interval.as_secs_f32() {
            self.fps = self.fps_frames as f32 / self.fps_secs;
            self.fps_frames = 0;
            self.fps_secs = 0.0;
        }

        let scale = self.scale_for(delta);
        self.snapshot(scale)
    }

    /// Motion multiplier for a frame that took `delta` seconds.
    pub fn scale_for(&self, delta: f32) -> f32 {
        match self.mode {
            StepMode::Fixed { increment } => increment,
            StepMode::DeltaTime {
                reference_fps,
                max_delta,
            } => delta.clamp(0.0, max_delta) * reference_fps,
        }
    }

    fn snapshot(&self, scale: f32) -> Tick {
        Tick {
            elapsed: self.elapsed_secs,
            delta: self.delta_secs,
            scale,
            frame: self.frame_count,
        }
    }

    /// Total unpaused seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds covered by the last tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Measured frames per second, refreshed every half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop motion and twinkle; ticks keep counting frames.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // the paused interval must not show up as one giant delta
            self.last_instant = None;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Back to frame zero.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(StepMode::default())
    }
}
