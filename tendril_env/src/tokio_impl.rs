//! Real-time implementation of FrameClock using Tokio.

use crate::context::FrameClock;
use crate::error::EnvError;
use crate::types::FrameTime;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Wall-clock frame source paced by a tokio interval.
///
/// Each `next_frame` waits for the next tick at the configured rate and
/// samples elapsed time from the tick instant. Late ticks are skipped rather
/// than burst, so a stalled host sees one large `delta` instead of a run of
/// zero-length frames.
pub struct WallClock {
    /// Target frame period
    period: Duration,

    /// Created on the first frame, inside the runtime
    interval: Option<Interval>,

    /// Instant of frame 0
    start: Option<Instant>,

    /// Instant of the previous frame
    last: Option<Instant>,

    /// Frames produced so far
    frames: u64,

    /// Most recent sample
    current: FrameTime,
}

impl WallClock {
    /// Creates a clock ticking at `frames_per_second`.
    pub fn new(frames_per_second: u32) -> Result<Self, EnvError> {
        if frames_per_second == 0 {
            return Err(EnvError::clock("frame rate must be positive"));
        }
        Ok(Self {
            period: Duration::from_secs_f64(1.0 / frames_per_second as f64),
            interval: None,
            start: None,
            last: None,
            frames: 0,
            current: FrameTime::default(),
        })
    }

    /// Returns the target frame period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits for the next frame and returns its sample.
    pub async fn next_frame(&mut self) -> FrameTime {
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        let now = interval.tick().await;

        let start = *self.start.get_or_insert(now);
        let delta = match self.last.replace(now) {
            Some(previous) => (now - previous).as_secs_f32(),
            None => 0.0,
        };

        self.current = FrameTime::new(self.frames, delta, (now - start).as_secs_f32());
        self.frames += 1;
        self.current
    }
}

impl FrameClock for WallClock {
    fn frame_time(&self) -> FrameTime {
        self.current
    }
}
