//! Host clock trait.

use crate::types::FrameTime;
use std::time::Duration;

/// The host's per-frame clock.
///
/// Behaviors never sample time themselves. The host reads its clock once per
/// frame and hands the resulting [`FrameTime`] to every `advance` call, so a
/// whole frame observes a single consistent time.
///
/// # Implementations
///
/// - **Real time**: `WallClock` - paced by a tokio interval
/// - **Simulation**: `SimClock` (in `tendril_sim`) - fixed virtual step
pub trait FrameClock {
    /// Returns the sample for the current frame.
    fn frame_time(&self) -> FrameTime;

    /// Returns the elapsed time since the clock started.
    fn now(&self) -> Duration {
        Duration::from_secs_f32(self.frame_time().time.max(0.0))
    }

    /// Returns the number of frames produced so far.
    fn frame(&self) -> u64 {
        self.frame_time().frame
    }
}
