//! Tendril Core - Frame-Driven Secondary Motion
//!
//! Two small behaviors a host engine advances once per frame:
//! 1. **SegmentChain**: a trailing "tentacle" of points chasing an anchor with
//!    critically-damped smoothing, plus a sinusoidal wiggle on a steering joint
//! 2. **FacingRotator**: turns an object in the XY plane to face a target
//!
//! Neither behavior reads global state. Time arrives as a `FrameTime` and
//! every scene object is borrowed through the traits in `tendril_env`.

pub mod config;
pub mod convergence;
pub mod error;
pub mod facing;
pub mod segment_chain;
pub mod smoothing;

// Re-export key types for convenience
pub use config::{ChainConfig, FacingConfig, RigConfig};
pub use convergence::{ConvergenceReport, ConvergenceTracker};
pub use error::AnimError;
pub use facing::FacingRotator;
pub use segment_chain::{ChainSnapshot, SegmentChain};
pub use smoothing::smooth_damp;
