//! Tendril Host Abstraction Layer
//!
//! The animation behaviors in `tendril_core` never read engine state on their
//! own. Everything they consume from the embedding host goes through the
//! small set of traits in this crate:
//! - Time (`FrameClock`, `FrameTime`)
//! - Transforms (`PositionSource`, `AnchorSource`, `SteeringJoint`)
//! - Rendering (`LineSink`)
//!
//! A real engine implements these on its own scene objects; the simulation
//! harness in `tendril_sim` implements them on a scripted scene.
//!
//! # Example
//!
//! ```ignore
//! use tendril_env::{FrameClock, WallClock};
//!
//! let mut clock = WallClock::new(60)?;
//! loop {
//!     let time = clock.next_frame().await;
//!     chain.advance(&time, &mut scene)?;
//! }
//! ```

mod context;
mod scene;
mod types;
mod error;
mod tokio_impl;

pub use context::FrameClock;
pub use scene::{AnchorSource, LineSink, PositionSource, SteeringJoint};
pub use types::{FrameTime, Pose};
pub use error::EnvError;
pub use tokio_impl::WallClock;
