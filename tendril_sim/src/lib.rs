//! Tendril Deterministic Frame-Stepping Harness
//!
//! This crate runs the tendril behaviors inside a scripted scene where every
//! source of variation is controlled:
//! - **Time**: a virtual fixed-step clock (or a tokio wall clock for live runs)
//! - **Motion**: anchor and target scripts seeded from a single 64-bit seed
//! - **Output**: a recording line sink that checks every publish
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        SimWorld                          │
//! │  ┌──────────┐   FrameTime   ┌──────────────────────────┐ │
//! │  │ SimClock │──────────────►│ SegmentChain             │ │
//! │  └──────────┘               │ FacingRotator            │ │
//! │                             └───────────┬──────────────┘ │
//! │  ┌──────────┐   poses       ┌───────────▼──────────────┐ │
//! │  │  Movers  │──────────────►│ Scene (root ─► steering  │ │
//! │  └──────────┘               │  ─► anchor, body, sink)  │ │
//! │                             └──────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tendril_sim::{ScenarioRunner, ScenarioId};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::Teleport);
//! assert!(result.passed);
//! ```

mod context;
mod error;
mod exporter;
mod motion;
mod runner;
mod scene;
mod world;
pub mod scenarios;

pub use context::SimClock;
pub use error::SimError;
pub use exporter::{PointRecord, SimExport, SimFrame};
pub use motion::{MotionScript, Mover};
pub use runner::{ScenarioMetrics, ScenarioPlan, ScenarioResult, ScenarioRunner, ScenarioSession};
pub use scenarios::ScenarioId;
pub use scene::{RecordingSink, Scene};
pub use world::{wrap_degrees, FrameReport, SimConfig, SimWorld};
