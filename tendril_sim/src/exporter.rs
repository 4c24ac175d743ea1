//! JSON exporter for offline plotting.
//!
//! Exports sampled simulation frames (segment positions, heading) as JSON.

use crate::error::SimError;
use crate::world::SimWorld;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tendril_env::PositionSource;

/// A single frame of simulation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimFrame {
    pub frame: u64,

    /// Simulation time in seconds
    pub time_sec: f64,

    /// Anchor position (the chain head's target)
    pub anchor: PointRecord,

    /// Segment positions, head first
    pub segments: Vec<PointRecord>,

    /// Facing body heading in degrees
    pub heading_deg: f32,

    /// Facing target position
    pub target: PointRecord,

    /// Largest segment residual this frame
    pub max_residual: f32,
}

impl SimFrame {
    /// Samples the world's current state.
    pub fn capture(world: &SimWorld, max_residual: f32) -> Self {
        let scene = world.scene();
        Self {
            frame: world.last_time().frame,
            time_sec: world.time(),
            anchor: PointRecord::from(&scene.position()),
            segments: world.chain().positions().iter().map(PointRecord::from).collect(),
            heading_deg: world.rotator().heading_degrees(),
            target: PointRecord::from(&scene.target),
            max_residual,
        }
    }
}

/// Position of a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<&Point3<f32>> for PointRecord {
    fn from(p: &Point3<f32>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Tick rate in Hz
    pub tick_rate_hz: u32,

    /// Duration in seconds
    pub duration_sec: f64,

    /// Sampled frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, tick_rate_hz: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            tick_rate_hz,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
            failure_reason: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, failure_reason: Option<String>) {
        self.passed = passed;
        self.failure_reason = failure_reason;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
