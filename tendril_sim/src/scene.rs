//! Simulated scene: a tiny transform hierarchy plus a recording line sink.
//!
//! ```text
//! root (scripted)
//!  └── steering joint (local rotation driven by the chain's wiggle)
//!       └── anchor (fixed local offset; the chain head locks here)
//!
//! body (facing object, rotated by the facing rotator)
//! target (scripted point the body faces)
//! ```

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use tendril_env::{AnchorSource, EnvError, LineSink, Pose, PositionSource, SteeringJoint};

/// Line sink that keeps the last published vertex list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Announced vertex count
    count: Option<usize>,

    /// Last published vertices
    latest: Vec<Point3<f32>>,

    /// Number of successful publishes
    publishes: u64,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> Option<usize> {
        self.count
    }

    pub fn latest(&self) -> &[Point3<f32>] {
        &self.latest
    }

    pub fn publishes(&self) -> u64 {
        self.publishes
    }
}

impl LineSink for RecordingSink {
    fn set_count(&mut self, count: usize) {
        self.count = Some(count);
        self.latest = Vec::with_capacity(count);
    }

    fn set_positions(&mut self, positions: &[Point3<f32>]) -> Result<(), EnvError> {
        let expected = self.count.ok_or(EnvError::CountNotSet)?;
        if positions.len() != expected {
            return Err(EnvError::count_mismatch(expected, positions.len()));
        }
        self.latest.clear();
        self.latest.extend_from_slice(positions);
        self.publishes += 1;
        Ok(())
    }
}

/// All scene objects the behaviors read from and write to.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Scripted root of the chain hierarchy (world space)
    pub root: Pose,

    /// Steering joint, local to `root`
    pub steering: Pose,

    /// Anchor, local to `steering`
    pub anchor_local: Pose,

    /// Facing object (world space)
    pub body: Pose,

    /// Point the body faces (world space)
    pub target: Point3<f32>,

    /// Line renderer stand-in
    pub sink: RecordingSink,
}

impl Scene {
    /// Creates a scene with the anchor `anchor_distance` ahead (+Y) of the steering joint.
    pub fn new(anchor_distance: f32) -> Self {
        Self {
            root: Pose::default(),
            steering: Pose::default(),
            anchor_local: Pose::at(Point3::new(0.0, anchor_distance, 0.0)),
            body: Pose::default(),
            target: Point3::origin(),
            sink: RecordingSink::new(),
        }
    }

    /// World pose of the anchor through the hierarchy.
    pub fn anchor_world(&self) -> Pose {
        self.root.compose(&self.steering).compose(&self.anchor_local)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PositionSource for Scene {
    fn position(&self) -> Point3<f32> {
        self.anchor_world().position
    }
}

impl AnchorSource for Scene {
    fn lateral_axis(&self) -> Unit<Vector3<f32>> {
        self.anchor_world().right()
    }
}

impl SteeringJoint for Scene {
    fn set_local_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.steering.rotation = rotation;
    }
}

impl LineSink for Scene {
    fn set_count(&mut self, count: usize) {
        self.sink.set_count(count);
    }

    fn set_positions(&mut self, positions: &[Point3<f32>]) -> Result<(), EnvError> {
        self.sink.set_positions(positions)
    }
}
