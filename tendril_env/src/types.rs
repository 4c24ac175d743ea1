//! Common types shared between hosts and behaviors.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// One host clock sample, taken once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTime {
    /// Frame counter, starting at 0 for the first sample
    pub frame: u64,

    /// Seconds since the previous frame
    pub delta: f32,

    /// Seconds since the host started
    pub time: f32,
}

impl FrameTime {
    /// Creates a frame time sample.
    pub fn new(frame: u64, delta: f32, time: f32) -> Self {
        Self { frame, delta, time }
    }

    /// Returns the sample that follows this one after `delta` seconds.
    pub fn next(&self, delta: f32) -> Self {
        Self {
            frame: self.frame + 1,
            delta,
            time: self.time + delta,
        }
    }
}

/// A rigid transform: position plus orientation.
///
/// Axis conventions follow the usual engine layout: +X is right, +Y is up and
/// +Z is forward (the "depth" axis for 2D content).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    pub fn new(position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Creates an unrotated pose at the given position.
    pub fn at(position: Point3<f32>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// Returns the local +X axis in world space.
    pub fn right(&self) -> Unit<Vector3<f32>> {
        Unit::new_normalize(self.rotation * Vector3::x())
    }

    /// Returns the local +Y axis in world space.
    pub fn up(&self) -> Unit<Vector3<f32>> {
        Unit::new_normalize(self.rotation * Vector3::y())
    }

    /// Returns the local +Z axis in world space.
    pub fn forward(&self) -> Unit<Vector3<f32>> {
        Unit::new_normalize(self.rotation * Vector3::z())
    }

    /// Maps a point from this pose's local space into world space.
    pub fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        self.position + self.rotation * local.coords
    }

    /// Composes a child pose expressed in this pose's local space.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.transform_point(&child.position),
            rotation: self.rotation * child.rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Point3::origin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_frame_time_next() {
        let t0 = FrameTime::default();
        let t1 = t0.next(0.5);
        let t2 = t1.next(0.25);

        assert_eq!(t2.frame, 2);
        assert_relative_eq!(t2.time, 0.75);
        assert_relative_eq!(t2.delta, 0.25);
    }

    #[test]
    fn test_identity_pose_axes() {
        let pose = Pose::default();
        assert_relative_eq!(pose.right().into_inner(), Vector3::x());
        assert_relative_eq!(pose.up().into_inner(), Vector3::y());
        assert_relative_eq!(pose.forward().into_inner(), Vector3::z());
    }

    #[test]
    fn test_rotated_right_axis() {
        // Quarter turn about forward swings right onto up
        let pose = Pose::new(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        assert_relative_eq!(pose.right().into_inner(), Vector3::y(), epsilon = 1e-6);
    }

    #[test]
    fn test_compose_child_offset() {
        let parent = Pose::new(
            Point3::new(1.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let child = Pose::at(Point3::new(2.0, 0.0, 0.0));

        let world = parent.compose(&child);
        assert_relative_eq!(world.position, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(world.right().into_inner(), Vector3::y(), epsilon = 1e-6);
    }
}
