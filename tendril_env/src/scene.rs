//! Scene collaborator traits consumed by the animation behaviors.
//!
//! None of these are owned by a behavior. A host lends them for the duration
//! of one `advance` call.

use crate::error::EnvError;
use crate::types::Pose;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

/// Anything with a world-space position (a facing target, a followed object).
pub trait PositionSource {
    /// Returns the current world-space position.
    fn position(&self) -> Point3<f32>;
}

/// The transform a segment chain's head locks onto.
///
/// Besides its position the anchor supplies the lateral ("right") axis that
/// trailing segments are offset along.
pub trait AnchorSource: PositionSource {
    /// Returns the anchor's lateral axis in world space.
    fn lateral_axis(&self) -> Unit<Vector3<f32>>;
}

/// A steering transform whose local rotation a behavior may drive.
///
/// In a scene graph the anchor is usually a descendant of the steering
/// joint, so the rotation set here changes the anchor's lateral axis.
pub trait SteeringJoint {
    /// Replaces the joint's rotation relative to its parent.
    fn set_local_rotation(&mut self, rotation: UnitQuaternion<f32>);
}

/// Consumer of an ordered vertex list, typically a line renderer.
///
/// # Contract
///
/// `set_count` is called once when the producer allocates its buffer.
/// `set_positions` is called once per frame; the sink copies or consumes the
/// slice before returning. The producer keeps ownership of the buffer.
pub trait LineSink {
    /// Announces the number of vertices that will be published.
    fn set_count(&mut self, count: usize);

    /// Publishes this frame's vertices.
    ///
    /// # Returns
    /// * `Ok(())` - Vertices consumed
    /// * `Err(EnvError::CountMismatch)` - Slice length differs from the announced count
    fn set_positions(&mut self, positions: &[Point3<f32>]) -> Result<(), EnvError>;
}

impl PositionSource for Point3<f32> {
    fn position(&self) -> Point3<f32> {
        *self
    }
}

impl PositionSource for Pose {
    fn position(&self) -> Point3<f32> {
        self.position
    }
}

impl AnchorSource for Pose {
    fn lateral_axis(&self) -> Unit<Vector3<f32>> {
        self.right()
    }
}

impl SteeringJoint for Pose {
    fn set_local_rotation(&mut self, rotation: UnitQuaternion<f32>) {
        self.rotation = rotation;
    }
}

impl<T: PositionSource + ?Sized> PositionSource for &T {
    fn position(&self) -> Point3<f32> {
        (**self).position()
    }
}
