//! Facing rotator: turns an object in the XY plane to face a target.

use crate::config::FacingConfig;
use crate::error::AnimError;
use nalgebra::{Point3, UnitQuaternion, Vector2, Vector3};
use tendril_env::{FrameTime, PositionSource};

/// Threshold handed to `try_slerp` for the sine of the half angle.
const SLERP_EPSILON: f32 = 1.0e-6;

/// Orientations closer than this (radians) snap to the target. Slerp in f32
/// cannot resolve such small steps and would leave the rotator short of it.
const SNAP_ANGLE: f32 = 1.0e-3;

/// Smoothly rotates an orientation toward a target about the forward axis.
#[derive(Debug, Clone)]
pub struct FacingRotator {
    config: FacingConfig,
    orientation: UnitQuaternion<f32>,
}

impl FacingRotator {
    /// Creates a rotator starting at the identity orientation.
    pub fn new(config: FacingConfig) -> Result<Self, AnimError> {
        Self::with_orientation(config, UnitQuaternion::identity())
    }

    /// Creates a rotator starting at `orientation`.
    pub fn with_orientation(
        config: FacingConfig,
        orientation: UnitQuaternion<f32>,
    ) -> Result<Self, AnimError> {
        config.validate()?;
        Ok(Self { config, orientation })
    }

    pub fn config(&self) -> &FacingConfig {
        &self.config
    }

    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.orientation
    }

    /// Overrides the current orientation (e.g. when the host rotates the object itself).
    pub fn set_orientation(&mut self, orientation: UnitQuaternion<f32>) {
        self.orientation = orientation;
    }

    /// Current heading in degrees: the angle of the rotated +X axis in the XY plane.
    pub fn heading_degrees(&self) -> f32 {
        let right = self.orientation * Vector3::x();
        facing_angle(&Vector2::new(right.x, right.y))
    }

    /// Runs one frame and returns the new orientation.
    ///
    /// # Arguments
    /// * `time` - This frame's clock sample; only `delta` is used
    /// * `position` - The object's own world position
    /// * `target` - What to face; only X and Y are considered
    pub fn advance<T: PositionSource + ?Sized>(
        &mut self,
        time: &FrameTime,
        position: &Point3<f32>,
        target: &T,
    ) -> UnitQuaternion<f32> {
        let offset = target.position() - *position;
        let desired = facing_rotation(facing_angle(&offset.xy()));
        let factor = (self.config.turn_speed * time.delta).clamp(0.0, 1.0);

        self.orientation = interpolate(&self.orientation, &desired, factor);
        self.orientation
    }
}

/// Angle in degrees of a planar direction, measured from +X toward +Y.
///
/// The zero vector maps to 0.
pub fn facing_angle(direction: &Vector2<f32>) -> f32 {
    direction.y.atan2(direction.x).to_degrees()
}

/// Rotation about the forward (Z) axis by `degrees`.
pub fn facing_rotation(degrees: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), degrees.to_radians())
}

/// Spherical interpolation with exact endpoints.
///
/// A factor of 0 returns `from` untouched and a factor of 1 returns `to`
/// untouched, so a saturated turn lands exactly on the target. Any other
/// factor snaps to `to` once the two are within [`SNAP_ANGLE`].
fn interpolate(
    from: &UnitQuaternion<f32>,
    to: &UnitQuaternion<f32>,
    factor: f32,
) -> UnitQuaternion<f32> {
    if factor <= 0.0 {
        return *from;
    }
    if factor >= 1.0 {
        return *to;
    }
    if from.angle_to(to) <= SNAP_ANGLE {
        return *to;
    }
    from.try_slerp(to, factor, SLERP_EPSILON).unwrap_or(*to)
}
