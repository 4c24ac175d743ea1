//! Critically-damped smoothing toward a moving goal.
//!
//! This is the classic game-engine "smooth damp": a spring with damping ratio
//! 1 integrated with a cubic approximation of `exp(-omega * dt)`, plus a guard
//! that stops the output from crossing the goal. The caller owns the
//! velocity memory and passes it back in every frame.

use nalgebra::{Point3, Vector3};

/// Lower bound on the time constant so `omega` stays finite.
pub const MIN_SMOOTH_TIME: f32 = 1e-4;

/// Moves `current` toward `target` and returns the new position.
///
/// # Arguments
/// * `current` - Position at the start of the frame
/// * `target` - Goal position
/// * `velocity` - Velocity memory, updated in place
/// * `smooth_time` - Approximate time to reach the goal (seconds)
/// * `max_speed` - Optional cap on speed; `None` leaves it unbounded
/// * `dt` - Frame delta (seconds); non-positive deltas leave everything unchanged
pub fn smooth_damp(
    current: Point3<f32>,
    target: Point3<f32>,
    velocity: &mut Vector3<f32>,
    smooth_time: f32,
    max_speed: Option<f32>,
    dt: f32,
) -> Point3<f32> {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let mut change = current - target;
    if let Some(max_speed) = max_speed {
        let max_change = max_speed * smooth_time;
        let distance = change.norm();
        if distance > max_change {
            change *= max_change / distance;
        }
    }
    // Goal after the optional speed clamp
    let goal = current - change;

    let temp = (*velocity + change * omega) * dt;
    *velocity = (*velocity - temp * omega) * exp;
    let mut output = goal + (change + temp) * exp;

    // Never pass the original target
    if (target - current).dot(&(output - target)) > 0.0 {
        output = target;
        *velocity = Vector3::zeros();
    }

    output
}

/// Damping time constant for a chain index.
///
/// Grows linearly with the index so later segments lag more.
pub fn segment_time_constant(smooth_time: f32, trail_factor: f32, index: usize) -> f32 {
    smooth_time + index as f32 / trail_factor
}
