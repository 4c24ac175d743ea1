//! Scripted motion for simulated scene objects.
//!
//! A `Mover` produces one pose per frame from a `MotionScript`:
//! - Stationary hold
//! - Instant teleport at a given frame
//! - Circular orbit with the object's right axis pointing outward
//! - Seeded random walk (Gaussian steps in the XY plane)

use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tendril_core::AnimError;
use tendril_env::{FrameTime, Pose};

/// How a scene object moves over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionScript {
    /// Holds a fixed position
    Stationary { at: Point3<f32> },

    /// Sits at `from`, then jumps to `to` on `at_frame`
    Teleport {
        from: Point3<f32>,
        to: Point3<f32>,
        at_frame: u64,
    },

    /// Circles `center` in the XY plane
    Orbit {
        center: Point3<f32>,
        radius: f32,
        /// Radians per second
        angular_speed: f32,
    },

    /// Gaussian steps per frame in X and Y
    RandomWalk { start: Point3<f32>, step_std: f32 },
}

/// Drives one scene object along a script.
pub struct Mover {
    script: MotionScript,

    /// Only consumed by random walks
    rng: ChaCha8Rng,

    /// Step distribution for random walks
    step: Option<Normal<f32>>,

    /// Last produced pose
    pose: Pose,
}

impl Mover {
    /// Creates a mover; the seed only matters for random walks.
    pub fn new(script: MotionScript, seed: u64) -> Result<Self, AnimError> {
        let step = match &script {
            MotionScript::RandomWalk { step_std, .. } => Some(
                Normal::new(0.0, *step_std)
                    .map_err(|e| AnimError::invalid(format!("random walk step_std: {}", e)))?,
            ),
            _ => None,
        };
        let pose = Pose::at(initial_position(&script));
        Ok(Self {
            script,
            rng: ChaCha8Rng::seed_from_u64(seed),
            step,
            pose,
        })
    }

    pub fn script(&self) -> &MotionScript {
        &self.script
    }

    /// Last produced pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Produces the pose for `time`.
    pub fn step(&mut self, time: &FrameTime) -> Pose {
        self.pose = match &self.script {
            MotionScript::Stationary { at } => Pose::at(*at),
            MotionScript::Teleport { from, to, at_frame } => {
                if time.frame >= *at_frame {
                    Pose::at(*to)
                } else {
                    Pose::at(*from)
                }
            }
            MotionScript::Orbit {
                center,
                radius,
                angular_speed,
            } => {
                let angle = angular_speed * time.time;
                let position = *center + Vector3::new(angle.cos(), angle.sin(), 0.0) * *radius;
                Pose::new(
                    position,
                    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle),
                )
            }
            MotionScript::RandomWalk { .. } => {
                let mut position = self.pose.position;
                if let Some(normal) = &self.step {
                    position.x += normal.sample(&mut self.rng);
                    position.y += normal.sample(&mut self.rng);
                }
                Pose::at(position)
            }
        };
        self.pose
    }
}

fn initial_position(script: &MotionScript) -> Point3<f32> {
    match script {
        MotionScript::Stationary { at } => *at,
        MotionScript::Teleport { from, .. } => *from,
        MotionScript::Orbit { center, radius, .. } => *center + Vector3::x() * *radius,
        MotionScript::RandomWalk { start, .. } => *start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at_frame(frame: u64) -> FrameTime {
        FrameTime::new(frame, 1.0 / 60.0, frame as f32 / 60.0)
    }

    #[test]
    fn test_teleport_switches_on_frame() {
        let mut mover = Mover::new(
            MotionScript::Teleport {
                from: Point3::origin(),
                to: Point3::new(10.0, 0.0, 0.0),
                at_frame: 3,
            },
            0,
        )
        .unwrap();

        assert_eq!(mover.step(&at_frame(2)).position, Point3::origin());
        assert_eq!(mover.step(&at_frame(3)).position, Point3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_orbit_right_axis_points_outward() {
        let mut mover = Mover::new(
            MotionScript::Orbit {
                center: Point3::new(1.0, 1.0, 0.0),
                radius: 2.0,
                angular_speed: 1.0,
            },
            0,
        )
        .unwrap();

        let pose = mover.step(&FrameTime::new(1, 0.1, std::f32::consts::FRAC_PI_2));
        assert_relative_eq!(pose.position, Point3::new(1.0, 3.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(pose.right().into_inner(), Vector3::y(), epsilon = 1e-5);
    }

    #[test]
    fn test_random_walk_deterministic() {
        let script = MotionScript::RandomWalk {
            start: Point3::origin(),
            step_std: 0.5,
        };
        let mut a = Mover::new(script.clone(), 7).unwrap();
        let mut b = Mover::new(script.clone(), 7).unwrap();
        let mut c = Mover::new(script, 8).unwrap();

        for frame in 1..50 {
            let pa = a.step(&at_frame(frame));
            let pb = b.step(&at_frame(frame));
            c.step(&at_frame(frame));
            assert_eq!(pa, pb);
            assert_eq!(pa.position.z, 0.0);
        }
        assert_ne!(a.pose(), c.pose());
    }

    #[test]
    fn test_random_walk_rejects_bad_std() {
        let script = MotionScript::RandomWalk {
            start: Point3::origin(),
            step_std: f32::NAN,
        };
        assert!(Mover::new(script, 0).is_err());
    }
}
