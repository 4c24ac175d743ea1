//! Trailing segment chain ("tentacle").
//!
//! A fixed number of points follow an anchor. The head is locked to the
//! anchor every frame; each following point is smoothed toward its
//! predecessor plus a lateral offset, with a damping time constant that grows
//! along the chain so the tail lags the most. A sinusoidal wiggle drives a
//! steering joint which, in a typical scene graph, is an ancestor of the
//! anchor.

use crate::config::ChainConfig;
use crate::error::AnimError;
use crate::smoothing::{segment_time_constant, smooth_damp};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tendril_env::{AnchorSource, FrameTime, LineSink, SteeringJoint};
use tracing::{debug, warn};

/// Chain of trailing positions chasing an anchor.
#[derive(Debug, Clone)]
pub struct SegmentChain {
    config: ChainConfig,

    /// Index 0 is the head; empty until allocated
    positions: Vec<Point3<f32>>,

    /// Smoothing velocity memory, one per segment
    velocities: Vec<Vector3<f32>>,
}

/// Read-only copy of a chain's positions at one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub frame: u64,
    pub time: f32,
    pub positions: Vec<Point3<f32>>,
}

impl SegmentChain {
    /// Creates an unallocated chain after validating the config.
    pub fn new(config: ChainConfig) -> Result<Self, AnimError> {
        config.validate()?;
        Ok(Self {
            config,
            positions: Vec::new(),
            velocities: Vec::new(),
        })
    }

    /// Creates a chain and allocates it against `sink` in one step.
    pub fn allocated<S: LineSink + ?Sized>(
        config: ChainConfig,
        sink: &mut S,
    ) -> Result<Self, AnimError> {
        let mut chain = Self::new(config)?;
        chain.allocate(sink)?;
        Ok(chain)
    }

    /// Allocates zero-filled position and velocity buffers and sizes the sink.
    ///
    /// Must be called exactly once, before the first `advance`.
    pub fn allocate<S: LineSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), AnimError> {
        if self.is_allocated() {
            return Err(AnimError::AlreadyAllocated);
        }
        let n = self.config.segment_count;
        self.positions = vec![Point3::origin(); n];
        self.velocities = vec![Vector3::zeros(); n];
        sink.set_count(n);
        debug!(segments = n, "segment chain allocated");
        Ok(())
    }

    pub fn is_allocated(&self) -> bool {
        !self.positions.is_empty()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn segment_count(&self) -> usize {
        self.config.segment_count
    }

    /// Current segment positions, head first. Empty before allocation.
    pub fn positions(&self) -> &[Point3<f32>] {
        &self.positions
    }

    /// Damping time constant used for segment `index`.
    pub fn time_constant(&self, index: usize) -> f32 {
        segment_time_constant(self.config.smooth_time, self.config.trail_factor, index)
    }

    /// Wiggle angle in degrees at host time `time`.
    pub fn wiggle_angle(&self, time: f32) -> f32 {
        (time * self.config.wiggle_speed).sin() * self.config.wiggle_magnitude
    }

    /// Steering rotation for host time `time`: the wiggle angle about forward.
    pub fn wiggle_rotation(&self, time: f32) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.wiggle_angle(time).to_radians())
    }

    /// Runs one frame.
    ///
    /// The host supplies the steering joint, the anchor and the line sink.
    /// The wiggle is applied first so an anchor parented under the steering
    /// joint already reports this frame's lateral axis.
    pub fn advance<H>(&mut self, time: &FrameTime, host: &mut H) -> Result<(), AnimError>
    where
        H: SteeringJoint + AnchorSource + LineSink + ?Sized,
    {
        if !self.is_allocated() {
            return Err(AnimError::NotAllocated);
        }
        if time.delta < 0.0 {
            warn!(frame = time.frame, delta = time.delta, "negative frame delta, trailing segments held");
        }

        host.set_local_rotation(self.wiggle_rotation(time.time));

        self.positions[0] = host.position();

        let offset = host.lateral_axis().into_inner() * self.config.lateral_offset;
        let max_speed = self.config.max_speed;
        for i in 1..self.positions.len() {
            let target = self.positions[i - 1] + offset;
            let smooth_time = self.time_constant(i);
            self.positions[i] = smooth_damp(
                self.positions[i],
                target,
                &mut self.velocities[i],
                smooth_time,
                max_speed,
                time.delta,
            );
        }

        host.set_positions(&self.positions)?;
        Ok(())
    }

    /// Snaps every segment to its rest point behind the anchor and clears
    /// velocity memory.
    pub fn reset<A: AnchorSource + ?Sized>(&mut self, anchor: &A) -> Result<(), AnimError> {
        if !self.is_allocated() {
            return Err(AnimError::NotAllocated);
        }
        let head = anchor.position();
        let offset = anchor.lateral_axis().into_inner() * self.config.lateral_offset;
        for (i, (position, velocity)) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .enumerate()
        {
            *position = head + offset * i as f32;
            *velocity = Vector3::zeros();
        }
        debug!(segments = self.positions.len(), "segment chain reset to rest layout");
        Ok(())
    }

    /// Point segment `index` is currently being pulled toward: its predecessor
    /// plus the lateral offset. Unlike [`crate::convergence::rest_position`]
    /// this moves with the chain.
    ///
    /// Returns `None` for the head or an out-of-range index.
    pub fn goal_point<A: AnchorSource + ?Sized>(
        &self,
        index: usize,
        anchor: &A,
    ) -> Option<Point3<f32>> {
        if index == 0 || index >= self.positions.len() {
            return None;
        }
        Some(self.positions[index - 1] + anchor.lateral_axis().into_inner() * self.config.lateral_offset)
    }

    pub fn snapshot(&self, time: &FrameTime) -> ChainSnapshot {
        ChainSnapshot {
            frame: time.frame,
            time: time.time,
            positions: self.positions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Unit;
    use std::f32::consts::PI;
    use tendril_env::{EnvError, Pose, PositionSource};

    /// Flat host: anchor, steering joint and sink are independent objects.
    struct TestHost {
        anchor: Pose,
        steering: UnitQuaternion<f32>,
        count: Option<usize>,
        published: Vec<Point3<f32>>,
        publish_calls: usize,
    }

    impl TestHost {
        fn at(position: Point3<f32>) -> Self {
            Self {
                anchor: Pose::at(position),
                steering: UnitQuaternion::identity(),
                count: None,
                published: Vec::new(),
                publish_calls: 0,
            }
        }
    }

    impl PositionSource for TestHost {
        fn position(&self) -> Point3<f32> {
            self.anchor.position
        }
    }

    impl AnchorSource for TestHost {
        fn lateral_axis(&self) -> Unit<Vector3<f32>> {
            self.anchor.right()
        }
    }

    impl SteeringJoint for TestHost {
        fn set_local_rotation(&mut self, rotation: UnitQuaternion<f32>) {
            self.steering = rotation;
        }
    }

    impl LineSink for TestHost {
        fn set_count(&mut self, count: usize) {
            self.count = Some(count);
        }

        fn set_positions(&mut self, positions: &[Point3<f32>]) -> Result<(), EnvError> {
            match self.count {
                None => Err(EnvError::CountNotSet),
                Some(n) if n != positions.len() => Err(EnvError::count_mismatch(n, positions.len())),
                Some(_) => {
                    self.published = positions.to_vec();
                    self.publish_calls += 1;
                    Ok(())
                }
            }
        }
    }

    fn slow_config(segment_count: usize) -> ChainConfig {
        ChainConfig::default()
            .with_segment_count(segment_count)
            .with_smoothing(0.5, 10.0)
            .with_lateral_offset(0.25)
    }

    fn run(chain: &mut SegmentChain, host: &mut TestHost, time: &mut FrameTime, frames: usize) {
        for _ in 0..frames {
            *time = time.next(1.0 / 60.0);
            chain.advance(time, host).unwrap();
        }
    }

    #[test]
    fn test_advance_before_allocate() {
        let mut chain = SegmentChain::new(slow_config(4)).unwrap();
        let mut host = TestHost::at(Point3::origin());
        let err = chain.advance(&FrameTime::default(), &mut host).unwrap_err();
        assert!(matches!(err, AnimError::NotAllocated));
        assert!(matches!(chain.reset(&host.anchor), Err(AnimError::NotAllocated)));
    }

    #[test]
    fn test_allocate_twice() {
        let mut host = TestHost::at(Point3::origin());
        let mut chain = SegmentChain::allocated(slow_config(4), &mut host).unwrap();
        assert!(matches!(chain.allocate(&mut host), Err(AnimError::AlreadyAllocated)));
    }

    #[test]
    fn test_allocate_sizes_buffers_and_sink() {
        let mut host = TestHost::at(Point3::origin());
        let chain = SegmentChain::allocated(slow_config(7), &mut host).unwrap();

        assert_eq!(host.count, Some(7));
        assert_eq!(chain.positions().len(), 7);
        assert!(chain.positions().iter().all(|p| *p == Point3::origin()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = slow_config(4).with_smoothing(0.5, 0.0);
        assert!(matches!(SegmentChain::new(config), Err(AnimError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_head_locks_exactly() {
        let mut host = TestHost::at(Point3::new(1.25, -3.5, 7.0));
        let mut chain = SegmentChain::allocated(slow_config(5), &mut host).unwrap();
        let mut time = FrameTime::default();

        run(&mut chain, &mut host, &mut time, 1);
        assert_eq!(chain.positions()[0], Point3::new(1.25, -3.5, 7.0));

        host.anchor.position = Point3::new(-8.0, 2.0, 0.5);
        run(&mut chain, &mut host, &mut time, 1);
        assert_eq!(chain.positions()[0], Point3::new(-8.0, 2.0, 0.5));
    }

    #[test]
    fn test_single_segment_only_locks_head() {
        let mut host = TestHost::at(Point3::new(2.0, 2.0, 2.0));
        let mut chain = SegmentChain::allocated(slow_config(1), &mut host).unwrap();
        let mut time = FrameTime::default();

        run(&mut chain, &mut host, &mut time, 3);
        assert_eq!(host.published, vec![Point3::new(2.0, 2.0, 2.0)]);
    }

    #[test]
    fn test_publishes_every_frame() {
        let mut host = TestHost::at(Point3::new(1.0, 0.0, 0.0));
        let mut chain = SegmentChain::allocated(slow_config(3), &mut host).unwrap();
        let mut time = FrameTime::default();

        run(&mut chain, &mut host, &mut time, 5);
        assert_eq!(host.publish_calls, 5);
        assert_eq!(host.published, chain.positions().to_vec());
    }

    #[test]
    fn test_segment_one_approaches_monotonically() {
        let mut host = TestHost::at(Point3::new(5.0, 0.0, 0.0));
        let mut chain = SegmentChain::allocated(slow_config(4), &mut host).unwrap();
        let mut time = FrameTime::default();
        let goal = Point3::new(5.25, 0.0, 0.0);

        let mut previous = (chain.positions()[1] - goal).norm();
        for _ in 0..120 {
            run(&mut chain, &mut host, &mut time, 1);
            let distance = (chain.positions()[1] - goal).norm();
            assert!(distance <= previous);
            previous = distance;
        }
    }

    #[test]
    fn test_converges_to_rest_layout() {
        let mut host = TestHost::at(Point3::new(0.0, 3.0, 0.0));
        let mut chain = SegmentChain::allocated(slow_config(4), &mut host).unwrap();
        let mut time = FrameTime::default();

        run(&mut chain, &mut host, &mut time, 1800);
        for (i, p) in chain.positions().iter().enumerate() {
            let expected = Point3::new(0.25 * i as f32, 3.0, 0.0);
            assert_relative_eq!(*p, expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_teleport_head_jumps_tail_lags() {
        let mut host = TestHost::at(Point3::origin());
        let mut chain = SegmentChain::allocated(slow_config(3), &mut host).unwrap();
        let mut time = FrameTime::default();

        run(&mut chain, &mut host, &mut time, 1);
        let before: Vec<_> = chain.positions().to_vec();

        host.anchor.position = Point3::new(10.0, 0.0, 0.0);
        run(&mut chain, &mut host, &mut time, 1);

        assert_eq!(chain.positions()[0], Point3::new(10.0, 0.0, 0.0));
        assert!((chain.positions()[1] - before[1]).norm() < 0.5);
        assert!((chain.positions()[2] - before[2]).norm() < 0.5);

        run(&mut chain, &mut host, &mut time, 1800);
        assert_relative_eq!(chain.positions()[1], Point3::new(10.25, 0.0, 0.0), epsilon = 1e-3);
        assert_relative_eq!(chain.positions()[2], Point3::new(10.5, 0.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn test_time_constants_increase() {
        let chain = SegmentChain::new(ChainConfig::default()).unwrap();
        for i in 0..chain.segment_count() - 1 {
            assert!(chain.time_constant(i) < chain.time_constant(i + 1));
        }
    }

    #[test]
    fn test_wiggle_angle_periodic() {
        let chain = SegmentChain::new(ChainConfig::default().with_wiggle(3.0, 20.0)).unwrap();
        let period = 2.0 * PI / 3.0;
        for t in [0.0, 0.1, 0.77, 1.5] {
            assert_relative_eq!(chain.wiggle_angle(t + period), chain.wiggle_angle(t), epsilon = 1e-3);
        }
        assert_relative_eq!(chain.wiggle_angle(PI / 6.0), 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_advance_drives_steering() {
        let mut host = TestHost::at(Point3::origin());
        let mut chain =
            SegmentChain::allocated(slow_config(2).with_wiggle(1.0, 30.0), &mut host).unwrap();
        let time = FrameTime::new(0, 1.0 / 60.0, PI / 2.0);

        chain.advance(&time, &mut host).unwrap();
        assert_relative_eq!(host.steering.angle(), 30f32.to_radians(), epsilon = 1e-5);
        let axis = host.steering.axis().unwrap();
        assert_relative_eq!(axis.into_inner(), Vector3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_delta_holds_trailing_segments() {
        let mut host = TestHost::at(Point3::new(4.0, 0.0, 0.0));
        let mut chain = SegmentChain::allocated(slow_config(3), &mut host).unwrap();

        chain.advance(&FrameTime::new(0, 0.0, 0.0), &mut host).unwrap();
        assert_eq!(chain.positions()[0], Point3::new(4.0, 0.0, 0.0));
        assert_eq!(chain.positions()[1], Point3::origin());
        assert_eq!(chain.positions()[2], Point3::origin());
    }

    #[test]
    fn test_reset_snaps_to_rest_layout() {
        let mut host = TestHost::at(Point3::new(1.0, 1.0, 0.0));
        let mut chain = SegmentChain::allocated(slow_config(3), &mut host).unwrap();
        let mut time = FrameTime::default();
        run(&mut chain, &mut host, &mut time, 10);

        host.anchor.position = Point3::new(-5.0, 0.0, 0.0);
        chain.reset(&host.anchor).unwrap();
        assert_eq!(chain.positions()[0], Point3::new(-5.0, 0.0, 0.0));
        assert_relative_eq!(chain.positions()[2], Point3::new(-4.5, 0.0, 0.0));

        // At rest with no velocity, one more frame changes nothing
        run(&mut chain, &mut host, &mut time, 1);
        assert_relative_eq!(chain.positions()[2], Point3::new(-4.5, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_lateral_offset_follows_anchor_rotation() {
        let mut host = TestHost::at(Point3::origin());
        host.anchor.rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
        let mut chain = SegmentChain::allocated(slow_config(2), &mut host).unwrap();

        chain.reset(&host.anchor).unwrap();
        assert_relative_eq!(chain.positions()[1], Point3::new(0.0, 0.25, 0.0), epsilon = 1e-6);
        assert_eq!(chain.goal_point(0, &host.anchor), None);
        assert_eq!(chain.goal_point(2, &host.anchor), None);
        assert_relative_eq!(
            chain.goal_point(1, &host.anchor).unwrap(),
            Point3::new(0.0, 0.25, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_sink_mismatch_surfaces() {
        let mut host = TestHost::at(Point3::origin());
        let mut chain = SegmentChain::allocated(slow_config(3), &mut host).unwrap();
        host.count = Some(2);

        let err = chain.advance(&FrameTime::default().next(0.1), &mut host).unwrap_err();
        assert!(matches!(err, AnimError::Env(EnvError::CountMismatch { expected: 2, actual: 3 })));
    }

    #[test]
    fn test_snapshot() {
        let mut host = TestHost::at(Point3::new(1.0, 2.0, 3.0));
        let mut chain = SegmentChain::allocated(slow_config(2), &mut host).unwrap();
        let time = FrameTime::new(4, 0.1, 0.4);
        chain.advance(&time, &mut host).unwrap();

        let snapshot = chain.snapshot(&time);
        assert_eq!(snapshot.frame, 4);
        assert_eq!(snapshot.positions, chain.positions().to_vec());
    }
}
