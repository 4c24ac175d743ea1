//! Property tests for the chain and the facing rotator, driven through the
//! simulated scene.

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;
use tendril_core::facing::{facing_angle, facing_rotation};
use tendril_core::{ChainConfig, FacingConfig, FacingRotator, SegmentChain};
use tendril_env::{FrameTime, Pose, PositionSource};
use tendril_sim::{MotionScript, Scene, SimConfig, SimWorld};

fn coord() -> impl Strategy<Value = f32> {
    -100.0f32..100.0
}

fn point() -> impl Strategy<Value = Point3<f32>> {
    (coord(), coord(), -5.0f32..5.0).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

proptest! {
    #[test]
    fn head_locks_to_anchor_every_frame(
        anchors in prop::collection::vec((point(), 0.0f32..0.25), 1..40),
        segment_count in 1usize..40,
        anchor_distance in 0.0f32..3.0,
    ) {
        let mut scene = Scene::new(anchor_distance);
        let config = ChainConfig::default().with_segment_count(segment_count);
        let mut chain = SegmentChain::allocated(config, &mut scene).unwrap();
        let mut time = FrameTime::default();

        for (position, delta) in anchors {
            scene.root = Pose::at(position);
            time = time.next(delta);
            chain.advance(&time, &mut scene).unwrap();

            prop_assert_eq!(chain.positions().len(), segment_count);
            prop_assert_eq!(chain.positions()[0], scene.position());
            prop_assert_eq!(scene.sink.latest(), chain.positions());
            prop_assert!(chain.positions().iter().all(|p| p.coords.iter().all(|c| c.is_finite())));
        }
    }

    #[test]
    fn zero_delta_holds_trailing_segments(
        start in point(),
        moved in point(),
        frames in 1usize..30,
    ) {
        let mut scene = Scene::new(1.0);
        scene.root = Pose::at(start);
        let mut chain = SegmentChain::allocated(ChainConfig::default(), &mut scene).unwrap();

        let mut time = FrameTime::default();
        for _ in 0..frames {
            time = time.next(1.0 / 60.0);
            chain.advance(&time, &mut scene).unwrap();
        }
        let before = chain.positions().to_vec();

        scene.root = Pose::at(moved);
        chain.advance(&time.next(0.0), &mut scene).unwrap();

        prop_assert_eq!(chain.positions()[0], scene.position());
        prop_assert_eq!(&chain.positions()[1..], &before[1..]);
    }

    #[test]
    fn time_constant_grows_along_chain(
        smooth_time in 0.0f32..1.0,
        trail_factor in 1.0f32..1000.0,
        i in 0usize..60,
        gap in 1usize..60,
    ) {
        let config = ChainConfig::default().with_segment_count(128).with_smoothing(smooth_time, trail_factor);
        let chain = SegmentChain::new(config).unwrap();
        prop_assert!(chain.time_constant(i) < chain.time_constant(i + gap));
    }

    #[test]
    fn wiggle_is_periodic_and_bounded(
        speed in 0.5f32..20.0,
        magnitude in 0.0f32..45.0,
        t in 0.0f32..10.0,
    ) {
        let config = ChainConfig::default().with_wiggle(speed, magnitude);
        let chain = SegmentChain::new(config).unwrap();
        let period = std::f32::consts::TAU / speed;

        let a = chain.wiggle_angle(t);
        let b = chain.wiggle_angle(t + period);
        prop_assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
        prop_assert!(a.abs() <= magnitude + 1e-4);
    }

    #[test]
    fn zero_turn_speed_never_rotates(
        start_deg in -180.0f32..180.0,
        position in point(),
        target in point(),
        delta in 0.0f32..1.0,
    ) {
        let start = facing_rotation(start_deg);
        let mut rotator = FacingRotator::with_orientation(
            FacingConfig::default().with_turn_speed(0.0),
            start,
        ).unwrap();

        let result = rotator.advance(&FrameTime::new(1, delta, delta), &position, &target);
        prop_assert_eq!(result, start);
    }

    #[test]
    fn saturated_turn_lands_on_target(
        start_deg in -180.0f32..180.0,
        position in point(),
        target in point(),
        turn_speed in 61.0f32..1000.0,
    ) {
        let mut rotator = FacingRotator::with_orientation(
            FacingConfig::default().with_turn_speed(turn_speed),
            facing_rotation(start_deg),
        ).unwrap();

        let result = rotator.advance(&FrameTime::new(1, 1.0 / 60.0, 1.0 / 60.0), &position, &target);
        let expected = facing_rotation(facing_angle(&(target - position).xy()));
        prop_assert_eq!(result, expected);
    }

    #[test]
    fn facing_stays_in_plane(
        position in point(),
        targets in prop::collection::vec(point(), 1..20),
        turn_speed in 0.0f32..30.0,
    ) {
        let mut rotator = FacingRotator::new(FacingConfig::default().with_turn_speed(turn_speed)).unwrap();
        let mut time = FrameTime::default();

        for target in targets {
            time = time.next(1.0 / 60.0);
            let q = rotator.advance(&time, &position, &target);
            let forward = q * Vector3::z();
            prop_assert!((forward - Vector3::z()).norm() < 1e-4);
        }
    }

    #[test]
    fn same_seed_same_run(seed in any::<u64>()) {
        let walk = MotionScript::RandomWalk { start: Point3::origin(), step_std: 0.1 };
        let config = SimConfig { seed, duration_secs: 1.0, ..Default::default() };

        let mut a = SimWorld::new(config.clone(), walk.clone(), walk.clone()).unwrap();
        let mut b = SimWorld::new(config, walk.clone(), walk).unwrap();
        for _ in 0..60 {
            a.tick().unwrap();
            b.tick().unwrap();
        }

        prop_assert_eq!(a.snapshot(), b.snapshot());
        prop_assert_eq!(a.rotator().orientation(), b.rotator().orientation());
    }
}
