//! SimWorld - The simulation harness container.

use crate::context::SimClock;
use crate::error::SimError;
use crate::motion::{MotionScript, Mover};
use crate::scene::Scene;

use tendril_core::facing::facing_angle;
use tendril_core::{
    ChainSnapshot, ConvergenceReport, ConvergenceTracker, FacingRotator, RigConfig, SegmentChain,
};
use tendril_env::{FrameClock, FrameTime};
use tracing::debug;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Tick rate in Hz
    pub tick_rate_hz: u32,

    /// Simulated duration in seconds
    pub duration_secs: f64,

    /// Distance from the steering joint to the anchor, along +Y
    pub anchor_distance: f32,

    /// Largest residual still counted as settled
    pub settle_tolerance: f32,

    /// Behavior configuration
    pub rig: RigConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate_hz: 60,
            duration_secs: 10.0,
            anchor_distance: 1.0,
            settle_tolerance: 1e-3,
            rig: RigConfig::default(),
        }
    }
}

impl SimConfig {
    /// Number of ticks covering `duration_secs`.
    pub fn target_ticks(&self) -> u64 {
        (self.duration_secs * self.tick_rate_hz as f64).round().max(0.0) as u64
    }
}

/// What one tick produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub time: FrameTime,

    /// Largest distance of any segment from its rest position
    pub max_residual: f32,

    /// Absolute facing error in degrees, wrapped to [0, 180]
    pub heading_error: f32,
}

/// The SimWorld - one rig in one scene, driven by scripted motion.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Virtual clock
    clock: SimClock,

    /// Scene objects the behaviors see
    scene: Scene,

    /// Trailing chain under test
    chain: SegmentChain,

    /// Facing rotator under test
    rotator: FacingRotator,

    /// Drives the chain's root
    root_mover: Mover,

    /// Drives the facing target
    target_mover: Mover,

    /// Residual statistics
    tracker: ConvergenceTracker,

    /// Sample used by the most recent tick
    last_time: FrameTime,

    /// Current tick count
    tick_count: u64,
}

impl SimWorld {
    /// Creates a world, allocating the chain against the scene's line sink.
    pub fn new(
        config: SimConfig,
        root: MotionScript,
        target: MotionScript,
    ) -> Result<Self, SimError> {
        config.rig.validate()?;

        // Separate streams so the two movers never share randomness
        let root_seed = config.seed;
        let target_seed = config.seed.wrapping_mul(0x9e3779b97f4a7c15);

        let clock = SimClock::new(config.tick_rate_hz)?;
        let root_mover = Mover::new(root, root_seed)?;
        let target_mover = Mover::new(target, target_seed)?;

        let mut scene = Scene::new(config.anchor_distance);
        scene.root = root_mover.pose();
        scene.target = target_mover.pose().position;

        let chain = SegmentChain::allocated(config.rig.chain.clone(), &mut scene)?;
        let rotator = FacingRotator::new(config.rig.facing.clone())?;
        let tracker = ConvergenceTracker::new(config.settle_tolerance);
        let last_time = clock.frame_time();

        debug!(
            seed = config.seed,
            tick_rate_hz = config.tick_rate_hz,
            segments = chain.segment_count(),
            "sim world created"
        );

        Ok(Self {
            config,
            clock,
            scene,
            chain,
            rotator,
            root_mover,
            target_mover,
            tracker,
            last_time,
            tick_count: 0,
        })
    }

    /// Advances the virtual clock by one step and runs the frame.
    pub fn tick(&mut self) -> Result<FrameReport, SimError> {
        let time = self.clock.advance();
        self.step(&time)
    }

    /// Runs one frame with an externally supplied clock sample.
    pub fn step(&mut self, time: &FrameTime) -> Result<FrameReport, SimError> {
        self.scene.root = self.root_mover.step(time);
        self.scene.target = self.target_mover.step(time).position;

        self.chain.advance(time, &mut self.scene)?;

        let body = self.scene.body.position;
        self.scene.body.rotation = self.rotator.advance(time, &body, &self.scene.target);

        let max_residual = self.tracker.record(time.frame, &self.chain, &self.scene);
        self.last_time = *time;
        self.tick_count += 1;

        Ok(FrameReport {
            time: *time,
            max_residual,
            heading_error: self.heading_error(),
        })
    }

    /// Angle in degrees between the body's heading and the direction to the target.
    pub fn heading_error(&self) -> f32 {
        let offset = self.scene.target - self.scene.body.position;
        let desired = facing_angle(&offset.xy());
        wrap_degrees(self.rotator.heading_degrees() - desired).abs()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn rotator(&self) -> &FacingRotator {
        &self.rotator
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Residual statistics so far.
    pub fn convergence(&self) -> ConvergenceReport {
        self.tracker.report()
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        self.chain.snapshot(&self.last_time)
    }

    /// Returns the sample of the most recent tick.
    pub fn last_time(&self) -> FrameTime {
        self.last_time
    }

    /// Returns the current simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.last_time.time as f64
    }

    /// Returns the current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Wraps an angle in degrees into [-180, 180).
pub fn wrap_degrees(degrees: f32) -> f32 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}
