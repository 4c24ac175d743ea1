//! Convergence Module - How far a chain is from its rest layout
//! =============================================================
//!
//! A chain at rest has segment `i` at `anchor + i * lateral_offset * lateral_axis`.
//! This module measures the distance of every segment from that layout and
//! accumulates it over a run, which is what the simulation harness asserts
//! on.
//!
//! Usage:
//! ```ignore
//! use tendril_core::convergence::ConvergenceTracker;
//!
//! let mut tracker = ConvergenceTracker::new(1e-3);
//! // every frame, after chain.advance(...)
//! tracker.record(time.frame, &chain, &scene);
//! let report = tracker.report();
//! ```

use crate::segment_chain::SegmentChain;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tendril_env::AnchorSource;

// =============================================================================
// RESIDUALS
// =============================================================================

/// Rest position of segment `index` for the given anchor.
pub fn rest_position<A: AnchorSource + ?Sized>(
    anchor: &A,
    lateral_offset: f32,
    index: usize,
) -> Point3<f32> {
    anchor.position() + anchor.lateral_axis().into_inner() * (lateral_offset * index as f32)
}

/// Distance of each segment from its rest position, head first.
pub fn residuals<A: AnchorSource + ?Sized>(chain: &SegmentChain, anchor: &A) -> Vec<f32> {
    let offset = chain.config().lateral_offset;
    chain
        .positions()
        .iter()
        .enumerate()
        .map(|(i, p)| (p - rest_position(anchor, offset, i)).norm())
        .collect()
}

// =============================================================================
// TRACKER
// =============================================================================

/// Aggregate convergence statistics over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Frames recorded
    pub frames: u64,
    /// Largest residual seen on any segment in any frame
    pub peak_residual: f32,
    /// Largest residual in the most recent frame
    pub final_residual: f32,
    /// Root mean square of all per-segment residuals
    pub rms_residual: f32,
    /// Frame from which the chain stayed within tolerance, if it did
    pub settled_at: Option<u64>,
    /// Frames where the head was not exactly on the anchor
    pub head_lock_violations: u64,
}

impl ConvergenceReport {
    pub fn is_settled(&self) -> bool {
        self.settled_at.is_some()
    }
}

/// Collects residuals frame by frame.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    tolerance: f32,
    report: ConvergenceReport,
    sum_squared: f64,
    samples: u64,
}

impl ConvergenceTracker {
    /// Creates a tracker that considers the chain settled below `tolerance`.
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            report: ConvergenceReport::default(),
            sum_squared: 0.0,
            samples: 0,
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Records one frame and returns that frame's largest residual.
    pub fn record<A: AnchorSource + ?Sized>(
        &mut self,
        frame: u64,
        chain: &SegmentChain,
        anchor: &A,
    ) -> f32 {
        let residuals = residuals(chain, anchor);
        let frame_max = residuals.iter().copied().fold(0.0f32, f32::max);

        for r in &residuals {
            self.sum_squared += (*r as f64) * (*r as f64);
        }
        self.samples += residuals.len() as u64;

        if chain.positions().first() != Some(&anchor.position()) {
            self.report.head_lock_violations += 1;
        }

        self.report.frames += 1;
        self.report.peak_residual = self.report.peak_residual.max(frame_max);
        self.report.final_residual = frame_max;

        if frame_max <= self.tolerance {
            self.report.settled_at.get_or_insert(frame);
        } else {
            self.report.settled_at = None;
        }

        frame_max
    }

    /// Returns the statistics collected so far.
    pub fn report(&self) -> ConvergenceReport {
        let mut report = self.report.clone();
        report.rms_residual = if self.samples > 0 {
            (self.sum_squared / self.samples as f64).sqrt() as f32
        } else {
            0.0
        };
        report
    }
}
