//! Behavior configuration.
//!
//! Plain serde structs with sensible defaults. Every behavior validates its
//! config once at construction so per-frame math never sees a value that
//! would turn into NaN or Infinity.

use crate::error::AnimError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a trailing segment chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Number of points in the chain, head included
    pub segment_count: usize,

    /// Offset of each segment from its predecessor along the anchor's lateral axis
    pub lateral_offset: f32,

    /// Base damping time constant (seconds)
    pub smooth_time: f32,

    /// Divisor for the per-index lag: constant(i) = smooth_time + i / trail_factor
    pub trail_factor: f32,

    /// Angular frequency of the wiggle (radians per second)
    pub wiggle_speed: f32,

    /// Peak wiggle angle (degrees)
    pub wiggle_magnitude: f32,

    /// Optional speed cap for trailing segments (units per second)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f32>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            segment_count: 30,
            lateral_offset: 0.1,
            smooth_time: 0.02,
            trail_factor: 350.0,
            wiggle_speed: 10.0,
            wiggle_magnitude: 20.0,
            max_speed: None,
        }
    }
}

impl ChainConfig {
    pub fn with_segment_count(mut self, segment_count: usize) -> Self {
        self.segment_count = segment_count;
        self
    }

    pub fn with_lateral_offset(mut self, lateral_offset: f32) -> Self {
        self.lateral_offset = lateral_offset;
        self
    }

    pub fn with_smoothing(mut self, smooth_time: f32, trail_factor: f32) -> Self {
        self.smooth_time = smooth_time;
        self.trail_factor = trail_factor;
        self
    }

    pub fn with_wiggle(mut self, speed: f32, magnitude: f32) -> Self {
        self.wiggle_speed = speed;
        self.wiggle_magnitude = magnitude;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    /// Checks every field; the first violation is reported.
    pub fn validate(&self) -> Result<(), AnimError> {
        if self.segment_count == 0 {
            return Err(AnimError::invalid("segment_count must be at least 1"));
        }
        if self.trail_factor == 0.0 {
            return Err(AnimError::invalid("trail_factor must not be zero"));
        }
        if !self.trail_factor.is_finite() || self.trail_factor < 0.0 {
            return Err(AnimError::invalid(format!(
                "trail_factor must be positive and finite, got {}",
                self.trail_factor
            )));
        }
        if !self.smooth_time.is_finite() || self.smooth_time < 0.0 {
            return Err(AnimError::invalid(format!(
                "smooth_time must be non-negative and finite, got {}",
                self.smooth_time
            )));
        }
        require_finite("lateral_offset", self.lateral_offset)?;
        require_finite("wiggle_speed", self.wiggle_speed)?;
        require_finite("wiggle_magnitude", self.wiggle_magnitude)?;
        if let Some(max_speed) = self.max_speed {
            if !max_speed.is_finite() || max_speed <= 0.0 {
                return Err(AnimError::invalid(format!(
                    "max_speed must be positive and finite, got {}",
                    max_speed
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for a facing rotator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacingConfig {
    /// Interpolation rate; the per-frame factor is turn_speed * delta, clamped to [0, 1]
    pub turn_speed: f32,
}

impl Default for FacingConfig {
    fn default() -> Self {
        Self { turn_speed: 5.0 }
    }
}

impl FacingConfig {
    pub fn with_turn_speed(mut self, turn_speed: f32) -> Self {
        self.turn_speed = turn_speed;
        self
    }

    pub fn validate(&self) -> Result<(), AnimError> {
        if !self.turn_speed.is_finite() || self.turn_speed < 0.0 {
            return Err(AnimError::invalid(format!(
                "turn_speed must be non-negative and finite, got {}",
                self.turn_speed
            )));
        }
        Ok(())
    }
}

/// A full rig: one chain and one facing rotator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub chain: ChainConfig,
    pub facing: FacingConfig,
}

impl RigConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, AnimError> {
        let config: RigConfig = serde_json::from_str(json).map_err(AnimError::config)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AnimError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, AnimError> {
        serde_json::to_string_pretty(self).map_err(AnimError::config)
    }

    pub fn validate(&self) -> Result<(), AnimError> {
        self.chain.validate()?;
        self.facing.validate()
    }
}

fn require_finite(name: &str, value: f32) -> Result<(), AnimError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnimError::invalid(format!("{} must be finite, got {}", name, value)))
    }
}
