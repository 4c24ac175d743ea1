//! Virtual fixed-step clock implementing FrameClock for deterministic runs.

use tendril_env::{EnvError, FrameClock, FrameTime};

/// Simulation clock that only moves when told to.
///
/// Time is kept as integer nanoseconds so long runs do not accumulate
/// floating-point drift; samples are converted to seconds on the way out.
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Ticks per simulated second
    tick_rate_hz: u32,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: u64,

    /// Frames advanced so far
    frame: u64,

    /// Delta reported with the current sample
    last_delta_ns: u64,
}

impl SimClock {
    /// Creates a clock at time zero.
    pub fn new(tick_rate_hz: u32) -> Result<Self, EnvError> {
        if tick_rate_hz == 0 {
            return Err(EnvError::clock("tick rate must be positive"));
        }
        Ok(Self {
            tick_rate_hz,
            virtual_time_ns: 0,
            frame: 0,
            last_delta_ns: 0,
        })
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// Length of one step in nanoseconds.
    pub fn step_ns(&self) -> u64 {
        1_000_000_000 / self.tick_rate_hz as u64
    }

    /// Advances one fixed step and returns the new sample.
    pub fn advance(&mut self) -> FrameTime {
        let step = self.step_ns();
        self.advance_by(step)
    }

    /// Advances by an arbitrary number of nanoseconds.
    pub fn advance_by(&mut self, delta_ns: u64) -> FrameTime {
        self.virtual_time_ns += delta_ns;
        self.last_delta_ns = delta_ns;
        self.frame += 1;
        self.frame_time()
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns
    }
}

impl FrameClock for SimClock {
    fn frame_time(&self) -> FrameTime {
        FrameTime::new(
            self.frame,
            (self.last_delta_ns as f64 / 1e9) as f32,
            (self.virtual_time_ns as f64 / 1e9) as f32,
        )
    }
}
