//! Fixed timestep accumulator
//!
//! The host frame loop feeds elapsed wall-clock time; the accumulator decides how
//! many fixed simulation steps to run so simulation time tracks real time.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Accumulates frame time and releases it in fixed `dt` slices
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    max_substeps: u32,
    /// Longest frame gap honoured; anything longer is clamped (tab hidden, debugger)
    max_frame: f32,
    accumulator: f32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            max_substeps: MAX_SUBSTEPS,
            max_frame: dt * MAX_SUBSTEPS as f32,
            accumulator: 0.0,
        }
    }

    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self.max_frame = self.dt * self.max_substeps as f32;
        self
    }

    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Unconsumed time, always in `[0, dt)` after `advance` unless substeps were capped
    #[inline]
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Fraction of a step left over, for render interpolation
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.dt).clamp(0.0, 1.0)
    }

    /// Add `elapsed` time and call `step(dt)` for each whole step it covers.
    /// Returns the number of steps run.
    pub fn advance<F: FnMut(f32)>(&mut self, elapsed: f32, mut step: F) -> u32 {
        if !elapsed.is_finite() {
            log::warn!("Ignoring non-finite frame time {elapsed}");
            return 0;
        }
        self.accumulator += elapsed.clamp(0.0, self.max_frame);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            step(self.dt);
            self.accumulator -= self.dt;
            substeps += 1;
        }

        if substeps == self.max_substeps && self.accumulator >= self.dt {
            log::debug!(
                "Dropping {:.2}ms of simulation time after {} substeps",
                self.accumulator,
                substeps
            );
            self.accumulator %= self.dt;
        }
        substeps
    }

    /// Forget any accumulated time (after pause or load)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
