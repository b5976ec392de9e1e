//! Fixed timestep frame scheduler
//!
//! Each tick moves things by a fixed displacement, so game speed follows the
//! tick rate. Feeding real frame times through [`FixedStep`] keeps the tick
//! rate at `1 / step` whatever the display refresh rate is.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame delta accepted (longer gaps are treated as this)
const MAX_FRAME_DT: f32 = 0.1;

/// Accumulates frame time and hands out whole ticks
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    /// `step` must be a positive number of seconds; anything else falls back
    /// to [`SIM_DT`]
    pub fn new(step: f32, max_steps: u32) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            log::warn!("Invalid tick step {step}, using {SIM_DT}");
            SIM_DT
        };
        Self {
            step,
            max_steps,
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Add a frame's elapsed seconds, returning how many ticks to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_steps {
            self.accumulator -= self.step;
            ticks += 1;
        }

        // Drop the backlog instead of spiralling
        if ticks == self.max_steps && self.accumulator >= self.step {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator %= self.step;
        }

        ticks
    }

    /// Fraction of a tick left in the accumulator (for render interpolation)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
