//! Fixed-timestep clock using an accumulator.
//!
//! Frames arrive with variable deltas; the clock converts them into a whole
//! number of fixed simulation steps so production does not depend on frame
//! rate. The remainder carries over to the next frame.

/// Steps shorter than this are widened.
const MIN_STEP_SECS: f64 = 0.001;
const DEFAULT_STEP_SECS: f64 = 0.1;
const DEFAULT_MAX_FRAME_MS: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FixedStepClock {
    step_ms: f64,
    /// Longest frame delta accepted; larger gaps belong to offline replay.
    max_frame_ms: f64,
    accumulator_ms: f64,
    last_timestamp: Option<f64>,
    /// Total steps produced since creation or the last reset.
    pub total_steps: u64,
}

impl FixedStepClock {
    pub fn new(step_secs: f64, max_frame_ms: f64) -> Self {
        let step_secs = if step_secs.is_finite() {
            step_secs.max(MIN_STEP_SECS)
        } else {
            DEFAULT_STEP_SECS
        };
        let max_frame_ms = if max_frame_ms.is_finite() && max_frame_ms > 0.0 {
            max_frame_ms
        } else {
            DEFAULT_MAX_FRAME_MS
        };
        Self {
            step_ms: step_secs * 1000.0,
            max_frame_ms,
            accumulator_ms: 0.0,
            last_timestamp: None,
            total_steps: 0,
        }
    }

    pub fn step_secs(&self) -> f64 {
        self.step_ms / 1000.0
    }

    /// Feed a frame delta in milliseconds; returns the steps to simulate.
    ///
    /// Negative or non-finite deltas count as zero, oversized ones are
    /// clamped to the frame limit.
    pub fn feed(&mut self, delta_ms: f64) -> u32 {
        let delta = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, self.max_frame_ms)
        } else {
            0.0
        };
        self.accumulator_ms += delta;
        let steps = (self.accumulator_ms / self.step_ms).floor();
        self.accumulator_ms -= steps * self.step_ms;
        if self.accumulator_ms < 0.0 {
            self.accumulator_ms = 0.0;
        }
        let steps = steps as u32;
        self.total_steps += u64::from(steps);
        steps
    }

    /// Feed a monotonic timestamp in milliseconds; the first call yields zero.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => now_ms - prev,
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        self.feed(delta)
    }

    /// Drop any accumulated remainder and the timestamp baseline.
    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
        self.last_timestamp = None;
        self.total_steps = 0;
    }
}
