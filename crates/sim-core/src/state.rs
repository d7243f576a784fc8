//! The mutable economy snapshot.

use crate::config::{EconConfig, ValidationError};
use crate::stage::{Stage, StageBuffers, StageTable};
use serde::{Deserialize, Serialize};

/// Clamp an amount to `[0, f64::MAX]`, mapping NaN to zero.
///
/// Applied at every site that writes currency, a buffer or the sell queue.
pub fn clamp_amount(v: f64) -> f64 {
    if v.is_nan() || v <= 0.0 {
        0.0
    } else if v == f64::INFINITY {
        f64::MAX
    } else {
        v
    }
}

/// Complete economy state of one factory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    /// Spendable currency.
    pub currency: f64,
    /// In-process material waiting after each non-terminal stage.
    pub stage_buffer: StageBuffers,
    /// Finished units awaiting settlement.
    pub sell_queue: f64,
    /// Workers per stage, always >= 1.
    pub worker_count: StageTable<u32>,
    /// Facility upgrade level per stage.
    pub facility_level: StageTable<u32>,
    /// Global sell-price upgrade level.
    pub brand_level: u32,
    /// Lifetime manual clicks; no economic effect.
    pub total_clicks: u64,
    /// Wall-clock epoch milliseconds of the last save.
    pub last_seen_at: i64,
}

impl EconomyState {
    /// Fresh state: empty buffers, one worker per stage, starting currency.
    pub fn new(config: &EconConfig) -> Self {
        Self {
            currency: clamp_amount(config.starting_currency),
            stage_buffer: StageBuffers::default(),
            sell_queue: 0.0,
            worker_count: StageTable::splat(1),
            facility_level: StageTable::splat(0),
            brand_level: 0,
            total_clicks: 0,
            last_seen_at: 0,
        }
    }

    /// Material produced by `stage` and not yet consumed downstream.
    /// For the terminal stage this is the sell queue.
    pub fn output(&self, stage: Stage) -> f64 {
        self.stage_buffer.get(stage).unwrap_or(self.sell_queue)
    }

    pub fn output_mut(&mut self, stage: Stage) -> &mut f64 {
        match self.stage_buffer.get_mut(stage) {
            Some(buffer) => buffer,
            None => &mut self.sell_queue,
        }
    }

    /// Buffers plus sell queue: everything produced but not yet sold.
    pub fn material_total(&self) -> f64 {
        self.stage_buffer.total() + self.sell_queue
    }
}

/// Check the state invariants that the type system does not already enforce.
pub fn validate_state(s: &EconomyState) -> Result<(), ValidationError> {
    let amounts = [
        ("currency", s.currency),
        ("stage_buffer.dough", s.stage_buffer.dough),
        ("stage_buffer.steam", s.stage_buffer.steam),
        ("stage_buffer.pack", s.stage_buffer.pack),
        ("sell_queue", s.sell_queue),
    ];
    for (field, v) in amounts {
        if !v.is_finite() {
            return Err(ValidationError::NonFinite(field));
        }
        if v < 0.0 {
            return Err(ValidationError::Negative(field));
        }
    }
    for (stage, &workers) in s.worker_count.iter() {
        if workers == 0 {
            return Err(ValidationError::NoWorkers(stage));
        }
    }
    Ok(())
}
