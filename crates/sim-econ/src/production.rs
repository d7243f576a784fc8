//! Production simulator: moves material through the pipeline over a time delta.

use crate::rates::effective_rate;
use sim_core::{clamp_amount, EconConfig, EconomyState, Stage};

/// What one production step did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProductionReport {
    /// Material created at the entry stage.
    pub produced: f64,
    /// Material that reached the sell queue.
    pub dispatched: f64,
}

/// Advance the pipeline by `seconds`.
///
/// Returns an empty report without touching the state when `seconds` is
/// non-finite or not positive. Stages are processed strictly in pipeline
/// order and each transfer is capped by what currently sits upstream, so no
/// stage can emit material it has not received.
pub fn simulate_production(
    state: &mut EconomyState,
    config: &EconConfig,
    seconds: f64,
) -> ProductionReport {
    if !seconds.is_finite() || seconds <= 0.0 {
        return ProductionReport::default();
    }

    let produced = clamp_amount(effective_rate(state, config, Stage::FIRST) * seconds);
    let entry = state.output_mut(Stage::FIRST);
    *entry = clamp_amount(*entry + produced);

    let mut dispatched = 0.0;
    for stage in Stage::ALL {
        let Some(upstream) = stage.upstream() else {
            continue;
        };
        let capacity = clamp_amount(effective_rate(state, config, stage) * seconds);
        let available = state.output(upstream);
        let moved = available.min(capacity);
        if moved <= 0.0 {
            continue;
        }
        *state.output_mut(upstream) = clamp_amount(available - moved);
        let downstream = state.output_mut(stage);
        *downstream = clamp_amount(*downstream + moved);
        if stage.is_terminal() {
            dispatched = moved;
        }
    }

    ProductionReport {
        produced,
        dispatched,
    }
}
