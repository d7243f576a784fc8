//! Offline reconciliation: replay production for time spent away.

use crate::production::simulate_production;
use sim_core::{EconConfig, EconomyState};
use tracing::debug;

/// Sub-steps shorter than this are widened so a replay stays bounded.
pub const MIN_OFFLINE_STEP_SECS: f64 = 0.01;

/// Replay production for `elapsed_ms` of absence.
///
/// The duration is clamped into `[0, offline_cap_ms]` and replayed in
/// sub-steps of `offline_step_secs`, the last one carrying the remainder.
/// Returns the duration actually applied; callers compare it against the raw
/// elapsed time to tell whether the cap kicked in.
pub fn simulate_offline(state: &mut EconomyState, config: &EconConfig, elapsed_ms: i64) -> u64 {
    let applied_ms = u64::try_from(elapsed_ms)
        .unwrap_or(0)
        .min(config.offline_cap_ms);
    if applied_ms == 0 {
        return 0;
    }

    let step = if config.offline_step_secs.is_finite() {
        config.offline_step_secs.max(MIN_OFFLINE_STEP_SECS)
    } else {
        1.0
    };
    let total_secs = applied_ms as f64 / 1000.0;
    let whole_steps = (total_secs / step).floor() as u64;
    let remainder = total_secs - whole_steps as f64 * step;

    let queue_before = state.sell_queue;
    for _ in 0..whole_steps {
        simulate_production(state, config, step);
    }
    simulate_production(state, config, remainder);

    debug!(
        elapsed_ms,
        applied_ms,
        steps = whole_steps,
        dispatched = state.sell_queue - queue_before,
        "offline time replayed"
    );
    applied_ms
}
