//! Rate calculator: throughput and prices derived from state and tuning.
//!
//! Every function here is pure. Costs are whole numbers >= 1 and never
//! decrease as the corresponding level rises, even for degenerate tables:
//! the base cost is clamped to >= 1 and the growth factor to
//! [`MIN_COST_GROWTH`] before exponentiating.

use sim_core::{clamp_amount, EconConfig, EconomyState, Stage, StageTable};

/// Smallest growth factor used when pricing upgrades.
pub const MIN_COST_GROWTH: f64 = 1.01;

/// `ceil(base * growth^exponent)` with both inputs made safe first.
///
/// An infinite base and any overflow saturate at `f64::MAX`; a NaN base
/// prices as 1.
pub fn geometric_cost(base: f64, growth: f64, exponent: u32) -> f64 {
    let base = if base.is_nan() { 1.0 } else { clamp_amount(base).max(1.0) };
    let growth = if growth.is_finite() {
        growth.max(MIN_COST_GROWTH)
    } else {
        MIN_COST_GROWTH
    };
    let cost = (base * growth.powf(f64::from(exponent))).ceil();
    if cost.is_finite() {
        cost.max(1.0)
    } else {
        f64::MAX
    }
}

/// Units per second `stage` can move:
/// `base_rate * workers * (1 + facility_level * bonus)`.
///
/// The facility bonus is flat per level, not compounding. Overflow
/// saturates at `f64::MAX`, so the rate never falls as workers or levels rise.
pub fn effective_rate(state: &EconomyState, config: &EconConfig, stage: Stage) -> f64 {
    let workers = f64::from(state.worker_count[stage]);
    let level = f64::from(state.facility_level[stage]);
    let multiplier = 1.0 + level * clamp_amount(config.facility_bonus_per_level);
    clamp_amount(clamp_amount(config.base_rate[stage]) * workers * multiplier)
}

/// Effective rate of every stage.
pub fn rates(state: &EconomyState, config: &EconConfig) -> StageTable<f64> {
    StageTable::from_fn(|stage| effective_rate(state, config, stage))
}

/// Slowest stage; ties resolve to the earliest in pipeline order.
pub fn bottleneck(state: &EconomyState, config: &EconConfig) -> Stage {
    let r = rates(state, config);
    Stage::ALL
        .into_iter()
        .fold(Stage::FIRST, |slowest, stage| {
            if r[stage] < r[slowest] {
                stage
            } else {
                slowest
            }
        })
}

/// Currency per settled unit: `base_sell_price * (1 + brand_level * bonus)`.
pub fn sell_price(state: &EconomyState, config: &EconConfig) -> f64 {
    let level = f64::from(state.brand_level);
    clamp_amount(
        clamp_amount(config.base_sell_price)
            * (1.0 + level * clamp_amount(config.brand_bonus_per_level)),
    )
}

/// Price of the next worker on `stage`.
pub fn hire_cost(state: &EconomyState, config: &EconConfig, stage: Stage) -> f64 {
    let extra_workers = state.worker_count[stage].saturating_sub(1);
    geometric_cost(config.hire_base_cost[stage], config.hire_growth, extra_workers)
}

/// Price of the next facility level on `stage`.
pub fn facility_cost(state: &EconomyState, config: &EconConfig, stage: Stage) -> f64 {
    geometric_cost(
        config.facility_base_cost[stage],
        config.facility_growth,
        state.facility_level[stage],
    )
}

/// Price of the next brand level.
pub fn brand_cost(state: &EconomyState, config: &EconConfig) -> f64 {
    geometric_cost(config.brand_base_cost, config.brand_growth, state.brand_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fresh() -> (EconomyState, EconConfig) {
        let cfg = EconConfig::default();
        (EconomyState::new(&cfg), cfg)
    }

    #[test]
    fn rate_is_linear_in_workers() {
        let (mut s, cfg) = fresh();
        let one = effective_rate(&s, &cfg, Stage::Steam);
        assert!((one - 0.94).abs() < 1e-12);
        s.worker_count[Stage::Steam] = 3;
        let three = effective_rate(&s, &cfg, Stage::Steam);
        assert!((three - 3.0 * one).abs() < 1e-12);
    }

    #[test]
    fn facility_bonus_is_flat_not_compounding() {
        let (mut s, cfg) = fresh();
        s.facility_level[Stage::Dough] = 5;
        let r = effective_rate(&s, &cfg, Stage::Dough);
        let expected = 1.35 * (1.0 + 5.0 * 0.18);
        assert!((r - expected).abs() < 1e-12);
        assert!(r < 1.35 * 1.18f64.powi(5));
    }

    #[test]
    fn sell_price_scales_with_brand() {
        let (mut s, cfg) = fresh();
        assert_eq!(sell_price(&s, &cfg), 6.0);
        s.brand_level = 2;
        assert!((sell_price(&s, &cfg) - 6.0 * 1.4).abs() < 1e-12);
    }

    #[test]
    fn default_costs_match_table() {
        let (mut s, cfg) = fresh();
        assert_eq!(hire_cost(&s, &cfg, Stage::Dough), 22.0);
        assert_eq!(facility_cost(&s, &cfg, Stage::Dispatch), 170.0);
        assert_eq!(brand_cost(&s, &cfg), 230.0);
        s.worker_count[Stage::Dough] = 2;
        // ceil(22 * 1.28) = ceil(28.16)
        assert_eq!(hire_cost(&s, &cfg, Stage::Dough), 29.0);
        s.brand_level = 1;
        // ceil(230 * 1.65) = ceil(379.5)
        assert_eq!(brand_cost(&s, &cfg), 380.0);
    }

    #[test]
    fn degenerate_table_still_charges() {
        let (mut s, mut cfg) = fresh();
        cfg.hire_base_cost = StageTable::splat(0.0);
        cfg.hire_growth = 0.5;
        cfg.brand_base_cost = -40.0;
        cfg.brand_growth = f64::NAN;
        cfg.facility_base_cost = StageTable::splat(f64::NAN);
        assert_eq!(hire_cost(&s, &cfg, Stage::Pack), 1.0);
        assert_eq!(brand_cost(&s, &cfg), 1.0);
        assert_eq!(facility_cost(&s, &cfg, Stage::Pack), 1.0);
        s.worker_count[Stage::Pack] = 200;
        assert!(hire_cost(&s, &cfg, Stage::Pack) > 1.0);
    }

    #[test]
    fn overflowing_cost_saturates() {
        let (mut s, cfg) = fresh();
        s.brand_level = u32::MAX;
        assert_eq!(brand_cost(&s, &cfg), f64::MAX);
    }

    #[test]
    fn infinite_base_cost_is_the_dearest_price() {
        let (s, mut cfg) = fresh();
        cfg.facility_base_cost[Stage::Steam] = f64::INFINITY;
        assert_eq!(facility_cost(&s, &cfg, Stage::Steam), f64::MAX);
        assert!(facility_cost(&s, &cfg, Stage::Steam) > facility_cost(&s, &cfg, Stage::Dough));
    }

    #[test]
    fn huge_rates_saturate_instead_of_stalling() {
        let (mut s, mut cfg) = fresh();
        cfg.base_rate[Stage::Steam] = f64::MAX / 2.0;
        let one = effective_rate(&s, &cfg, Stage::Steam);
        s.worker_count[Stage::Steam] = 3;
        let three = effective_rate(&s, &cfg, Stage::Steam);
        assert_eq!(one, f64::MAX / 2.0);
        assert_eq!(three, f64::MAX);

        cfg.base_rate[Stage::Pack] = f64::INFINITY;
        assert_eq!(effective_rate(&s, &cfg, Stage::Pack), f64::MAX);

        cfg.facility_bonus_per_level = f64::INFINITY;
        s.facility_level[Stage::Dough] = 2;
        assert_eq!(effective_rate(&s, &cfg, Stage::Dough), f64::MAX);
    }

    #[test]
    fn degenerate_rates_are_zero() {
        let (s, mut cfg) = fresh();
        cfg.base_rate[Stage::Pack] = -2.0;
        cfg.base_rate[Stage::Steam] = f64::NAN;
        assert_eq!(effective_rate(&s, &cfg, Stage::Pack), 0.0);
        assert_eq!(effective_rate(&s, &cfg, Stage::Steam), 0.0);
    }

    #[test]
    fn bottleneck_is_slowest_stage() {
        let (mut s, cfg) = fresh();
        assert_eq!(bottleneck(&s, &cfg), Stage::Dispatch);
        s.worker_count[Stage::Dispatch] = 4;
        assert_eq!(bottleneck(&s, &cfg), Stage::Pack);
    }

    proptest! {
        #[test]
        fn costs_never_decrease(base in -100.0f64..10_000.0,
                                growth in -2.0f64..3.0,
                                level in 0u32..2_000) {
            let a = geometric_cost(base, growth, level);
            let b = geometric_cost(base, growth, level + 1);
            prop_assert!(a >= 1.0);
            prop_assert!(b >= a);
            prop_assert_eq!(a, a.ceil());
        }

        #[test]
        fn rate_never_falls_as_workers_rise(base in 1e300f64..f64::MAX,
                                            workers in 1u32..u32::MAX,
                                            level in 0u32..1_000) {
            let mut cfg = EconConfig::default();
            cfg.base_rate[Stage::Pack] = base;
            let mut s = EconomyState::new(&cfg);
            s.facility_level[Stage::Pack] = level;
            s.worker_count[Stage::Pack] = workers;
            let before = effective_rate(&s, &cfg, Stage::Pack);
            s.worker_count[Stage::Pack] = workers + 1;
            let after = effective_rate(&s, &cfg, Stage::Pack);
            prop_assert!(before.is_finite() && after.is_finite());
            prop_assert!(after >= before);
        }

        #[test]
        fn hire_cost_monotonic_in_workers(workers in 1u32..500, stage_idx in 0usize..Stage::COUNT) {
            let cfg = EconConfig::default();
            let stage = Stage::ALL[stage_idx];
            let mut s = EconomyState::new(&cfg);
            s.worker_count[stage] = workers;
            let before = hire_cost(&s, &cfg, stage);
            s.worker_count[stage] = workers + 1;
            prop_assert!(hire_cost(&s, &cfg, stage) >= before);
            prop_assert!(before >= cfg.hire_base_cost[stage]);
        }
    }
}
