//! Transaction layer: clicks, purchases and settlement.
//!
//! Purchases are atomic: the cost is computed and checked first, and the
//! state is only touched when the balance covers it.

use crate::rates::{brand_cost, facility_cost, hire_cost, sell_price};
use sim_core::{clamp_amount, EconConfig, EconomyState, Stage};
use thiserror::Error;
use tracing::debug;

/// Errors produced by purchase operations.
#[derive(Debug, Error, PartialEq)]
pub enum TransactionError {
    /// Balance does not cover the price.
    #[error("insufficient funds: cost {cost}, available {available}")]
    InsufficientFunds { cost: f64, available: f64 },
}

/// A completed purchase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Purchase {
    /// Currency spent.
    pub cost: f64,
    /// Worker count or level after the purchase.
    pub new_level: u32,
}

/// Outcome of converting queued units into currency.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Settlement {
    pub units: u64,
    pub earned: f64,
}

fn charge(state: &mut EconomyState, cost: f64) -> Result<(), TransactionError> {
    if state.currency < cost {
        return Err(TransactionError::InsufficientFunds {
            cost,
            available: state.currency,
        });
    }
    state.currency = clamp_amount(state.currency - cost);
    Ok(())
}

/// Add one click worth of dough to the entry buffer. Always succeeds.
pub fn apply_click(state: &mut EconomyState, config: &EconConfig) {
    let entry = state.output_mut(Stage::FIRST);
    *entry = clamp_amount(*entry + clamp_amount(config.click_gain));
    state.total_clicks = state.total_clicks.saturating_add(1);
}

/// Hire one more worker on `stage`.
pub fn hire_worker(
    state: &mut EconomyState,
    config: &EconConfig,
    stage: Stage,
) -> Result<Purchase, TransactionError> {
    let cost = hire_cost(state, config, stage);
    charge(state, cost)?;
    let workers = &mut state.worker_count[stage];
    *workers = workers.saturating_add(1);
    debug!(%stage, cost, workers = *workers, "worker hired");
    Ok(Purchase {
        cost,
        new_level: *workers,
    })
}

/// Raise the facility level of `stage` by one.
pub fn upgrade_facility(
    state: &mut EconomyState,
    config: &EconConfig,
    stage: Stage,
) -> Result<Purchase, TransactionError> {
    let cost = facility_cost(state, config, stage);
    charge(state, cost)?;
    let level = &mut state.facility_level[stage];
    *level = level.saturating_add(1);
    debug!(%stage, cost, level = *level, "facility upgraded");
    Ok(Purchase {
        cost,
        new_level: *level,
    })
}

/// Raise the brand level by one.
pub fn upgrade_brand(
    state: &mut EconomyState,
    config: &EconConfig,
) -> Result<Purchase, TransactionError> {
    let cost = brand_cost(state, config);
    charge(state, cost)?;
    state.brand_level = state.brand_level.saturating_add(1);
    debug!(cost, level = state.brand_level, "brand upgraded");
    Ok(Purchase {
        cost,
        new_level: state.brand_level,
    })
}

/// Whether the sell queue holds at least one whole unit.
pub fn can_settle(state: &EconomyState) -> bool {
    state.sell_queue >= 1.0
}

/// Sell every whole unit in the queue.
///
/// Partial units stay queued. Returns an empty settlement, leaving the state
/// untouched, when less than one unit is waiting. One call sells at most
/// `u64::MAX` units; anything beyond stays queued for the next call.
pub fn settle(state: &mut EconomyState, config: &EconConfig) -> Settlement {
    let whole = state.sell_queue.floor();
    if whole.is_nan() || whole < 1.0 {
        return Settlement::default();
    }
    let units = whole.min(u64::MAX as f64) as u64;
    let sold = units as f64;
    let earned = clamp_amount(sold * sell_price(state, config));
    state.sell_queue = clamp_amount(state.sell_queue - sold);
    state.currency = clamp_amount(state.currency + earned);
    debug!(units, earned, "sell queue settled");
    Settlement { units, earned }
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
    fn click_adds_dough_and_counts() {
        let (mut s, cfg) = fresh();
        apply_click(&mut s, &cfg);
        assert_eq!(s.stage_buffer.dough, 1.0);
        assert_eq!(s.total_clicks, 1);
        assert_eq!(s.currency, 30.0);
    }

    #[test]
    fn settle_sells_whole_units_only() {
        let (mut s, cfg) = fresh();
        s.sell_queue = 12.8;
        let price = sell_price(&s, &cfg);
        let result = settle(&mut s, &cfg);
        assert_eq!(result.units, 12);
        assert_eq!(result.earned, 12.0 * price);
        assert!((s.sell_queue - 0.8).abs() < 1e-9);
        assert_eq!(s.currency, 30.0 + 12.0 * price);
    }

    #[test]
    fn settle_below_one_unit_changes_nothing() {
        let (mut s, cfg) = fresh();
        s.sell_queue = 0.99;
        let before = s.clone();
        assert!(!can_settle(&s));
        assert_eq!(settle(&mut s, &cfg), Settlement::default());
        assert_eq!(s, before);
    }

    #[test]
    fn settle_caps_units_and_keeps_earnings_consistent() {
        let (mut s, cfg) = fresh();
        s.sell_queue = 1e30;
        let price = sell_price(&s, &cfg);
        let first = settle(&mut s, &cfg);
        assert_eq!(first.units, u64::MAX);
        assert_eq!(first.earned, first.units as f64 * price);
        assert!(s.sell_queue > 1.0);
        assert!(can_settle(&s));
        assert_eq!(settle(&mut s, &cfg).units, u64::MAX);
        sim_core::validate_state(&s).unwrap();
    }

    #[test]
    fn hire_without_funds_fails_cleanly() {
        let (mut s, cfg) = fresh();
        s.currency = 10.0;
        let before = s.clone();
        let err = hire_worker(&mut s, &cfg, Stage::Dough).unwrap_err();
        assert_eq!(
            err,
            TransactionError::InsufficientFunds {
                cost: 22.0,
                available: 10.0
            }
        );
        assert_eq!(s, before);
    }

    #[test]
    fn hire_charges_and_increments() {
        let (mut s, cfg) = fresh();
        let p = hire_worker(&mut s, &cfg, Stage::Dough).unwrap();
        assert_eq!(p, Purchase { cost: 22.0, new_level: 2 });
        assert_eq!(s.currency, 8.0);
        assert_eq!(s.worker_count[Stage::Dough], 2);
    }

    #[test]
    fn exact_balance_is_enough() {
        let (mut s, cfg) = fresh();
        s.currency = 230.0;
        upgrade_brand(&mut s, &cfg).unwrap();
        assert_eq!(s.currency, 0.0);
        assert_eq!(s.brand_level, 1);
    }

    #[test]
    fn facility_upgrade_charges_level_price() {
        let (mut s, cfg) = fresh();
        s.currency = 1_000.0;
        let first = upgrade_facility(&mut s, &cfg, Stage::Pack).unwrap();
        let second = upgrade_facility(&mut s, &cfg, Stage::Pack).unwrap();
        assert_eq!(first.cost, 128.0);
        assert!(second.cost > first.cost);
        assert_eq!(s.facility_level[Stage::Pack], 2);
        assert_eq!(s.currency, 1_000.0 - first.cost - second.cost);
        assert!(upgrade_facility(&mut s, &cfg, Stage::Dispatch).is_ok());
        s.currency = 0.0;
        assert!(upgrade_facility(&mut s, &cfg, Stage::Dispatch).is_err());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Click,
        Hire(usize),
        Facility(usize),
        Brand,
        Settle,
        Produce(f64),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Click),
            (0usize..Stage::COUNT).prop_map(Op::Hire),
            (0usize..Stage::COUNT).prop_map(Op::Facility),
            Just(Op::Brand),
            Just(Op::Settle),
            (0.0f64..30.0).prop_map(Op::Produce),
        ]
    }

    proptest! {
        #[test]
        fn any_operation_sequence_keeps_invariants(ops in prop::collection::vec(arb_op(), 1..200)) {
            let (mut s, cfg) = fresh();
            let mut clicks = 0u64;
            for op in ops {
                match op {
                    Op::Click => { apply_click(&mut s, &cfg); clicks += 1; }
                    Op::Hire(i) => { let _ = hire_worker(&mut s, &cfg, Stage::ALL[i]); }
                    Op::Facility(i) => { let _ = upgrade_facility(&mut s, &cfg, Stage::ALL[i]); }
                    Op::Brand => { let _ = upgrade_brand(&mut s, &cfg); }
                    Op::Settle => {
                        let r = settle(&mut s, &cfg);
                        prop_assert!(s.sell_queue < 1.0);
                        prop_assert_eq!(r.earned, r.units as f64 * sell_price(&s, &cfg));
                    }
                    Op::Produce(dt) => { crate::simulate_production(&mut s, &cfg, dt); }
                }
                prop_assert!(sim_core::validate_state(&s).is_ok());
            }
            prop_assert_eq!(s.total_clicks, clicks);
        }

        #[test]
        fn settle_leaves_fraction(queue in 0.0f64..1e12) {
            let (mut s, cfg) = fresh();
            s.sell_queue = queue;
            let r = settle(&mut s, &cfg);
            prop_assert!(s.sell_queue < 1.0);
            prop_assert!(s.sell_queue >= 0.0);
            prop_assert_eq!(r.units, queue.floor() as u64);
        }
    }
}
