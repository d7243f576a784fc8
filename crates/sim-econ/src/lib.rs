#![deny(warnings)]

//! Economy simulation for the dough factory.
//!
//! This crate provides the behavior over `sim-core` types:
//! - Rate calculator: throughput, sell price and upgrade costs
//! - Production simulator: buffer-limited flow through the pipeline
//! - Offline reconciler: capped, sub-stepped replay of time spent away
//! - Transaction layer: clicks, purchases and settlement
//!
//! All operations take the state and tuning table explicitly; nothing here
//! keeps global state.

mod offline;
mod production;
mod rates;
mod transactions;

pub use offline::{simulate_offline, MIN_OFFLINE_STEP_SECS};
pub use production::{simulate_production, ProductionReport};
pub use rates::{
    bottleneck, brand_cost, effective_rate, facility_cost, geometric_cost, hire_cost, rates,
    sell_price, MIN_COST_GROWTH,
};
pub use transactions::{
    apply_click, can_settle, hire_worker, settle, upgrade_brand, upgrade_facility, Purchase,
    Settlement, TransactionError,
};
