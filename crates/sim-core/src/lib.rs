#![deny(warnings)]

//! Core domain models and invariants for the dough factory economy.
//!
//! This crate defines the pipeline stages, the static tuning table and the
//! serializable economy state, with validation helpers to guarantee basic
//! invariants. It contains no behavior beyond construction and checks; the
//! simulation lives in `sim-econ`.

mod config;
mod stage;
mod state;
mod time;

pub use config::{validate_config, EconConfig, ValidationError};
pub use stage::{ParseStageError, Stage, StageBuffers, StageTable};
pub use state::{clamp_amount, validate_state, EconomyState};
pub use time::{ManualClock, SystemClock, TimeSource};
