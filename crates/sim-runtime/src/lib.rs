#![deny(warnings)]

//! Live runtime around the economy: fixed-step clock, change notifications,
//! and a session that ties state, tuning and persistence together.

mod clock;
mod events;
mod session;
mod sheet;
mod shared;

pub use clock::FixedStepClock;
pub use events::{EconomyEvent, EventBus, ListenerId, OfflineReport};
pub use session::{RestoreReport, Session};
pub use sheet::{PriceSheet, StageQuote, Upgrade};
pub use shared::SharedSession;
