//! A running game: state, tuning, live clock and notifications in one place.

use crate::clock::FixedStepClock;
use crate::events::{EconomyEvent, EventBus, OfflineReport};
use crate::sheet::{PriceSheet, Upgrade};
use persistence::{clear_save, load_game, save_game, LoadSource, SnapshotStore};
use sim_core::{clamp_amount, EconConfig, EconomyState, Stage};
use sim_econ::{Purchase, Settlement, TransactionError};
use tracing::{debug, info, warn};

/// What [`Session::restore`] found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestoreReport {
    pub source: LoadSource,
    pub offline: OfflineReport,
}

#[derive(Debug)]
pub struct Session {
    config: EconConfig,
    state: EconomyState,
    clock: FixedStepClock,
    bus: EventBus,
    last_saved_at: i64,
}

impl Session {
    /// Start a fresh game at `now_ms`.
    pub fn new(config: EconConfig, now_ms: i64) -> Self {
        let mut state = EconomyState::new(&config);
        state.last_seen_at = now_ms;
        Self::from_state(config, state)
    }

    pub fn from_state(config: EconConfig, state: EconomyState) -> Self {
        let clock = FixedStepClock::new(config.fixed_step_secs, config.max_frame_ms);
        let last_saved_at = state.last_seen_at;
        Self {
            config,
            state,
            clock,
            bus: EventBus::new(),
            last_saved_at,
        }
    }

    /// Load the save slot and replay the time spent away.
    pub fn restore(
        config: EconConfig,
        store: &dyn SnapshotStore,
        now_ms: i64,
    ) -> (Self, RestoreReport) {
        let loaded = load_game(store, &config, now_ms);
        let mut session = Self::from_state(config, loaded.state);
        let offline = session.apply_offline(loaded.elapsed_ms);
        // The gap is spent; the next save measures from here.
        session.state.last_seen_at = now_ms;
        session.last_saved_at = now_ms;
        info!(
            source = ?loaded.source,
            elapsed_ms = offline.elapsed_ms,
            applied_ms = offline.applied_ms,
            capped = offline.capped,
            "session restored"
        );
        (
            session,
            RestoreReport {
                source: loaded.source,
                offline,
            },
        )
    }

    /// Credit production for `elapsed_ms` of absence, subject to the cap.
    pub fn apply_offline(&mut self, elapsed_ms: u64) -> OfflineReport {
        let queue_before = self.state.sell_queue;
        let raw = i64::try_from(elapsed_ms).unwrap_or(i64::MAX);
        let applied_ms = sim_econ::simulate_offline(&mut self.state, &self.config, raw);
        let report = OfflineReport {
            elapsed_ms,
            applied_ms,
            capped: elapsed_ms > applied_ms,
            dispatched: clamp_amount(self.state.sell_queue - queue_before),
        };
        if applied_ms > 0 {
            self.bus.emit(EconomyEvent::OfflineApplied(report));
        }
        report
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn config(&self) -> &EconConfig {
        &self.config
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn price_sheet(&self) -> PriceSheet {
        PriceSheet::build(&self.state, &self.config)
    }

    pub fn click(&mut self) {
        sim_econ::apply_click(&mut self.state, &self.config);
        self.bus.emit(EconomyEvent::Clicked {
            total_clicks: self.state.total_clicks,
        });
    }

    pub fn hire(&mut self, stage: Stage) -> Result<Purchase, TransactionError> {
        let p = sim_econ::hire_worker(&mut self.state, &self.config, stage)?;
        self.bus.emit(EconomyEvent::WorkerHired {
            stage,
            workers: p.new_level,
            cost: p.cost,
        });
        Ok(p)
    }

    pub fn upgrade_facility(&mut self, stage: Stage) -> Result<Purchase, TransactionError> {
        let p = sim_econ::upgrade_facility(&mut self.state, &self.config, stage)?;
        self.bus.emit(EconomyEvent::FacilityUpgraded {
            stage,
            level: p.new_level,
            cost: p.cost,
        });
        Ok(p)
    }

    pub fn upgrade_brand(&mut self) -> Result<Purchase, TransactionError> {
        let p = sim_econ::upgrade_brand(&mut self.state, &self.config)?;
        self.bus.emit(EconomyEvent::BrandUpgraded {
            level: p.new_level,
            cost: p.cost,
        });
        Ok(p)
    }

    pub fn buy(&mut self, upgrade: Upgrade) -> Result<Purchase, TransactionError> {
        match upgrade {
            Upgrade::Hire(stage) => self.hire(stage),
            Upgrade::Facility(stage) => self.upgrade_facility(stage),
            Upgrade::Brand => self.upgrade_brand(),
        }
    }

    /// Sell whole queued units. Emits nothing when there was nothing to sell.
    pub fn settle(&mut self) -> Settlement {
        let s = sim_econ::settle(&mut self.state, &self.config);
        if s.units > 0 {
            self.bus.emit(EconomyEvent::Settled {
                units: s.units,
                earned: s.earned,
            });
        }
        s
    }

    /// Feed one frame of `frame_ms` to the live clock and run the whole
    /// fixed steps it yields. Returns the number of steps run.
    pub fn advance(&mut self, frame_ms: f64) -> u32 {
        let steps = self.clock.feed(frame_ms);
        if steps == 0 {
            return 0;
        }
        let dt = self.clock.step_secs();
        let mut dispatched = 0.0;
        for _ in 0..steps {
            let report = sim_econ::simulate_production(&mut self.state, &self.config, dt);
            dispatched = clamp_amount(dispatched + report.dispatched);
        }
        self.bus.emit(EconomyEvent::Produced { steps, dispatched });
        steps
    }

    /// Stamp `now_ms` into the state and write it. Returns whether it landed.
    pub fn save(&mut self, store: &mut dyn SnapshotStore, now_ms: i64) -> bool {
        self.state.last_seen_at = now_ms;
        if !save_game(store, &self.state) {
            return false;
        }
        self.last_saved_at = now_ms;
        debug!(at_ms = now_ms, "session saved");
        self.bus.emit(EconomyEvent::Saved { at_ms: now_ms });
        true
    }

    /// Save if the autosave interval has elapsed since the last save.
    pub fn maybe_autosave(&mut self, store: &mut dyn SnapshotStore, now_ms: i64) -> bool {
        let interval = i64::try_from(self.config.autosave_interval_ms).unwrap_or(i64::MAX);
        if now_ms.saturating_sub(self.last_saved_at) < interval {
            return false;
        }
        self.save(store, now_ms)
    }

    /// Discard all progress, clear the slot and persist the fresh state.
    ///
    /// Returns `true` only when the slot was cleared and the fresh state
    /// written. The in-memory reset happens either way.
    pub fn reset(&mut self, store: &mut dyn SnapshotStore, now_ms: i64) -> bool {
        self.state = EconomyState::new(&self.config);
        self.state.last_seen_at = now_ms;
        self.clock.reset();
        let cleared = clear_save(store);
        let saved = self.save(store, now_ms);
        if cleared && saved {
            info!("session reset");
        } else {
            warn!(cleared, saved, "session reset in memory only");
        }
        self.bus.emit(EconomyEvent::Reset);
        cleared && saved
    }
}
