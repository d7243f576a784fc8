#![deny(warnings)]

//! Persistence layer: snapshot codec and storage.
//!
//! Storage and decoding failures never escape this crate. A save that
//! cannot be read or parsed degrades to a fresh state, and a write that
//! fails is reported as `false`; both are logged.

mod codec;
mod store;

pub use codec::{deserialize, serialize, CodecError, Decoded, SAVE_VERSION};
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError};

use sim_core::{EconConfig, EconomyState};
use tracing::{info, warn};

/// Storage key of the single save slot.
pub const SAVE_KEY: &str = "pipeline-idle-save-v1";

/// Where a loaded state came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from a stored snapshot.
    Restored,
    /// Nothing was stored.
    NoSave,
    /// A snapshot existed or was expected but could not be used.
    Discarded,
}

/// Result of [`load_game`].
#[derive(Clone, Debug, PartialEq)]
pub struct LoadOutcome {
    pub state: EconomyState,
    /// Raw time since the last save; the offline reconciler applies the cap.
    pub elapsed_ms: u64,
    pub source: LoadSource,
}

impl LoadOutcome {
    fn fresh(config: &EconConfig, now_ms: i64, source: LoadSource) -> Self {
        let mut state = EconomyState::new(config);
        state.last_seen_at = now_ms;
        Self {
            state,
            elapsed_ms: 0,
            source,
        }
    }
}

/// Read and decode the save slot, falling back to a fresh state on any failure.
pub fn load_game(store: &dyn SnapshotStore, config: &EconConfig, now_ms: i64) -> LoadOutcome {
    let blob = match store.read(SAVE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return LoadOutcome::fresh(config, now_ms, LoadSource::NoSave),
        Err(e) => {
            warn!(error = %e, "save storage unavailable, starting fresh");
            return LoadOutcome::fresh(config, now_ms, LoadSource::Discarded);
        }
    };
    match deserialize(&blob, config, now_ms) {
        Ok(Decoded { state, elapsed_ms }) => {
            info!(elapsed_ms, "save restored");
            LoadOutcome {
                state,
                elapsed_ms,
                source: LoadSource::Restored,
            }
        }
        Err(e) => {
            warn!(error = %e, "save discarded, starting fresh");
            LoadOutcome::fresh(config, now_ms, LoadSource::Discarded)
        }
    }
}

/// Encode and write `state`. Returns whether the save landed.
pub fn save_game(store: &mut dyn SnapshotStore, state: &EconomyState) -> bool {
    let result = serialize(state)
        .map_err(|e| e.to_string())
        .and_then(|blob| store.write(SAVE_KEY, &blob).map_err(|e| e.to_string()));
    match result {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "save failed");
            false
        }
    }
}

/// Delete the save slot. Returns whether the slot is now empty.
pub fn clear_save(store: &mut dyn SnapshotStore) -> bool {
    match store.remove(SAVE_KEY) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to clear save");
            false
        }
    }
}
