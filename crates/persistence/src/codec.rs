//! Versioned snapshot encoding with field-by-field sanitizing on decode.
//!
//! Decoding treats the blob as untrusted: the envelope (JSON syntax,
//! version, presence of `state`) must be intact, but individual fields are
//! coerced to safe defaults instead of failing the whole load.

use serde::Serialize;
use serde_json::Value;
use sim_core::{clamp_amount, EconConfig, EconomyState, Stage, StageBuffers, StageTable};
use thiserror::Error;
use tracing::debug;

/// Current snapshot schema version.
pub const SAVE_VERSION: u32 = 1;

/// Errors produced while decoding a snapshot envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found:?}")]
    VersionMismatch { found: Option<u64> },
    #[error("snapshot has no state object")]
    MissingState,
}

#[derive(Serialize)]
struct SavedState<'a> {
    currency: f64,
    stage_buffer: &'a StageBuffers,
    sell_queue: f64,
    worker_count: &'a StageTable<u32>,
    facility_level: &'a StageTable<u32>,
    brand_level: u32,
    total_clicks: u64,
}

#[derive(Serialize)]
struct SavePayload<'a> {
    version: u32,
    last_seen_at: i64,
    state: SavedState<'a>,
}

/// A decoded snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub state: EconomyState,
    /// Milliseconds between the stored timestamp and now, never negative and
    /// not yet capped.
    pub elapsed_ms: u64,
}

/// Encode `state`, stamped with `state.last_seen_at`.
pub fn serialize(state: &EconomyState) -> Result<String, CodecError> {
    let payload = SavePayload {
        version: SAVE_VERSION,
        last_seen_at: state.last_seen_at,
        state: SavedState {
            currency: state.currency,
            stage_buffer: &state.stage_buffer,
            sell_queue: state.sell_queue,
            worker_count: &state.worker_count,
            facility_level: &state.facility_level,
            brand_level: state.brand_level,
            total_clicks: state.total_clicks,
        },
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Decode a snapshot, sanitizing every field against a fresh state.
pub fn deserialize(blob: &str, config: &EconConfig, now_ms: i64) -> Result<Decoded, CodecError> {
    let root: Value = serde_json::from_str(blob)?;
    let version = root.get("version").and_then(Value::as_u64);
    if version != Some(u64::from(SAVE_VERSION)) {
        return Err(CodecError::VersionMismatch { found: version });
    }
    let saved = root
        .get("state")
        .filter(|v| v.is_object())
        .ok_or(CodecError::MissingState)?;

    let fallback = EconomyState::new(config);
    let buffers = saved.get("stage_buffer");
    let buffer = |stage: Stage, default: f64| amount(buffers.and_then(|b| b.get(stage.name())), default);

    let last_seen_at = root
        .get("last_seen_at")
        .and_then(timestamp)
        .unwrap_or(now_ms);
    let elapsed_ms = u64::try_from(now_ms.saturating_sub(last_seen_at)).unwrap_or(0);

    let state = EconomyState {
        currency: amount(saved.get("currency"), fallback.currency),
        stage_buffer: StageBuffers {
            dough: buffer(Stage::Dough, fallback.stage_buffer.dough),
            steam: buffer(Stage::Steam, fallback.stage_buffer.steam),
            pack: buffer(Stage::Pack, fallback.stage_buffer.pack),
        },
        sell_queue: amount(saved.get("sell_queue"), fallback.sell_queue),
        worker_count: stage_counts(saved.get("worker_count"), 1, &fallback.worker_count),
        facility_level: stage_counts(saved.get("facility_level"), 0, &fallback.facility_level),
        brand_level: small_count(saved.get("brand_level"), 0, fallback.brand_level),
        total_clicks: count(saved.get("total_clicks"), 0, fallback.total_clicks),
        last_seen_at,
    };
    debug!(elapsed_ms, "snapshot decoded");
    Ok(Decoded { state, elapsed_ms })
}

/// Non-negative finite amount; anything else falls back.
fn amount(v: Option<&Value>, fallback: f64) -> f64 {
    match v.and_then(Value::as_f64) {
        Some(x) if x.is_finite() => clamp_amount(x),
        _ => fallback,
    }
}

/// Whole count of at least `min`. Fractions are floored, oversize values saturate.
fn count(v: Option<&Value>, min: u64, fallback: u64) -> u64 {
    let Some(v) = v else {
        return fallback;
    };
    if let Some(n) = v.as_u64() {
        return n.max(min);
    }
    match v.as_f64() {
        Some(x) if x.is_finite() => (x.floor() as u64).max(min),
        _ => fallback,
    }
}

fn small_count(v: Option<&Value>, min: u32, fallback: u32) -> u32 {
    let n = count(v, u64::from(min), u64::from(fallback));
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn stage_counts(v: Option<&Value>, min: u32, fallback: &StageTable<u32>) -> StageTable<u32> {
    StageTable::from_fn(|stage| {
        small_count(v.and_then(|t| t.get(stage.name())), min, fallback[stage])
    })
}

fn timestamp(v: &Value) -> Option<i64> {
    if let Some(ms) = v.as_i64() {
        return Some(ms);
    }
    v.as_f64().filter(|x| x.is_finite()).map(|x| x as i64)
}
