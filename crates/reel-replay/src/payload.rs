//! JSON payload form of a recorded run.
//!
//! Building is strict about what goes out (finite numbers, capped
//! sizes, no empty action ids); hydration is lenient about what comes
//! in, because stored documents may have been written by other builds
//! or tampered with. A malformed field degrades to its default rather
//! than rejecting the whole document; only unparseable JSON or a
//! document missing the replay essentials (seed, ticks) fails.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use reel_core::{Action, Cursor, MoveIntent, TickRecord, SIM_TPS};

use crate::error::PayloadError;
use crate::run::ReplayRun;

/// Wire format version written by [`build_payload`].
pub const PAYLOAD_VERSION: u64 = 1;

/// Ceiling on a serialized payload accepted for upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Top-level keys the payload format owns. Anything else found during
/// hydration is preserved verbatim in `extra`.
const KNOWN_KEYS: [&str; 10] = [
    "version",
    "seed",
    "rngTape",
    "ticks",
    "tickCount",
    "durationMs",
    "actionCount",
    "score",
    "recordedAt",
    "ended",
];

// ── Limits ─────────────────────────────────────────────────────────

/// Caps applied when building or hydrating a payload.
///
/// Oversized inputs are truncated, not rejected: a run that somehow
/// exceeded a cap still produces a valid (if shortened) document, and
/// a hostile document cannot allocate unbounded memory.
#[derive(Clone, Copy, Debug)]
pub struct PayloadLimits {
    /// Maximum tick records kept.
    pub max_ticks: usize,
    /// Maximum actions kept on any one tick.
    pub max_actions_per_tick: usize,
    /// Maximum rng tape entries kept.
    pub max_rng_tape: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            max_ticks: 120_000,
            max_actions_per_tick: 8,
            max_rng_tape: 240_000,
        }
    }
}

// ── Wire structs ───────────────────────────────────────────────────

/// Movement sample on the wire.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PayloadMove {
    /// Horizontal axis.
    pub dx: f64,
    /// Vertical axis.
    pub dy: f64,
}

/// Cursor sample on the wire.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PayloadCursor {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Whether a pointer was present.
    pub has: bool,
}

/// Action on the wire.
#[derive(Clone, Debug, Serialize)]
pub struct PayloadAction {
    /// Game-defined action id.
    pub id: String,
    /// Trigger-time cursor, if one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<PayloadCursor>,
}

/// One tick record on the wire.
#[derive(Clone, Debug, Serialize)]
pub struct PayloadTick {
    /// Movement sample. Serializes as `"move"`.
    #[serde(rename = "move")]
    pub movement: PayloadMove,
    /// Cursor sample.
    pub cursor: PayloadCursor,
    /// Actions dispatched this tick; omitted when none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<PayloadAction>>,
}

/// A complete replay document ready for serialization.
///
/// Field names serialize in camelCase. `extra` carries unknown
/// top-level fields from hydrated documents, so rebuilding a document
/// written by a newer build does not silently drop its additions.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayPayload {
    /// Wire format version ([`PAYLOAD_VERSION`] for fresh builds).
    pub version: u64,
    /// Run seed.
    pub seed: String,
    /// Recorded random draws, possibly truncated by limits.
    pub rng_tape: Vec<f64>,
    /// Per-tick records, possibly truncated by limits.
    pub ticks: Vec<PayloadTick>,
    /// Number of records in `ticks`.
    pub tick_count: usize,
    /// Run length in milliseconds at the fixed tick rate.
    pub duration_ms: u64,
    /// Total actions across all ticks.
    pub action_count: usize,
    /// Final score reported by the caller.
    pub score: f64,
    /// Unix timestamp in milliseconds when the payload was built.
    pub recorded_at: u64,
    /// Whether the run had ended. Always `true` for built payloads.
    pub ended: bool,
    /// Unknown top-level fields preserved from hydration.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Metadata accompanying a hydrated payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayMeta {
    /// Wire format version the document declared.
    pub version: u64,
    /// Tick count, as declared or recomputed.
    pub tick_count: usize,
    /// Duration in milliseconds, as declared or recomputed.
    pub duration_ms: u64,
    /// Total action count, as declared or recomputed.
    pub action_count: usize,
    /// Final score.
    pub score: f64,
    /// Unix timestamp in milliseconds the document was built, 0 if
    /// absent.
    pub recorded_at: u64,
    /// Unknown top-level fields, in document order.
    pub extra: IndexMap<String, Value>,
}

/// A run hydrated from a JSON document, with its metadata.
#[derive(Clone, Debug)]
pub struct HydratedReplay {
    /// The replayable run.
    pub run: ReplayRun,
    /// Document metadata.
    pub meta: ReplayMeta,
}

// ── Building ───────────────────────────────────────────────────────

/// Build the wire document for a frozen run.
///
/// Returns `None` when the run is not uploadable: still recording, no
/// seed, no ticks, or no rng tape. Non-finite numbers are zeroed and
/// the configured limits are enforced by truncation.
pub fn build_payload(run: &ReplayRun, score: f64, limits: &PayloadLimits) -> Option<ReplayPayload> {
    assemble(
        run,
        score,
        limits,
        PAYLOAD_VERSION,
        unix_millis(),
        IndexMap::new(),
    )
}

/// Rebuild the wire document for a hydrated run, preserving the
/// metadata and unknown fields it arrived with.
pub fn rebuild_payload(
    hydrated: &HydratedReplay,
    limits: &PayloadLimits,
) -> Option<ReplayPayload> {
    assemble(
        &hydrated.run,
        hydrated.meta.score,
        limits,
        hydrated.meta.version,
        hydrated.meta.recorded_at,
        hydrated.meta.extra.clone(),
    )
}

fn assemble(
    run: &ReplayRun,
    score: f64,
    limits: &PayloadLimits,
    version: u64,
    recorded_at: u64,
    extra: IndexMap<String, Value>,
) -> Option<ReplayPayload> {
    if !run.ended()
        || run.seed().trim().is_empty()
        || run.ticks().is_empty()
        || run.rng_tape().is_empty()
    {
        return None;
    }
    if run.ticks().len() > limits.max_ticks {
        log::warn!(
            "replay truncated from {} to {} ticks for upload",
            run.ticks().len(),
            limits.max_ticks
        );
    }

    let ticks: Vec<PayloadTick> = run
        .ticks()
        .iter()
        .take(limits.max_ticks)
        .map(|t| wire_tick(t, limits))
        .collect();
    let rng_tape: Vec<f64> = run
        .rng_tape()
        .iter()
        .copied()
        .map(finite_or_zero)
        .take(limits.max_rng_tape)
        .collect();

    let tick_count = ticks.len();
    let action_count = ticks
        .iter()
        .map(|t| t.actions.as_ref().map_or(0, Vec::len))
        .sum();
    Some(ReplayPayload {
        version,
        seed: run.seed().to_string(),
        rng_tape,
        ticks,
        tick_count,
        duration_ms: duration_for(tick_count),
        action_count,
        score: finite_or_zero(score),
        recorded_at,
        ended: true,
        extra,
    })
}

fn wire_tick(tick: &TickRecord, limits: &PayloadLimits) -> PayloadTick {
    let actions: Vec<PayloadAction> = tick
        .actions()
        .iter()
        .take(limits.max_actions_per_tick)
        .filter(|a| !a.id.trim().is_empty())
        .map(|a| PayloadAction {
            id: a.id.trim().to_string(),
            cursor: a.cursor.map(wire_cursor),
        })
        .collect();
    PayloadTick {
        movement: PayloadMove {
            dx: finite_or_zero(tick.movement.dx),
            dy: finite_or_zero(tick.movement.dy),
        },
        cursor: wire_cursor(tick.cursor),
        actions: if actions.is_empty() {
            None
        } else {
            Some(actions)
        },
    }
}

fn wire_cursor(cursor: Cursor) -> PayloadCursor {
    PayloadCursor {
        x: finite_or_zero(cursor.x),
        y: finite_or_zero(cursor.y),
        has: cursor.has,
    }
}

// ── Serializing ────────────────────────────────────────────────────

/// Serialize a payload to its JSON document.
pub fn serialize_payload(payload: &ReplayPayload) -> Result<String, PayloadError> {
    Ok(serde_json::to_string(payload)?)
}

/// Reject documents over [`MAX_UPLOAD_BYTES`].
pub fn check_upload_size(json: &str) -> Result<(), PayloadError> {
    if json.len() > MAX_UPLOAD_BYTES {
        return Err(PayloadError::OversizeUpload { bytes: json.len() });
    }
    Ok(())
}

// ── Hydrating ──────────────────────────────────────────────────────

/// Hydrate a run from an untrusted JSON document.
///
/// Returns `Ok(None)` for well-formed JSON that is not a usable replay
/// (not an object, blank seed, no ticks) and `Err` only for JSON that
/// does not parse. Malformed fields inside an otherwise usable
/// document degrade to defaults: bad numbers become zero, actions
/// without an id are dropped, and an action given as a bare string is
/// taken as its id. Unknown top-level fields are kept in the returned
/// metadata.
pub fn hydrate_payload(
    json: &str,
    limits: &PayloadLimits,
) -> Result<Option<HydratedReplay>, PayloadError> {
    let doc: Value = serde_json::from_str(json)?;
    let Some(obj) = doc.as_object() else {
        return Ok(None);
    };

    let seed = obj
        .get("seed")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if seed.is_empty() {
        return Ok(None);
    }

    let Some(raw_ticks) = obj.get("ticks").and_then(Value::as_array) else {
        return Ok(None);
    };
    if raw_ticks.is_empty() {
        return Ok(None);
    }
    if raw_ticks.len() > limits.max_ticks {
        log::warn!(
            "hydrated replay truncated from {} to {} ticks",
            raw_ticks.len(),
            limits.max_ticks
        );
    }

    let ticks: Vec<TickRecord> = raw_ticks
        .iter()
        .take(limits.max_ticks)
        .map(|t| hydrate_tick(t, limits))
        .collect();
    let rng_tape: Vec<f64> = obj
        .get("rngTape")
        .and_then(Value::as_array)
        .map(|vals| {
            vals.iter()
                .filter_map(Value::as_f64)
                .filter(|v| v.is_finite())
                .take(limits.max_rng_tape)
                .collect()
        })
        .unwrap_or_default();
    let ended = obj.get("ended").and_then(Value::as_bool).unwrap_or(true);

    let run = ReplayRun::from_parts(seed, ticks, rng_tape, ended);
    let tick_count = run.ticks().len();
    let action_count: usize = run.ticks().iter().map(|t| t.actions().len()).sum();

    let meta = ReplayMeta {
        version: obj
            .get("version")
            .and_then(Value::as_u64)
            .unwrap_or(PAYLOAD_VERSION),
        tick_count: obj
            .get("tickCount")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(tick_count),
        duration_ms: obj
            .get("durationMs")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| duration_for(tick_count)),
        action_count: obj
            .get("actionCount")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(action_count),
        score: finite_or_zero(obj.get("score").and_then(Value::as_f64).unwrap_or(0.0)),
        recorded_at: obj.get("recordedAt").and_then(Value::as_u64).unwrap_or(0),
        extra: obj
            .iter()
            .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };

    Ok(Some(HydratedReplay { run, meta }))
}

fn hydrate_tick(value: &Value, limits: &PayloadLimits) -> TickRecord {
    let movement = MoveIntent::new(
        num(value.get("move").and_then(|m| m.get("dx"))),
        num(value.get("move").and_then(|m| m.get("dy"))),
    );
    let cursor_v = value.get("cursor");
    let cursor = Cursor {
        x: num(cursor_v.and_then(|c| c.get("x"))),
        y: num(cursor_v.and_then(|c| c.get("y"))),
        has: cursor_v
            .and_then(|c| c.get("has"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
    };
    let actions: Vec<Action> = value
        .get("actions")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .take(limits.max_actions_per_tick)
                .filter_map(hydrate_action)
                .collect()
        })
        .unwrap_or_default();
    TickRecord::new(movement, cursor, actions)
}

fn hydrate_action(value: &Value) -> Option<Action> {
    // A bare string is shorthand for an id-only action.
    if let Some(id) = value.as_str() {
        let id = id.trim();
        return (!id.is_empty()).then(|| Action::new(id));
    }

    let id = value
        .get("id")
        .or_else(|| value.get("action"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("");
    if id.is_empty() {
        log::debug!("dropping action without id during hydration");
        return None;
    }

    let mut action = Action::new(id);
    if let Some(c) = value.get("cursor") {
        if let (Some(x), Some(y)) = (
            c.get("x").and_then(Value::as_f64),
            c.get("y").and_then(Value::as_f64),
        ) {
            if x.is_finite() && y.is_finite() {
                let has = c.get("has").and_then(Value::as_bool).unwrap_or(true);
                action = action.with_cursor(Cursor { x, y, has });
            }
        }
    }
    Some(action)
}

// ── Shared helpers ─────────────────────────────────────────────────

fn duration_for(tick_count: usize) -> u64 {
    ((tick_count as f64) * 1000.0 / SIM_TPS).round() as u64
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn num(v: Option<&Value>) -> f64 {
    finite_or_zero(v.and_then(Value::as_f64).unwrap_or(0.0))
}

fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
