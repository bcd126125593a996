//! Run recording and replay payloads for Reel.
//!
//! Captures everything a deterministic re-run needs: the run seed, the
//! per-tick input records, and the tape of random values the
//! simulation drew. Provides a JSON payload form for persisting and
//! sharing runs, with lenient hydration of untrusted documents.
//!
//! # Architecture
//!
//! - [`ReplayRun`] is the in-memory artifact: seed, ticks, rng tape
//! - [`ReplayRecorder`] captures a run while it is played live
//! - [`build_payload`] / [`hydrate_payload`] convert runs to and from
//!   the wire form, enforcing [`PayloadLimits`]
//! - [`format_duration_ms`] and [`describe_meta`] render payload
//!   metadata for UI surfaces
//!
//! # Format
//!
//! Payloads are camelCase JSON:
//!
//! ```text
//! { "version": 1, "seed": "...", "rngTape": [...],
//!   "ticks": [{ "move": {...}, "cursor": {...}, "actions": [...] }],
//!   "tickCount": N, "durationMs": M, "actionCount": K, ... }
//! ```
//!
//! Unknown top-level fields are preserved across a hydrate/rebuild
//! round trip, so documents written by newer builds survive older
//! ones.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod meta;
pub mod payload;
pub mod recorder;
pub mod run;

pub use error::PayloadError;
pub use meta::{describe_meta, format_duration_ms};
pub use payload::{
    build_payload, check_upload_size, hydrate_payload, rebuild_payload, serialize_payload,
    HydratedReplay, PayloadLimits, ReplayMeta, ReplayPayload, MAX_UPLOAD_BYTES, PAYLOAD_VERSION,
};
pub use recorder::ReplayRecorder;
pub use run::ReplayRun;
