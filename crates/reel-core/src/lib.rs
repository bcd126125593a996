//! Core types and traits for the Reel deterministic replay engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the seams through which a game simulation talks to the rest of the
//! workspace: the [`RandSource`] randomness seam, the [`InputDevice`]
//! input seam, the [`Game`] simulation seam, and the [`FrameHost`]
//! scheduling seam, plus the tape and tick data types that recording
//! and playback are built on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod clock;
pub mod game;
pub mod host;
pub mod input;
pub mod rng;
pub mod tape;
pub mod tick;

pub use action::{Action, ActionQueue};
pub use clock::{FixedStepLoop, MAX_FRAME_DT, SIM_DT, SIM_TPS};
pub use game::{Game, GameError, GamePhase};
pub use host::FrameHost;
pub use input::{Cursor, InputDevice, MoveIntent};
pub use rng::{seed_hash, PlatformSource, RandContext, RandSource, SeededStream};
pub use tape::{new_tape_handle, TapeHandle, TapePlayer, TapeRecorder};
pub use tick::TickRecord;
