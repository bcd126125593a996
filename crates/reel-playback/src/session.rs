//! The session that ties recording to playback.
//!
//! [`ReplaySession`] owns the pieces one logical player needs: the
//! recorder, the ambient random context the live game draws from, and
//! the scripted input installed during playback. At most one run is
//! active and at most one playback is in flight, which is what makes
//! the bare install/restore swaps on the random context safe.
//!
//! [`ReplaySession::play`] is the reliability-critical path: whatever
//! happens during playback, the live game's input device, random
//! source, and overlay visibility come back exactly as they were.

use reel_core::{
    Action, Cursor, FrameHost, Game, MoveIntent, PlatformSource, RandContext, RandSource, SIM_DT,
};
use reel_replay::{ReplayRecorder, ReplayRun};

use crate::capture::{CaptureAdapter, CaptureBlob, RecordingSurface};
use crate::engine::{play_ticks, PlaybackReport};
use crate::error::PlaybackError;
use crate::input::ReplayInput;
use crate::pacing::{DeterministicOptions, PacingPolicy, DEFAULT_CAPTURE_FPS};

// ── Collaborator seams ─────────────────────────────────────────────

/// Interactive UI the session hides while a replay runs.
///
/// The session records the visibility it found and puts exactly that
/// back afterwards; an overlay hidden before playback stays hidden.
pub trait Overlay {
    /// Whether the overlay is currently shown.
    fn is_visible(&self) -> bool;

    /// Show or hide the overlay.
    fn set_visible(&mut self, visible: bool);
}

/// A request to capture playback to video.
#[derive(Clone, Copy)]
pub struct CaptureRequest<'a> {
    /// Surface to record from.
    pub surface: &'a dyn RecordingSurface,
    /// Capture frame rate.
    pub fps: f64,
}

impl<'a> CaptureRequest<'a> {
    /// A request at [`DEFAULT_CAPTURE_FPS`].
    pub fn new(surface: &'a dyn RecordingSurface) -> Self {
        Self {
            surface,
            fps: DEFAULT_CAPTURE_FPS,
        }
    }
}

/// Knobs for one [`ReplaySession::play`] call.
///
/// The default plays the recorder's active run deterministically with
/// no capture and no overlay handling.
#[derive(Default)]
pub struct PlayOptions<'a> {
    /// Pacing when not capturing. `None` plays deterministically.
    /// Capture always forces [`PacingPolicy::CaptureLocked`].
    pub policy: Option<PacingPolicy>,
    /// Capture the playback to video.
    pub capture: Option<CaptureRequest<'a>>,
    /// Overlay UI to hide for the duration of playback.
    pub overlay: Option<&'a mut dyn Overlay>,
    /// Play this run instead of the recorder's active run, e.g. one
    /// hydrated from an uploaded payload.
    pub run: Option<&'a ReplayRun>,
}

// ── Outcomes ───────────────────────────────────────────────────────

/// Why a play request did not start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionStatus {
    /// No run has been recorded or supplied.
    NoRun,
    /// The run is still recording or holds no ticks.
    NotReplayable,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRun => write!(f, "no replay available yet (finish a run first)"),
            Self::NotReplayable => write!(f, "replay is incomplete and cannot be played"),
        }
    }
}

/// Result of a [`ReplaySession::play`] call.
#[derive(Debug)]
pub enum PlayOutcome {
    /// The run played back without capture.
    Played(PlaybackReport),
    /// The run played back into a video blob.
    Captured {
        /// Assembled video data.
        blob: CaptureBlob,
        /// What playback did while the recorder ran.
        report: PlaybackReport,
    },
    /// Nothing played and nothing was touched.
    Unavailable(SessionStatus),
}

impl PlayOutcome {
    /// The playback report, when playback actually ran.
    pub fn report(&self) -> Option<&PlaybackReport> {
        match self {
            Self::Played(report) | Self::Captured { report, .. } => Some(report),
            Self::Unavailable(_) => None,
        }
    }
}

// ── ReplaySession ──────────────────────────────────────────────────

/// Owns one player's recording and playback lifecycle.
///
/// The live game loop draws randomness through
/// [`rand_source`](ReplaySession::rand_source) and forwards input
/// events through the recording methods; those delegate to the owned
/// [`ReplayRecorder`] with the session's random context, so the
/// install/restore pairing around recording never leaks out.
///
/// Replays tick at [`SIM_DT`], the rate runs are recorded at.
pub struct ReplaySession {
    recorder: ReplayRecorder,
    rand: RandContext,
    input: ReplayInput,
    replaying: bool,
}

impl ReplaySession {
    /// A session drawing live randomness from the platform RNG.
    pub fn new() -> Self {
        Self::with_source(Box::new(PlatformSource))
    }

    /// A session drawing live randomness from `source`, for seeded
    /// daily-run modes and tests.
    pub fn with_source(source: Box<dyn RandSource>) -> Self {
        Self {
            recorder: ReplayRecorder::new(),
            rand: RandContext::with_source(source),
            input: ReplayInput::new(),
            replaying: false,
        }
    }

    /// The currently-installed random source. The live game loop
    /// passes this to its update call.
    pub fn rand_source(&mut self) -> &mut dyn RandSource {
        self.rand.source_mut()
    }

    /// Begin recording a fresh run under `seed`.
    pub fn start_recording(&mut self, seed: &str, game: &mut dyn Game) -> &ReplayRun {
        self.recorder.start_recording(seed, game, &mut self.rand)
    }

    /// Queue an action for the next recorded tick.
    pub fn queue_action(&mut self, action: Action) {
        self.recorder.queue_action(action);
    }

    /// Take the actions queued since the last drain, in arrival order.
    pub fn drain_pending_actions(&mut self) -> Vec<Action> {
        self.recorder.drain_pending_actions()
    }

    /// Discard any queued actions without recording them.
    pub fn clear_pending_actions(&mut self) {
        self.recorder.clear_pending_actions()
    }

    /// Record one tick's input sample and dispatched actions.
    pub fn record_tick(&mut self, movement: MoveIntent, cursor: Cursor, actions: Vec<Action>) {
        self.recorder.record_tick(movement, cursor, actions);
    }

    /// Freeze the active run and restore the pre-recording random
    /// source.
    pub fn mark_ended(&mut self) -> Option<&ReplayRun> {
        self.recorder.mark_ended(&mut self.rand)
    }

    /// The current run, recording or frozen.
    pub fn active_run(&self) -> Option<&ReplayRun> {
        self.recorder.active_run()
    }

    /// Whether a run is currently recording.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Whether a playback is currently in flight. Only observable from
    /// within playback callbacks; a panic mid-playback leaves it set.
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Drop any active run and restore the pre-recording source.
    pub fn reset(&mut self) {
        self.recorder.reset(&mut self.rand);
    }

    /// Play a recorded run back through `game`.
    ///
    /// Follows the contract in the module docs: validation first, then
    /// capture start (so an unsupported surface fails with nothing to
    /// restore), then the world swap (replay random source, cosmetic
    /// streams, scripted input, hidden overlay, fresh run lifecycle),
    /// then playback under the selected policy, and finally the
    /// unconditional restore. Simulation and capture errors propagate
    /// only after the live world is back.
    pub fn play(
        &mut self,
        game: &mut dyn Game,
        host: &mut dyn FrameHost,
        options: PlayOptions<'_>,
    ) -> Result<PlayOutcome, PlaybackError> {
        let PlayOptions {
            policy,
            capture,
            mut overlay,
            run,
        } = options;

        let run = match run {
            Some(run) => run,
            None => match self.recorder.active_run() {
                Some(run) => run,
                None => return Ok(PlayOutcome::Unavailable(SessionStatus::NoRun)),
            },
        };
        if !run.is_replayable() {
            return Ok(PlayOutcome::Unavailable(SessionStatus::NotReplayable));
        }

        let mut adapter = match &capture {
            Some(request) => Some(CaptureAdapter::start(request.surface, request.fps)?),
            None => None,
        };

        self.replaying = true;
        let saved_source = self.rand.install(run.playback_source());
        game.set_background_rand(run.background_source());
        game.set_visual_rand(run.visual_source());

        self.input.reset();
        let mut saved_device = game.swap_input(self.input.device());
        saved_device.reset();

        let overlay_was_visible = overlay.as_ref().map(|o| o.is_visible());
        if let Some(o) = overlay.as_mut() {
            o.set_visible(false);
        }
        game.start_run();

        let policy = if adapter.is_some() {
            PacingPolicy::CaptureLocked
        } else {
            policy.unwrap_or_else(|| PacingPolicy::Deterministic(DeterministicOptions::default()))
        };
        log::debug!(
            "replaying {} ticks under seed {:?}",
            run.ticks().len(),
            run.seed()
        );

        let played = play_ticks(
            game,
            &self.input,
            self.rand.source_mut(),
            run.ticks(),
            SIM_DT,
            &policy,
            host,
        );

        // A failed playback abandons the capture instead of stopping
        // it; there is no meaningful video to assemble.
        let captured = match (&played, adapter.take()) {
            (Ok(_), Some(adapter)) => Some(adapter.stop()),
            _ => None,
        };

        // The restore runs on every path, before any error escapes.
        drop(game.swap_input(saved_device));
        drop(self.rand.install(saved_source));
        if let (Some(o), Some(was)) = (overlay, overlay_was_visible) {
            o.set_visible(was);
        }
        self.replaying = false;

        let report = played?;
        match captured {
            Some(blob) => Ok(PlayOutcome::Captured {
                blob: blob?,
                report,
            }),
            None => Ok(PlayOutcome::Played(report)),
        }
    }
}

impl Default for ReplaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReplaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplaySession")
            .field("recording", &self.is_recording())
            .field("replaying", &self.replaying)
            .finish_non_exhaustive()
    }
}
