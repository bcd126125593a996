//! Test fixtures and mock types for Reel development.
//!
//! Provides a scripted [`Game`] implementation ([`MockGame`]) that logs
//! every externally observable call with full float precision, a
//! hand-driven input source ([`ScriptedInput`]) for simulating live
//! play, a [`FrameHost`] fed from fixed timestamp lists
//! ([`ScriptedHost`]) so pacing behavior can be asserted exactly, a
//! draw-counting [`RandSource`] ([`CountingSource`]), and an in-memory
//! capture surface ([`MockSurface`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};
use reel_core::{
    Cursor, FrameHost, Game, GameError, GamePhase, InputDevice, MoveIntent, RandSource,
};
use reel_playback::{CaptureEvent, MediaRecorder, RecordingSurface, MIME_WEBM_VP8, MIME_WEBM_VP9};

/// Input device that always reports neutral input.
struct NullDevice;

impl InputDevice for NullDevice {
    fn move_intent(&self) -> MoveIntent {
        MoveIntent::default()
    }

    fn cursor(&self) -> Cursor {
        Cursor::default()
    }

    fn reset(&mut self) {}
}

/// Scripted [`Game`] that records every observable call.
///
/// Each update samples the installed input device, draws a fixed
/// number of random values, mixes everything into a running float
/// state, and appends a log line. Debug-formatted floats round-trip
/// exactly, so two runs produced identical ops if and only if they
/// consumed identical input and randomness in identical order.
///
/// Failures and game-over transitions can be scripted by update index
/// via [`fail_at_update`](MockGame::fail_at_update) and
/// [`over_after_updates`](MockGame::over_after_updates).
pub struct MockGame {
    pub ops: Vec<String>,
    pub draws_per_update: usize,
    pub fail_at_update: Option<usize>,
    pub over_after_updates: Option<usize>,
    phase: GamePhase,
    updates: usize,
    state: f64,
    input: Box<dyn InputDevice>,
    background_rand: Option<Box<dyn RandSource>>,
    visual_rand: Option<Box<dyn RandSource>>,
}

impl MockGame {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            draws_per_update: 2,
            fail_at_update: None,
            over_after_updates: None,
            phase: GamePhase::Menu,
            updates: 0,
            state: 0.0,
            input: Box::new(NullDevice),
            background_rand: None,
            visual_rand: None,
        }
    }

    /// Take the recorded ops, leaving the log empty.
    pub fn take_ops(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ops)
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn state(&self) -> f64 {
        self.state
    }

    pub fn has_background_rand(&self) -> bool {
        self.background_rand.is_some()
    }

    pub fn has_visual_rand(&self) -> bool {
        self.visual_rand.is_some()
    }
}

impl Default for MockGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for MockGame {
    fn update(&mut self, dt: f64, rand: &mut dyn RandSource) -> Result<(), GameError> {
        if self.phase != GamePhase::Playing {
            return Ok(());
        }
        self.updates += 1;
        if self.fail_at_update == Some(self.updates) {
            return Err(GameError::UpdateFailed {
                reason: format!("scripted failure at update {}", self.updates),
            });
        }

        let movement = self.input.move_intent();
        let cursor = self.input.cursor();
        let drawn: Vec<f64> = (0..self.draws_per_update).map(|_| rand.draw()).collect();
        for v in &drawn {
            self.state = self.state * 0.75 + v + movement.dx * 0.125 + movement.dy * 0.0625;
        }
        self.ops.push(format!(
            "update {} dt {:?} move {:?} {:?} cursor {:?} {:?} {} rng {:?} state {:?}",
            self.updates,
            dt,
            movement.dx,
            movement.dy,
            cursor.x,
            cursor.y,
            cursor.has,
            drawn,
            self.state,
        ));

        if self.over_after_updates == Some(self.updates) {
            self.phase = GamePhase::Over;
            self.ops.push(format!("over {}", self.updates));
        }
        Ok(())
    }

    fn render(&mut self) {
        self.ops.push(format!("render {}", self.updates));
    }

    fn handle_action(&mut self, id: &str) {
        // Cursor is sampled at dispatch time, so an action-carried
        // override is visible here while it lasts.
        let cursor = self.input.cursor();
        self.state += id.len() as f64 * 0.001;
        self.ops.push(format!(
            "action {} cursor {:?} {:?} {} state {:?}",
            id, cursor.x, cursor.y, cursor.has, self.state,
        ));
    }

    fn start_run(&mut self) {
        self.phase = GamePhase::Playing;
        self.updates = 0;
        self.state = 0.0;
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn swap_input(&mut self, device: Box<dyn InputDevice>) -> Box<dyn InputDevice> {
        std::mem::replace(&mut self.input, device)
    }

    fn set_background_rand(&mut self, source: Box<dyn RandSource>) {
        self.background_rand = Some(source);
    }

    fn set_visual_rand(&mut self, source: Box<dyn RandSource>) {
        self.visual_rand = Some(source);
    }
}

/// Hand-driven input source for simulating live play.
///
/// The handle and every device it vends share one state cell; tests
/// set movement and cursor between frames and the game under test
/// samples them through the [`InputDevice`] seam.
#[derive(Clone, Default)]
pub struct ScriptedInput {
    shared: Arc<Mutex<(MoveIntent, Cursor)>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_movement(&self, movement: MoveIntent) {
        self.shared.lock().unwrap().0 = movement;
    }

    pub fn set_cursor(&self, cursor: Cursor) {
        self.shared.lock().unwrap().1 = cursor;
    }

    /// A device polling this handle's state.
    pub fn device(&self) -> Box<dyn InputDevice> {
        Box::new(ScriptedDevice {
            shared: Arc::clone(&self.shared),
        })
    }
}

struct ScriptedDevice {
    shared: Arc<Mutex<(MoveIntent, Cursor)>>,
}

impl InputDevice for ScriptedDevice {
    fn move_intent(&self) -> MoveIntent {
        self.shared.lock().unwrap().0
    }

    fn cursor(&self) -> Cursor {
        self.shared.lock().unwrap().1
    }

    fn reset(&mut self) {
        *self.shared.lock().unwrap() = Default::default();
    }
}

/// [`FrameHost`] scripted from fixed timestamp lists.
///
/// Frames are served front to back and run out; clock reads consume
/// `now_values` and repeat the last one when exhausted. Waits and
/// yields are recorded instead of sleeping, so pacing arithmetic can
/// be asserted to the millisecond.
pub struct ScriptedHost {
    frames: VecDeque<f64>,
    now_values: VecDeque<f64>,
    last_now: f64,
    pub waits: Vec<f64>,
    pub yields: usize,
}

impl ScriptedHost {
    pub fn new(frames: Vec<f64>) -> Self {
        Self {
            frames: frames.into(),
            now_values: VecDeque::new(),
            last_now: 0.0,
            waits: Vec::new(),
            yields: 0,
        }
    }

    /// Script the values returned by [`FrameHost::now_ms`].
    pub fn with_now(mut self, now_values: Vec<f64>) -> Self {
        self.now_values = now_values.into();
        self
    }
}

impl FrameHost for ScriptedHost {
    fn next_frame(&mut self) -> Option<f64> {
        self.frames.pop_front()
    }

    fn now_ms(&mut self) -> f64 {
        if let Some(v) = self.now_values.pop_front() {
            self.last_now = v;
        }
        self.last_now
    }

    fn wait_ms(&mut self, ms: f64) {
        self.waits.push(ms);
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }
}

/// [`RandSource`] that counts draws and serves a fixed cycle.
///
/// With no scripted values it serves a constant 0.5, so a test can
/// assert exactly how many draws a code path performs without caring
/// what the values are.
#[derive(Clone, Debug, Default)]
pub struct CountingSource {
    values: Vec<f64>,
    at: usize,
    pub draws: u64,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source cycling through `values`.
    pub fn cycling(values: Vec<f64>) -> Self {
        Self {
            values,
            at: 0,
            draws: 0,
        }
    }
}

impl RandSource for CountingSource {
    fn draw(&mut self) -> f64 {
        self.draws += 1;
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.at % self.values.len()];
        self.at += 1;
        v
    }
}

/// In-memory [`RecordingSurface`] for capture tests.
///
/// Supports whichever webm codecs it is built with and vends
/// [`MockRecorder`]s that replay the scripted chunks on stop. Vended
/// recorder settings are published through shared cells so a test can
/// assert what the adapter negotiated.
pub struct MockSurface {
    vp9: bool,
    vp8: bool,
    chunks: Vec<Vec<u8>>,
    pub vend: bool,
    started: Arc<Mutex<Vec<(String, f64)>>>,
}

impl MockSurface {
    /// A surface supporting both webm codecs, producing `chunks`.
    pub fn webm(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            vp9: true,
            vp8: true,
            chunks,
            vend: true,
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A surface supporting only vp8.
    pub fn vp8_only(chunks: Vec<Vec<u8>>) -> Self {
        let mut surface = Self::webm(chunks);
        surface.vp9 = false;
        surface
    }

    /// A surface that cannot encode anything.
    pub fn unsupported() -> Self {
        Self {
            vp9: false,
            vp8: false,
            chunks: Vec::new(),
            vend: false,
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(mime, fps)` for every recorder started so far.
    pub fn started(&self) -> Vec<(String, f64)> {
        self.started.lock().unwrap().clone()
    }
}

impl RecordingSurface for MockSurface {
    fn supports(&self, mime: &str) -> bool {
        match mime {
            MIME_WEBM_VP9 => self.vp9,
            MIME_WEBM_VP8 => self.vp8,
            _ => false,
        }
    }

    fn recorder(
        &self,
        fps: f64,
        mime: &str,
    ) -> Option<(Box<dyn MediaRecorder>, Receiver<CaptureEvent>)> {
        if !self.vend {
            return None;
        }
        let (tx, rx) = unbounded();
        Some((
            Box::new(MockRecorder {
                mime: mime.to_string(),
                fps,
                chunks: self.chunks.clone(),
                events: Some(tx),
                started: Arc::clone(&self.started),
            }),
            rx,
        ))
    }
}

/// Recorder vended by [`MockSurface`]: emits its chunks and the stop
/// event when stopped.
pub struct MockRecorder {
    mime: String,
    fps: f64,
    chunks: Vec<Vec<u8>>,
    events: Option<Sender<CaptureEvent>>,
    started: Arc<Mutex<Vec<(String, f64)>>>,
}

impl MediaRecorder for MockRecorder {
    fn mime_type(&self) -> &str {
        &self.mime
    }

    fn start(&mut self) {
        self.started
            .lock()
            .unwrap()
            .push((self.mime.clone(), self.fps));
    }

    fn stop(&mut self) {
        if let Some(tx) = self.events.take() {
            for chunk in self.chunks.drain(..) {
                let _ = tx.send(CaptureEvent::Chunk(chunk));
            }
            let _ = tx.send(CaptureEvent::Stopped);
        }
    }
}
