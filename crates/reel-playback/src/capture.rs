//! Video capture adapter for replay playback.
//!
//! Capture is expressed against two traits so the crate stays free of
//! any particular encoder. A [`RecordingSurface`] answers codec probes
//! and vends [`MediaRecorder`]s; recorded data flows back over a
//! channel as [`CaptureEvent`]s and is assembled into a single
//! [`CaptureBlob`] when the adapter stops.

use crossbeam_channel::Receiver;

use crate::error::PlaybackError;

/// VP9-in-WebM, the preferred capture codec.
pub const MIME_WEBM_VP9: &str = "video/webm;codecs=vp9";

/// VP8-in-WebM, probed when VP9 is unavailable.
pub const MIME_WEBM_VP8: &str = "video/webm;codecs=vp8";

/// Container-only MIME reported when a recorder leaves its own blank.
pub const FALLBACK_MIME: &str = "video/webm";

/// Data produced by an active [`MediaRecorder`].
#[derive(Clone, Debug)]
pub enum CaptureEvent {
    /// One encoded chunk. Empty chunks are dropped at assembly.
    Chunk(Vec<u8>),
    /// The recorder has flushed everything it will produce.
    Stopped,
}

/// An active encoder for one capture session.
pub trait MediaRecorder {
    /// MIME type the recorder is actually encoding.
    fn mime_type(&self) -> &str;

    /// Begin producing [`CaptureEvent`]s.
    fn start(&mut self);

    /// Flush remaining chunks and emit [`CaptureEvent::Stopped`].
    fn stop(&mut self);
}

/// Something a replay can be recorded from.
pub trait RecordingSurface {
    /// Whether the surface can encode `mime`.
    fn supports(&self, mime: &str) -> bool;

    /// A recorder at `fps` for `mime`, with its event channel.
    ///
    /// `None` means the surface cannot record right now even though
    /// the probe succeeded.
    fn recorder(
        &self,
        fps: f64,
        mime: &str,
    ) -> Option<(Box<dyn MediaRecorder>, Receiver<CaptureEvent>)>;
}

/// A finished capture: every chunk concatenated, plus its MIME type.
#[derive(Clone, Debug)]
pub struct CaptureBlob {
    /// Encoded video data.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime: String,
}

/// Drives one capture session over a [`RecordingSurface`].
pub struct CaptureAdapter {
    recorder: Box<dyn MediaRecorder>,
    events: Receiver<CaptureEvent>,
}

impl std::fmt::Debug for CaptureAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureAdapter").finish_non_exhaustive()
    }
}

impl CaptureAdapter {
    /// Start capturing from `surface` at `fps`.
    ///
    /// Probes [`MIME_WEBM_VP9`] then [`MIME_WEBM_VP8`]; if the surface
    /// supports neither, or refuses to vend a recorder, returns
    /// [`PlaybackError::CaptureUnsupported`].
    pub fn start(
        surface: &dyn RecordingSurface,
        fps: f64,
    ) -> Result<Self, PlaybackError> {
        let mime = [MIME_WEBM_VP9, MIME_WEBM_VP8]
            .into_iter()
            .find(|m| surface.supports(m))
            .ok_or(PlaybackError::CaptureUnsupported)?;
        let (mut recorder, events) = surface
            .recorder(fps, mime)
            .ok_or(PlaybackError::CaptureUnsupported)?;
        recorder.start();
        log::debug!("capture started at {fps} fps as {mime}");
        Ok(Self { recorder, events })
    }

    /// Stop the recorder and assemble everything it produced.
    pub fn stop(mut self) -> Result<CaptureBlob, PlaybackError> {
        self.recorder.stop();

        let mut bytes = Vec::new();
        loop {
            match self.events.recv() {
                Ok(CaptureEvent::Chunk(chunk)) => {
                    if !chunk.is_empty() {
                        bytes.extend_from_slice(&chunk);
                    }
                }
                Ok(CaptureEvent::Stopped) => break,
                Err(_) => {
                    return Err(PlaybackError::CaptureFailed {
                        reason: "recorder channel closed before stop event".into(),
                    });
                }
            }
        }

        let mime = match self.recorder.mime_type() {
            "" => FALLBACK_MIME.to_string(),
            mime => mime.to_string(),
        };
        log::debug!("capture stopped with {} bytes of {mime}", bytes.len());
        Ok(CaptureBlob { bytes, mime })
    }
}
