use crate::{
    foundation::{
        core::{Fps, FrameIndex},
        error::{DepthloopError, DepthloopResult},
    },
    render::frame::RenderedFrame,
};

/// Output description handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

impl SinkConfig {
    /// Reject sizes a 4:2:0 chroma-subsampled encoder cannot take.
    pub fn require_even_dims(&self) -> DepthloopResult<()> {
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 || !w.is_multiple_of(2) || !h.is_multiple_of(2) {
            return Err(DepthloopError::validation(format!(
                "yuv420p output needs non-zero even dimensions, got {w}x{h}"
            )));
        }
        Ok(())
    }
}

/// The encoder side of an export.
///
/// Ordering contract: `push_frame` is called with strictly increasing, gap-free `FrameIndex`
/// values starting at 0. Exactly one of `end` or `abort` closes a sink that was begun.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> DepthloopResult<()>;
    /// Accept one frame. An error rejects the frame and ends the export.
    fn push_frame(&mut self, idx: FrameIndex, frame: &RenderedFrame) -> DepthloopResult<()>;
    /// Finalize the output after the last frame.
    fn end(&mut self) -> DepthloopResult<()>;
    /// Release a partially written output after a failure. Must not fail.
    fn abort(&mut self) {}
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn begin(&mut self, cfg: SinkConfig) -> DepthloopResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RenderedFrame) -> DepthloopResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> DepthloopResult<()> {
        (**self).end()
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, RenderedFrame)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, RenderedFrame)] {
        &self.frames
    }

    /// Whether `end` ran after the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> DepthloopResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RenderedFrame) -> DepthloopResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> DepthloopResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
    }
}
