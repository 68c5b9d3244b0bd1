use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::Context as _;

use crate::{
    animation::{clock::AnimationClock, params::AnimationParameters},
    assets::depth_image::DepthImage,
    foundation::error::{DepthloopError, DepthloopResult},
    render::{
        frame::RenderedFrame,
        renderer::{FrameRenderer, RenderOpts},
    },
};

/// Lifecycle of a live preview.
///
/// `Idle -> Running <-> Paused -> Stopped`. Starting again from any state begins a new session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// No image loaded.
    Idle,
    /// Ticking and delivering frames.
    Running,
    /// Elapsed time frozen.
    Paused,
    /// Session over.
    Stopped,
}

/// Receiver of preview frames, called once per successful tick.
pub trait FrameConsumer: Send {
    fn deliver(&mut self, frame: RenderedFrame);
}

impl<F> FrameConsumer for F
where
    F: FnMut(RenderedFrame) + Send,
{
    fn deliver(&mut self, frame: RenderedFrame) {
        self(frame)
    }
}

/// What a single [`PreviewLoop::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame reached the consumer.
    Delivered,
    /// Rendering failed; the frame was skipped and the loop keeps going.
    Dropped,
    /// The loop is not running; time did not advance.
    NotRunning,
}

/// Counters for one preview loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreviewStats {
    pub delivered: u64,
    pub dropped: u64,
}

/// Private copy of a session, safe to hand to an export running elsewhere.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub renderer: FrameRenderer,
    pub params: AnimationParameters,
    pub elapsed: Duration,
}

#[derive(Debug)]
struct Session {
    renderer: FrameRenderer,
    params: AnimationParameters,
    clock: AnimationClock,
    #[cfg(test)]
    fail_next_render: bool,
}

impl Session {
    fn render(&mut self, elapsed: f64) -> DepthloopResult<RenderedFrame> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_render) {
            return Err(DepthloopError::evaluation("render failure requested by test"));
        }
        self.renderer.render_at(elapsed, &self.params)
    }
}

/// Wall-clock driven loop around a [`FrameRenderer`].
///
/// The loop owns the session's elapsed time; callers pass `now` explicitly so ticking can be
/// driven by a real display cadence or by a test.
pub struct PreviewLoop<C> {
    state: LoopState,
    session: Option<Session>,
    render_opts: RenderOpts,
    consumer: C,
    stats: PreviewStats,
}

impl<C: FrameConsumer> PreviewLoop<C> {
    pub fn new(consumer: C) -> Self {
        Self::with_opts(consumer, RenderOpts::default())
    }

    pub fn with_opts(consumer: C, render_opts: RenderOpts) -> Self {
        Self {
            state: LoopState::Idle,
            session: None,
            render_opts,
            consumer,
            stats: PreviewStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> PreviewStats {
        self.stats
    }

    /// Elapsed animation time of the current session, zero when idle.
    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map_or(Duration::ZERO, |s| s.clock.elapsed())
    }

    pub fn params(&self) -> Option<AnimationParameters> {
        self.session.as_ref().map(|s| s.params)
    }

    /// Begin a fresh session on `image` at elapsed time zero, whatever the current state.
    #[tracing::instrument(skip_all, fields(w = image.width(), h = image.height()))]
    pub fn start(&mut self, image: DepthImage, params: AnimationParameters, now: Instant) {
        let mut clock = AnimationClock::new();
        clock.resume(now);
        self.session = Some(Session {
            renderer: FrameRenderer::with_opts(image, self.render_opts),
            params: params.clamped(),
            clock,
            #[cfg(test)]
            fail_next_render: false,
        });
        self.state = LoopState::Running;
        tracing::debug!("preview session started");
    }

    /// Freeze elapsed time at `now`.
    pub fn pause(&mut self, now: Instant) -> DepthloopResult<()> {
        self.expect_state(LoopState::Running, "pause")?;
        if let Some(s) = self.session.as_mut() {
            s.clock.pause(now);
        }
        self.state = LoopState::Paused;
        Ok(())
    }

    /// Continue from the frozen elapsed time. The pause gap is never counted.
    pub fn resume(&mut self, now: Instant) -> DepthloopResult<()> {
        self.expect_state(LoopState::Paused, "resume")?;
        if let Some(s) = self.session.as_mut() {
            s.clock.resume(now);
        }
        self.state = LoopState::Running;
        Ok(())
    }

    /// End the session. Only [`PreviewLoop::start`] leaves `Stopped`.
    pub fn stop(&mut self) -> DepthloopResult<()> {
        match self.state {
            LoopState::Running | LoopState::Paused => {
                self.state = LoopState::Stopped;
                Ok(())
            }
            other => Err(DepthloopError::validation(format!(
                "cannot stop preview loop while {other:?}"
            ))),
        }
    }

    /// Replace the parameters. The next tick uses them; elapsed time is kept.
    pub fn set_params(&mut self, params: AnimationParameters) -> DepthloopResult<()> {
        match (self.state, self.session.as_mut()) {
            (LoopState::Running | LoopState::Paused, Some(s)) => {
                s.params = params.clamped();
                Ok(())
            }
            (other, _) => Err(DepthloopError::validation(format!(
                "cannot set parameters while {other:?}"
            ))),
        }
    }

    /// Advance elapsed time to `now` and deliver one frame.
    ///
    /// A frame that fails to render is dropped with a warning; the session keeps running.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.state != LoopState::Running {
            return TickOutcome::NotRunning;
        }
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::NotRunning;
        };
        let elapsed = session.clock.tick(now).as_secs_f64();
        match session.render(elapsed) {
            Ok(frame) => {
                self.consumer.deliver(frame);
                self.stats.delivered += 1;
                TickOutcome::Delivered
            }
            Err(err) => {
                self.stats.dropped += 1;
                tracing::warn!(elapsed, error = %err, "dropping preview frame");
                TickOutcome::Dropped
            }
        }
    }

    /// Copy of the current session for an export that must not touch live elapsed time.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|s| SessionSnapshot {
            renderer: s.renderer.clone(),
            params: s.params,
            elapsed: s.clock.elapsed(),
        })
    }

    pub fn into_consumer(self) -> C {
        self.consumer
    }

    fn expect_state(&self, want: LoopState, op: &str) -> DepthloopResult<()> {
        if self.state == want {
            Ok(())
        } else {
            Err(DepthloopError::validation(format!(
                "cannot {op} preview loop while {:?}",
                self.state
            )))
        }
    }
}

/// Options for [`PreviewThread`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewOpts {
    /// Target time between ticks.
    pub frame_interval: Duration,
    pub render: RenderOpts,
}

impl Default for PreviewOpts {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_micros(16_667),
            render: RenderOpts::default(),
        }
    }
}

enum Command {
    Start(Box<DepthImage>, AnimationParameters),
    Pause,
    Resume,
    Stop,
    SetParams(AnimationParameters),
    Shutdown,
}

/// A [`PreviewLoop`] on its own thread.
///
/// The thread sleeps on its command channel until the next tick is due, and blocks outright while
/// the loop is not running. Commands are handled between ticks, so a frame in progress always
/// completes.
pub struct PreviewThread {
    tx: mpsc::Sender<Command>,
    handle: Option<JoinHandle<PreviewStats>>,
}

impl PreviewThread {
    pub fn spawn<C>(consumer: C, opts: PreviewOpts) -> DepthloopResult<Self>
    where
        C: FrameConsumer + 'static,
    {
        if opts.frame_interval.is_zero() {
            return Err(DepthloopError::validation(
                "preview frame_interval must be non-zero",
            ));
        }
        let (tx, rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("depthloop-preview".to_string())
            .spawn(move || run_preview(PreviewLoop::with_opts(consumer, opts.render), rx, opts))
            .context("failed to spawn preview thread")?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn start(&self, image: DepthImage, params: AnimationParameters) -> DepthloopResult<()> {
        self.send(Command::Start(Box::new(image), params))
    }

    pub fn pause(&self) -> DepthloopResult<()> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> DepthloopResult<()> {
        self.send(Command::Resume)
    }

    pub fn stop(&self) -> DepthloopResult<()> {
        self.send(Command::Stop)
    }

    pub fn set_params(&self, params: AnimationParameters) -> DepthloopResult<()> {
        self.send(Command::SetParams(params))
    }

    /// Stop the thread and return its counters.
    pub fn shutdown(mut self) -> DepthloopResult<PreviewStats> {
        let _ = self.tx.send(Command::Shutdown);
        let handle = self
            .handle
            .take()
            .ok_or_else(|| DepthloopError::evaluation("preview thread already joined"))?;
        handle
            .join()
            .map_err(|_| DepthloopError::evaluation("preview thread panicked"))
    }

    fn send(&self, cmd: Command) -> DepthloopResult<()> {
        self.tx
            .send(cmd)
            .map_err(|_| DepthloopError::evaluation("preview thread is gone"))
    }
}

impl Drop for PreviewThread {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(Command::Shutdown);
            let _ = handle.join();
        }
    }
}

fn run_preview<C: FrameConsumer>(
    mut preview: PreviewLoop<C>,
    rx: mpsc::Receiver<Command>,
    opts: PreviewOpts,
) -> PreviewStats {
    let interval = opts.frame_interval;
    let mut next_tick = Instant::now() + interval;
    loop {
        let cmd = if preview.state() == LoopState::Running {
            match rx.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        };

        let now = Instant::now();
        let Some(cmd) = cmd else {
            preview.tick(now);
            next_tick += interval;
            // Skip ticks we are too late for instead of bursting to catch up.
            if next_tick <= now {
                next_tick = now + interval;
            }
            continue;
        };

        let applied = match cmd {
            Command::Shutdown => break,
            Command::Start(image, params) => {
                preview.start(*image, params, now);
                next_tick = now + interval;
                Ok(())
            }
            Command::Pause => preview.pause(now),
            Command::Resume => preview.resume(now).map(|()| next_tick = now + interval),
            Command::Stop => preview.stop(),
            Command::SetParams(params) => preview.set_params(params),
        };
        if let Err(err) = applied {
            tracing::warn!(error = %err, "ignoring preview command");
        }
    }
    tracing::debug!(stats = ?preview.stats(), "preview thread exiting");
    preview.stats()
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
