use std::thread::{self, JoinHandle};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    animation::params::AnimationParameters,
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::{Fps, FrameIndex, FrameRange},
        error::{DepthloopError, DepthloopResult},
    },
    render::{frame::RenderedFrame, renderer::FrameRenderer},
};

/// Options for [`export`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOpts {
    /// Length of the exported clip in seconds.
    pub duration_secs: f64,
    /// Output frame rate; also the step of the virtual clock.
    pub fps: Fps,
    /// Render frames on a dedicated rayon pool, `chunk_size` at a time.
    pub parallel: bool,
    pub chunk_size: usize,
    /// Pool size; rayon's default when `None`.
    pub threads: Option<usize>,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            duration_secs: 2.0,
            fps: Fps { num: 30, den: 1 },
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub frames_total: u64,
    pub frames_written: u64,
}

/// Number of frames an export of `duration_secs` at `fps` produces: `round(duration * fps)`.
pub fn frame_count(duration_secs: f64, fps: Fps) -> DepthloopResult<u64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(DepthloopError::validation(
            "export duration must be a positive number of seconds",
        ));
    }
    if fps.num == 0 || fps.den == 0 {
        return Err(DepthloopError::validation("export fps must be non-zero"));
    }
    let frames = fps.secs_to_frames_round(duration_secs);
    if frames == 0 {
        return Err(DepthloopError::validation(
            "export duration is shorter than one frame",
        ));
    }
    Ok(frames)
}

/// Render a clip on a fixed virtual clock and hand every frame to `sink`.
///
/// Frame `i` is rendered at `i / fps` seconds regardless of how long rendering takes, so repeated
/// exports of the same inputs are bit-identical. Frames reach the sink strictly in index order,
/// also when rendered in parallel.
///
/// The first frame that fails to render or is rejected by the sink aborts the export: the sink is
/// told to discard its partial output and the error names the frame index.
#[tracing::instrument(skip_all, fields(
    w = renderer.image().width(),
    h = renderer.image().height(),
    duration = opts.duration_secs,
    fps = opts.fps.as_f64(),
))]
pub fn export<S: FrameSink + ?Sized>(
    renderer: &FrameRenderer,
    params: &AnimationParameters,
    opts: &ExportOpts,
    sink: &mut S,
) -> DepthloopResult<ExportStats> {
    let total = frame_count(opts.duration_secs, opts.fps)?;
    let pool = if opts.parallel {
        Some(build_thread_pool(opts.threads)?)
    } else {
        None
    };
    let params = params.clamped();
    let image = renderer.image();

    if let Err(err) = sink.begin(SinkConfig {
        width: image.width(),
        height: image.height(),
        fps: opts.fps,
    }) {
        sink.abort();
        return Err(DepthloopError::encoding(format!(
            "encoder rejected output: {err}"
        )));
    }
    tracing::info!(frames = total, parallel = opts.parallel, "export started");

    let range = FrameRange::new(FrameIndex(0), FrameIndex(total))?;
    let mut stats = ExportStats {
        frames_total: range.len_frames(),
        frames_written: 0,
    };
    let render = |i: u64| renderer.render_at(opts.fps.frames_to_secs(i), &params);

    for chunk in range.chunks(opts.chunk_size.max(1) as u64) {
        let indices = chunk.start.0..chunk.end.0;
        let rendered: Vec<DepthloopResult<RenderedFrame>> = match &pool {
            Some(pool) => pool.install(|| indices.clone().into_par_iter().map(render).collect()),
            None => indices.clone().map(render).collect(),
        };

        for (i, frame) in indices.zip(rendered) {
            let pushed = frame
                .map_err(|e| DepthloopError::encoding_at(i, format!("render failed: {e}")))
                .and_then(|frame| {
                    sink.push_frame(FrameIndex(i), &frame).map_err(|e| {
                        DepthloopError::encoding_at(i, format!("encoder rejected frame: {e}"))
                    })
                });
            if let Err(err) = pushed {
                tracing::warn!(frame = i, error = %err, "export aborted");
                sink.abort();
                return Err(err);
            }
            stats.frames_written += 1;
            tracing::debug!(frame = i, "frame encoded");
        }
    }

    if let Err(err) = sink.end() {
        sink.abort();
        return Err(DepthloopError::encoding(format!(
            "failed to finalize output: {err}"
        )));
    }
    tracing::info!(frames = stats.frames_written, "export finished");
    Ok(stats)
}

/// Run [`export`] on its own thread with private copies of the renderer and parameters.
///
/// The sink is handed back with the stats so in-memory results can be inspected.
pub fn spawn_export<S>(
    renderer: FrameRenderer,
    params: AnimationParameters,
    opts: ExportOpts,
    mut sink: S,
) -> DepthloopResult<JoinHandle<DepthloopResult<(ExportStats, S)>>>
where
    S: FrameSink + 'static,
{
    let handle = thread::Builder::new()
        .name("depthloop-export".to_string())
        .spawn(move || {
            let stats = export(&renderer, &params, &opts, &mut sink)?;
            Ok((stats, sink))
        })
        .context("failed to spawn export thread")?;
    Ok(handle)
}

fn build_thread_pool(threads: Option<usize>) -> DepthloopResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DepthloopError::validation(
            "export 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DepthloopError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
