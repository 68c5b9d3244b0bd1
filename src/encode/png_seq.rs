use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::FrameIndex,
        error::{DepthloopError, DepthloopResult},
    },
    render::frame::RenderedFrame,
};

/// Writes each frame as `<dir>/<prefix><index:05>.png` with straight alpha.
///
/// Needs no external tools; useful when `ffmpeg` is unavailable or for frame-accurate inspection.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
    scratch: Vec<u8>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_string(),
            cfg: None,
            written: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:05}.png", self.prefix, idx.0))
    }

    /// Files written since the last `begin`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> DepthloopResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(DepthloopError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory '{}'", self.dir.display()))?;
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.written.clear();
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RenderedFrame) -> DepthloopResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| DepthloopError::encoding("png sink not started"))?;
        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(DepthloopError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        let path = self.frame_path(idx);
        write_png_with_scratch(&path, frame, &mut self.scratch)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> DepthloopResult<()> {
        self.cfg
            .take()
            .ok_or_else(|| DepthloopError::encoding("png sink not started"))?;
        tracing::debug!(frames = self.written.len(), dir = %self.dir.display(), "png sequence done");
        Ok(())
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        self.cfg = None;
    }
}

/// Write one frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &RenderedFrame) -> DepthloopResult<()> {
    let mut scratch = vec![0u8; frame.data().len()];
    write_png_with_scratch(path, frame, &mut scratch)
}

fn write_png_with_scratch(
    path: &Path,
    frame: &RenderedFrame,
    scratch: &mut [u8],
) -> DepthloopResult<()> {
    unpremultiply_rgba8(scratch, frame.data());
    image::save_buffer_with_format(
        path,
        scratch,
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn unpremultiply_rgba8(dst: &mut [u8], src_premul: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        match a {
            0 => d.copy_from_slice(&[0, 0, 0, 0]),
            255 => d.copy_from_slice(s),
            _ => {
                for c in 0..3 {
                    d[c] = ((u16::from(s[c]) * 255 + a / 2) / a).min(255) as u8;
                }
                d[3] = s[3];
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png_seq.rs"]
mod tests;
