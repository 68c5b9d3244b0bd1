use crate::foundation::error::{DepthloopError, DepthloopResult};

pub use kurbo::Vec2;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> DepthloopResult<Self> {
        if start.0 > end.0 {
            return Err(DepthloopError::validation(
                "FrameRange start must be <= end",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Split into consecutive sub-ranges of at most `chunk` frames.
    pub fn chunks(self, chunk: u64) -> impl Iterator<Item = FrameRange> {
        let chunk = chunk.max(1);
        let end = self.end.0;
        (self.start.0..end)
            .step_by(chunk as usize)
            .map(move |s| FrameRange {
                start: FrameIndex(s),
                end: FrameIndex((s + chunk).min(end)),
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> DepthloopResult<Self> {
        if den == 0 {
            return Err(DepthloopError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(DepthloopError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn integer(fps: u32) -> DepthloopResult<Self> {
        Self::new(fps, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Exact virtual timestamp of frame `frames`, computed without accumulating error.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
