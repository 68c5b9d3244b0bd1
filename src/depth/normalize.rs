use std::collections::VecDeque;

use crate::{
    assets::depth_image::DepthMap,
    foundation::error::{DepthloopError, DepthloopResult},
};

/// How raw samples relate to distance from the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthEncoding {
    /// Larger values are farther away (metric depth).
    Depth,
    /// Larger values are nearer (disparity, white-near grayscale maps).
    #[default]
    Disparity,
}

/// Fill policy for non-finite (missing) raw samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDepth {
    /// Treat missing samples as farthest (1.0) so they never pull foreground warp.
    #[default]
    Far,
    /// Copy the value of the nearest valid sample (4-connected flood fill).
    Nearest,
    /// Use a fixed normalized value, clamped to [0,1].
    Value(f32),
}

/// Options for [`normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizeOpts {
    /// Interpretation of raw samples.
    #[serde(default)]
    pub encoding: DepthEncoding,
    /// Policy for non-finite samples.
    #[serde(default)]
    pub missing: MissingDepth,
}

/// Canonical depth field: one sample per pixel in [0,1], 0 = near, 1 = far.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedDepthField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl NormalizedDepthField {
    /// Wrap values that are already normalized.
    ///
    /// Fails with [`DepthloopError::InvalidDepthData`] when the length does not match or a value
    /// lies outside [0,1].
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> DepthloopResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthloopError::invalid_depth(
                "depth field has zero dimensions",
            ));
        }
        if values.len() != width as usize * height as usize {
            return Err(DepthloopError::invalid_depth(format!(
                "depth field expects {} samples, got {}",
                width as usize * height as usize,
                values.len()
            )));
        }
        if values.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(DepthloopError::invalid_depth(
                "depth field values must lie in [0,1]",
            ));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Horizontal ramp from near (0) at the left column to far (1) at the right column.
    pub fn horizontal_ramp(width: u32, height: u32) -> DepthloopResult<Self> {
        let denom = width.saturating_sub(1).max(1) as f32;
        let values = (0..height)
            .flat_map(|_| (0..width).map(move |x| x as f32 / denom))
            .collect();
        Self::new(width, height, values)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Sample at pixel `(x, y)`. Coordinates must be in bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: u32) -> &[f32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.values[start..start + w]
    }

    /// View this field as a raw depth map (larger = farther) so it can be re-normalized.
    pub fn to_depth_map(&self) -> DepthMap {
        DepthMap::from_parts(self.width, self.height, self.values.clone())
    }
}

/// Rescale a raw depth buffer into a [`NormalizedDepthField`].
///
/// Finite samples are mapped linearly from `[min, max]` to `[0, 1]` (inverted for disparity input).
/// A flat buffer maps to 1.0 everywhere. Non-finite samples are filled per [`MissingDepth`].
#[tracing::instrument(skip(raw), fields(width = raw.width(), height = raw.height()))]
pub fn normalize(raw: &DepthMap, opts: &NormalizeOpts) -> DepthloopResult<NormalizedDepthField> {
    let (width, height) = (raw.width(), raw.height());
    if width == 0 || height == 0 {
        return Err(DepthloopError::invalid_depth(
            "depth map has zero dimensions",
        ));
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut missing = 0usize;
    for &v in raw.samples() {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        } else {
            missing += 1;
        }
    }
    if missing == raw.samples().len() {
        return Err(DepthloopError::invalid_depth(
            "depth map contains no finite samples",
        ));
    }

    let range = max - min;
    let rescale = |v: f32| -> f32 {
        if range <= 0.0 || !range.is_finite() {
            return 1.0;
        }
        let t = ((v - min) / range).clamp(0.0, 1.0);
        match opts.encoding {
            DepthEncoding::Depth => t,
            DepthEncoding::Disparity => 1.0 - t,
        }
    };

    let mut values: Vec<Option<f32>> = raw
        .samples()
        .iter()
        .map(|&v| v.is_finite().then(|| rescale(v)))
        .collect();

    if missing > 0 {
        tracing::debug!(missing, policy = ?opts.missing, "filling missing depth samples");
        fill_missing(&mut values, width as usize, height as usize, opts.missing);
    }

    let values = values.into_iter().map(|v| v.unwrap_or(1.0)).collect();
    Ok(NormalizedDepthField {
        width,
        height,
        values,
    })
}

fn fill_missing(values: &mut [Option<f32>], width: usize, height: usize, policy: MissingDepth) {
    match policy {
        MissingDepth::Far => fill_constant(values, 1.0),
        MissingDepth::Value(v) => {
            let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
            fill_constant(values, v);
        }
        MissingDepth::Nearest => fill_nearest(values, width, height),
    }
}

fn fill_constant(values: &mut [Option<f32>], v: f32) {
    for slot in values.iter_mut().filter(|s| s.is_none()) {
        *slot = Some(v);
    }
}

fn fill_nearest(values: &mut [Option<f32>], width: usize, height: usize) {
    let mut queue: VecDeque<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    while let Some(i) = queue.pop_front() {
        let Some(v) = values[i] else { continue };
        let (x, y) = (i % width, i / width);
        let mut visit = |j: usize| {
            if values[j].is_none() {
                values[j] = Some(v);
                queue.push_back(j);
            }
        };
        if x > 0 {
            visit(i - 1);
        }
        if x + 1 < width {
            visit(i + 1);
        }
        if y > 0 {
            visit(i - width);
        }
        if y + 1 < height {
            visit(i + width);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/depth/normalize.rs"]
mod tests;
