use rayon::prelude::*;

use crate::{
    depth::normalize::NormalizedDepthField,
    effects::blur::blur_rgba8_premul,
    foundation::{
        error::{DepthloopError, DepthloopResult},
        math::lerp_u8,
    },
    render::frame::ColorBuffer,
};

/// Upper bound on the per-pixel blur radius, in pixels.
pub const MAX_BOKEH_RADIUS: f32 = 32.0;

/// Radii below this many pixels are treated as in focus.
pub const MIN_BOKEH_RADIUS: f32 = 1e-3;

/// Quality knobs for [`apply_bokeh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BokehOpts {
    /// Number of pre-blurred levels between sharp and the widest radius in the frame.
    pub buckets: u32,
}

impl Default for BokehOpts {
    fn default() -> Self {
        Self { buckets: 8 }
    }
}

/// Blur radius in pixels for a sample at `depth`: grows linearly with the distance from the
/// focal plane and is zero on it. Radii under [`MIN_BOKEH_RADIUS`] snap to zero.
pub fn blur_radius(depth: f32, focal_point: f64, bokeh_intensity: f64) -> f32 {
    let r = bokeh_intensity * (f64::from(depth) - focal_point).abs();
    if !r.is_finite() || r < f64::from(MIN_BOKEH_RADIUS) {
        return 0.0;
    }
    (r as f32).min(MAX_BOKEH_RADIUS)
}

/// Depth-of-field pass over an already warped frame.
///
/// The frame is blurred at `buckets` evenly spaced radii up to the largest radius present; each
/// pixel then blends the two levels that bracket its own radius. Pixels on the focal plane keep
/// their exact input value.
#[tracing::instrument(skip(warped, depth), fields(w = warped.width, h = warped.height))]
pub fn apply_bokeh(
    warped: &ColorBuffer,
    depth: &NormalizedDepthField,
    focal_point: f64,
    bokeh_intensity: f64,
    opts: &BokehOpts,
) -> DepthloopResult<ColorBuffer> {
    if (depth.width(), depth.height()) != (warped.width, warped.height) {
        return Err(DepthloopError::invalid_pair(format!(
            "bokeh expects matching dimensions: frame {}x{}, depth {}x{}",
            warped.width,
            warped.height,
            depth.width(),
            depth.height()
        )));
    }
    if bokeh_intensity <= 0.0 {
        return Ok(warped.clone());
    }

    let radii: Vec<f32> = depth
        .values()
        .iter()
        .map(|&d| blur_radius(d, focal_point, bokeh_intensity))
        .collect();
    let max_radius = radii.iter().copied().fold(0.0f32, f32::max);
    if max_radius <= 0.0 {
        return Ok(warped.clone());
    }

    let buckets = opts.buckets.max(1);
    let blurred = (1..=buckets)
        .into_par_iter()
        .map(|k| {
            let r = max_radius * k as f32 / buckets as f32;
            blur_rgba8_premul(
                &warped.data,
                warped.width,
                warped.height,
                r.ceil() as u32,
                r / 2.0,
            )
        })
        .collect::<DepthloopResult<Vec<_>>>()?;
    tracing::trace!(buckets, max_radius, "bokeh levels ready");

    let levels: Vec<&[u8]> = std::iter::once(warped.data.as_slice())
        .chain(blurred.iter().map(Vec::as_slice))
        .collect();

    let mut out = vec![0u8; warped.data.len()];
    for (i, (px, &r)) in out.chunks_exact_mut(4).zip(&radii).enumerate() {
        let t = r / max_radius * buckets as f32;
        let lo = (t.floor() as usize).min(buckets as usize);
        let hi = (lo + 1).min(buckets as usize);
        let frac = t - lo as f32;
        let (a, b) = (&levels[lo][i * 4..i * 4 + 4], &levels[hi][i * 4..i * 4 + 4]);
        for c in 0..4 {
            px[c] = lerp_u8(a[c], b[c], frac);
        }
    }

    ColorBuffer::new(warped.width, warped.height, out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bokeh.rs"]
mod tests;
