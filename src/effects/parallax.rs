use rayon::prelude::*;

use crate::{
    animation::curve::CameraOffset,
    assets::depth_image::DiffuseImage,
    depth::normalize::NormalizedDepthField,
    effects::blur::PARALLEL_PIXEL_THRESHOLD,
    foundation::{
        core::Vec2,
        error::{DepthloopError, DepthloopResult},
    },
    render::frame::ColorBuffer,
};

/// Source sampling filter for [`warp`].
///
/// `Nearest` is faster but shows blocky steps during slow motion; it is a quality/performance
/// trade-off and never chosen implicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    #[default]
    Bilinear,
    Nearest,
}

/// Displacement scale for a normalized depth: 1 at near (0), 0 at far (1), linear in between.
pub fn depth_weight(depth: f32) -> f32 {
    1.0 - depth.clamp(0.0, 1.0)
}

/// Source-sample displacement in pixels for the output pixel `(x, y)`.
pub fn displacement_at(
    depth: &NormalizedDepthField,
    x: u32,
    y: u32,
    offset: CameraOffset,
) -> Vec2 {
    let w = f64::from(depth_weight(depth.get(x, y)));
    Vec2::new(
        offset.dx() * f64::from(depth.width()) * w,
        offset.dy() * f64::from(depth.height()) * w,
    )
}

/// Re-project `diffuse` for a camera `offset`: every output pixel samples the source at
/// `pixel + offset * depth_weight(depth[pixel])`, clamped to the image edge.
///
/// Clamping stretches the border pixels under large offsets rather than wrapping around.
#[tracing::instrument(skip(diffuse, depth), fields(w = diffuse.width(), h = diffuse.height()))]
pub fn warp(
    diffuse: &DiffuseImage,
    depth: &NormalizedDepthField,
    offset: CameraOffset,
    sampling: Sampling,
) -> DepthloopResult<ColorBuffer> {
    let (width, height) = (diffuse.width(), diffuse.height());
    if (depth.width(), depth.height()) != (width, height) {
        return Err(DepthloopError::invalid_pair(format!(
            "warp expects matching dimensions: diffuse {width}x{height}, depth {}x{}",
            depth.width(),
            depth.height()
        )));
    }
    if offset.is_zero() || width == 0 || height == 0 {
        return Ok(ColorBuffer::from_diffuse(diffuse));
    }

    let mut out = vec![0u8; diffuse.data().len()];
    let scale = (
        offset.dx() * f64::from(width),
        offset.dy() * f64::from(height),
    );
    let row_bytes = width as usize * 4;
    let row = |(y, dst): (usize, &mut [u8])| {
        warp_row(diffuse, depth.row(y as u32), dst, y as u32, scale, sampling)
    };
    if (width as usize) * (height as usize) >= PARALLEL_PIXEL_THRESHOLD {
        out.par_chunks_mut(row_bytes).enumerate().for_each(row);
    } else {
        out.chunks_mut(row_bytes).enumerate().for_each(row);
    }

    ColorBuffer::new(width, height, out)
}

fn warp_row(
    src: &DiffuseImage,
    depth_row: &[f32],
    dst: &mut [u8],
    y: u32,
    (sx_scale, sy_scale): (f64, f64),
    sampling: Sampling,
) {
    let max_x = f64::from(src.width() - 1);
    let max_y = f64::from(src.height() - 1);
    for (x, px) in dst.chunks_exact_mut(4).enumerate() {
        let w = f64::from(depth_weight(depth_row[x]));
        let fx = (x as f64 + sx_scale * w).clamp(0.0, max_x);
        let fy = (f64::from(y) + sy_scale * w).clamp(0.0, max_y);
        let rgba = match sampling {
            Sampling::Bilinear => sample_bilinear(src, fx, fy),
            Sampling::Nearest => src.pixel(fx.round() as u32, fy.round() as u32),
        };
        px.copy_from_slice(&rgba);
    }
}

/// Bilinear sample at in-bounds fractional coordinates.
fn sample_bilinear(src: &DiffuseImage, fx: f64, fy: f64) -> [u8; 4] {
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let tx = (fx - f64::from(x0)) as f32;
    let ty = (fy - f64::from(y0)) as f32;

    let p00 = src.pixel(x0, y0);
    let p10 = src.pixel(x1, y0);
    let p01 = src.pixel(x0, y1);
    let p11 = src.pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) + (f32::from(p10[c]) - f32::from(p00[c])) * tx;
        let bot = f32::from(p01[c]) + (f32::from(p11[c]) - f32::from(p01[c])) * tx;
        out[c] = (top + (bot - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/effects/parallax.rs"]
mod tests;
