use crate::{
    assets::depth_image::DepthMap,
    foundation::error::{DepthloopError, DepthloopResult},
};

/// Resample a raw depth map to `width` x `height` using pixel-center alignment.
///
/// Bilinear where all four taps are finite; otherwise the nearest tap is copied so missing samples
/// stay missing instead of poisoning their neighbors.
pub fn resample_depth(src: &DepthMap, width: u32, height: u32) -> DepthloopResult<DepthMap> {
    if src.width() == 0 || src.height() == 0 {
        return Err(DepthloopError::invalid_depth(
            "depth map has zero dimensions",
        ));
    }
    if width == 0 || height == 0 {
        return Err(DepthloopError::validation(
            "resample target must be non-empty",
        ));
    }
    if (src.width(), src.height()) == (width, height) {
        return Ok(src.clone());
    }

    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let sx_scale = sw as f64 / f64::from(width);
    let sy_scale = sh as f64 / f64::from(height);
    let samples = src.samples();

    let mut out = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        let fy = ((f64::from(y) + 0.5) * sy_scale - 0.5).clamp(0.0, (sh - 1) as f64);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(sh - 1);
        let ty = (fy - y0 as f64) as f32;
        for x in 0..width {
            let fx = ((f64::from(x) + 0.5) * sx_scale - 0.5).clamp(0.0, (sw - 1) as f64);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(sw - 1);
            let tx = (fx - x0 as f64) as f32;

            let v00 = samples[y0 * sw + x0];
            let v10 = samples[y0 * sw + x1];
            let v01 = samples[y1 * sw + x0];
            let v11 = samples[y1 * sw + x1];

            let v = if v00.is_finite() && v10.is_finite() && v01.is_finite() && v11.is_finite() {
                let top = v00 + (v10 - v00) * tx;
                let bot = v01 + (v11 - v01) * tx;
                top + (bot - top) * ty
            } else {
                let nx = if tx < 0.5 { x0 } else { x1 };
                let ny = if ty < 0.5 { y0 } else { y1 };
                samples[ny * sw + nx]
            };
            out.push(v);
        }
    }

    Ok(DepthMap::from_parts(width, height, out))
}

#[cfg(test)]
#[path = "../../tests/unit/depth/resample.rs"]
mod tests;
