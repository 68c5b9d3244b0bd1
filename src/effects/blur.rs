use rayon::prelude::*;

use crate::foundation::{
    error::{DepthloopError, DepthloopResult},
    math::rgba8_len,
};

/// Minimum pixel count (w*h) to justify row-level parallelism.
pub(crate) const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Separable Gaussian blur of a premultiplied RGBA8 buffer with clamp-to-edge sampling.
///
/// Weights are Q16 fixed point so results are bit-identical across threads and machines.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> DepthloopResult<Vec<u8>> {
    let expected_len = rgba8_len(width, height)
        .ok_or_else(|| DepthloopError::evaluation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(DepthloopError::evaluation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    let parallel = (width as usize) * (height as usize) >= PARALLEL_PIXEL_THRESHOLD;
    let row_bytes = width as usize * 4;

    let h_row = |(y, dst): (usize, &mut [u8])| horizontal_row(src, dst, y, width, &kernel);
    if parallel {
        tmp.par_chunks_mut(row_bytes).enumerate().for_each(h_row);
    } else {
        tmp.chunks_mut(row_bytes).enumerate().for_each(h_row);
    }

    let v_row = |(y, dst): (usize, &mut [u8])| vertical_row(&tmp, dst, y, width, height, &kernel);
    if parallel {
        out.par_chunks_mut(row_bytes).enumerate().for_each(v_row);
    } else {
        out.chunks_mut(row_bytes).enumerate().for_each(v_row);
    }
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> DepthloopResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(DepthloopError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(DepthloopError::evaluation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the center tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_row(src: &[u8], dst: &mut [u8], y: usize, width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row = y * width as usize;
    for x in 0..w {
        let mut acc = [0u64; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let sx = (x + ki as i32 - radius).clamp(0, w - 1);
            let idx = (row + sx as usize) * 4;
            for c in 0..4 {
                acc[c] += u64::from(kw) * u64::from(src[idx + c]);
            }
        }
        let out_idx = x as usize * 4;
        for c in 0..4 {
            dst[out_idx + c] = q16_to_u8(acc[c]);
        }
    }
}

fn vertical_row(src: &[u8], dst: &mut [u8], y: usize, width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as usize;
    let h = height as i32;
    for x in 0..w {
        let mut acc = [0u64; 4];
        for (ki, &kw) in k.iter().enumerate() {
            let sy = (y as i32 + ki as i32 - radius).clamp(0, h - 1);
            let idx = (sy as usize * w + x) * 4;
            for c in 0..4 {
                acc[c] += u64::from(kw) * u64::from(src[idx + c]);
            }
        }
        let out_idx = x * 4;
        for c in 0..4 {
            dst[out_idx + c] = q16_to_u8(acc[c]);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
