use std::path::Path;

use anyhow::Context;

use crate::{
    assets::depth_image::{DepthImage, DepthMap, DiffuseImage},
    depth::normalize::NormalizeOpts,
    foundation::error::{DepthloopError, DepthloopResult},
};

/// Decode encoded image bytes into a premultiplied RGBA8 [`DiffuseImage`].
///
/// Orientation is not touched: the capture side hands over upright images.
pub fn decode_diffuse(bytes: &[u8]) -> DepthloopResult<DiffuseImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode diffuse image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    DiffuseImage::new(width, height, rgba8_premul)
}

/// Decode a grayscale depth/disparity image; samples are luma in [0,1].
pub fn decode_depth_image(bytes: &[u8]) -> DepthloopResult<DepthMap> {
    let dyn_img = image::load_from_memory(bytes).context("decode depth image from memory")?;
    let luma = dyn_img.to_luma32f();
    let (width, height) = luma.dimensions();
    DepthMap::new(width, height, luma.into_raw())
}

/// Interpret `bytes` as tightly packed little-endian `f32` samples.
pub fn depth_from_f32le(bytes: &[u8], width: u32, height: u32) -> DepthloopResult<DepthMap> {
    if !bytes.len().is_multiple_of(4) {
        return Err(DepthloopError::invalid_depth(
            "f32le depth buffer length must be a multiple of 4",
        ));
    }
    let samples = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    DepthMap::new(width, height, samples)
}

pub fn read_diffuse(path: &Path) -> DepthloopResult<DiffuseImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read diffuse image '{}'", path.display()))?;
    decode_diffuse(&bytes)
}

pub fn read_depth_image(path: &Path) -> DepthloopResult<DepthMap> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read depth image '{}'", path.display()))?;
    decode_depth_image(&bytes)
}

pub fn read_depth_f32le(path: &Path, width: u32, height: u32) -> DepthloopResult<DepthMap> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read raw depth '{}'", path.display()))?;
    depth_from_f32le(&bytes, width, height)
}

/// Read a photo and a grayscale depth image from disk and pair them.
pub fn load_depth_image(
    diffuse: &Path,
    depth: &Path,
    opts: &NormalizeOpts,
) -> DepthloopResult<DepthImage> {
    DepthImage::new(read_diffuse(diffuse)?, read_depth_image(depth)?, opts)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
