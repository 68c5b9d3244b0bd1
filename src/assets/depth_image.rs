use std::sync::Arc;

use crate::{
    depth::{
        normalize::{NormalizeOpts, NormalizedDepthField, normalize},
        resample::resample_depth,
    },
    foundation::{
        error::{DepthloopError, DepthloopResult},
        math::rgba8_len,
    },
};

/// Largest relative aspect-ratio difference accepted when pairing a depth map with a photo.
pub const MAX_ASPECT_MISMATCH: f64 = 0.02;

/// Upright color photo as premultiplied RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffuseImage {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
}

impl DiffuseImage {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> DepthloopResult<Self> {
        let expected = rgba8_len(width, height)
            .ok_or_else(|| DepthloopError::validation("diffuse image size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(DepthloopError::validation(format!(
                "diffuse image expects {expected} bytes for {width}x{height}, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul,
        })
    }

    /// Image filled with a single premultiplied color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DepthloopResult<Self> {
        let px = width as usize * height as usize;
        Self::new(width, height, rgba.repeat(px))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.rgba8_premul
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba8_premul[i],
            self.rgba8_premul[i + 1],
            self.rgba8_premul[i + 2],
            self.rgba8_premul[i + 3],
        ]
    }
}

/// Raw, sensor-specific depth or disparity samples. Non-finite samples mark missing depth.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl DepthMap {
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> DepthloopResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| DepthloopError::invalid_depth("depth map size overflow"))?;
        if samples.len() != expected {
            return Err(DepthloopError::invalid_depth(format!(
                "depth map expects {expected} samples for {width}x{height}, got {}",
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub(crate) fn from_parts(width: u32, height: u32, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len(), width as usize * height as usize);
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// A photo paired with its normalized depth field; the unit handed to the renderer.
///
/// Both halves are immutable and shared, so cloning is cheap and clones may be handed to export
/// while a preview keeps rendering.
#[derive(Clone, Debug)]
pub struct DepthImage {
    diffuse: Arc<DiffuseImage>,
    depth: Arc<NormalizedDepthField>,
}

impl DepthImage {
    /// Pair a photo with a raw depth map, resampling and normalizing the depth exactly once.
    ///
    /// The depth map may have a different resolution as long as the aspect ratios agree within
    /// [`MAX_ASPECT_MISMATCH`].
    #[tracing::instrument(skip_all, fields(
        diffuse_w = diffuse.width(),
        diffuse_h = diffuse.height(),
        depth_w = depth.width(),
        depth_h = depth.height(),
    ))]
    pub fn new(
        diffuse: DiffuseImage,
        depth: DepthMap,
        opts: &NormalizeOpts,
    ) -> DepthloopResult<Self> {
        if diffuse.width() == 0 || diffuse.height() == 0 {
            return Err(DepthloopError::invalid_pair("diffuse image is empty"));
        }
        if depth.width() == 0 || depth.height() == 0 {
            return Err(DepthloopError::invalid_depth(
                "depth map has zero dimensions",
            ));
        }

        let diffuse_aspect = f64::from(diffuse.width()) / f64::from(diffuse.height());
        let depth_aspect = f64::from(depth.width()) / f64::from(depth.height());
        if ((depth_aspect - diffuse_aspect) / diffuse_aspect).abs() > MAX_ASPECT_MISMATCH {
            return Err(DepthloopError::invalid_pair(format!(
                "aspect ratio mismatch: diffuse {}x{}, depth {}x{}",
                diffuse.width(),
                diffuse.height(),
                depth.width(),
                depth.height()
            )));
        }

        let depth = if (depth.width(), depth.height()) == (diffuse.width(), diffuse.height()) {
            depth
        } else {
            tracing::debug!("resampling depth map to diffuse resolution");
            resample_depth(&depth, diffuse.width(), diffuse.height())?
        };
        let field = normalize(&depth, opts)?;
        Self::from_normalized(diffuse, field)
    }

    /// Pair a photo with an already normalized field of identical dimensions.
    pub fn from_normalized(
        diffuse: DiffuseImage,
        depth: NormalizedDepthField,
    ) -> DepthloopResult<Self> {
        if (depth.width(), depth.height()) != (diffuse.width(), diffuse.height()) {
            return Err(DepthloopError::invalid_pair(format!(
                "dimension mismatch: diffuse {}x{}, depth {}x{}",
                diffuse.width(),
                diffuse.height(),
                depth.width(),
                depth.height()
            )));
        }
        Ok(Self {
            diffuse: Arc::new(diffuse),
            depth: Arc::new(depth),
        })
    }

    pub fn diffuse(&self) -> &DiffuseImage {
        &self.diffuse
    }

    pub fn depth(&self) -> &NormalizedDepthField {
        &self.depth
    }

    pub fn width(&self) -> u32 {
        self.diffuse.width()
    }

    pub fn height(&self) -> u32 {
        self.diffuse.height()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/depth_image.rs"]
mod tests;
