use crate::{
    assets::depth_image::DiffuseImage,
    foundation::{
        error::{DepthloopError, DepthloopResult},
        math::rgba8_len,
    },
};

/// Premultiplied RGBA8 pixels, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, premultiplied alpha.
    pub data: Vec<u8>,
}

impl ColorBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> DepthloopResult<Self> {
        let expected = rgba8_len(width, height)
            .ok_or_else(|| DepthloopError::evaluation("color buffer size overflow"))?;
        if data.len() != expected {
            return Err(DepthloopError::evaluation(format!(
                "color buffer expects {expected} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_diffuse(img: &DiffuseImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            data: img.data().to_vec(),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// A finished frame tagged with the elapsed animation time that produced it.
///
/// Frames are handed to exactly one consumer and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedFrame {
    /// Elapsed animation time in seconds.
    pub time_secs: f64,
    /// Final pixels.
    pub buffer: ColorBuffer,
}

impl RenderedFrame {
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer.data
    }
}
