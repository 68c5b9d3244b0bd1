use crate::{
    animation::{curve::offset_at, params::AnimationParameters},
    assets::depth_image::DepthImage,
    effects::{
        bokeh::{BokehOpts, apply_bokeh},
        parallax::{Sampling, warp},
    },
    foundation::error::DepthloopResult,
    render::frame::RenderedFrame,
};

/// Quality settings shared by preview and export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOpts {
    pub sampling: Sampling,
    pub bokeh: BokehOpts,
}

/// Stateless frame producer for one [`DepthImage`].
///
/// `render_at` is a pure function of `(image, time, params, opts)`, so the same renderer can be
/// shared by reference across threads and two calls with equal inputs produce identical pixels.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    image: DepthImage,
    opts: RenderOpts,
}

impl FrameRenderer {
    pub fn new(image: DepthImage) -> Self {
        Self::with_opts(image, RenderOpts::default())
    }

    pub fn with_opts(image: DepthImage, opts: RenderOpts) -> Self {
        Self { image, opts }
    }

    pub fn image(&self) -> &DepthImage {
        &self.image
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Render the frame at elapsed `time_secs`: camera offset, parallax warp, then depth of field.
    ///
    /// Parameters are clamped before use.
    #[tracing::instrument(level = "trace", skip(self, params))]
    pub fn render_at(
        &self,
        time_secs: f64,
        params: &AnimationParameters,
    ) -> DepthloopResult<RenderedFrame> {
        let p = params.clamped();
        let offset = offset_at(time_secs, &p);
        let warped = warp(
            self.image.diffuse(),
            self.image.depth(),
            offset,
            self.opts.sampling,
        )?;
        let buffer = apply_bokeh(
            &warped,
            self.image.depth(),
            p.focal_point,
            p.bokeh_intensity,
            &self.opts.bokeh,
        )?;
        Ok(RenderedFrame { time_secs, buffer })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
