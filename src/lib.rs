//! depthloop turns a single photo plus a per-pixel depth map into a seamless "pseudo-3D"
//! parallax loop.
//!
//! The pipeline per frame:
//!
//! - [`offset_at`]: camera offset on a periodic curve for the elapsed time
//! - [`warp`]: re-project the photo, near pixels moving more than far ones
//! - [`apply_bokeh`]: depth-of-field blur around a focal depth
//!
//! [`FrameRenderer`] composes the three. [`PreviewLoop`] drives it from the wall clock with a
//! pause/resume state machine, and [`export`] drives it from a fixed virtual clock into a
//! [`FrameSink`] such as [`FfmpegSink`].
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod animation;
pub(crate) mod depth;
pub(crate) mod effects;
/// Export driver and encoder sinks.
pub mod encode;
/// JSON project files.
pub mod project;
/// Frame rendering and the live preview loop.
pub mod render;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRange, Vec2};
pub use crate::foundation::error::{DepthloopError, DepthloopResult};

pub use crate::assets::decode::{
    decode_depth_image, decode_diffuse, depth_from_f32le, load_depth_image, read_depth_f32le,
    read_depth_image, read_diffuse,
};
pub use crate::assets::depth_image::{DepthImage, DepthMap, DiffuseImage, MAX_ASPECT_MISMATCH};

pub use crate::depth::normalize::{
    DepthEncoding, MissingDepth, NormalizeOpts, NormalizedDepthField, normalize,
};
pub use crate::depth::resample::resample_depth;

pub use crate::animation::clock::AnimationClock;
pub use crate::animation::curve::{CameraOffset, offset_at, phase_at};
pub use crate::animation::params::{AnimationParameters, CurveType};

pub use crate::effects::blur::blur_rgba8_premul;
pub use crate::effects::bokeh::{
    BokehOpts, MAX_BOKEH_RADIUS, MIN_BOKEH_RADIUS, apply_bokeh, blur_radius,
};
pub use crate::effects::parallax::{Sampling, depth_weight, displacement_at, warp};

pub use crate::render::frame::{ColorBuffer, RenderedFrame};
pub use crate::render::preview::{
    FrameConsumer, LoopState, PreviewLoop, PreviewOpts, PreviewStats, PreviewThread,
    SessionSnapshot, TickOutcome,
};
pub use crate::render::renderer::{FrameRenderer, RenderOpts};

pub use crate::encode::export::{ExportOpts, ExportStats, export, frame_count, spawn_export};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png_seq::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};

pub use crate::project::{DepthSource, ExportSettings, Project};
