//! Export: the fixed-clock driver and the sinks that receive its frames.
//!
//! Sinks consume rendered frames in index order and are driven by [`export::export`].

/// Fixed virtual-clock export driver.
pub mod export;
/// `ffmpeg`-based MP4 sink (system `ffmpeg` binary).
pub mod ffmpeg;
/// Numbered PNG frames.
pub mod png_seq;
/// Sink trait and the in-memory sink.
pub mod sink;
