//! Frame production: the stateless renderer and the live preview loop built on it.

/// Finished frames and pixel buffers.
pub mod frame;
/// Wall-clock preview loop and its thread.
pub mod preview;
/// Curve, warp and depth-of-field per frame.
pub mod renderer;
