use std::f64::consts::TAU;

use crate::{
    animation::params::{AnimationParameters, CurveType},
    foundation::core::Vec2,
};

/// Camera offset in UV units (fractions of image width/height).
///
/// Its length never exceeds the `intensity` it was scaled by.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraOffset(pub Vec2);

impl CameraOffset {
    pub const ZERO: Self = Self(Vec2::ZERO);

    pub fn new(dx: f64, dy: f64) -> Self {
        Self(Vec2::new(dx, dy))
    }

    pub fn dx(self) -> f64 {
        self.0.x
    }

    pub fn dy(self) -> f64 {
        self.0.y
    }

    pub fn magnitude(self) -> f64 {
        self.0.hypot()
    }

    pub fn is_zero(self) -> bool {
        self.0.x == 0.0 && self.0.y == 0.0
    }
}

impl CurveType {
    /// Unit-bounded curve point at `phase` in [0,1). Every curve is periodic in phase with period 1,
    /// so `sample(0.0)` and the limit towards `sample(1.0)` coincide.
    pub fn sample(self, phase: f64) -> Vec2 {
        let theta = TAU * phase;
        let (s, c) = theta.sin_cos();
        match self {
            Self::Circle => Vec2::new(c, s),
            Self::Infinity => Vec2::new(s, s * c),
            Self::HorizontalSweep => Vec2::new(s, 0.0),
            Self::VerticalSweep => Vec2::new(0.0, s),
        }
    }
}

/// Loop phase in [0,1) for elapsed `time_secs`.
pub fn phase_at(time_secs: f64, interval_secs: f64) -> f64 {
    let phase = (time_secs / interval_secs).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if phase >= 1.0 { 0.0 } else { phase }
}

/// Camera offset at elapsed `time_secs`: the selected curve at the wrapped phase, scaled by
/// `intensity`. Parameters are clamped before use.
pub fn offset_at(time_secs: f64, params: &AnimationParameters) -> CameraOffset {
    let p = params.clamped();
    let unit = p.curve.sample(phase_at(time_secs, p.interval_secs));
    let mut offset = unit * p.intensity;
    // sin/cos and hypot rounding can land a hair above the bound.
    while offset.hypot() > p.intensity {
        offset = offset * (1.0 - f64::EPSILON);
    }
    CameraOffset(offset)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
