use std::ops::RangeInclusive;

/// Closed set of camera motion patterns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// Circular orbit.
    #[default]
    Circle,
    /// Figure-eight.
    Infinity,
    /// Left/right sweep.
    HorizontalSweep,
    /// Up/down sweep.
    VerticalSweep,
}

impl CurveType {
    /// All variants in control-panel order.
    pub const ALL: [CurveType; 4] = [
        CurveType::Circle,
        CurveType::Infinity,
        CurveType::HorizontalSweep,
        CurveType::VerticalSweep,
    ];
}

/// Values supplied by the control panel; read by the engine once per tick, never mutated by it.
///
/// Construct freely, then call [`AnimationParameters::clamped`] (the engine does so on every read).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationParameters {
    /// Loop period in seconds, within [0.5, 30].
    pub interval_secs: f64,
    /// Maximum camera offset in UV units, within [0, 0.1].
    pub intensity: f64,
    /// Blur radius in pixels per unit of depth distance from the focal plane, within [0, 50].
    pub bokeh_intensity: f64,
    /// Normalized depth that stays sharp, within [0, 1].
    pub focal_point: f64,
    /// Motion pattern.
    pub curve: CurveType,
}

impl AnimationParameters {
    pub const INTERVAL_RANGE: RangeInclusive<f64> = 0.5..=30.0;
    pub const INTENSITY_RANGE: RangeInclusive<f64> = 0.0..=0.1;
    pub const BOKEH_RANGE: RangeInclusive<f64> = 0.0..=50.0;
    pub const FOCAL_RANGE: RangeInclusive<f64> = 0.0..=1.0;

    /// Copy with every field forced into its range. Non-finite values fall back to the default.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            interval_secs: clamp_or(self.interval_secs, Self::INTERVAL_RANGE, d.interval_secs),
            intensity: clamp_or(self.intensity, Self::INTENSITY_RANGE, d.intensity),
            bokeh_intensity: clamp_or(self.bokeh_intensity, Self::BOKEH_RANGE, d.bokeh_intensity),
            focal_point: clamp_or(self.focal_point, Self::FOCAL_RANGE, d.focal_point),
            curve: self.curve,
        }
    }
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Self {
            interval_secs: 2.0,
            intensity: 0.05,
            bokeh_intensity: 5.0,
            focal_point: 0.0,
            curve: CurveType::Circle,
        }
    }
}

fn clamp_or(v: f64, range: RangeInclusive<f64>, fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/params.rs"]
mod tests;
