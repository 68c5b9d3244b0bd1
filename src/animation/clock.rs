use std::time::{Duration, Instant};

/// Elapsed animation time for one preview session.
///
/// Advances by wall-clock deltas between ticks while running. Time spent paused is never counted:
/// resuming re-anchors the clock, so the first tick after a resume advances only by the time since
/// the resume.
#[derive(Clone, Debug, Default)]
pub struct AnimationClock {
    elapsed: Duration,
    anchor: Option<Instant>,
}

impl AnimationClock {
    /// A stopped clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clock is currently accumulating time.
    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Start (or resume) accumulating from `now`. No-op when already running.
    pub fn resume(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Fold in time up to `now` and stop accumulating.
    pub fn pause(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            self.elapsed += now.saturating_duration_since(anchor);
        }
    }

    /// Advance to `now` and return the new elapsed time. A paused clock does not move.
    ///
    /// `now` earlier than the previous tick counts as a zero delta.
    pub fn tick(&mut self, now: Instant) -> Duration {
        if let Some(anchor) = self.anchor {
            let delta = now.saturating_duration_since(anchor);
            self.elapsed += delta;
            self.anchor = Some(now.max(anchor));
        }
        self.elapsed
    }

    /// Back to zero, stopped.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/clock.rs"]
mod tests;
