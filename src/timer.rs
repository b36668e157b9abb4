use std::time::{Duration, Instant};

/// Countdown started by [`Timer::reset_at`].
///
/// A timer that has never been reset counts as elapsed, so the first cycle
/// after startup always fires.
#[derive(Debug, Clone)]
pub struct Timer {
    start: Option<Instant>,
    duration: Duration,
}

impl Timer {
    pub fn new(duration: Duration) -> Self {
        Self {
            start: None,
            duration,
        }
    }

    #[cfg(test)]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.start = Some(now);
    }

    /// Absolute distance between `now` and the start. `None` before the first reset.
    pub fn elapsed_at(&self, now: Instant) -> Option<Duration> {
        self.start.map(|start| {
            if now >= start {
                now - start
            } else {
                start - now
            }
        })
    }

    /// Seconds left, negative once overdue
    pub fn remaining_secs_at(&self, now: Instant) -> f64 {
        match self.elapsed_at(now) {
            Some(elapsed) => self.duration.as_secs_f64() - elapsed.as_secs_f64(),
            None => f64::NEG_INFINITY,
        }
    }

    pub fn is_elapsed_at(&self, now: Instant) -> bool {
        match self.elapsed_at(now) {
            Some(elapsed) => elapsed > self.duration,
            None => true,
        }
    }
}
