// SPDX-License-Identifier: MPL-2.0
//! Progress sources for the active item.
//!
//! Image and text items are measured by a pausable timer; videos report
//! their playback position. Both resolve to the same fraction:
//! `clamp(elapsed_ms / max(1, duration_ms), 0, 1)`.

use std::time::{Duration, Instant};

/// Returns `elapsed / duration` in `[0, 1]`, treating durations under one
/// millisecond as one millisecond.
#[must_use]
pub fn fraction(elapsed: Duration, duration: Duration) -> f32 {
    let duration_ms = duration.as_millis().max(1) as f64;
    let elapsed_ms = elapsed.as_millis() as f64;
    (elapsed_ms / duration_ms).clamp(0.0, 1.0) as f32
}

/// Returns true once `elapsed` covers `duration` (at least one millisecond).
#[must_use]
pub fn is_complete(elapsed: Duration, duration: Duration) -> bool {
    elapsed >= duration.max(Duration::from_millis(1))
}

/// A pausable stopwatch with a fixed target duration.
///
/// While running, elapsed time is measured from a reference instant and
/// added to what was accumulated before the last pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSource {
    duration: Duration,
    reference_start: Option<Instant>,
    accumulated: Duration,
}

impl TimerSource {
    /// Creates a stopped timer at zero.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            reference_start: None,
            accumulated: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.reference_start.is_some()
    }

    /// Starts or resumes the timer. No-op if already running.
    pub fn start(&mut self, now: Instant) {
        if self.reference_start.is_none() {
            self.reference_start = Some(now);
        }
    }

    /// Stops the timer, folding the running span into the accumulated time.
    pub fn pause(&mut self, now: Instant) {
        if let Some(start) = self.reference_start.take() {
            self.accumulated += now.saturating_duration_since(start);
        }
    }

    /// Stops the timer and rewinds it to zero.
    pub fn reset(&mut self) {
        self.reference_start = None;
        self.accumulated = Duration::ZERO;
    }

    /// Time measured so far.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.reference_start {
            Some(start) => self.accumulated + now.saturating_duration_since(start),
            None => self.accumulated,
        }
    }
}

/// Where the active item's progress comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSource {
    /// Fixed-duration items (image, text).
    Timer(TimerSource),
    /// Media-driven items (video). `duration` is unknown until metadata loads
    /// and stays unknown when loading failed.
    MediaPosition {
        position: Duration,
        duration: Option<Duration>,
    },
}

impl ProgressSource {
    /// A video source at position zero.
    #[must_use]
    pub fn media(duration: Option<Duration>) -> Self {
        Self::MediaPosition {
            position: Duration::ZERO,
            duration,
        }
    }

    /// Elapsed time at `now`.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self {
            Self::Timer(timer) => timer.elapsed(now),
            Self::MediaPosition { position, .. } => *position,
        }
    }

    /// The duration progress is measured against, if known.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Timer(timer) => Some(timer.duration()),
            Self::MediaPosition { duration, .. } => *duration,
        }
    }

    /// Progress fraction for the given elapsed time.
    #[must_use]
    pub fn fraction_for(&self, elapsed: Duration) -> f32 {
        self.duration()
            .map_or(0.0, |duration| fraction(elapsed, duration))
    }

    #[must_use]
    pub fn is_timer(&self) -> bool {
        matches!(self, Self::Timer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn fraction_is_clamped() {
        assert_abs_diff_eq!(fraction(Duration::ZERO, Duration::from_secs(5)), 0.0);
        assert_abs_diff_eq!(
            fraction(Duration::from_millis(2_500), Duration::from_secs(5)),
            0.5
        );
        assert_abs_diff_eq!(
            fraction(Duration::from_secs(9), Duration::from_secs(5)),
            1.0
        );
    }

    #[test]
    fn zero_duration_counts_as_one_millisecond() {
        assert_abs_diff_eq!(fraction(Duration::ZERO, Duration::ZERO), 0.0);
        assert_abs_diff_eq!(fraction(Duration::from_millis(1), Duration::ZERO), 1.0);
        assert!(!is_complete(Duration::ZERO, Duration::ZERO));
        assert!(is_complete(Duration::from_millis(1), Duration::ZERO));
    }

    #[test]
    fn timer_pause_preserves_elapsed() {
        let start = Instant::now();
        let mut timer = TimerSource::new(Duration::from_secs(5));
        timer.start(start);

        let paused_at = start + Duration::from_millis(1_200);
        timer.pause(paused_at);
        assert_eq!(timer.elapsed(paused_at), Duration::from_millis(1_200));

        // Time spent paused does not count.
        let resumed_at = paused_at + Duration::from_secs(3);
        assert_eq!(timer.elapsed(resumed_at), Duration::from_millis(1_200));
        timer.start(resumed_at);
        assert_eq!(
            timer.elapsed(resumed_at + Duration::from_millis(300)),
            Duration::from_millis(1_500)
        );
    }

    #[test]
    fn timer_start_is_idempotent() {
        let start = Instant::now();
        let mut timer = TimerSource::new(Duration::from_secs(1));
        timer.start(start);
        timer.start(start + Duration::from_millis(400));
        assert_eq!(
            timer.elapsed(start + Duration::from_millis(500)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn timer_reset_rewinds() {
        let start = Instant::now();
        let mut timer = TimerSource::new(Duration::from_secs(1));
        timer.start(start);
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(start + Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn media_source_without_duration_has_no_progress() {
        let source = ProgressSource::media(None);
        assert_abs_diff_eq!(source.fraction_for(Duration::from_secs(3)), 0.0);

        let source = ProgressSource::media(Some(Duration::from_secs(10)));
        assert_abs_diff_eq!(source.fraction_for(Duration::from_secs(4)), 0.4);
    }
}
