// SPDX-License-Identifier: MPL-2.0
//! Timeline controller: which item is active, how far it has played, and
//! when to move on.
//!
//! # Phases
//!
//! ```text
//!            ready               pause
//! Loading ─────────► Playing ◄─────────► Paused
//!    ▲                  │       resume
//!    │                  │ progress ≥ 1 / forward intent
//!    │                  ▼
//!    └────────────── Advancing ──────► Closed (past the last item)
//! ```
//!
//! `Advancing` only exists while a transition is applied; callers observe
//! `Loading` for the new item, or `Closed`.

use super::progress::{self, ProgressSource, TimerSource};
use super::scheduler::{DeferredAction, FrameScheduler};
use super::CloseReason;
use crate::config::REDUCED_MOTION_DURATION_MS;
use crate::domain::{ItemDuration, SkipDelay, Story};
use crate::media::Readiness;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

/// Timeline phase for the active item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Loading,
    Playing,
    Paused,
    Advancing,
    Closed,
}

/// What a timeline operation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    None,
    /// A different item became active and is loading.
    Entered { from: usize, to: usize },
    /// The first item restarted from zero.
    Replayed { index: usize },
    /// The session ended.
    Closed(CloseReason),
}

/// Timing parameters for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineSettings {
    pub default_duration: ItemDuration,
    pub skip_delay: SkipDelay,
    pub reduced_motion: bool,
}

/// Owns the playback state of one viewing session.
#[derive(Debug, Clone)]
pub struct TimelineController {
    story: Arc<Story>,
    settings: TimelineSettings,
    active_index: usize,
    phase: Phase,
    source: ProgressSource,
    elapsed: Duration,
    readiness: Option<Readiness>,
    is_paused: bool,
    auto_advance_fired: bool,
    scheduler: FrameScheduler,
    close_reason: Option<CloseReason>,
}

impl TimelineController {
    /// Opens `story` at `start_index`, clamped into range.
    ///
    /// An empty story opens straight into [`Phase::Closed`] with
    /// [`CloseReason::EmptyStory`].
    #[must_use]
    pub fn open(story: Arc<Story>, start_index: usize, settings: TimelineSettings) -> Self {
        let len = story.len();
        let mut controller = Self {
            story,
            settings,
            active_index: start_index.min(len.saturating_sub(1)),
            phase: Phase::Loading,
            source: ProgressSource::Timer(TimerSource::new(
                settings.default_duration.as_duration(),
            )),
            elapsed: Duration::ZERO,
            readiness: None,
            is_paused: false,
            auto_advance_fired: false,
            scheduler: FrameScheduler::new(),
            close_reason: None,
        };
        if len == 0 {
            controller.close(CloseReason::EmptyStory);
        }
        controller
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn story(&self) -> &Arc<Story> {
        &self.story
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.readiness.is_some()
    }

    #[must_use]
    pub fn readiness(&self) -> Option<Readiness> {
        self.readiness
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.settings.reduced_motion
    }

    /// Time spent on the current item as of the last update.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The duration progress is measured against, once known.
    #[must_use]
    pub fn effective_duration(&self) -> Option<Duration> {
        if self.is_ready() {
            self.source.duration()
        } else {
            None
        }
    }

    /// Progress of the current item in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if !self.is_ready() {
            return 0.0;
        }
        self.source.fraction_for(self.elapsed)
    }

    #[must_use]
    pub fn source(&self) -> &ProgressSource {
        &self.source
    }

    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Returns true if the host should keep delivering ticks.
    #[must_use]
    pub fn wants_frames(&self) -> bool {
        !self.is_closed() && self.scheduler.wants_frames()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Applies the readiness signal for the current item.
    ///
    /// Ignored while closed or if the item is already ready.
    pub fn mark_ready(&mut self, readiness: Readiness, now: Instant) {
        if self.is_closed() || self.is_ready() {
            return;
        }
        self.start_item(readiness, now);
    }

    /// Switches a ready video to the failure path (error during playback).
    pub fn mark_media_failed(&mut self, now: Instant) {
        if self.is_closed() {
            return;
        }
        self.scheduler.cancel_all();
        self.start_item(Readiness::MediaFailed, now);
    }

    fn start_item(&mut self, readiness: Readiness, now: Instant) {
        self.readiness = Some(readiness);
        self.elapsed = Duration::ZERO;
        self.auto_advance_fired = false;

        match readiness {
            Readiness::Timed { .. } => {
                let mut timer = TimerSource::new(self.timed_duration());
                if !self.is_paused {
                    timer.start(now);
                }
                self.source = ProgressSource::Timer(timer);
            }
            Readiness::Media { duration } => {
                self.source = ProgressSource::media(duration);
            }
            Readiness::MediaFailed => {
                self.source = ProgressSource::media(None);
                self.scheduler
                    .defer(now + self.settings.skip_delay.as_duration(), DeferredAction::SkipFailedItem);
            }
        }

        if self.is_paused {
            self.phase = Phase::Paused;
            self.scheduler.start_suspended();
        } else {
            self.phase = Phase::Playing;
            self.scheduler.start();
        }
    }

    /// Resolved duration for the current image or text item.
    fn timed_duration(&self) -> Duration {
        if self.settings.reduced_motion {
            return Duration::from_millis(REDUCED_MOTION_DURATION_MS);
        }
        self.story
            .item(self.active_index)
            .and_then(|item| item.configured_duration())
            .unwrap_or_else(|| self.settings.default_duration.as_duration())
    }

    /// Updates the reported video position.
    pub fn update_position(&mut self, position: Duration, duration: Option<Duration>) {
        if let ProgressSource::MediaPosition {
            position: current,
            duration: known,
        } = &mut self.source
        {
            *current = position;
            if duration.is_some() {
                *known = duration;
            }
            self.elapsed = position;
        }
    }

    /// Moves to the next or previous item.
    ///
    /// Cancels all scheduled work for the item being left first.
    pub fn advance(&mut self, direction: Direction, now: Instant) -> Transition {
        if self.is_closed() {
            return Transition::None;
        }

        self.scheduler.cancel_all();
        self.phase = Phase::Advancing;

        let from = self.active_index;
        match direction {
            Direction::Forward if from + 1 >= self.story.len() => {
                self.close(CloseReason::Completed);
                Transition::Closed(CloseReason::Completed)
            }
            Direction::Forward => {
                self.enter(from + 1);
                Transition::Entered { from, to: from + 1 }
            }
            Direction::Backward if from == 0 => {
                self.replay(now);
                Transition::Replayed { index: 0 }
            }
            Direction::Backward => {
                self.enter(from - 1);
                Transition::Entered { from, to: from - 1 }
            }
        }
    }

    fn enter(&mut self, index: usize) {
        self.active_index = index;
        self.phase = Phase::Loading;
        self.readiness = None;
        self.elapsed = Duration::ZERO;
        self.auto_advance_fired = false;
        self.source = ProgressSource::Timer(TimerSource::new(
            self.settings.default_duration.as_duration(),
        ));
    }

    fn replay(&mut self, now: Instant) {
        match self.readiness {
            Some(readiness) => self.start_item(readiness, now),
            None => {
                self.phase = Phase::Loading;
                self.elapsed = Duration::ZERO;
                self.auto_advance_fired = false;
            }
        }
    }

    /// Pauses or resumes. Repeating the current state is a no-op.
    ///
    /// Returns true if the paused flag changed.
    pub fn set_paused(&mut self, paused: bool, now: Instant) -> bool {
        if self.is_closed() || self.is_paused == paused {
            return false;
        }
        self.is_paused = paused;

        match (paused, self.phase) {
            (true, Phase::Playing) => {
                if let ProgressSource::Timer(timer) = &mut self.source {
                    timer.pause(now);
                    self.elapsed = timer.elapsed(now);
                }
                self.phase = Phase::Paused;
                self.scheduler.suspend();
            }
            (false, Phase::Paused) => {
                if let ProgressSource::Timer(timer) = &mut self.source {
                    timer.start(now);
                }
                self.phase = Phase::Playing;
                self.scheduler.resume();
            }
            // Loading: the flag is applied when the item becomes ready.
            _ => {}
        }
        true
    }

    /// Turns reduced motion on or off, recomputing the current duration.
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        if self.settings.reduced_motion == enabled {
            return;
        }
        self.settings.reduced_motion = enabled;
        if self.is_ready() {
            let duration = self.timed_duration();
            if let ProgressSource::Timer(timer) = &mut self.source {
                timer.set_duration(duration);
            }
        }
    }

    /// Frame callback. Updates elapsed time, runs due deferred work and
    /// triggers auto-advance at most once per item.
    pub fn tick(&mut self, now: Instant) -> Transition {
        if self.is_closed() {
            return Transition::None;
        }

        if let Some(DeferredAction::SkipFailedItem) = self.scheduler.take_due(now) {
            return self.advance(Direction::Forward, now);
        }

        if self.phase != Phase::Playing {
            return Transition::None;
        }

        let ProgressSource::Timer(timer) = &self.source else {
            // Videos advance when the media reports its end.
            return Transition::None;
        };

        self.elapsed = timer.elapsed(now);
        if !self.auto_advance_fired && progress::is_complete(self.elapsed, timer.duration()) {
            self.auto_advance_fired = true;
            return self.advance(Direction::Forward, now);
        }
        Transition::None
    }

    /// The current video reached its end.
    pub fn media_ended(&mut self, now: Instant) -> Transition {
        if self.is_closed() || !self.is_ready() || self.auto_advance_fired {
            return Transition::None;
        }
        self.auto_advance_fired = true;
        self.advance(Direction::Forward, now)
    }

    /// Ends the session. Returns false if it was already closed.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if self.is_closed() {
            return false;
        }
        self.scheduler.cancel_all();
        self.phase = Phase::Closed;
        self.close_reason = Some(reason);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoryItem;
    use crate::test_utils::assert_abs_diff_eq;

    fn story(items: Vec<StoryItem>) -> Arc<Story> {
        Arc::new(Story::new("u", "User", items))
    }

    fn three_texts() -> Arc<Story> {
        story(vec![
            StoryItem::text("a", "one").with_duration_ms(1_000),
            StoryItem::text("b", "two").with_duration_ms(1_000),
            StoryItem::text("c", "three").with_duration_ms(1_000),
        ])
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn open_clamps_start_index() {
        let timeline = TimelineController::open(three_texts(), 99, TimelineSettings::default());
        assert_eq!(timeline.active_index(), 2);
        assert_eq!(timeline.phase(), Phase::Loading);
        assert!(!timeline.wants_frames());
    }

    #[test]
    fn empty_story_opens_closed() {
        let timeline = TimelineController::open(story(Vec::new()), 0, TimelineSettings::default());
        assert!(timeline.is_closed());
        assert_eq!(timeline.close_reason(), Some(CloseReason::EmptyStory));
    }

    #[test]
    fn ready_starts_the_timer() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 0, TimelineSettings::default());
        timeline.mark_ready(Readiness::Timed { failed: false }, t0);

        assert_eq!(timeline.phase(), Phase::Playing);
        assert_eq!(timeline.effective_duration(), Some(ms(1_000)));
        assert_eq!(timeline.tick(t0 + ms(250)), Transition::None);
        assert_abs_diff_eq!(timeline.progress(), 0.25);
    }

    #[test]
    fn forward_at_last_item_closes() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 2, TimelineSettings::default());
        assert_eq!(
            timeline.advance(Direction::Forward, t0),
            Transition::Closed(CloseReason::Completed)
        );
        assert!(timeline.is_closed());
        assert_eq!(timeline.advance(Direction::Forward, t0), Transition::None);
    }

    #[test]
    fn backward_at_first_item_replays() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 0, TimelineSettings::default());
        timeline.mark_ready(Readiness::Timed { failed: false }, t0);
        timeline.tick(t0 + ms(600));

        let now = t0 + ms(700);
        assert_eq!(
            timeline.advance(Direction::Backward, now),
            Transition::Replayed { index: 0 }
        );
        assert_eq!(timeline.active_index(), 0);
        assert_eq!(timeline.elapsed(), Duration::ZERO);
        assert_eq!(timeline.phase(), Phase::Playing);

        timeline.tick(now + ms(100));
        assert_eq!(timeline.elapsed(), ms(100));
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 0, TimelineSettings::default());
        timeline.mark_ready(Readiness::Timed { failed: false }, t0);

        assert!(timeline.set_paused(true, t0 + ms(400)));
        assert!(!timeline.set_paused(true, t0 + ms(450)));
        assert_eq!(timeline.elapsed(), ms(400));
        assert_eq!(timeline.tick(t0 + ms(5_000)), Transition::None);
        assert_eq!(timeline.elapsed(), ms(400));

        assert!(timeline.set_paused(false, t0 + ms(5_000)));
        assert_eq!(timeline.elapsed(), ms(400));
        timeline.tick(t0 + ms(5_500));
        assert_eq!(timeline.elapsed(), ms(900));
    }

    #[test]
    fn pause_while_loading_applies_on_ready() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 0, TimelineSettings::default());
        timeline.set_paused(true, t0);
        timeline.mark_ready(Readiness::Timed { failed: false }, t0);

        assert_eq!(timeline.phase(), Phase::Paused);
        timeline.tick(t0 + ms(2_000));
        assert_eq!(timeline.active_index(), 0);
        assert_eq!(timeline.elapsed(), Duration::ZERO);
    }

    #[test]
    fn tick_advances_once_per_instant() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(
            story(vec![
                StoryItem::text("a", "one").with_duration_ms(0),
                StoryItem::text("b", "two").with_duration_ms(0),
                StoryItem::text("c", "three").with_duration_ms(0),
            ]),
            0,
            TimelineSettings::default(),
        );
        timeline.mark_ready(Readiness::Timed { failed: false }, t0);

        let now = t0 + ms(1);
        assert_eq!(timeline.tick(now), Transition::Entered { from: 0, to: 1 });
        timeline.mark_ready(Readiness::Timed { failed: false }, now);
        assert_eq!(timeline.tick(now), Transition::None);
        assert_eq!(timeline.tick(now), Transition::None);
        assert_eq!(timeline.active_index(), 1);
    }

    #[test]
    fn video_does_not_advance_on_tick() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(
            story(vec![StoryItem::video("v", "clip.mp4"), StoryItem::text("t", "x")]),
            0,
            TimelineSettings::default(),
        );
        timeline.mark_ready(
            Readiness::Media {
                duration: Some(ms(3_000)),
            },
            t0,
        );
        timeline.update_position(ms(3_000), None);
        assert_abs_diff_eq!(timeline.progress(), 1.0);
        assert_eq!(timeline.tick(t0 + ms(10_000)), Transition::None);

        assert_eq!(
            timeline.media_ended(t0 + ms(10_000)),
            Transition::Entered { from: 0, to: 1 }
        );
    }

    #[test]
    fn failed_video_skips_after_grace_delay_even_when_paused() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(
            story(vec![StoryItem::video("v", "clip.mp4"), StoryItem::text("t", "x")]),
            0,
            TimelineSettings::default(),
        );
        timeline.mark_ready(Readiness::MediaFailed, t0);
        assert!(timeline.is_ready());
        timeline.set_paused(true, t0 + ms(100));

        assert!(timeline.wants_frames());
        assert_eq!(timeline.tick(t0 + ms(499)), Transition::None);
        assert_eq!(
            timeline.tick(t0 + ms(500)),
            Transition::Entered { from: 0, to: 1 }
        );
    }

    #[test]
    fn manual_advance_cancels_pending_skip() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(
            story(vec![
                StoryItem::video("v", "clip.mp4"),
                StoryItem::text("t", "x"),
                StoryItem::text("u", "y"),
            ]),
            0,
            TimelineSettings::default(),
        );
        timeline.mark_ready(Readiness::MediaFailed, t0);
        timeline.advance(Direction::Forward, t0 + ms(100));

        timeline.tick(t0 + ms(600));
        assert_eq!(timeline.active_index(), 1);
    }

    #[test]
    fn reduced_motion_overrides_timed_items_live() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 0, TimelineSettings::default());
        timeline.mark_ready(Readiness::Timed { failed: false }, t0);

        timeline.set_reduced_motion(true);
        assert_eq!(
            timeline.effective_duration(),
            Some(Duration::from_millis(REDUCED_MOTION_DURATION_MS))
        );
        assert_eq!(timeline.tick(t0 + ms(60_000)), Transition::None);

        timeline.set_reduced_motion(false);
        assert_eq!(timeline.effective_duration(), Some(ms(1_000)));
        assert_eq!(
            timeline.tick(t0 + ms(60_001)),
            Transition::Entered { from: 0, to: 1 }
        );
    }

    #[test]
    fn reduced_motion_leaves_video_duration_alone() {
        let t0 = Instant::now();
        let settings = TimelineSettings {
            reduced_motion: true,
            ..TimelineSettings::default()
        };
        let mut timeline = TimelineController::open(
            story(vec![StoryItem::video("v", "clip.mp4")]),
            0,
            settings,
        );
        timeline.mark_ready(
            Readiness::Media {
                duration: Some(ms(8_000)),
            },
            t0,
        );
        assert_eq!(timeline.effective_duration(), Some(ms(8_000)));
    }

    #[test]
    fn close_is_terminal() {
        let t0 = Instant::now();
        let mut timeline = TimelineController::open(three_texts(), 0, TimelineSettings::default());
        assert!(timeline.close(CloseReason::Dismissed));
        assert!(!timeline.close(CloseReason::Completed));
        assert_eq!(timeline.close_reason(), Some(CloseReason::Dismissed));
        assert!(!timeline.set_paused(true, t0));
        assert_eq!(timeline.tick(t0), Transition::None);
        assert!(!timeline.wants_frames());
    }
}
