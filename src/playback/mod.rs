// SPDX-License-Identifier: MPL-2.0
//! Story playback engine.
//!
//! [`PlaybackEngine`] drives one viewing session of a [`Story`]: it owns the
//! [`TimelineController`], the [`MediaAdapter`] and the [`InputRouter`],
//! and exposes everything the host needs to draw a frame.
//!
//! The engine is single-threaded and frame-driven. The host calls
//! [`PlaybackEngine::tick`] on every frame while
//! [`PlaybackEngine::wants_frames`] is true, forwards input and media
//! callbacks, and executes the [`Output`]s it drains from the outbox.
//! Engine operations never fail; every failure resolves to a playable item
//! or a closed session.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use story_lens::domain::{Story, StoryItem};
//! use story_lens::playback::{ManualClock, PlaybackEngine, PlaybackSettings};
//!
//! let story = Arc::new(Story::new(
//!     "1",
//!     "Ana",
//!     vec![
//!         StoryItem::text("a", "Hello").with_duration_ms(2_000),
//!         StoryItem::text("b", "World").with_duration_ms(2_000),
//!     ],
//! ));
//! let clock = ManualClock::new();
//! let mut engine =
//!     PlaybackEngine::open_with_clock(story, 0, PlaybackSettings::default(), clock.clone());
//!
//! clock.advance_ms(2_000);
//! engine.tick();
//! assert_eq!(engine.active_index(), 1);
//! ```

pub mod clock;
pub mod input;
pub mod journal;
pub mod progress;
pub mod render;
pub mod scheduler;
pub mod timeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use input::{InputRouter, Intent, Key, RawInput, Routed};
pub use journal::{Journal, JournalEntry, PlaybackEvent};
pub use progress::{ProgressSource, TimerSource};
pub use render::{segment_fills, SegmentFill, SegmentTransition};
pub use scheduler::{FrameScheduler, SchedulerState};
pub use timeline::{Direction, Phase, TimelineController, TimelineSettings, Transition};

use crate::config::Config;
use crate::domain::{
    FrameInterval, HoldThreshold, ItemDuration, JournalCapacity, SkipDelay, Story, StoryItem,
};
use crate::media::{MediaAdapter, MediaCommand, MediaEvent, MediaSignal, Readiness};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// Advanced past the last item.
    Completed,
    /// Closed by the user or the host.
    Dismissed,
    /// The story had no items.
    EmptyStory,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Completed => "completed",
            Self::Dismissed => "dismissed",
            Self::EmptyStory => "empty story",
        };
        f.write_str(label)
    }
}

/// Something the host must act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Media(MediaCommand),
    /// Emitted exactly once per session.
    Close(CloseReason),
}

type CloseHandler = Box<dyn FnOnce(CloseReason) + Send>;

/// Engine settings, usually derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub default_item_duration: ItemDuration,
    pub video_error_skip_delay: SkipDelay,
    pub reduced_motion: bool,
    pub hold_threshold: HoldThreshold,
    pub preload_enabled: bool,
    pub frame_interval: FrameInterval,
    pub journal_capacity: JournalCapacity,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_item_duration: ItemDuration::default(),
            video_error_skip_delay: SkipDelay::default(),
            reduced_motion: false,
            hold_threshold: HoldThreshold::default(),
            preload_enabled: true,
            frame_interval: FrameInterval::default(),
            journal_capacity: JournalCapacity::default(),
        }
    }
}

impl PlaybackSettings {
    /// Converts user configuration into validated engine settings.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            default_item_duration: config
                .playback
                .default_item_duration_ms
                .map_or(defaults.default_item_duration, ItemDuration::new),
            video_error_skip_delay: config
                .playback
                .video_error_skip_delay_ms
                .map_or(defaults.video_error_skip_delay, SkipDelay::new),
            reduced_motion: config.playback.reduced_motion.unwrap_or(false),
            hold_threshold: config
                .input
                .hold_threshold_ms
                .map_or(defaults.hold_threshold, HoldThreshold::new),
            preload_enabled: config.preload.enabled.unwrap_or(true),
            frame_interval: config
                .display
                .frame_interval_ms
                .map_or(defaults.frame_interval, FrameInterval::new),
            journal_capacity: config
                .diagnostics
                .journal_capacity
                .map_or(defaults.journal_capacity, JournalCapacity::new),
        }
    }

    fn timeline(&self) -> TimelineSettings {
        TimelineSettings {
            default_duration: self.default_item_duration,
            skip_delay: self.video_error_skip_delay,
            reduced_motion: self.reduced_motion,
        }
    }
}

/// One viewing session of a story.
pub struct PlaybackEngine<C: Clock = SystemClock> {
    clock: C,
    timeline: TimelineController,
    media: MediaAdapter,
    input: InputRouter,
    journal: Journal,
    outbox: VecDeque<Output>,
    on_close: Option<CloseHandler>,
    viewed: Vec<bool>,
}

impl PlaybackEngine<SystemClock> {
    /// Opens `story` at `start_index` using the system clock.
    #[must_use]
    pub fn open(story: Arc<Story>, start_index: usize, settings: PlaybackSettings) -> Self {
        Self::open_with_clock(story, start_index, settings, SystemClock)
    }
}

impl<C: Clock> PlaybackEngine<C> {
    /// Opens `story` at `start_index` (clamped) with an explicit clock.
    ///
    /// The first item starts loading immediately. An empty story opens
    /// closed, with [`Output::Close`] already in the outbox.
    pub fn open_with_clock(
        story: Arc<Story>,
        start_index: usize,
        settings: PlaybackSettings,
        clock: C,
    ) -> Self {
        let now = clock.now();
        let viewed = story.items.iter().map(|item| item.viewed).collect();
        let timeline = TimelineController::open(story, start_index, settings.timeline());

        let mut engine = Self {
            clock,
            timeline,
            media: MediaAdapter::new(settings.preload_enabled),
            input: InputRouter::new(settings.hold_threshold),
            journal: Journal::new(settings.journal_capacity, now),
            outbox: VecDeque::new(),
            on_close: None,
            viewed,
        };

        if let Some(reason) = engine.timeline.close_reason() {
            log::info!("story '{}' has no items, closing", engine.story().user_id);
            engine.finish_close(reason, now);
            return engine;
        }

        let index = engine.timeline.active_index();
        log::info!(
            "opened story '{}' at item {} of {}",
            engine.story().user_id,
            index + 1,
            engine.story().len()
        );
        engine.journal.record(
            now,
            PlaybackEvent::Opened {
                index,
                items: engine.story().len(),
            },
        );
        engine.load_current(now);
        engine
    }

    /// Registers the close handler.
    ///
    /// If the session already ended (empty story), the handler runs
    /// immediately. It is invoked at most once.
    pub fn set_close_handler(&mut self, handler: impl FnOnce(CloseReason) + Send + 'static) {
        match self.timeline.close_reason() {
            Some(reason) => handler(reason),
            None => self.on_close = Some(Box::new(handler)),
        }
    }

    /// Builder form of [`set_close_handler`](Self::set_close_handler).
    #[must_use]
    pub fn with_close_handler(mut self, handler: impl FnOnce(CloseReason) + Send + 'static) -> Self {
        self.set_close_handler(handler);
        self
    }

    // =========================================================================
    // State
    // =========================================================================

    #[must_use]
    pub fn story(&self) -> &Arc<Story> {
        self.timeline.story()
    }

    #[must_use]
    pub fn active_index(&self) -> usize {
        self.timeline.active_index()
    }

    #[must_use]
    pub fn active_item(&self) -> Option<&StoryItem> {
        if self.is_closed() {
            return None;
        }
        self.story().item(self.active_index())
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.timeline.phase()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.timeline.is_paused()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.timeline.is_ready()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.timeline.is_closed()
    }

    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.timeline.close_reason()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.timeline.elapsed()
    }

    #[must_use]
    pub fn effective_duration(&self) -> Option<Duration> {
        self.timeline.effective_duration()
    }

    /// Progress of the active item in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.timeline.progress()
    }

    /// Returns true while a pointer press is being classified.
    #[must_use]
    pub fn is_pointer_pressed(&self) -> bool {
        self.input.is_pressed()
    }

    /// One fill per item for the progress bar.
    #[must_use]
    pub fn segment_fills(&self) -> Vec<SegmentFill> {
        render::segment_fills(self.story().len(), self.active_index(), self.progress())
    }

    #[must_use]
    pub fn wants_frames(&self) -> bool {
        self.timeline.wants_frames()
    }

    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.timeline.reduced_motion()
    }

    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Whether the item at `index` was viewed (before or during this session).
    #[must_use]
    pub fn viewed(&self, index: usize) -> bool {
        self.viewed.get(index).copied().unwrap_or(false)
    }

    /// Returns true if some item has not been viewed yet.
    #[must_use]
    pub fn has_unviewed(&self) -> bool {
        self.viewed.iter().any(|viewed| !viewed)
    }

    /// Removes and returns all pending outputs, oldest first.
    pub fn drain_outputs(&mut self) -> Vec<Output> {
        self.outbox.drain(..).collect()
    }

    /// Removes and returns the oldest pending output.
    pub fn poll_output(&mut self) -> Option<Output> {
        self.outbox.pop_front()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Moves to the next or previous item.
    pub fn advance(&mut self, direction: Direction) {
        let now = self.clock.now();
        let transition = self.timeline.advance(direction, now);
        self.apply(transition, direction, now);
    }

    /// Pauses or resumes playback. Repeated calls are no-ops.
    pub fn set_paused(&mut self, paused: bool) {
        let now = self.clock.now();
        if !self.timeline.set_paused(paused, now) {
            return;
        }
        let index = self.active_index();
        if paused {
            log::debug!("paused at item {index}");
            self.journal.record(now, PlaybackEvent::Paused { index });
            if let Some(command) = self.media.pause_command() {
                self.emit(Output::Media(command));
            }
        } else {
            log::debug!("resumed at item {index}");
            self.journal.record(now, PlaybackEvent::Resumed { index });
            if let Some(command) = self.media.play_command() {
                self.emit(Output::Media(command));
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.is_paused());
    }

    /// Closes the session at the user's request.
    pub fn close(&mut self) {
        let now = self.clock.now();
        if self.timeline.close(CloseReason::Dismissed) {
            self.finish_close(CloseReason::Dismissed, now);
        }
    }

    /// Changes the reduced motion preference for the rest of the session.
    pub fn set_reduced_motion(&mut self, enabled: bool) {
        if self.is_closed() || self.timeline.reduced_motion() == enabled {
            return;
        }
        self.timeline.set_reduced_motion(enabled);
        self.journal.record(
            self.clock.now(),
            PlaybackEvent::ReducedMotionChanged { enabled },
        );
    }

    /// Frame callback using the engine's clock.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.tick_at(now);
    }

    /// Frame callback at an explicit instant.
    pub fn tick_at(&mut self, now: Instant) {
        let index = self.active_index();
        let skipping_failed = self.timeline.readiness() == Some(Readiness::MediaFailed);
        let transition = self.timeline.tick(now);
        if transition != Transition::None {
            let event = if skipping_failed {
                PlaybackEvent::FailedItemSkipped { index }
            } else {
                PlaybackEvent::AutoAdvanced { index }
            };
            log::debug!("{event:?}");
            self.journal.record(now, event);
        }
        self.apply(transition, Direction::Forward, now);
    }

    /// Feeds a host media callback into the session.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        let now = self.clock.now();
        self.handle_media_event_at(event, now);
    }

    /// Feeds a host media callback observed at an explicit instant.
    pub fn handle_media_event_at(&mut self, event: MediaEvent, now: Instant) {
        if self.is_closed() {
            return;
        }
        match self.media.handle(&event) {
            MediaSignal::Ready(readiness) => self.on_ready(readiness, now),
            MediaSignal::Position { position, duration } => {
                self.timeline.update_position(position, duration);
            }
            MediaSignal::Ended => {
                let index = self.active_index();
                self.journal.record(now, PlaybackEvent::MediaEnded { index });
                let transition = self.timeline.media_ended(now);
                self.apply(transition, Direction::Forward, now);
            }
            MediaSignal::Stale => {
                log::warn!("dropping media event for superseded load {}", event.token);
                self.journal
                    .record(now, PlaybackEvent::StaleMediaEvent { token: event.token });
            }
            MediaSignal::Ignored => {}
        }
    }

    /// Routes a pointer or key event.
    ///
    /// Returns true if the host should suppress the platform's default
    /// handling of the input.
    pub fn handle_input(&mut self, input: RawInput) -> bool {
        if self.is_closed() {
            return false;
        }
        let routed = self.input.route(input, self.clock.now());
        for intent in routed.intents {
            self.apply_intent(intent);
        }
        routed.suppress_default
    }

    /// Applies a single intent.
    pub fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Pause => self.set_paused(true),
            Intent::Resume => self.set_paused(false),
            Intent::TogglePause => self.toggle_pause(),
            Intent::Advance(direction) => self.advance(direction),
            Intent::Close => self.close(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn emit(&mut self, output: Output) {
        self.outbox.push_back(output);
    }

    fn apply(&mut self, transition: Transition, direction: Direction, now: Instant) {
        match transition {
            Transition::None => {}
            Transition::Entered { from, to } => {
                log::debug!("item {from} -> {to}");
                self.journal
                    .record(now, PlaybackEvent::Entered { index: to, direction });
                self.load_current(now);
            }
            Transition::Replayed { index } => {
                log::debug!("replaying item {index}");
                self.journal.record(now, PlaybackEvent::Replayed { index });
                if let Some(command) = self.media.restart_command() {
                    self.emit(Output::Media(command));
                }
            }
            Transition::Closed(reason) => self.finish_close(reason, now),
        }
    }

    fn load_current(&mut self, now: Instant) {
        let index = self.active_index();
        let story = Arc::clone(self.story());
        let Some(item) = story.item(index) else {
            return;
        };
        let plan = self.media.load(index, item);
        for command in plan.commands {
            self.emit(Output::Media(command));
        }
        if let Some(readiness) = plan.ready {
            self.on_ready(readiness, now);
        }
    }

    fn on_ready(&mut self, readiness: Readiness, now: Instant) {
        let index = self.active_index();
        if self.timeline.is_ready() {
            // Only a video failing mid-playback reaches here.
            self.timeline.mark_media_failed(now);
        } else {
            self.timeline.mark_ready(readiness, now);
        }

        let failed = readiness.is_failure();
        log::debug!("item {index} ready (failed: {failed})");
        self.journal.record(now, PlaybackEvent::Ready { index, failed });
        if let Some(viewed) = self.viewed.get_mut(index) {
            *viewed = true;
        }

        if !self.is_paused() {
            if let Some(command) = self.media.play_command() {
                self.emit(Output::Media(command));
            }
        }
        if !failed {
            let story = Arc::clone(self.story());
            if let Some(command) = self.media.preload_command(index, story.item(index + 1)) {
                self.emit(Output::Media(command));
            }
        }
    }

    fn finish_close(&mut self, reason: CloseReason, now: Instant) {
        self.input.reset();
        if let Some(command) = self.media.release() {
            self.emit(Output::Media(command));
        }
        log::info!("closed story '{}' ({reason})", self.story().user_id);
        self.journal.record(now, PlaybackEvent::Closed { reason });
        self.emit(Output::Close(reason));
        if let Some(handler) = self.on_close.take() {
            handler(reason);
        }
    }
}

impl<C: Clock> fmt::Debug for PlaybackEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("timeline", &self.timeline)
            .field("media", &self.media)
            .field("outbox", &self.outbox)
            .field("has_close_handler", &self.on_close.is_some())
            .finish_non_exhaustive()
    }
}
