// SPDX-License-Identifier: MPL-2.0
//! Frame scheduler for the playback timeline.
//!
//! The host delivers frame ticks; the scheduler decides whether those ticks
//! are wanted and holds deferred actions that come due on a later tick.
//! Pausing suspends the frame loop but not deferred actions, which keep
//! their wall-clock deadline.

use std::time::Instant;

/// Frame loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No item is playing (loading, or closed).
    #[default]
    Idle,
    /// Ticks drive the current item.
    Running,
    /// Paused; ticks are not needed for progress.
    Suspended,
}

/// Work scheduled for a later tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Skip the current item after its media failed to load.
    SkipFailedItem,
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    due: Instant,
    action: DeferredAction,
}

/// Single scheduling point for frame ticks and deferred actions.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    state: SchedulerState,
    deferred: Vec<Deferred>,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Starts (or restarts) the frame loop.
    pub fn start(&mut self) {
        self.state = SchedulerState::Running;
    }

    /// Starts the loop in the suspended state.
    pub fn start_suspended(&mut self) {
        self.state = SchedulerState::Suspended;
    }

    /// Suspends a running loop. Idle stays idle.
    pub fn suspend(&mut self) {
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Suspended;
        }
    }

    /// Resumes a suspended loop. Idle stays idle.
    pub fn resume(&mut self) {
        if self.state == SchedulerState::Suspended {
            self.state = SchedulerState::Running;
        }
    }

    /// Schedules `action` to run on the first tick at or after `due`.
    pub fn defer(&mut self, due: Instant, action: DeferredAction) {
        self.deferred.push(Deferred { due, action });
    }

    /// Removes and returns the earliest action due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<DeferredAction> {
        let position = self
            .deferred
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| entry.due)
            .map(|(position, _)| position)?;
        Some(self.deferred.remove(position).action)
    }

    /// Returns true if any deferred action is pending.
    #[must_use]
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Cancels the frame loop and every deferred action.
    pub fn cancel_all(&mut self) {
        self.state = SchedulerState::Idle;
        self.deferred.clear();
    }

    /// Returns true if the host should keep delivering ticks.
    #[must_use]
    pub fn wants_frames(&self) -> bool {
        self.state == SchedulerState::Running || self.has_deferred()
    }
}
