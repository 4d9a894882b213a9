// SPDX-License-Identifier: MPL-2.0
//! Playback timing newtypes.
//!
//! This module provides type-safe wrappers for the configurable timing
//! values of the playback engine, ensuring they are always within valid
//! ranges.

use crate::config::{
    DEFAULT_FRAME_INTERVAL_MS, DEFAULT_HOLD_THRESHOLD_MS, DEFAULT_ITEM_DURATION_MS,
    DEFAULT_JOURNAL_CAPACITY, DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS, MAX_FRAME_INTERVAL_MS,
    MAX_HOLD_THRESHOLD_MS, MAX_ITEM_DURATION_MS, MAX_JOURNAL_CAPACITY,
    MAX_VIDEO_ERROR_SKIP_DELAY_MS, MIN_FRAME_INTERVAL_MS, MIN_HOLD_THRESHOLD_MS,
    MIN_ITEM_DURATION_MS, MIN_JOURNAL_CAPACITY, MIN_VIDEO_ERROR_SKIP_DELAY_MS,
};
use std::time::Duration;

// =============================================================================
// ItemDuration
// =============================================================================

/// Default display time for image and text items, in milliseconds.
///
/// This newtype enforces validity at the type level, ensuring the value
/// is always within the valid range (1–60 seconds).
///
/// # Example
///
/// ```
/// use story_lens::domain::ItemDuration;
///
/// let duration = ItemDuration::new(4_000);
/// assert_eq!(duration.value(), 4_000);
///
/// // Values outside range are clamped
/// let too_short = ItemDuration::new(10);
/// assert_eq!(too_short.value(), 1_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDuration(u32);

impl ItemDuration {
    /// Creates a new item duration, clamping to valid range.
    #[must_use]
    pub fn new(millis: u32) -> Self {
        Self(millis.clamp(MIN_ITEM_DURATION_MS, MAX_ITEM_DURATION_MS))
    }

    /// Returns the value in milliseconds.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the duration as a `Duration`.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }
}

impl Default for ItemDuration {
    fn default() -> Self {
        Self(DEFAULT_ITEM_DURATION_MS)
    }
}

// =============================================================================
// SkipDelay
// =============================================================================

/// Grace delay before a video that failed to load is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipDelay(u32);

impl SkipDelay {
    /// Creates a new skip delay, clamping to valid range.
    #[must_use]
    pub fn new(millis: u32) -> Self {
        Self(millis.clamp(MIN_VIDEO_ERROR_SKIP_DELAY_MS, MAX_VIDEO_ERROR_SKIP_DELAY_MS))
    }

    /// Returns the value in milliseconds.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the delay as a `Duration`.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }

    /// Returns true if failed videos are skipped on the next frame.
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.0 == 0
    }
}

impl Default for SkipDelay {
    fn default() -> Self {
        Self(DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS)
    }
}

// =============================================================================
// HoldThreshold
// =============================================================================

/// Minimum press length for a pointer gesture to count as a hold.
///
/// Shorter presses are classified as taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldThreshold(u32);

impl HoldThreshold {
    /// Creates a new hold threshold, clamping to valid range.
    #[must_use]
    pub fn new(millis: u32) -> Self {
        Self(millis.clamp(MIN_HOLD_THRESHOLD_MS, MAX_HOLD_THRESHOLD_MS))
    }

    /// Returns the value in milliseconds.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the threshold as a `Duration`.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }
}

impl Default for HoldThreshold {
    fn default() -> Self {
        Self(DEFAULT_HOLD_THRESHOLD_MS)
    }
}

// =============================================================================
// FrameInterval
// =============================================================================

/// Interval between frame ticks delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval(u32);

impl FrameInterval {
    #[must_use]
    pub fn new(millis: u32) -> Self {
        Self(millis.clamp(MIN_FRAME_INTERVAL_MS, MAX_FRAME_INTERVAL_MS))
    }

    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0))
    }
}

impl Default for FrameInterval {
    fn default() -> Self {
        Self(DEFAULT_FRAME_INTERVAL_MS)
    }
}

// =============================================================================
// JournalCapacity
// =============================================================================

/// Number of playback events kept by the in-memory journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalCapacity(usize);

impl JournalCapacity {
    /// Creates a new capacity, clamping to valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(MIN_JOURNAL_CAPACITY, MAX_JOURNAL_CAPACITY))
    }

    /// Returns the value as usize.
    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }

    /// Returns true if this is the minimum value.
    #[must_use]
    pub fn is_min(self) -> bool {
        self.0 <= MIN_JOURNAL_CAPACITY
    }

    /// Returns true if this is the maximum value.
    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= MAX_JOURNAL_CAPACITY
    }
}

impl Default for JournalCapacity {
    fn default() -> Self {
        Self(DEFAULT_JOURNAL_CAPACITY)
    }
}
