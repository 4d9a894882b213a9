// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the application. Constants are organized by category.
//!
//! # Categories
//!
//! - **Playback**: Item durations, video error skip delay, reduced motion
//! - **Input**: Hold gesture threshold
//! - **Preload**: Next-item image cache
//! - **Display**: Frame tick pacing
//! - **Diagnostics**: Playback journal capacity

// ==========================================================================
// Playback Defaults
// ==========================================================================

/// Display time for image and text items without an explicit duration.
pub const DEFAULT_ITEM_DURATION_MS: u32 = 5_000;

/// Shortest configurable default item duration.
pub const MIN_ITEM_DURATION_MS: u32 = 1_000;

/// Longest configurable default item duration.
pub const MAX_ITEM_DURATION_MS: u32 = 60_000;

/// Delay before skipping a video that failed to load.
pub const DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS: u32 = 500;

/// Minimum video error skip delay (skip on the next frame).
pub const MIN_VIDEO_ERROR_SKIP_DELAY_MS: u32 = 0;

/// Maximum video error skip delay.
pub const MAX_VIDEO_ERROR_SKIP_DELAY_MS: u32 = 5_000;

/// Duration used for image and text items when reduced motion is requested.
///
/// Large enough that auto-advance never happens in practice.
pub const REDUCED_MOTION_DURATION_MS: u64 = 1_000_000_000;

// ==========================================================================
// Input Defaults
// ==========================================================================

/// Presses at least this long are holds, shorter ones are taps.
pub const DEFAULT_HOLD_THRESHOLD_MS: u32 = 200;

/// Minimum hold threshold.
pub const MIN_HOLD_THRESHOLD_MS: u32 = 50;

/// Maximum hold threshold.
pub const MAX_HOLD_THRESHOLD_MS: u32 = 2_000;

// ==========================================================================
// Preload Defaults
// ==========================================================================

/// Number of decoded images kept for upcoming items.
pub const DEFAULT_IMAGE_CACHE_ENTRIES: usize = 8;

/// Minimum preload cache entries.
pub const MIN_IMAGE_CACHE_ENTRIES: usize = 1;

/// Maximum preload cache entries.
pub const MAX_IMAGE_CACHE_ENTRIES: usize = 64;

// ==========================================================================
// Display Defaults
// ==========================================================================

/// Interval between frame ticks (~60 fps).
pub const DEFAULT_FRAME_INTERVAL_MS: u32 = 16;

/// Minimum frame interval.
pub const MIN_FRAME_INTERVAL_MS: u32 = 8;

/// Maximum frame interval.
pub const MAX_FRAME_INTERVAL_MS: u32 = 100;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Default number of playback journal entries kept in memory.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 256;

/// Minimum playback journal capacity.
pub const MIN_JOURNAL_CAPACITY: usize = 16;

/// Maximum playback journal capacity.
pub const MAX_JOURNAL_CAPACITY: usize = 4_096;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Item duration validation
    assert!(MIN_ITEM_DURATION_MS > 0);
    assert!(MAX_ITEM_DURATION_MS >= MIN_ITEM_DURATION_MS);
    assert!(DEFAULT_ITEM_DURATION_MS >= MIN_ITEM_DURATION_MS);
    assert!(DEFAULT_ITEM_DURATION_MS <= MAX_ITEM_DURATION_MS);
    assert!(REDUCED_MOTION_DURATION_MS > MAX_ITEM_DURATION_MS as u64);

    // Skip delay validation
    assert!(MAX_VIDEO_ERROR_SKIP_DELAY_MS >= MIN_VIDEO_ERROR_SKIP_DELAY_MS);
    assert!(DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS <= MAX_VIDEO_ERROR_SKIP_DELAY_MS);

    // Hold threshold validation
    assert!(MIN_HOLD_THRESHOLD_MS > 0);
    assert!(MAX_HOLD_THRESHOLD_MS >= MIN_HOLD_THRESHOLD_MS);
    assert!(DEFAULT_HOLD_THRESHOLD_MS >= MIN_HOLD_THRESHOLD_MS);
    assert!(DEFAULT_HOLD_THRESHOLD_MS <= MAX_HOLD_THRESHOLD_MS);

    // Preload cache validation
    assert!(MIN_IMAGE_CACHE_ENTRIES > 0);
    assert!(DEFAULT_IMAGE_CACHE_ENTRIES >= MIN_IMAGE_CACHE_ENTRIES);
    assert!(DEFAULT_IMAGE_CACHE_ENTRIES <= MAX_IMAGE_CACHE_ENTRIES);

    // Frame interval validation
    assert!(MIN_FRAME_INTERVAL_MS > 0);
    assert!(DEFAULT_FRAME_INTERVAL_MS >= MIN_FRAME_INTERVAL_MS);
    assert!(DEFAULT_FRAME_INTERVAL_MS <= MAX_FRAME_INTERVAL_MS);

    // Journal capacity validation
    assert!(MIN_JOURNAL_CAPACITY > 0);
    assert!(DEFAULT_JOURNAL_CAPACITY >= MIN_JOURNAL_CAPACITY);
    assert!(DEFAULT_JOURNAL_CAPACITY <= MAX_JOURNAL_CAPACITY);
};
