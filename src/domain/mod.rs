// SPDX-License-Identifier: MPL-2.0
//! Domain layer - story content and playback value objects.
//!
//! # Modules
//!
//! - [`story`]: Story content ([`Story`], [`StoryItem`], [`ItemKind`])
//! - [`newtypes`]: Validated timing values ([`ItemDuration`], [`SkipDelay`],
//!   [`HoldThreshold`], [`FrameInterval`], [`JournalCapacity`])

pub mod newtypes;
pub mod story;

pub use newtypes::{FrameInterval, HoldThreshold, ItemDuration, JournalCapacity, SkipDelay};
pub use story::{ItemKind, ItemMeta, Story, StoryError, StoryItem};
