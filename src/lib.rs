// SPDX-License-Identifier: MPL-2.0
//! `story_lens` plays ephemeral "stories": ordered sequences of images,
//! videos and text cards, each shown for a bounded time.
//!
//! The [`playback`] module holds the host-independent engine (timeline,
//! media readiness, gesture routing, progress). [`app`] is a desktop host for
//! it built on iced.

#![doc(html_root_url = "https://docs.rs/story_lens/0.1.0")]

pub mod app;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod media;
pub mod playback;

#[cfg(test)]
pub(crate) mod test_utils;
