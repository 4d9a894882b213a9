// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use super::media_host::LoadedMedia;
use crate::catalog::StoryCatalog;
use crate::error::MediaError;
use crate::media::{MediaToken, PreloadedMedia};
use crate::playback::Key;
use iced::{window, Point, Size};
use std::path::PathBuf;
use std::time::Instant;

/// Top-level messages consumed by `App::update`.
#[derive(Debug, Clone)]
pub enum Message {
    /// Frame tick while playback or a segment animation is running.
    Tick(Instant),
    CursorMoved(Point),
    /// Left button or finger down at the last known cursor position.
    PointerPressed,
    PointerReleased,
    /// The pointer left the window or the touch was lost.
    PointerCancelled,
    TouchPressed(Point),
    TouchLifted(Point),
    KeyPressed(Key),
    WindowResized(Size),
    /// Result of a `Load` command.
    MediaLoaded {
        token: MediaToken,
        result: Result<LoadedMedia, MediaError>,
    },
    /// Result of a `Preload` command.
    Preloaded {
        path: PathBuf,
        result: Result<PreloadedMedia, MediaError>,
    },
    /// The header close button was clicked.
    CloseButtonPressed,
    /// Window close was requested (user clicked X or pressed Alt+F4).
    WindowCloseRequested(window::Id),
}

/// Runtime flags passed in from the command line.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub catalog: StoryCatalog,
    /// Story to open, by user id. Defaults to the first story with unviewed
    /// items, then the first story.
    pub story: Option<String>,
    pub start_index: usize,
    /// Forces reduced motion on, overriding the config file.
    pub reduced_motion: bool,
}
