// SPDX-License-Identifier: MPL-2.0
//! Media loading for story items.
//!
//! The [`MediaAdapter`] hides the differences between image, video and text
//! items from the timeline. It turns the current item into host commands
//! ([`MediaCommand`]) and turns host callbacks ([`MediaEvent`]) back into a
//! single readiness signal ([`Readiness`]).
//!
//! Every load is tagged with a fresh [`MediaToken`]. Events carrying any
//! other token belong to an item the viewer already left and are dropped.
//!
//! The submodules hold the host side: decoding images ([`image`]), probing
//! and clocking videos ([`video`]) and caching preloaded media
//! ([`prefetch`]).

pub mod image;
pub mod prefetch;
pub mod video;

use crate::domain::{ItemKind, StoryItem};
use crate::error::MediaError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub use image::{load_image, ImageData};
pub use prefetch::{PreloadCache, PreloadedMedia};
pub use video::{probe_video, VideoClock, VideoMetadata};

/// Resolves an item source to a local file path.
///
/// Plain paths and `file://` URIs are accepted. Remote and inline sources
/// are not fetched.
///
/// # Errors
///
/// Returns [`MediaError::UnsupportedSource`] for any other URI scheme.
pub fn local_path(source: &str) -> Result<PathBuf, MediaError> {
    if let Some(path) = source.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if source.contains("://") || source.starts_with("data:") {
        return Err(MediaError::UnsupportedSource(source.to_string()));
    }
    Ok(PathBuf::from(source))
}

/// Identifies one load of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaToken(u64);

impl MediaToken {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MediaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the host must fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaRequest {
    Image { source: String },
    Video { source: String },
}

impl MediaRequest {
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Image { source } | Self::Video { source } => source,
        }
    }
}

/// Instructions for the host's media layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    /// Start loading the current item.
    Load {
        token: MediaToken,
        index: usize,
        request: MediaRequest,
    },
    /// Start or continue video playback.
    Play { token: MediaToken },
    /// Pause video playback.
    Pause { token: MediaToken },
    /// Seek the video back to the start.
    Restart { token: MediaToken },
    /// Drop everything held for this load.
    Release { token: MediaToken },
    /// Best-effort fetch of an upcoming item. Has no token; nothing reports
    /// back to the engine.
    Preload { index: usize, request: MediaRequest },
}

/// Host callback for a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEvent {
    pub token: MediaToken,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    #[must_use]
    pub fn new(token: MediaToken, kind: MediaEventKind) -> Self {
        Self { token, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEventKind {
    /// Image decoded, or video metadata available.
    Loaded { duration: Option<Duration> },
    /// The media could not be loaded or played.
    Failed(MediaError),
    /// The video reached its natural end.
    Ended,
    /// Current video playback position.
    Position {
        position: Duration,
        duration: Option<Duration>,
    },
}

/// The signal the timeline waits for before an item starts playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Image or text, played on a timer. `failed` marks an image that could
    /// not be decoded; it still plays for its duration.
    Timed { failed: bool },
    /// Video with metadata loaded.
    Media { duration: Option<Duration> },
    /// Video that could not be loaded; skipped after a grace delay.
    MediaFailed,
}

impl Readiness {
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Timed { failed: true } | Self::MediaFailed)
    }
}

/// Result of feeding a [`MediaEvent`] to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSignal {
    Ready(Readiness),
    Position {
        position: Duration,
        duration: Option<Duration>,
    },
    Ended,
    /// The event belongs to a superseded load.
    Stale,
    /// Valid token, but nothing to do.
    Ignored,
}

/// Commands for a new load, and the readiness if it is immediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub commands: Vec<MediaCommand>,
    pub ready: Option<Readiness>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveMedia {
    token: MediaToken,
    kind: ItemKind,
    ready: bool,
    failed: bool,
}

/// Per-item media state machine.
#[derive(Debug, Clone)]
pub struct MediaAdapter {
    next_token: u64,
    current: Option<ActiveMedia>,
    preload_enabled: bool,
}

impl MediaAdapter {
    #[must_use]
    pub fn new(preload_enabled: bool) -> Self {
        Self {
            next_token: 1,
            current: None,
            preload_enabled,
        }
    }

    fn issue_token(&mut self) -> MediaToken {
        let token = MediaToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Returns the token of the current load.
    #[must_use]
    pub fn current_token(&self) -> Option<MediaToken> {
        self.current.map(|media| media.token)
    }

    /// Starts loading `item`, releasing whatever was loaded before.
    pub fn load(&mut self, index: usize, item: &StoryItem) -> LoadPlan {
        let mut commands = Vec::with_capacity(2);
        if let Some(release) = self.release() {
            commands.push(release);
        }

        let token = self.issue_token();
        let mut media = ActiveMedia {
            token,
            kind: item.kind,
            ready: false,
            failed: false,
        };

        let ready = match (item.kind, item.source()) {
            (ItemKind::Text, _) => Some(Readiness::Timed { failed: false }),
            (ItemKind::Image, Some(source)) => {
                commands.push(MediaCommand::Load {
                    token,
                    index,
                    request: MediaRequest::Image {
                        source: source.to_string(),
                    },
                });
                None
            }
            (ItemKind::Video, Some(source)) => {
                commands.push(MediaCommand::Load {
                    token,
                    index,
                    request: MediaRequest::Video {
                        source: source.to_string(),
                    },
                });
                None
            }
            (ItemKind::Image, None) => {
                log::warn!("item '{}' has no image source", item.id);
                Some(Readiness::Timed { failed: true })
            }
            (ItemKind::Video, None) => {
                log::warn!("item '{}' has no video source", item.id);
                Some(Readiness::MediaFailed)
            }
        };

        if let Some(readiness) = ready {
            media.ready = true;
            media.failed = readiness.is_failure();
        }
        self.current = Some(media);

        LoadPlan { commands, ready }
    }

    /// Interprets a host callback for the current load.
    pub fn handle(&mut self, event: &MediaEvent) -> MediaSignal {
        let Some(media) = self.current.as_mut() else {
            return MediaSignal::Stale;
        };
        if media.token != event.token {
            return MediaSignal::Stale;
        }

        match (&event.kind, media.kind) {
            (MediaEventKind::Loaded { .. }, ItemKind::Image) if !media.ready => {
                media.ready = true;
                MediaSignal::Ready(Readiness::Timed { failed: false })
            }
            (MediaEventKind::Loaded { duration }, ItemKind::Video) if !media.ready => {
                media.ready = true;
                MediaSignal::Ready(Readiness::Media {
                    duration: *duration,
                })
            }
            (MediaEventKind::Failed(err), ItemKind::Image) if !media.ready => {
                log::warn!("image {} failed to load: {err}", event.token);
                media.ready = true;
                media.failed = true;
                MediaSignal::Ready(Readiness::Timed { failed: true })
            }
            (MediaEventKind::Failed(err), ItemKind::Video) if !media.failed => {
                log::warn!("video {} failed: {err}", event.token);
                media.ready = true;
                media.failed = true;
                MediaSignal::Ready(Readiness::MediaFailed)
            }
            (MediaEventKind::Ended, ItemKind::Video) if media.ready && !media.failed => {
                MediaSignal::Ended
            }
            (MediaEventKind::Position { position, duration }, ItemKind::Video)
                if media.ready && !media.failed =>
            {
                MediaSignal::Position {
                    position: *position,
                    duration: *duration,
                }
            }
            _ => MediaSignal::Ignored,
        }
    }

    /// Returns true if the current item is a video that loaded successfully.
    #[must_use]
    pub fn has_playable_video(&self) -> bool {
        self.current
            .is_some_and(|media| media.kind == ItemKind::Video && media.ready && !media.failed)
    }

    /// `Play` for a playable video.
    #[must_use]
    pub fn play_command(&self) -> Option<MediaCommand> {
        self.playable_token()
            .map(|token| MediaCommand::Play { token })
    }

    /// `Pause` for a playable video.
    #[must_use]
    pub fn pause_command(&self) -> Option<MediaCommand> {
        self.playable_token()
            .map(|token| MediaCommand::Pause { token })
    }

    /// `Restart` for a playable video.
    #[must_use]
    pub fn restart_command(&self) -> Option<MediaCommand> {
        self.playable_token()
            .map(|token| MediaCommand::Restart { token })
    }

    fn playable_token(&self) -> Option<MediaToken> {
        self.current
            .filter(|_| self.has_playable_video())
            .map(|media| media.token)
    }

    /// Best-effort preload of the item after `index`.
    ///
    /// Only issued once the current item loaded successfully.
    #[must_use]
    pub fn preload_command(&self, index: usize, next: Option<&StoryItem>) -> Option<MediaCommand> {
        if !self.preload_enabled {
            return None;
        }
        let current = self.current?;
        if !current.ready || current.failed {
            return None;
        }
        let next = next?;
        let source = next.source()?.to_string();
        let request = match next.kind {
            ItemKind::Image => MediaRequest::Image { source },
            ItemKind::Video => MediaRequest::Video { source },
            ItemKind::Text => return None,
        };
        Some(MediaCommand::Preload {
            index: index + 1,
            request,
        })
    }

    /// Forgets the current load and returns the `Release` for it.
    pub fn release(&mut self) -> Option<MediaCommand> {
        self.current
            .take()
            .map(|media| MediaCommand::Release { token: media.token })
    }
}

impl Default for MediaAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}
