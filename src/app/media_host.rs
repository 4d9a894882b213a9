// SPDX-License-Identifier: MPL-2.0
//! Executes engine media commands.
//!
//! Images are decoded and videos probed on the blocking pool, then reported
//! back as [`Message::MediaLoaded`]. A playing video is driven by a
//! [`VideoClock`]; its position and end are polled on every frame tick and
//! fed to the engine as media events.

use super::Message;
use crate::domain::ItemDuration;
use crate::error::MediaError;
use crate::media::prefetch::video_duration_or_default;
use crate::media::{
    self, load_image, probe_video, ImageData, MediaCommand, MediaEvent, MediaEventKind,
    MediaRequest, MediaToken, PreloadCache, PreloadedMedia, VideoClock, VideoMetadata,
};
use iced::Task;
use std::path::PathBuf;
use std::time::Instant;

/// Payload of a completed load.
#[derive(Debug, Clone)]
pub enum LoadedMedia {
    Image(ImageData),
    Video(VideoMetadata),
}

impl From<LoadedMedia> for PreloadedMedia {
    fn from(media: LoadedMedia) -> Self {
        match media {
            LoadedMedia::Image(image) => PreloadedMedia::Image(image),
            LoadedMedia::Video(metadata) => PreloadedMedia::Video(metadata),
        }
    }
}

/// What the host currently shows for the active item.
#[derive(Debug, Clone, Default)]
pub enum Presentation {
    #[default]
    Empty,
    Loading,
    Image(ImageData),
    /// A video, shown as its first frame when one could be decoded.
    Video(Option<ImageData>),
    Failed(MediaError),
}

#[derive(Debug)]
struct ActiveVideo {
    clock: VideoClock,
}

#[derive(Debug)]
struct ActiveLoad {
    token: MediaToken,
    path: Option<PathBuf>,
    presentation: Presentation,
    video: Option<ActiveVideo>,
}

/// Host side of the media pipeline.
pub struct MediaHost {
    cache: PreloadCache,
    default_duration: ItemDuration,
    active: Option<ActiveLoad>,
}

impl std::fmt::Debug for MediaHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHost")
            .field("cached", &self.cache.len())
            .field("active", &self.active.as_ref().map(|load| load.token))
            .finish()
    }
}

impl MediaHost {
    #[must_use]
    pub fn new(cache: PreloadCache, default_duration: ItemDuration) -> Self {
        Self {
            cache,
            default_duration,
            active: None,
        }
    }

    #[must_use]
    pub fn presentation(&self) -> &Presentation {
        self.active
            .as_ref()
            .map_or(&Presentation::Empty, |load| &load.presentation)
    }

    /// Returns true while a video clock is running.
    #[must_use]
    pub fn is_playing_video(&self) -> bool {
        self.active_video()
            .is_some_and(|video| video.clock.is_playing())
    }

    #[must_use]
    pub fn cache(&self) -> &PreloadCache {
        &self.cache
    }

    /// Carries out one engine command.
    pub fn execute(&mut self, command: MediaCommand, now: Instant) -> Task<Message> {
        match command {
            MediaCommand::Load { token, request, .. } => self.load(token, request),
            MediaCommand::Play { token } => {
                if let Some(video) = self.video_for(token) {
                    video.clock.play(now);
                }
                Task::none()
            }
            MediaCommand::Pause { token } => {
                if let Some(video) = self.video_for(token) {
                    video.clock.pause(now);
                }
                Task::none()
            }
            MediaCommand::Restart { token } => {
                if let Some(video) = self.video_for(token) {
                    video.clock.restart(now);
                }
                Task::none()
            }
            MediaCommand::Release { token } => {
                if self.active.as_ref().is_some_and(|load| load.token == token) {
                    log::trace!("released media {token}");
                    self.active = None;
                }
                Task::none()
            }
            MediaCommand::Preload { index, request } => self.preload(index, request),
        }
    }

    fn load(&mut self, token: MediaToken, request: MediaRequest) -> Task<Message> {
        let path = match media::local_path(request.source()) {
            Ok(path) => path,
            Err(err) => {
                self.active = Some(ActiveLoad {
                    token,
                    path: None,
                    presentation: Presentation::Failed(err.clone()),
                    video: None,
                });
                return Task::done(Message::MediaLoaded {
                    token,
                    result: Err(err),
                });
            }
        };

        self.active = Some(ActiveLoad {
            token,
            path: Some(path.clone()),
            presentation: Presentation::Loading,
            video: None,
        });

        let cached = match &request {
            MediaRequest::Image { .. } => self.cache.image(&path).map(LoadedMedia::Image),
            MediaRequest::Video { .. } => self.cache.video(&path).map(LoadedMedia::Video),
        };
        if let Some(media) = cached {
            log::debug!("serving {} from preload cache", path.display());
            return Task::done(Message::MediaLoaded {
                token,
                result: Ok(media),
            });
        }

        Task::perform(fetch(request, path), move |result| Message::MediaLoaded {
            token,
            result,
        })
    }

    fn preload(&mut self, index: usize, request: MediaRequest) -> Task<Message> {
        let Ok(path) = media::local_path(request.source()) else {
            return Task::none();
        };
        if !self.cache.is_enabled() || self.cache.contains(&path) {
            return Task::none();
        }
        log::debug!("preloading item {index} from {}", path.display());
        let key = path.clone();
        Task::perform(fetch(request, path), move |result| Message::Preloaded {
            path: key,
            result: result.map(PreloadedMedia::from),
        })
    }

    /// Records a finished load and returns the event for the engine.
    ///
    /// Results for superseded tokens are still returned so the engine can
    /// account for them; they never change what is shown.
    pub fn finish_load(
        &mut self,
        token: MediaToken,
        result: Result<LoadedMedia, MediaError>,
    ) -> MediaEvent {
        let default_duration = self.default_duration;
        let Some(load) = self.active.as_mut().filter(|load| load.token == token) else {
            let kind = match result {
                Ok(_) => MediaEventKind::Loaded { duration: None },
                Err(err) => MediaEventKind::Failed(err),
            };
            return MediaEvent::new(token, kind);
        };

        match result {
            Ok(LoadedMedia::Image(image)) => {
                if let Some(path) = load.path.clone() {
                    self.cache
                        .insert(path, PreloadedMedia::Image(image.clone()));
                }
                load.presentation = Presentation::Image(image);
                MediaEvent::new(token, MediaEventKind::Loaded { duration: None })
            }
            Ok(LoadedMedia::Video(metadata)) => {
                // The clock length is what gets played, so it is what gets
                // reported when the container has no duration.
                let clock = VideoClock::new(video_duration_or_default(&metadata, default_duration));
                let duration = Some(clock.duration());
                load.video = Some(ActiveVideo { clock });
                load.presentation = Presentation::Video(metadata.poster.clone());
                if let Some(path) = load.path.clone() {
                    self.cache.insert(path, PreloadedMedia::Video(metadata));
                }
                MediaEvent::new(token, MediaEventKind::Loaded { duration })
            }
            Err(err) => {
                load.presentation = Presentation::Failed(err.clone());
                MediaEvent::new(token, MediaEventKind::Failed(err))
            }
        }
    }

    /// Stores a preloaded payload, or logs why it is missing.
    pub fn finish_preload(&mut self, path: PathBuf, result: Result<PreloadedMedia, MediaError>) {
        match result {
            Ok(media) => {
                self.cache.insert(path, media);
            }
            Err(err) => log::debug!("preload of {} failed: {err}", path.display()),
        }
    }

    /// Polls the video clock, returning position and end events.
    pub fn tick(&mut self, now: Instant) -> Vec<MediaEvent> {
        let Some(load) = self.active.as_mut() else {
            return Vec::new();
        };
        let token = load.token;
        let Some(video) = load.video.as_mut() else {
            return Vec::new();
        };
        if !video.clock.is_playing() {
            return Vec::new();
        }

        let mut events = vec![MediaEvent::new(
            token,
            MediaEventKind::Position {
                position: video.clock.position(now),
                duration: Some(video.clock.duration()),
            },
        )];
        if video.clock.take_ended(now) {
            events.push(MediaEvent::new(token, MediaEventKind::Ended));
        }
        events
    }

    fn active_video(&self) -> Option<&ActiveVideo> {
        self.active.as_ref().and_then(|load| load.video.as_ref())
    }

    fn video_for(&mut self, token: MediaToken) -> Option<&mut ActiveVideo> {
        self.active
            .as_mut()
            .filter(|load| load.token == token)
            .and_then(|load| load.video.as_mut())
    }
}

/// Decodes or probes `path` on the blocking pool.
async fn fetch(request: MediaRequest, path: PathBuf) -> Result<LoadedMedia, MediaError> {
    let joined = tokio::task::spawn_blocking(move || match request {
        MediaRequest::Image { .. } => load_image(&path).map(LoadedMedia::Image),
        MediaRequest::Video { .. } => probe_video(&path).map(LoadedMedia::Video),
    })
    .await;

    joined.unwrap_or_else(|err| Err(MediaError::Decode(format!("media task failed: {err}"))))
}
