// SPDX-License-Identifier: MPL-2.0
//! Desktop story viewer built on iced.
//!
//! `App` owns one [`PlaybackEngine`] session and acts as its host: it turns
//! window events into engine input, runs the engine's media commands through
//! [`MediaHost`], and exits once the engine reports that the session closed.

mod media_host;
mod message;
mod segments;
mod subscription;
mod view;

pub use media_host::{LoadedMedia, MediaHost, Presentation};
pub use message::{Flags, Message};
pub use view::format_timestamp;

use crate::config::{self, Config};
use crate::domain::Story;
use crate::media::{self, PreloadCache};
use crate::playback::{Intent, Output, PlaybackEngine, PlaybackSettings, RawInput};
use iced::widget::image;
use iced::{window, Element, Point, Size, Subscription, Task, Theme};
use segments::SegmentAnimator;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const WINDOW_DEFAULT_HEIGHT: u32 = 760;
pub const WINDOW_DEFAULT_WIDTH: u32 = 430;
pub const MIN_WINDOW_HEIGHT: u32 = 320;
pub const MIN_WINDOW_WIDTH: u32 = 240;

/// Root application state.
pub struct App {
    engine: PlaybackEngine,
    media: MediaHost,
    segments: SegmentAnimator,
    avatar: Option<image::Handle>,
    frame_interval: Duration,
    cursor: Option<Point>,
    window_size: Size,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("story", &self.engine.story().user_id)
            .field("active_index", &self.engine.active_index())
            .field("media", &self.media)
            .finish()
    }
}

/// Builds the window settings.
#[must_use]
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(Size::new(MIN_WINDOW_WIDTH as f32, MIN_WINDOW_HEIGHT as f32)),
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    let boot = move || App::new(flags.clone());

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

/// Picks the story to open: the requested one, else the first with unviewed
/// items, else the first.
#[must_use]
pub fn select_story(flags: &Flags) -> Arc<Story> {
    let catalog = &flags.catalog;
    let requested = flags.story.as_deref().and_then(|user_id| {
        let found = catalog.find(user_id);
        if found.is_none() {
            log::warn!("story '{user_id}' is not in the catalog");
        }
        found
    });

    requested
        .or_else(|| catalog.first_unviewed())
        .or_else(|| catalog.stories().first())
        .cloned()
        .unwrap_or_else(|| Arc::new(Story::new("", "", Vec::new())))
}

impl App {
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let (config, config_warning) = config::load();
        if let Some(warning) = config_warning {
            log::warn!("{warning}");
        }
        Self::with_config(&flags, &config)
    }

    /// Opens the selected story with explicit configuration.
    fn with_config(flags: &Flags, config: &Config) -> (Self, Task<Message>) {
        let mut settings = PlaybackSettings::from_config(config);
        settings.reduced_motion |= flags.reduced_motion;

        let cache_entries = config
            .preload
            .image_cache_entries
            .unwrap_or(config::DEFAULT_IMAGE_CACHE_ENTRIES)
            .clamp(config::MIN_IMAGE_CACHE_ENTRIES, config::MAX_IMAGE_CACHE_ENTRIES);

        let story = select_story(flags);
        let avatar = story
            .avatar_url
            .as_deref()
            .and_then(|source| media::local_path(source).ok())
            .map(image::Handle::from_path);
        let engine = PlaybackEngine::open(story, flags.start_index, settings);

        let mut app = App {
            engine,
            media: MediaHost::new(
                PreloadCache::new(cache_entries, settings.preload_enabled),
                settings.default_item_duration,
            ),
            segments: SegmentAnimator::default(),
            avatar,
            frame_interval: settings.frame_interval.as_duration(),
            cursor: None,
            window_size: window_settings().size,
        };
        let task = app.flush(Instant::now());
        (app, task)
    }

    fn title(&self) -> String {
        let story = self.engine.story();
        if story.is_empty() {
            return "StoryLens".to_string();
        }
        format!(
            "{} ({}/{}) - StoryLens",
            story.user_name,
            self.engine.active_index() + 1,
            story.len()
        )
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        let now = Instant::now();
        let animating = self.engine.wants_frames()
            || self.media.is_playing_video()
            || self.segments.is_animating(now);

        Subscription::batch([
            subscription::create_event_subscription(),
            subscription::create_tick_subscription(animating, self.frame_interval),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(now) => {
                for event in self.media.tick(now) {
                    self.engine.handle_media_event_at(event, now);
                }
                self.engine.tick_at(now);
                self.flush(now)
            }
            Message::CursorMoved(position) => {
                self.cursor = Some(position);
                Task::none()
            }
            Message::PointerPressed => {
                let x = self.cursor.map_or(0.0, |cursor| cursor.x);
                self.route(RawInput::PointerDown {
                    x,
                    surface_width: self.window_size.width,
                })
            }
            Message::PointerReleased => {
                let x = self.cursor.map_or(0.0, |cursor| cursor.x);
                self.route(RawInput::PointerUp {
                    x,
                    surface_width: self.window_size.width,
                })
            }
            Message::PointerCancelled => {
                self.cursor = None;
                // Leaving the window with no button held must not undo a
                // keyboard pause.
                if !self.engine.is_pointer_pressed() {
                    return Task::none();
                }
                self.route(RawInput::PointerCancel)
            }
            Message::TouchPressed(position) => self.route(RawInput::PointerDown {
                x: position.x,
                surface_width: self.window_size.width,
            }),
            Message::TouchLifted(position) => self.route(RawInput::PointerUp {
                x: position.x,
                surface_width: self.window_size.width,
            }),
            Message::KeyPressed(key) => self.route(RawInput::Key(key)),
            Message::WindowResized(size) => {
                self.window_size = size;
                Task::none()
            }
            Message::MediaLoaded { token, result } => {
                let event = self.media.finish_load(token, result);
                self.engine.handle_media_event(event);
                self.flush(Instant::now())
            }
            Message::Preloaded { path, result } => {
                self.media.finish_preload(path, result);
                Task::none()
            }
            Message::CloseButtonPressed => {
                self.engine.apply_intent(Intent::Close);
                self.flush(Instant::now())
            }
            Message::WindowCloseRequested(_) => {
                self.engine.close();
                self.flush(Instant::now())
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(view::ViewContext {
            story: self.engine.story(),
            avatar: self.avatar.as_ref(),
            item: self.engine.active_item(),
            segments: self.segments.shown(),
            presentation: self.media.presentation(),
            is_paused: self.engine.is_paused(),
            is_ready: self.engine.is_ready(),
            now: chrono::Utc::now(),
        })
    }

    fn route(&mut self, input: RawInput) -> Task<Message> {
        if self.engine.handle_input(input) {
            log::trace!("handled {input:?}");
        }
        self.flush(Instant::now())
    }

    /// Runs pending engine outputs and refreshes the progress segments.
    fn flush(&mut self, now: Instant) -> Task<Message> {
        let mut tasks = Vec::new();
        for output in self.engine.drain_outputs() {
            match output {
                Output::Media(command) => tasks.push(self.media.execute(command, now)),
                Output::Close(reason) => {
                    log::info!("session ended ({reason}), exiting");
                    tasks.push(iced::exit());
                }
            }
        }
        self.segments.update(&self.engine.segment_fills(), now);
        Task::batch(tasks)
    }
}
