// SPDX-License-Identifier: MPL-2.0
//! Video metadata probing and host-side playback clock.
//!
//! Probing uses FFmpeg when the `ffmpeg` feature is enabled. Without it,
//! [`probe_video`] fails with [`MediaError::ProbeUnavailable`] and video
//! items take the failure path.

use crate::error::MediaError;
use crate::media::ImageData;
use crate::playback::TimerSource;
use std::path::Path;
use std::time::{Duration, Instant};

/// Metadata read from a video container.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// `None` when the container does not report a duration.
    pub duration: Option<Duration>,
    pub fps: f64,
    pub has_audio: bool,
    /// First decoded frame, shown while the video plays.
    pub poster: Option<ImageData>,
}

/// Reads metadata and the first frame of the video at `path`.
///
/// # Errors
///
/// Returns [`MediaError::ProbeUnavailable`] when built without FFmpeg,
/// otherwise a [`MediaError`] describing why the file could not be opened.
#[cfg(feature = "ffmpeg")]
pub fn probe_video<P: AsRef<Path>>(path: P) -> Result<VideoMetadata, MediaError> {
    ffmpeg::probe(path.as_ref())
}

/// Reads metadata and the first frame of the video at `path`.
///
/// # Errors
///
/// Always [`MediaError::ProbeUnavailable`]: this build has no FFmpeg.
#[cfg(not(feature = "ffmpeg"))]
pub fn probe_video<P: AsRef<Path>>(path: P) -> Result<VideoMetadata, MediaError> {
    log::debug!("cannot probe {}: built without ffmpeg", path.as_ref().display());
    Err(MediaError::ProbeUnavailable)
}

#[cfg(feature = "ffmpeg")]
mod ffmpeg {
    use super::VideoMetadata;
    use crate::error::MediaError;
    use crate::media::ImageData;
    use std::path::Path;
    use std::sync::Once;
    use std::time::Duration;

    static FFMPEG_INIT: Once = Once::new();

    fn init() -> Result<(), MediaError> {
        let mut result = Ok(());
        FFMPEG_INIT.call_once(|| {
            if let Err(e) = ffmpeg_next::init() {
                result = Err(MediaError::Decode(format!("FFmpeg initialization failed: {e}")));
                return;
            }
            // SAFETY: av_log_set_level is thread-safe and only affects logging
            unsafe {
                ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
            }
        });
        result
    }

    pub(super) fn probe(path: &Path) -> Result<VideoMetadata, MediaError> {
        init()?;

        let mut ictx = ffmpeg_next::format::input(&path)
            .map_err(|e| MediaError::from_message(&e.to_string()))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(MediaError::NoVideoStream)?;
        let stream_index = stream.index();

        let duration_secs = if stream.duration() > 0 {
            let time_base = stream.time_base();
            stream.duration() as f64 * f64::from(time_base.numerator())
                / f64::from(time_base.denominator())
        } else if ictx.duration() > 0 {
            ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
        } else {
            0.0
        };
        let duration =
            (duration_secs > 0.0).then(|| Duration::from_secs_f64(duration_secs));

        let fps = {
            let rate = stream.avg_frame_rate();
            if rate.denominator() == 0 {
                0.0
            } else {
                f64::from(rate.numerator()) / f64::from(rate.denominator())
            }
        };

        let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| MediaError::Decode(format!("codec context: {e}")))?;
        let mut decoder = context
            .decoder()
            .video()
            .map_err(|e| MediaError::Decode(format!("video decoder: {e}")))?;

        let (width, height) = (decoder.width(), decoder.height());
        if width == 0 || height == 0 {
            return Err(MediaError::Decode(format!(
                "invalid video dimensions: {width}x{height}"
            )));
        }

        let has_audio = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .is_some();

        let poster = first_frame(&mut ictx, &mut decoder, stream_index, width, height);
        if let Err(err) = &poster {
            log::debug!("no poster frame for {}: {err}", path.display());
        }

        Ok(VideoMetadata {
            width,
            height,
            duration,
            fps,
            has_audio,
            poster: poster.ok(),
        })
    }

    fn first_frame(
        ictx: &mut ffmpeg_next::format::context::Input,
        decoder: &mut ffmpeg_next::decoder::Video,
        stream_index: usize,
        width: u32,
        height: u32,
    ) -> Result<ImageData, MediaError> {
        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| MediaError::Decode(format!("scaler: {e}")))?;

        let mut rgba = ffmpeg_next::frame::Video::empty();
        let mut decoded = ffmpeg_next::frame::Video::empty();
        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder
                .send_packet(&packet)
                .map_err(|e| MediaError::Decode(format!("send packet: {e}")))?;
            if decoder.receive_frame(&mut decoded).is_ok() {
                scaler
                    .run(&decoded, &mut rgba)
                    .map_err(|e| MediaError::Decode(format!("scale frame: {e}")))?;
                break;
            }
        }

        if rgba.data(0).is_empty() {
            return Err(MediaError::Decode("could not decode first frame".into()));
        }

        let (width, height) = (rgba.width(), rgba.height());
        let data = rgba.data(0);
        let stride = rgba.stride(0);
        let row_len = (width * 4) as usize;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            pixels.extend_from_slice(&data[start..start + row_len]);
        }
        Ok(ImageData::from_rgba(width, height, pixels))
    }
}

/// Tracks the playback position of a video presented by the host.
///
/// Reports positions and the end of media the way a platform player would,
/// so the engine sees the same event stream either way.
#[derive(Debug, Clone)]
pub struct VideoClock {
    timer: TimerSource,
    ended: bool,
}

impl VideoClock {
    /// A stopped clock at position zero.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            timer: TimerSource::new(duration),
            ended: false,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.timer.duration()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.timer.is_running()
    }

    pub fn play(&mut self, now: Instant) {
        if !self.ended {
            self.timer.start(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        self.timer.pause(now);
    }

    /// Seeks back to zero, keeping the play state.
    pub fn restart(&mut self, now: Instant) {
        let playing = self.timer.is_running();
        self.timer.reset();
        self.ended = false;
        if playing {
            self.timer.start(now);
        }
    }

    /// Current position, capped at the duration.
    #[must_use]
    pub fn position(&self, now: Instant) -> Duration {
        self.timer.elapsed(now).min(self.timer.duration())
    }

    /// Returns true exactly once, on the first call after the end is reached.
    pub fn take_ended(&mut self, now: Instant) -> bool {
        if self.ended || self.timer.elapsed(now) < self.timer.duration() {
            return false;
        }
        self.timer.pause(now);
        self.ended = true;
        true
    }
}
