// SPDX-License-Identifier: MPL-2.0
use crate::domain::StoryError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Story Error: {0}")]
    Story(#[from] StoryError),
    #[error("Media Error: {0}")]
    Media(#[from] MediaError),
}

/// Reasons a media item could not be prepared for display.
///
/// Carried inside [`crate::media::MediaEvent::Failed`], so it must stay
/// cheap to clone. The engine never surfaces these to the host as hard
/// errors; they only select the recovery path for the item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The source is not something the host can resolve (e.g. a remote URL).
    #[error("Unsupported media source: {0}")]
    UnsupportedSource(String),

    /// The file referenced by the item does not exist.
    #[error("Media file not found")]
    NotFound,

    /// The item kind requires a source but none was given.
    #[error("Media item has no source")]
    MissingSource,

    /// Decoding failed (corrupt or unsupported data).
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// Container opened but holds no video stream.
    #[error("No video stream found")]
    NoVideoStream,

    /// Video metadata probing is not compiled in.
    #[error("Video probing is unavailable in this build")]
    ProbeUnavailable,
}

impl MediaError {
    /// Maps a raw decoder message onto the closest variant.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("no such file") || msg_lower.contains("not found") {
            return MediaError::NotFound;
        }

        if msg_lower.contains("no video stream") || msg_lower.contains("no video track") {
            return MediaError::NoVideoStream;
        }

        MediaError::Decode(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn story_error_converts_into_error() {
        let err: Error = StoryError::Empty.into();
        assert!(matches!(err, Error::Story(StoryError::Empty)));
    }

    #[test]
    fn media_error_from_message_not_found() {
        let err = MediaError::from_message("No such file or directory");
        assert_eq!(err, MediaError::NotFound);
    }

    #[test]
    fn media_error_from_message_no_stream() {
        let err = MediaError::from_message("No video stream found in file");
        assert_eq!(err, MediaError::NoVideoStream);
    }

    #[test]
    fn media_error_from_message_falls_back_to_decode() {
        let err = MediaError::from_message("Invalid data found when processing input");
        assert!(matches!(err, MediaError::Decode(msg) if msg.contains("Invalid data")));
    }

    #[test]
    fn media_error_display() {
        let err: Error = MediaError::Decode("bad header".to_string()).into();
        assert_eq!(format!("{}", err), "Media Error: Decoding failed: bad header");
    }
}
