// SPDX-License-Identifier: MPL-2.0
//! Image decoding for story items (PNG, JPEG, GIF, WebP, etc.).

use crate::error::MediaError;
use iced::widget::image;
use image_rs::{GenericImageView, ImageError};
use std::fs;
use std::io;
use std::path::Path;

/// A decoded image ready for display.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub handle: image::Handle,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    /// Creates a new `ImageData` from RGBA pixels.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            handle: image::Handle::from_rgba(width, height, pixels),
            width,
            height,
        }
    }

    /// Approximate decoded size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Loads and decodes the image at `path`.
///
/// # Errors
///
/// Returns [`MediaError::NotFound`] if the file does not exist and
/// [`MediaError::Decode`] if it cannot be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageData, MediaError> {
    let bytes = fs::read(path.as_ref()).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => MediaError::NotFound,
        _ => MediaError::Decode(err.to_string()),
    })?;

    let img = image_rs::load_from_memory(&bytes).map_err(MediaError::from)?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::Decode(format!(
            "invalid image dimensions: {width}x{height}"
        )));
    }

    Ok(ImageData::from_rgba(width, height, img.to_rgba8().into_vec()))
}

impl From<ImageError> for MediaError {
    fn from(err: ImageError) -> Self {
        MediaError::Decode(err.to_string())
    }
}
