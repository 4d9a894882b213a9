// SPDX-License-Identifier: MPL-2.0
//! Story and story item value objects.
//!
//! A [`Story`] is an ordered list of [`StoryItem`]s published by one user.
//! Stories are immutable for the duration of a viewing session; the engine
//! shares them as `Arc<Story>` with the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// The kind of content a story item displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Image,
    Video,
    Text,
}

impl ItemKind {
    /// Returns true for kinds whose duration comes from a timer rather than
    /// from the media itself.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::Image | Self::Text)
    }

    /// Returns true for kinds that need a media source.
    #[must_use]
    pub fn requires_source(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Optional descriptive metadata about an item's media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// One slide of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItem {
    /// Identifier, unique within its story.
    pub id: String,

    pub kind: ItemKind,

    /// Media URI. Required for images and videos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Body for text items, caption for the other kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Display time for images and text. Ignored for videos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,

    /// When the item was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Whether the viewer has already seen this item.
    #[serde(default)]
    pub viewed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ItemMeta>,
}

impl StoryItem {
    fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
            source: None,
            text: None,
            duration_ms: None,
            timestamp: None,
            viewed: false,
            meta: None,
        }
    }

    /// Creates an image item.
    #[must_use]
    pub fn image(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(id, ItemKind::Image)
        }
    }

    /// Creates a video item.
    #[must_use]
    pub fn video(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(id, ItemKind::Video)
        }
    }

    /// Creates a text item.
    #[must_use]
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(id, ItemKind::Text)
        }
    }

    /// Sets the display duration in milliseconds.
    #[must_use]
    pub fn with_duration_ms(mut self, millis: u32) -> Self {
        self.duration_ms = Some(millis);
        self
    }

    /// Sets the caption (or body, for text items).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the publication timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Marks the item as already viewed.
    #[must_use]
    pub fn viewed(mut self) -> Self {
        self.viewed = true;
        self
    }

    /// Returns the configured display duration for timed kinds.
    ///
    /// Always `None` for videos, whose duration is intrinsic to the media.
    #[must_use]
    pub fn configured_duration(&self) -> Option<Duration> {
        if self.kind.is_timed() {
            self.duration_ms
                .map(|millis| Duration::from_millis(u64::from(millis)))
        } else {
            None
        }
    }

    /// Returns the media source, ignoring blank values.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Returns the caption shown over image and video items.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        match self.kind {
            ItemKind::Text => None,
            ItemKind::Image | ItemKind::Video => {
                self.text.as_deref().filter(|s| !s.trim().is_empty())
            }
        }
    }

    /// Checks that the item carries what its kind needs.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError::MissingSource`] for images and videos without a
    /// source, and [`StoryError::MissingText`] for text items without text.
    pub fn validate(&self) -> Result<(), StoryError> {
        match self.kind {
            ItemKind::Image | ItemKind::Video if self.source().is_none() => {
                Err(StoryError::MissingSource {
                    item_id: self.id.clone(),
                })
            }
            ItemKind::Text
                if self
                    .text
                    .as_deref()
                    .map_or(true, |text| text.trim().is_empty()) =>
            {
                Err(StoryError::MissingText {
                    item_id: self.id.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// An ordered sequence of items published by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub items: Vec<StoryItem>,
}

impl Story {
    /// Creates a story without an avatar.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        items: Vec<StoryItem>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            avatar_url: None,
            items,
        }
    }

    /// Sets the avatar URI.
    #[must_use]
    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the story has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `index`, if any.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&StoryItem> {
        self.items.get(index)
    }

    /// Returns true if at least one item has not been viewed yet.
    #[must_use]
    pub fn has_unviewed(&self) -> bool {
        self.items.iter().any(|item| !item.viewed)
    }

    /// Returns the label shown under a story card ("1 story", "3 stories").
    #[must_use]
    pub fn item_count_label(&self) -> String {
        match self.items.len() {
            1 => "1 story".to_string(),
            count => format!("{count} stories"),
        }
    }

    /// Checks the per-item invariants and id uniqueness.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in item order.
    pub fn validate(&self) -> Result<(), StoryError> {
        if self.items.is_empty() {
            return Err(StoryError::Empty);
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(StoryError::DuplicateId {
                    item_id: item.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Story invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("story has no items")]
    Empty,

    #[error("item '{item_id}' needs a media source")]
    MissingSource { item_id: String },

    #[error("text item '{item_id}' has no text")]
    MissingText { item_id: String },

    #[error("item id '{item_id}' is used more than once")]
    DuplicateId { item_id: String },
}
