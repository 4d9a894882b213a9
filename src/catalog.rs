// SPDX-License-Identifier: MPL-2.0
//! Story catalogs loaded from TOML files.
//!
//! A catalog lists stories in display order:
//!
//! ```toml
//! [[stories]]
//! user_id = "1"
//! user_name = "Adventure Travel"
//!
//! [[stories.items]]
//! id = "1-1"
//! kind = "image"
//! source = "media/sunrise.jpg"
//! text = "Mountain sunrise"
//! duration_ms = 5000
//! timestamp = "2024-05-01T06:30:00Z"
//! ```
//!
//! Relative media sources are resolved against the catalog's directory.

use crate::domain::Story;
use crate::error::{Error, Result};
use crate::media;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    stories: Vec<Story>,
}

/// An ordered, validated list of stories.
#[derive(Debug, Clone, Default)]
pub struct StoryCatalog {
    stories: Vec<Arc<Story>>,
}

impl StoryCatalog {
    /// Builds a catalog from already-resolved stories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Story`] if any story violates its invariants.
    pub fn from_stories(stories: Vec<Story>) -> Result<Self> {
        for story in &stories {
            story.validate().map_err(|err| {
                log::error!("story '{}' is invalid: {err}", story.user_id);
                Error::from(err)
            })?;
        }
        Ok(Self {
            stories: stories.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parses a catalog from TOML text, resolving relative sources against
    /// `base_dir` when given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed TOML and [`Error::Story`] for
    /// invalid stories.
    pub fn from_toml(content: &str, base_dir: Option<&Path>) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut stories = file.stories;
        if let Some(base) = base_dir {
            for story in &mut stories {
                resolve_sources(story, base);
            }
        }
        Self::from_stories(stories)
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise see
    /// [`StoryCatalog::from_toml`].
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_toml(&content, path.parent())?;
        log::info!(
            "loaded {} stories from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Serializes the catalog back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        let file = CatalogFile {
            stories: self.stories.iter().map(|story| (**story).clone()).collect(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    #[must_use]
    pub fn stories(&self) -> &[Arc<Story>] {
        &self.stories
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Returns the story published by `user_id`.
    #[must_use]
    pub fn find(&self, user_id: &str) -> Option<&Arc<Story>> {
        self.stories.iter().find(|story| story.user_id == user_id)
    }

    /// Returns the first story that still has unviewed items.
    #[must_use]
    pub fn first_unviewed(&self) -> Option<&Arc<Story>> {
        self.stories.iter().find(|story| story.has_unviewed())
    }
}

fn resolve_sources(story: &mut Story, base: &Path) {
    if let Some(avatar) = story.avatar_url.as_mut() {
        resolve_source(avatar, base);
    }
    for item in &mut story.items {
        if let Some(source) = item.source.as_mut() {
            resolve_source(source, base);
        }
    }
}

fn resolve_source(source: &mut String, base: &Path) {
    if source.trim().is_empty() || source.starts_with("file://") {
        return;
    }
    if let Ok(path) = media::local_path(source) {
        if path.is_relative() {
            *source = base.join(path).to_string_lossy().into_owned();
        }
    }
}
