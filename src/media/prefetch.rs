// SPDX-License-Identifier: MPL-2.0
//! Preload cache for upcoming story items.
//!
//! When an item becomes ready the engine asks the host to preload the next
//! one. The host decodes the image (or probes the video) in the background
//! and parks the result here, so the following `Load` is served without
//! touching the disk.
//!
//! - **LRU eviction**: least recently used entries are evicted first
//! - **Count-bounded**: at most `image_cache_entries` entries
//! - **Path-keyed**: entries are indexed by resolved file path

use crate::domain::{ItemDuration, ItemKind};
use crate::media::{ImageData, VideoMetadata};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// A preloaded media payload.
#[derive(Debug, Clone)]
pub enum PreloadedMedia {
    Image(ImageData),
    Video(VideoMetadata),
}

impl PreloadedMedia {
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Image(_) => ItemKind::Image,
            Self::Video(_) => ItemKind::Video,
        }
    }
}

/// Statistics about preload cache performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadStats {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub evictions: u64,
}

impl PreloadStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU cache of preloaded media.
pub struct PreloadCache {
    cache: LruCache<PathBuf, PreloadedMedia>,
    enabled: bool,
    stats: PreloadStats,
}

impl PreloadCache {
    /// Creates a cache holding up to `entries` items (at least one).
    #[must_use]
    pub fn new(entries: usize, enabled: bool) -> Self {
        let capacity = NonZeroUsize::new(entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            enabled,
            stats: PreloadStats::default(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stores a preloaded payload. Returns false if preloading is disabled.
    pub fn insert(&mut self, path: PathBuf, media: PreloadedMedia) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some((evicted, _)) = self.cache.push(path.clone(), media) {
            if evicted != path {
                self.stats.evictions += 1;
            }
        }
        self.stats.insertions += 1;
        true
    }

    /// Returns the cached image for `path`, updating LRU order.
    pub fn image(&mut self, path: &Path) -> Option<ImageData> {
        match self.lookup(path) {
            Some(PreloadedMedia::Image(image)) => Some(image),
            _ => None,
        }
    }

    /// Returns the cached video metadata for `path`, updating LRU order.
    pub fn video(&mut self, path: &Path) -> Option<VideoMetadata> {
        match self.lookup(path) {
            Some(PreloadedMedia::Video(metadata)) => Some(metadata),
            _ => None,
        }
    }

    fn lookup(&mut self, path: &Path) -> Option<PreloadedMedia> {
        if !self.enabled {
            return None;
        }
        match self.cache.get(path) {
            Some(media) => {
                self.stats.hits += 1;
                Some(media.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Checks for `path` without updating LRU order.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.enabled && self.cache.contains(path)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> PreloadStats {
        self.stats
    }
}

/// Duration a preloaded video would play for, falling back to the item
/// default when the container has none.
#[must_use]
pub fn video_duration_or_default(
    metadata: &VideoMetadata,
    fallback: ItemDuration,
) -> std::time::Duration {
    metadata.duration.unwrap_or_else(|| fallback.as_duration())
}
