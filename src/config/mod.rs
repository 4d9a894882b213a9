// SPDX-License-Identifier: MPL-2.0
//! This module handles the viewer's configuration, loading and saving user
//! preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[playback]` - Default item duration, video error skip delay, reduced motion
//! - `[input]` - Hold gesture threshold
//! - `[preload]` - Next-item preloading
//! - `[display]` - Frame tick pacing
//! - `[diagnostics]` - Playback journal size
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with an explicit path
//! 2. Pass `--config-dir` or set `STORY_LENS_CONFIG_DIR`
//! 3. Falls back to the platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use story_lens::config::{self, Config};
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! config.playback.reduced_motion = Some(true);
//!
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;
pub mod paths;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Playback timing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// Display time for image and text items without their own duration.
    #[serde(
        default = "default_item_duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_item_duration_ms: Option<u32>,

    /// Grace delay before a video that failed to load is skipped.
    #[serde(
        default = "default_video_error_skip_delay_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub video_error_skip_delay_ms: Option<u32>,

    /// Suppress auto-advance of image and text items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_item_duration_ms: default_item_duration_ms(),
            video_error_skip_delay_ms: default_video_error_skip_delay_ms(),
            reduced_motion: Some(false),
        }
    }
}

/// Pointer gesture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Presses at least this long are holds rather than taps.
    #[serde(
        default = "default_hold_threshold_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub hold_threshold_ms: Option<u32>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hold_threshold_ms: default_hold_threshold_ms(),
        }
    }
}

/// Next-item preloading settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreloadConfig {
    /// Whether the next item is fetched ahead of time.
    #[serde(default = "default_preload_enabled", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Decoded images kept in the preload cache.
    #[serde(
        default = "default_image_cache_entries",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_cache_entries: Option<usize>,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            enabled: default_preload_enabled(),
            image_cache_entries: default_image_cache_entries(),
        }
    }
}

/// Display pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Interval between frame ticks.
    #[serde(
        default = "default_frame_interval_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub frame_interval_ms: Option<u32>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// Playback events kept by the in-memory journal.
    #[serde(
        default = "default_journal_capacity",
        skip_serializing_if = "Option::is_none"
    )]
    pub journal_capacity: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            journal_capacity: default_journal_capacity(),
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Viewer configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub preload: PreloadConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_item_duration_ms() -> Option<u32> {
    Some(DEFAULT_ITEM_DURATION_MS)
}

fn default_video_error_skip_delay_ms() -> Option<u32> {
    Some(DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS)
}

fn default_hold_threshold_ms() -> Option<u32> {
    Some(DEFAULT_HOLD_THRESHOLD_MS)
}

fn default_preload_enabled() -> Option<bool> {
    Some(true)
}

fn default_image_cache_entries() -> Option<usize> {
    Some(DEFAULT_IMAGE_CACHE_ENTRIES)
}

fn default_frame_interval_ms() -> Option<u32> {
    Some(DEFAULT_FRAME_INTERVAL_MS)
}

fn default_journal_capacity() -> Option<usize> {
    Some(DEFAULT_JOURNAL_CAPACITY)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// the default config with a warning explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!(
                            "could not load {}, using defaults: {err}",
                            path.display()
                        )),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
