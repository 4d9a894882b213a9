// SPDX-License-Identifier: MPL-2.0
use std::fs;
use std::sync::Arc;
use story_lens::catalog::StoryCatalog;
use story_lens::config::{self, Config, DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS};
use story_lens::domain::ItemKind;
use story_lens::error::Error;
use story_lens::playback::{Direction, ManualClock, PlaybackEngine, PlaybackSettings};
use tempfile::tempdir;

#[test]
fn config_changes_reach_the_engine() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("settings.toml");

    let mut initial = Config::default();
    initial.playback.video_error_skip_delay_ms = Some(1_200);
    initial.playback.reduced_motion = Some(true);
    initial.preload.enabled = Some(false);
    config::save_to_path(&initial, &path).expect("Failed to write config file");

    let loaded = config::load_from_path(&path).expect("Failed to load config from path");
    assert_eq!(loaded, initial);

    let settings = PlaybackSettings::from_config(&loaded);
    assert_eq!(settings.video_error_skip_delay.value(), 1_200);
    assert!(settings.reduced_motion);
    assert!(!settings.preload_enabled);

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn partial_config_falls_back_to_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    fs::write(
        dir.path().join("settings.toml"),
        "[input]\nhold_threshold_ms = 350\n",
    )
    .expect("Failed to write config file");

    let (config, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert!(warning.is_none());
    assert_eq!(config.input.hold_threshold_ms, Some(350));
    assert_eq!(
        config.playback.video_error_skip_delay_ms,
        Some(DEFAULT_VIDEO_ERROR_SKIP_DELAY_MS)
    );
}

#[test]
fn broken_config_yields_defaults_and_warning() {
    let dir = tempdir().expect("Failed to create temporary directory");
    fs::write(dir.path().join("settings.toml"), "[playback\n").expect("write");

    let (config, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert_eq!(config, Config::default());
    assert!(warning.is_some());
}

#[test]
fn catalog_file_opens_into_a_session() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("stories.toml");
    fs::write(
        &path,
        r#"
[[stories]]
user_id = "7"
user_name = "Nature Photography"

[[stories.items]]
id = "7-1"
kind = "image"
source = "forest.jpg"
text = "Morning fog"

[[stories.items]]
id = "7-2"
kind = "text"
text = "Take only pictures, leave only footprints"
duration_ms = 3000
"#,
    )
    .expect("Failed to write catalog");

    let catalog = StoryCatalog::load_from_path(&path).expect("catalog should load");
    let story = Arc::clone(catalog.find("7").expect("story 7"));
    assert_eq!(story.items[0].kind, ItemKind::Image);
    assert_eq!(
        story.items[0].source(),
        Some(dir.path().join("forest.jpg").to_string_lossy().as_ref())
    );
    assert_eq!(story.items[0].caption(), Some("Morning fog"));

    let mut engine = PlaybackEngine::open_with_clock(
        story,
        0,
        PlaybackSettings::default(),
        ManualClock::new(),
    );
    assert!(!engine.is_ready());
    engine.advance(Direction::Forward);
    assert_eq!(engine.active_index(), 1);
    assert!(engine.is_ready());
    assert!(engine.viewed(1));
    assert!(!engine.viewed(0));
}

#[test]
fn missing_catalog_is_an_io_error() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let result = StoryCatalog::load_from_path(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}
