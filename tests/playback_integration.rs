// SPDX-License-Identifier: MPL-2.0
//! Session scenarios driven through the public engine API with a manual
//! clock.

use approx::assert_abs_diff_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use story_lens::domain::{Story, StoryItem};
use story_lens::error::MediaError;
use story_lens::media::{MediaCommand, MediaEvent, MediaEventKind, MediaToken};
use story_lens::playback::{
    CloseReason, Direction, Key, ManualClock, Output, Phase, PlaybackEngine, PlaybackEvent,
    PlaybackSettings, RawInput,
};

const WIDTH: f32 = 400.0;

fn open(items: Vec<StoryItem>, settings: PlaybackSettings) -> (PlaybackEngine<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let engine = PlaybackEngine::open_with_clock(
        Arc::new(Story::new("42", "Tester", items)),
        0,
        settings,
        clock.clone(),
    );
    (engine, clock)
}

fn texts(durations: &[u32]) -> Vec<StoryItem> {
    durations
        .iter()
        .enumerate()
        .map(|(i, ms)| StoryItem::text(format!("t{i}"), format!("card {i}")).with_duration_ms(*ms))
        .collect()
}

fn pending_load(engine: &mut PlaybackEngine<ManualClock>) -> MediaToken {
    engine
        .drain_outputs()
        .into_iter()
        .find_map(|output| match output {
            Output::Media(MediaCommand::Load { token, .. }) => Some(token),
            _ => None,
        })
        .expect("engine should request a load")
}

fn close_outputs(engine: &mut PlaybackEngine<ManualClock>) -> Vec<CloseReason> {
    engine
        .drain_outputs()
        .into_iter()
        .filter_map(|output| match output {
            Output::Close(reason) => Some(reason),
            Output::Media(_) => None,
        })
        .collect()
}

#[test]
fn forward_through_every_item_then_close() {
    let (mut engine, _clock) = open(texts(&[3_000; 4]), PlaybackSettings::default());

    for expected in 1..4 {
        engine.advance(Direction::Forward);
        assert_eq!(engine.active_index(), expected);
    }
    assert!(!engine.is_closed());

    engine.advance(Direction::Forward);
    assert_eq!(engine.phase(), Phase::Closed);
    assert_eq!(engine.close_reason(), Some(CloseReason::Completed));
    assert_eq!(close_outputs(&mut engine), vec![CloseReason::Completed]);
}

#[test]
fn backward_at_first_item_replays() {
    let (mut engine, clock) = open(texts(&[5_000, 5_000]), PlaybackSettings::default());
    clock.advance_ms(1_500);
    engine.tick();
    assert_eq!(engine.elapsed(), Duration::from_millis(1_500));

    engine.advance(Direction::Backward);
    assert_eq!(engine.active_index(), 0);
    assert_eq!(engine.elapsed(), Duration::ZERO);
    assert!(!engine.is_closed());
}

#[test]
fn pause_then_resume_keeps_elapsed() {
    let (mut engine, clock) = open(texts(&[5_000]), PlaybackSettings::default());
    clock.advance_ms(700);
    engine.tick();

    engine.set_paused(true);
    engine.set_paused(false);
    assert_eq!(engine.elapsed(), Duration::from_millis(700));

    // Repeated calls are no-ops.
    engine.set_paused(false);
    engine.set_paused(true);
    engine.set_paused(true);
    assert!(engine.is_paused());
}

#[test]
fn segment_fills_around_active_item() {
    let (mut engine, clock) = open(texts(&[4_000; 5]), PlaybackSettings::default());
    engine.advance(Direction::Forward);
    engine.advance(Direction::Forward);
    clock.advance_ms(1_000);
    engine.tick();

    let fills = engine.segment_fills();
    assert_eq!(fills.len(), 5);
    assert_eq!(fills[0].fraction, 1.0);
    assert_eq!(fills[1].fraction, 1.0);
    assert_abs_diff_eq!(fills[2].fraction, 0.25, epsilon = 1e-6);
    assert_eq!(fills[3].fraction, 0.0);
    assert_eq!(fills[4].fraction, 0.0);
}

#[test]
fn image_then_text_advances_after_image_duration() {
    let (mut engine, clock) = open(
        vec![
            StoryItem::image("img", "sunrise.jpg").with_duration_ms(5_000),
            StoryItem::text("txt", "Life is a daring adventure").with_duration_ms(4_000),
        ],
        PlaybackSettings::default(),
    );
    let token = pending_load(&mut engine);

    // Loading time does not count.
    clock.advance_ms(800);
    engine.tick();
    assert_eq!(engine.elapsed(), Duration::ZERO);

    engine.handle_media_event(MediaEvent::new(token, MediaEventKind::Loaded { duration: None }));
    for _ in 0..49 {
        clock.advance_ms(100);
        engine.tick();
    }
    assert_eq!(engine.active_index(), 0);

    clock.advance_ms(100);
    engine.tick();
    assert_eq!(engine.active_index(), 1);
    assert!(engine.is_ready());
}

#[test]
fn holding_extends_time_to_advance() {
    let (mut engine, clock) = open(texts(&[4_000, 4_000]), PlaybackSettings::default());

    clock.advance_ms(1_000);
    engine.tick();
    engine.handle_input(RawInput::PointerDown {
        x: 300.0,
        surface_width: WIDTH,
    });
    assert!(engine.is_paused());

    clock.advance_ms(2_000);
    engine.tick();
    engine.handle_input(RawInput::PointerUp {
        x: 300.0,
        surface_width: WIDTH,
    });
    assert!(!engine.is_paused());
    // A hold never counts as a tap.
    assert_eq!(engine.active_index(), 0);

    clock.advance_ms(2_999);
    engine.tick();
    assert_eq!(engine.active_index(), 0);

    clock.advance_ms(1);
    engine.tick();
    assert_eq!(engine.active_index(), 1);
}

#[test]
fn quick_taps_navigate_by_half() {
    let (mut engine, clock) = open(texts(&[4_000; 3]), PlaybackSettings::default());

    engine.handle_input(RawInput::PointerDown {
        x: 350.0,
        surface_width: WIDTH,
    });
    clock.advance_ms(50);
    engine.handle_input(RawInput::PointerUp {
        x: 350.0,
        surface_width: WIDTH,
    });
    assert_eq!(engine.active_index(), 1);
    assert!(!engine.is_paused());

    engine.handle_input(RawInput::PointerDown {
        x: 20.0,
        surface_width: WIDTH,
    });
    engine.handle_input(RawInput::PointerUp {
        x: 20.0,
        surface_width: WIDTH,
    });
    assert_eq!(engine.active_index(), 0);
}

#[test]
fn keys_drive_the_session() {
    let (mut engine, _clock) = open(texts(&[4_000; 2]), PlaybackSettings::default());

    assert!(engine.handle_input(RawInput::Key(Key::ArrowRight)));
    assert_eq!(engine.active_index(), 1);
    assert!(engine.handle_input(RawInput::Key(Key::Space)));
    assert!(engine.is_paused());
    assert!(!engine.handle_input(RawInput::Key(Key::Other)));
    assert!(engine.handle_input(RawInput::Key(Key::Escape)));
    assert_eq!(engine.close_reason(), Some(CloseReason::Dismissed));
}

#[test]
fn reduced_motion_holds_images_and_text() {
    let settings = PlaybackSettings {
        reduced_motion: true,
        ..PlaybackSettings::default()
    };
    let (mut engine, clock) = open(texts(&[1_000, 1_000]), settings);

    clock.advance_ms(120_000);
    engine.tick();
    assert_eq!(engine.active_index(), 0);

    engine.advance(Direction::Forward);
    assert_eq!(engine.active_index(), 1);
}

#[test]
fn video_load_error_skips_after_grace_delay() {
    let (mut engine, clock) = open(
        vec![
            StoryItem::video("clip", "broken.mp4"),
            StoryItem::text("after", "next"),
        ],
        PlaybackSettings::default(),
    );
    let token = pending_load(&mut engine);

    engine.handle_media_event(MediaEvent::new(
        token,
        MediaEventKind::Failed(MediaError::NoVideoStream),
    ));
    assert!(engine.is_ready());
    assert_eq!(engine.active_index(), 0);

    clock.advance_ms(499);
    engine.tick();
    assert_eq!(engine.active_index(), 0);

    clock.advance_ms(1);
    engine.tick();
    assert_eq!(engine.active_index(), 1);
    assert!(engine
        .journal()
        .events()
        .any(|event| matches!(event, PlaybackEvent::FailedItemSkipped { index: 0 })));
}

#[test]
fn video_advances_only_when_it_ends() {
    let (mut engine, clock) = open(
        vec![
            StoryItem::video("clip", "clip.mp4"),
            StoryItem::text("after", "next"),
        ],
        PlaybackSettings::default(),
    );
    let token = pending_load(&mut engine);
    engine.handle_media_event(MediaEvent::new(
        token,
        MediaEventKind::Loaded {
            duration: Some(Duration::from_secs(8)),
        },
    ));

    clock.advance_ms(4_000);
    engine.handle_media_event(MediaEvent::new(
        token,
        MediaEventKind::Position {
            position: Duration::from_secs(4),
            duration: Some(Duration::from_secs(8)),
        },
    ));
    engine.tick();
    assert_abs_diff_eq!(engine.progress(), 0.5, epsilon = 1e-6);

    clock.advance_ms(10_000);
    engine.tick();
    assert_eq!(engine.active_index(), 0);

    engine.handle_media_event(MediaEvent::new(token, MediaEventKind::Ended));
    assert_eq!(engine.active_index(), 1);
}

#[test]
fn repeated_ticks_in_one_instant_advance_once() {
    let (mut engine, clock) = open(texts(&[1_000; 3]), PlaybackSettings::default());
    clock.advance_ms(1_000);
    engine.tick();
    engine.tick();
    engine.tick();
    assert_eq!(engine.active_index(), 1);
}

#[test]
fn stale_media_events_are_dropped() {
    let (mut engine, _clock) = open(
        vec![StoryItem::image("a", "a.jpg"), StoryItem::image("b", "b.jpg")],
        PlaybackSettings::default(),
    );
    let first = pending_load(&mut engine);
    engine.advance(Direction::Forward);

    engine.handle_media_event(MediaEvent::new(first, MediaEventKind::Loaded { duration: None }));
    assert!(!engine.is_ready());
    assert!(engine
        .journal()
        .events()
        .any(|event| matches!(event, PlaybackEvent::StaleMediaEvent { token } if *token == first)));
}

#[test]
fn empty_story_closes_immediately() {
    let (mut engine, _clock) = open(Vec::new(), PlaybackSettings::default());
    assert_eq!(engine.close_reason(), Some(CloseReason::EmptyStory));
    assert_eq!(close_outputs(&mut engine), vec![CloseReason::EmptyStory]);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    engine.set_close_handler(move |reason| {
        assert_eq!(reason, CloseReason::EmptyStory);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    engine.advance(Direction::Forward);
    engine.close();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(close_outputs(&mut engine).is_empty());
}

#[test]
fn close_releases_active_media() {
    let (mut engine, _clock) = open(
        vec![StoryItem::image("a", "a.jpg")],
        PlaybackSettings::default(),
    );
    let token = pending_load(&mut engine);
    engine.close();
    assert_eq!(
        engine.drain_outputs(),
        vec![
            Output::Media(MediaCommand::Release { token }),
            Output::Close(CloseReason::Dismissed),
        ]
    );
    assert!(!engine.wants_frames());
}

#[test]
fn start_index_is_clamped() {
    let clock = ManualClock::new();
    let engine = PlaybackEngine::open_with_clock(
        Arc::new(Story::new("42", "Tester", texts(&[1_000; 3]))),
        99,
        PlaybackSettings::default(),
        clock,
    );
    assert_eq!(engine.active_index(), 2);
}
