// SPDX-License-Identifier: MPL-2.0
//! Gesture and keyboard routing.
//!
//! Translates raw pointer and key events into playback intents. A press
//! pauses immediately; on release its length decides whether it was a hold
//! (resume only) or a tap (resume, then navigate by screen half).

use super::timeline::Direction;
use crate::domain::HoldThreshold;
use std::time::Instant;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    Escape,
    Other,
}

/// Platform input, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    PointerDown { x: f32, surface_width: f32 },
    PointerUp { x: f32, surface_width: f32 },
    PointerCancel,
    Key(Key),
}

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Pause,
    Resume,
    TogglePause,
    Advance(Direction),
    Close,
}

/// Routing result for one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Routed {
    /// Intents to apply, in order.
    pub intents: Vec<Intent>,
    /// The host should stop the platform's default handling of this input.
    pub suppress_default: bool,
}

impl Routed {
    fn handled(intents: Vec<Intent>) -> Self {
        Self {
            intents,
            suppress_default: true,
        }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

/// Stateful gesture classifier.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    hold_threshold: HoldThreshold,
    pressed_at: Option<Instant>,
}

impl InputRouter {
    #[must_use]
    pub fn new(hold_threshold: HoldThreshold) -> Self {
        Self {
            hold_threshold,
            pressed_at: None,
        }
    }

    /// Returns true while a pointer press is active.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Routes one input received at `now`.
    pub fn route(&mut self, input: RawInput, now: Instant) -> Routed {
        match input {
            RawInput::PointerDown { .. } => {
                if self.pressed_at.is_some() {
                    return Routed::ignored();
                }
                self.pressed_at = Some(now);
                Routed::handled(vec![Intent::Pause])
            }
            RawInput::PointerUp { x, surface_width } => {
                let Some(pressed_at) = self.pressed_at.take() else {
                    return Routed::ignored();
                };
                let held = now.saturating_duration_since(pressed_at);
                if held >= self.hold_threshold.as_duration() {
                    Routed::handled(vec![Intent::Resume])
                } else {
                    Routed::handled(vec![
                        Intent::Resume,
                        Intent::Advance(tap_direction(x, surface_width)),
                    ])
                }
            }
            RawInput::PointerCancel => {
                self.pressed_at = None;
                Routed::handled(vec![Intent::Resume])
            }
            RawInput::Key(key) => match key {
                Key::ArrowRight => Routed::handled(vec![Intent::Advance(Direction::Forward)]),
                Key::ArrowLeft => Routed::handled(vec![Intent::Advance(Direction::Backward)]),
                Key::Space => Routed::handled(vec![Intent::TogglePause]),
                Key::Escape => Routed::handled(vec![Intent::Close]),
                Key::Other => Routed::ignored(),
            },
        }
    }

    /// Forgets any active press.
    pub fn reset(&mut self) {
        self.pressed_at = None;
    }
}

/// Right half navigates forward, left half backward.
#[must_use]
pub fn tap_direction(x: f32, surface_width: f32) -> Direction {
    if x > surface_width / 2.0 {
        Direction::Forward
    } else {
        Direction::Backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const WIDTH: f32 = 400.0;

    fn down(x: f32) -> RawInput {
        RawInput::PointerDown {
            x,
            surface_width: WIDTH,
        }
    }

    fn up(x: f32) -> RawInput {
        RawInput::PointerUp {
            x,
            surface_width: WIDTH,
        }
    }

    #[test]
    fn short_press_on_right_half_is_forward_tap() {
        let t0 = Instant::now();
        let mut router = InputRouter::default();

        assert_eq!(router.route(down(300.0), t0).intents, vec![Intent::Pause]);
        let routed = router.route(up(300.0), t0 + Duration::from_millis(80));
        assert_eq!(
            routed.intents,
            vec![Intent::Resume, Intent::Advance(Direction::Forward)]
        );
        assert!(routed.suppress_default);
    }

    #[test]
    fn short_press_on_left_half_is_backward_tap() {
        let t0 = Instant::now();
        let mut router = InputRouter::default();
        router.route(down(50.0), t0);
        let routed = router.route(up(50.0), t0 + Duration::from_millis(80));
        assert_eq!(
            routed.intents,
            vec![Intent::Resume, Intent::Advance(Direction::Backward)]
        );
    }

    #[test]
    fn exact_middle_counts_as_left() {
        assert_eq!(tap_direction(WIDTH / 2.0, WIDTH), Direction::Backward);
        assert_eq!(tap_direction(WIDTH / 2.0 + 0.5, WIDTH), Direction::Forward);
    }

    #[test]
    fn long_press_only_resumes() {
        let t0 = Instant::now();
        let mut router = InputRouter::new(HoldThreshold::new(200));
        router.route(down(350.0), t0);
        let routed = router.route(up(350.0), t0 + Duration::from_millis(200));
        assert_eq!(routed.intents, vec![Intent::Resume]);
        assert!(!router.is_pressed());
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut router = InputRouter::default();
        let routed = router.route(up(10.0), Instant::now());
        assert!(routed.intents.is_empty());
        assert!(!routed.suppress_default);
    }

    #[test]
    fn second_press_is_ignored() {
        let t0 = Instant::now();
        let mut router = InputRouter::default();
        router.route(down(10.0), t0);
        assert!(router
            .route(down(20.0), t0 + Duration::from_millis(10))
            .intents
            .is_empty());
    }

    #[test]
    fn cancel_always_resumes() {
        let t0 = Instant::now();
        let mut router = InputRouter::default();
        assert_eq!(
            router.route(RawInput::PointerCancel, t0).intents,
            vec![Intent::Resume]
        );

        router.route(down(10.0), t0);
        assert_eq!(
            router.route(RawInput::PointerCancel, t0).intents,
            vec![Intent::Resume]
        );
        assert!(!router.is_pressed());
    }

    #[test]
    fn keys_map_to_intents() {
        let now = Instant::now();
        let mut router = InputRouter::default();
        let cases = [
            (Key::ArrowRight, Intent::Advance(Direction::Forward)),
            (Key::ArrowLeft, Intent::Advance(Direction::Backward)),
            (Key::Space, Intent::TogglePause),
            (Key::Escape, Intent::Close),
        ];
        for (key, intent) in cases {
            let routed = router.route(RawInput::Key(key), now);
            assert_eq!(routed.intents, vec![intent]);
            assert!(routed.suppress_default);
        }

        let other = router.route(RawInput::Key(Key::Other), now);
        assert!(other.intents.is_empty());
        assert!(!other.suppress_default);
    }
}
