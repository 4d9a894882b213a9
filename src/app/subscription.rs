// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! Native mouse, touch and keyboard events are reduced to the few messages
//! the playback engine understands. Frame ticks run only while something on
//! screen is moving.

use super::Message;
use crate::playback::Key;
use iced::{event, keyboard, mouse, time, touch, window, Subscription};
use std::time::Duration;

/// Routes native events to application messages.
///
/// Input already captured by a widget is left alone. Window close
/// requests are always forwarded so the session can end cleanly.
pub fn create_event_subscription() -> Subscription<Message> {
    event::listen_with(|event, status, window_id| match event {
        event::Event::Window(window::Event::CloseRequested) => {
            Some(Message::WindowCloseRequested(window_id))
        }
        event::Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        // Presses captured by a widget (the close button) are not taps.
        event::Event::Mouse(mouse_event) => match status {
            event::Status::Ignored => map_mouse(mouse_event),
            event::Status::Captured => None,
        },
        event::Event::Touch(touch_event) => match status {
            event::Status::Ignored => map_touch(touch_event),
            event::Status::Captured => None,
        },
        event::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => match status {
            event::Status::Ignored => map_key(&key).map(Message::KeyPressed),
            event::Status::Captured => None,
        },
        _ => None,
    })
}

fn map_mouse(event: mouse::Event) -> Option<Message> {
    match event {
        mouse::Event::CursorMoved { position } => Some(Message::CursorMoved(position)),
        mouse::Event::ButtonPressed(mouse::Button::Left) => Some(Message::PointerPressed),
        mouse::Event::ButtonReleased(mouse::Button::Left) => Some(Message::PointerReleased),
        mouse::Event::CursorLeft => Some(Message::PointerCancelled),
        _ => None,
    }
}

fn map_touch(event: touch::Event) -> Option<Message> {
    match event {
        touch::Event::FingerPressed { position, .. } => Some(Message::TouchPressed(position)),
        touch::Event::FingerLifted { position, .. } => Some(Message::TouchLifted(position)),
        touch::Event::FingerLost { .. } => Some(Message::PointerCancelled),
        touch::Event::FingerMoved { .. } => None,
    }
}

/// Maps a pressed key to the playback key set. Unlisted keys are `Other`.
#[must_use]
pub fn map_key(key: &keyboard::Key) -> Option<Key> {
    use keyboard::key::Named;

    match key {
        keyboard::Key::Named(Named::ArrowRight) => Some(Key::ArrowRight),
        keyboard::Key::Named(Named::ArrowLeft) => Some(Key::ArrowLeft),
        keyboard::Key::Named(Named::Space) => Some(Key::Space),
        keyboard::Key::Named(Named::Escape) => Some(Key::Escape),
        keyboard::Key::Character(text) if text.as_str() == " " => Some(Key::Space),
        keyboard::Key::Unidentified => None,
        _ => Some(Key::Other),
    }
}

/// Creates the frame tick subscription.
pub fn create_tick_subscription(active: bool, interval: Duration) -> Subscription<Message> {
    if active {
        time::every(interval).map(Message::Tick)
    } else {
        Subscription::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::keyboard::key::Named;

    #[test]
    fn navigation_keys_map_to_playback_keys() {
        assert_eq!(
            map_key(&keyboard::Key::Named(Named::ArrowRight)),
            Some(Key::ArrowRight)
        );
        assert_eq!(
            map_key(&keyboard::Key::Named(Named::Escape)),
            Some(Key::Escape)
        );
        assert_eq!(map_key(&keyboard::Key::Named(Named::Space)), Some(Key::Space));
    }

    #[test]
    fn other_keys_are_forwarded_as_other() {
        assert_eq!(
            map_key(&keyboard::Key::Character("a".into())),
            Some(Key::Other)
        );
        assert_eq!(map_key(&keyboard::Key::Unidentified), None);
    }

    #[test]
    fn mouse_left_button_maps_to_pointer() {
        assert!(matches!(
            map_mouse(mouse::Event::ButtonPressed(mouse::Button::Left)),
            Some(Message::PointerPressed)
        ));
        assert!(map_mouse(mouse::Event::ButtonPressed(mouse::Button::Right)).is_none());
    }
}
