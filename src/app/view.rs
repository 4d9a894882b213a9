// SPDX-License-Identifier: MPL-2.0
//! View rendering for the story viewer.
//!
//! The screen is a stack: the current item fills the window, with the
//! progress segments, header and caption layered on top.

use super::media_host::Presentation;
use super::Message;
use crate::domain::{ItemKind, Story, StoryItem};
use chrono::{DateTime, Utc};
use iced::widget::{button, container, image, progress_bar, text, Column, Row, Space, Stack};
use iced::{Alignment, ContentFit, Element, Length};

const SEGMENT_SPACING: f32 = 4.0;
const OVERLAY_PADDING: f32 = 12.0;
const TEXT_ITEM_SIZE: f32 = 32.0;
const HEADER_SIZE: f32 = 16.0;
const CAPTION_SIZE: f32 = 18.0;
const AVATAR_SIZE: f32 = 32.0;

/// Everything the view needs from the application state.
pub struct ViewContext<'a> {
    pub story: &'a Story,
    pub avatar: Option<&'a image::Handle>,
    pub item: Option<&'a StoryItem>,
    pub segments: &'a [f32],
    pub presentation: &'a Presentation,
    pub is_paused: bool,
    pub is_ready: bool,
    pub now: DateTime<Utc>,
}

/// Renders the viewer.
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let base = container(view_item(ctx.item, ctx.presentation))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill);

    let mut overlay = Column::new()
        .spacing(8.0)
        .padding(OVERLAY_PADDING)
        .width(Length::Fill)
        .height(Length::Fill)
        .push(view_segments(ctx.segments))
        .push(view_header(ctx.story, ctx.avatar, ctx.item, ctx.now));

    if ctx.is_paused {
        overlay = overlay.push(
            container(text("Paused").size(HEADER_SIZE))
                .center_x(Length::Fill)
                .padding(8.0),
        );
    } else if !ctx.is_ready {
        overlay = overlay.push(
            container(text("Loading…").size(HEADER_SIZE))
                .center_x(Length::Fill)
                .padding(8.0),
        );
    }

    overlay = overlay.push(Space::new().height(Length::Fill));
    if let Some(caption) = ctx.item.and_then(StoryItem::caption) {
        overlay = overlay.push(
            container(text(caption).size(CAPTION_SIZE))
                .center_x(Length::Fill)
                .padding(8.0),
        );
    }

    Stack::new().push(base).push(overlay).into()
}

fn view_segments(values: &[f32]) -> Element<'_, Message> {
    values
        .iter()
        .fold(Row::new().spacing(SEGMENT_SPACING), |row, value| {
            row.push(progress_bar(0.0..=1.0, *value))
        })
        .width(Length::Fill)
        .into()
}

fn view_header<'a>(
    story: &'a Story,
    avatar: Option<&'a image::Handle>,
    item: Option<&'a StoryItem>,
    now: DateTime<Utc>,
) -> Element<'a, Message> {
    let mut header = Row::new().spacing(8.0).align_y(Alignment::Center);
    if let Some(handle) = avatar {
        header = header.push(
            image(handle.clone())
                .content_fit(ContentFit::Cover)
                .width(AVATAR_SIZE)
                .height(AVATAR_SIZE),
        );
    }
    header = header.push(text(story.user_name.as_str()).size(HEADER_SIZE));
    if let Some(timestamp) = item.and_then(|item| item.timestamp) {
        header = header.push(text(format_timestamp(timestamp, now)).size(HEADER_SIZE));
    }
    header
        .push(Space::new().width(Length::Fill))
        .push(text(story.item_count_label()).size(HEADER_SIZE))
        .push(
            button(text("×").size(HEADER_SIZE))
                .style(button::text)
                .on_press(Message::CloseButtonPressed),
        )
        .into()
}

fn view_item<'a>(item: Option<&'a StoryItem>, presentation: &'a Presentation) -> Element<'a, Message> {
    let Some(item) = item else {
        return Space::new().into();
    };

    match (item.kind, presentation) {
        (ItemKind::Text, _) => text(item.text.as_deref().unwrap_or_default())
            .size(TEXT_ITEM_SIZE)
            .into(),
        (_, Presentation::Image(data)) | (_, Presentation::Video(Some(data))) => {
            image(data.handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        }
        (_, Presentation::Video(None)) => text("▶").size(TEXT_ITEM_SIZE).into(),
        (_, Presentation::Failed(err)) => text(format!("Could not load media: {err}")).into(),
        (_, Presentation::Loading | Presentation::Empty) => Space::new().into(),
    }
}

/// Formats a post time relative to `now`: "just now", minutes and hours
/// up to a day, then the calendar date.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h", age.num_hours())
    } else {
        timestamp.format("%b %-d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0)
            .single()
            .expect("valid date")
    }

    #[test]
    fn recent_posts_are_just_now() {
        let now = at(12, 0);
        assert_eq!(format_timestamp(now, now), "just now");
        // Clock skew puts the post in the future.
        assert_eq!(format_timestamp(now + Duration::minutes(3), now), "just now");
    }

    #[test]
    fn minutes_then_hours() {
        let now = at(12, 0);
        assert_eq!(format_timestamp(at(11, 35), now), "25m");
        assert_eq!(format_timestamp(at(7, 0), now), "5h");
    }

    #[test]
    fn older_posts_show_the_date() {
        let now = at(12, 0) + Duration::days(3);
        assert_eq!(format_timestamp(at(6, 30), now), "May 1");
    }
}
