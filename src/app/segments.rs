// SPDX-License-Identifier: MPL-2.0
//! Animated values for the progress segments.
//!
//! The engine reports target fills; this keeps, per segment, where an eased
//! move started so each frame can show the in-between value.

use crate::playback::{SegmentFill, SegmentTransition};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Track {
    from: f32,
    fill: SegmentFill,
    since: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct SegmentAnimator {
    tracks: Vec<Track>,
    shown: Vec<f32>,
}

impl SegmentAnimator {
    /// Values computed by the last [`SegmentAnimator::update`].
    #[must_use]
    pub fn shown(&self) -> &[f32] {
        &self.shown
    }

    /// Retargets the segments and recomputes the shown values at `now`.
    pub fn update(&mut self, fills: &[SegmentFill], now: Instant) {
        if self.tracks.len() != fills.len() {
            self.tracks = fills
                .iter()
                .map(|fill| Track {
                    from: fill.fraction,
                    fill: *fill,
                    since: now,
                })
                .collect();
        }

        for (track, fill) in self.tracks.iter_mut().zip(fills) {
            let retarget = match fill.transition {
                SegmentTransition::Snap => true,
                SegmentTransition::EaseOut(_) => track.fill.fraction != fill.fraction,
            };
            if retarget {
                let current = track
                    .fill
                    .displayed(track.from, now.saturating_duration_since(track.since));
                track.from = current;
                track.since = now;
            }
            track.fill = *fill;
        }

        self.shown = self
            .tracks
            .iter()
            .map(|track| {
                track
                    .fill
                    .displayed(track.from, now.saturating_duration_since(track.since))
            })
            .collect();
    }

    /// Returns true while some segment is still easing towards its fill.
    #[must_use]
    pub fn is_animating(&self, now: Instant) -> bool {
        self.tracks.iter().any(|track| match track.fill.transition {
            SegmentTransition::Snap => false,
            SegmentTransition::EaseOut(total) => {
                now.saturating_duration_since(track.since) < total
                    && track.from != track.fill.fraction
            }
        })
    }
}
