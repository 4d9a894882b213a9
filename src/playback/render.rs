// SPDX-License-Identifier: MPL-2.0
//! Progress segment rendering.
//!
//! A pure mapping from the active index and its progress to one fill per
//! item. Segments before the active one are full, segments after it are
//! empty. The active segment follows progress exactly, without animation;
//! the others ease into their new value.

use std::time::Duration;

/// Duration of the eased fill used for non-active segments.
pub const SEGMENT_EASE_DURATION: Duration = Duration::from_millis(300);

/// How a segment moves to a new fill value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentTransition {
    /// Jump to the value.
    Snap,
    /// Ease out over the given duration.
    EaseOut(Duration),
}

/// Fill of one progress segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFill {
    pub fraction: f32,
    pub transition: SegmentTransition,
}

impl SegmentFill {
    /// Value shown `since` after the segment started moving from `from`
    /// towards this fill.
    #[must_use]
    pub fn displayed(&self, from: f32, since: Duration) -> f32 {
        match self.transition {
            SegmentTransition::Snap => self.fraction,
            SegmentTransition::EaseOut(total) => {
                if total.is_zero() || since >= total {
                    return self.fraction;
                }
                let t = since.as_secs_f32() / total.as_secs_f32();
                from + (self.fraction - from) * ease_out(t)
            }
        }
    }
}

/// Cubic ease-out on `t` in `[0, 1]`.
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Fill for the segment at `index`.
#[must_use]
pub fn segment_fill(index: usize, active_index: usize, progress: f32) -> SegmentFill {
    use std::cmp::Ordering;

    match index.cmp(&active_index) {
        Ordering::Less => SegmentFill {
            fraction: 1.0,
            transition: SegmentTransition::EaseOut(SEGMENT_EASE_DURATION),
        },
        Ordering::Equal => SegmentFill {
            fraction: progress.clamp(0.0, 1.0),
            transition: SegmentTransition::Snap,
        },
        Ordering::Greater => SegmentFill {
            fraction: 0.0,
            transition: SegmentTransition::EaseOut(SEGMENT_EASE_DURATION),
        },
    }
}

/// Fills for all `len` segments.
#[must_use]
pub fn segment_fills(len: usize, active_index: usize, progress: f32) -> Vec<SegmentFill> {
    (0..len)
        .map(|index| segment_fill(index, active_index, progress))
        .collect()
}
