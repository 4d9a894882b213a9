// SPDX-License-Identifier: MPL-2.0
//! In-memory playback journal.
//!
//! A memory-bounded ring buffer of timestamped playback events. The oldest
//! entries are evicted once capacity is reached.

use super::timeline::Direction;
use super::CloseReason;
use crate::domain::JournalCapacity;
use crate::media::MediaToken;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A generic circular buffer with fixed capacity.
///
/// When the buffer is full, pushing a new element evicts the oldest one.
/// Elements are stored in chronological order (oldest first).
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    /// Creates a buffer holding at most `capacity` elements (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes an element, evicting the oldest if at capacity.
    pub fn push(&mut self, item: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(item);
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Something that happened during a viewing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Opened { index: usize, items: usize },
    Entered { index: usize, direction: Direction },
    Replayed { index: usize },
    Ready { index: usize, failed: bool },
    Paused { index: usize },
    Resumed { index: usize },
    AutoAdvanced { index: usize },
    FailedItemSkipped { index: usize },
    MediaEnded { index: usize },
    StaleMediaEvent { token: MediaToken },
    ReducedMotionChanged { enabled: bool },
    Closed { reason: CloseReason },
}

/// A journal event and when it happened, relative to session open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub at: Duration,
    pub event: PlaybackEvent,
}

/// Bounded log of playback events.
#[derive(Debug, Clone)]
pub struct Journal {
    opened_at: Instant,
    entries: CircularBuffer<JournalEntry>,
}

impl Journal {
    #[must_use]
    pub fn new(capacity: JournalCapacity, opened_at: Instant) -> Self {
        Self {
            opened_at,
            entries: CircularBuffer::with_capacity(capacity.value()),
        }
    }

    /// Appends an event that happened at `now`.
    pub fn record(&mut self, now: Instant, event: PlaybackEvent) {
        self.entries.push(JournalEntry {
            at: now.saturating_duration_since(self.opened_at),
            event,
        });
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    /// Iterates over the events only, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &PlaybackEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_buffer_overflow_evicts_oldest() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_capacity(3);
        for value in 1..=5 {
            buffer.push(value);
        }
        let items: Vec<_> = buffer.iter().copied().collect();
        assert_eq!(items, vec![3, 4, 5]);
    }

    #[test]
    fn circular_buffer_zero_capacity_becomes_one() {
        let mut buffer: CircularBuffer<i32> = CircularBuffer::with_capacity(0);
        buffer.push(1);
        buffer.push(2);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![2]);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn journal_records_relative_time() {
        let t0 = Instant::now();
        let mut journal = Journal::new(JournalCapacity::default(), t0);
        journal.record(t0, PlaybackEvent::Opened { index: 0, items: 2 });
        journal.record(
            t0 + Duration::from_millis(40),
            PlaybackEvent::Paused { index: 0 },
        );

        let entries: Vec<_> = journal.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].at, Duration::ZERO);
        assert_eq!(entries[1].at, Duration::from_millis(40));
        assert_eq!(entries[1].event, PlaybackEvent::Paused { index: 0 });
    }

    #[test]
    fn journal_is_bounded() {
        let t0 = Instant::now();
        let capacity = JournalCapacity::new(0);
        let mut journal = Journal::new(capacity, t0);
        for index in 0..(capacity.value() + 10) {
            journal.record(t0, PlaybackEvent::Ready { index, failed: false });
        }
        assert_eq!(journal.len(), capacity.value());
        assert_eq!(
            journal.events().next(),
            Some(&PlaybackEvent::Ready {
                index: 10,
                failed: false
            })
        );
    }
}
