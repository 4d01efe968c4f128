//! Bounded, sequenced in-memory event log.

use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use super::types::Event;
use crate::metrics::EVENTS_PUBLISHED;

/// Capacity used when a bus is constructed with zero capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 500;

#[derive(Debug, Default)]
struct BusState {
    next_seq: u64,
    events: VecDeque<Event>,
}

/// Stores the most recent events and serves incremental reads.
///
/// Sequence numbers start at 1 and increase by one per publish. Once the log
/// holds more than `capacity` events the oldest are dropped; readers that had
/// not consumed them yet never see them.
#[derive(Debug)]
pub struct EventBus {
    state: RwLock<BusState>,
    capacity: usize,
}

impl EventBus {
    /// Creates a bus retaining at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_EVENT_CAPACITY
        } else {
            capacity
        };
        Self {
            state: RwLock::new(BusState {
                next_seq: 0,
                events: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    /// Appends an event, assigning its sequence number and (if unset) timestamp.
    ///
    /// Returns the finalized event so callers can forward it to live subscribers.
    pub fn publish(&self, mut event: Event) -> Event {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        state.next_seq += 1;
        event.seq = state.next_seq;
        event.timestamp.get_or_insert_with(Utc::now);

        state.events.push_back(event.clone());
        while state.events.len() > self.capacity {
            state.events.pop_front();
        }

        EVENTS_PUBLISHED
            .with_label_values(&[event.event_type.as_str()])
            .inc();
        event
    }

    /// Returns retained events with a sequence strictly greater than `seq`.
    pub fn since(&self, seq: u64) -> Vec<Event> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let start = state.events.partition_point(|e| e.seq <= seq);
        state.events.range(start..).cloned().collect()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained events.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sequence number of the most recently published event (0 if none).
    pub fn last_seq(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .next_seq
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
