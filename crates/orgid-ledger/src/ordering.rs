use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::LedgerEvent;

/// Canonical position of a log: block number, then log index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventCursor {
    pub block: u64,
    pub log_index: u64,
}

impl EventCursor {
    pub fn new(block: u64, log_index: u64) -> Self {
        Self { block, log_index }
    }

    pub fn of(event: &LedgerEvent) -> Self {
        Self::new(event.block.number, event.log_index)
    }
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.block, self.log_index)
    }
}

/// How an event relates to what has already been processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Strictly after the cursor.
    Advanced,
    /// At or before the cursor: a replay or a reorg redelivering history.
    Redelivered { cursor: EventCursor },
}

/// Tracks the highest position seen in a delivered event stream.
///
/// The host delivers events in canonical order. A reorg or a restarted
/// replay can hand back a range that was already applied; handlers are
/// idempotent so such events are still processed, but the guard reports
/// them so the caller can count and log them.
#[derive(Clone, Debug, Default)]
pub struct OrderingGuard {
    cursor: Option<EventCursor>,
}

impl OrderingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously persisted cursor.
    pub fn resume_from(cursor: EventCursor) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    /// Highest position observed so far.
    pub fn cursor(&self) -> Option<EventCursor> {
        self.cursor
    }

    /// Record an event and classify its delivery.
    pub fn observe(&mut self, event: &LedgerEvent) -> Delivery {
        let position = EventCursor::of(event);
        match self.cursor {
            Some(cursor) if position <= cursor => {
                warn!(
                    event = %event,
                    cursor = %cursor,
                    "event at or before processed cursor; applying again"
                );
                Delivery::Redelivered { cursor }
            }
            _ => {
                self.cursor = Some(position);
                Delivery::Advanced
            }
        }
    }
}
