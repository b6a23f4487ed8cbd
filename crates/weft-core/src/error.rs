//! Error taxonomy for clock assignment and causal queries.

use crate::clock::serde::ClockCodecError;
use crate::event::EventId;

/// Failures surfaced by the assignment engine and the causal-order queries.
///
/// Every variant is fatal to the enclosing operation: there is no retry or
/// partial recovery inside the core, and values persisted before the failure
/// remain as written. The caller must fix the underlying record and re-invoke
/// the whole operation. Each variant names the offending event so the record
/// can be located.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CausalityError {
    /// A stored vector time could not be decoded.
    #[error("event {event}: malformed stored vector time: {source}")]
    MalformedClock {
        /// Event whose stored property failed to parse.
        event: EventId,
        /// Codec diagnostic.
        source: ClockCodecError,
    },

    /// The event lacks the timeline id needed to key its own clock.
    #[error("event {event} has no timeline id")]
    MissingTimelineId {
        /// Event without a timeline.
        event: EventId,
    },

    /// A query touched an event that never went through clock assignment.
    #[error("event {event} has no assigned logical timestamp")]
    MissingTimestamp {
        /// Event without timestamps.
        event: EventId,
    },

    /// A query endpoint does not exist in the store.
    #[error("event {event} not found in store")]
    EventNotFound {
        /// The unknown event id.
        event: EventId,
    },
}
