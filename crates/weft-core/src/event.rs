//! Event records as seen by the causality core.
//!
//! Events are created and owned by the backing store before any clock
//! assignment runs. The core reads every field but writes only the two
//! timestamp fields, and only through [`crate::store::EventStore`].

use std::collections::BTreeSet;
use std::fmt;

/// Label carried by events that produce log output. In only-matching range
/// queries, only events with this label (and an allowed host) receive their
/// own clock tick.
pub const LOG_LABEL: &str = "LOG";

// ---------------------------------------------------------------------------
// EventId
// ---------------------------------------------------------------------------

/// Stable identity of an event, assigned by the trace recorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(String);

impl EventId {
    /// Wrap a recorder-assigned identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// One recorded event of a distributed execution trace.
///
/// `timeline` identifies the thread/process the event belongs to; it keys the
/// event's own counter in its vector clock. `host` is an optional grouping
/// key used by host-filtered range queries. Both timestamp fields start out
/// absent and are filled in by [`crate::causality::assign::annotate_logical_time`].
#[derive(Debug, Clone)]
pub struct Event {
    /// Stable identity.
    pub id: EventId,
    /// Execution timeline (thread/process). Required for clock assignment;
    /// an event without one aborts the run.
    pub timeline: Option<String>,
    /// Machine that recorded the event.
    pub host: Option<String>,
    /// Kind tags. [`LOG_LABEL`] is significant for filtered queries.
    pub labels: BTreeSet<String>,
    /// Scalar logical time, absent until assigned.
    pub lamport_time: Option<u64>,
    /// Vector logical time in its persisted serialized form
    /// (see [`crate::clock::serde`]), absent until assigned.
    pub vector_time: Option<String>,
}

impl Event {
    /// Create an event on the given timeline with no labels or timestamps.
    pub fn new(id: impl Into<EventId>, timeline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timeline: Some(timeline.into()),
            host: None,
            labels: BTreeSet::new(),
            lamport_time: None,
            vector_time: None,
        }
    }

    /// Attach a host grouping key.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Attach a kind tag.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    /// Returns `true` if the event carries the given kind tag.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
