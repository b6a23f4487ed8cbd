//! Storage capability consumed by the causality core.
//!
//! The core does not own events. It reads the happens-before graph and
//! reads/writes the two timestamp properties through [`EventStore`], so any
//! engine satisfying the trait (the bundled in-memory graph, an embedded
//! store, a remote service) is interchangeable.
//!
//! All methods are synchronous and are assumed to observe one consistent
//! snapshot of the graph for the duration of a run. Isolation against
//! concurrent writers is the store's responsibility, not the core's.

pub mod memory;

pub use memory::MemoryStore;

use crate::event::{Event, EventId};

/// Persisted property name for the scalar logical time.
pub const LAMPORT_TIME_PROPERTY: &str = "lamportLogicalTime";

/// Persisted property name for the serialized vector time.
pub const VECTOR_TIME_PROPERTY: &str = "vectorLogicalTime";

/// Read/write access to one consistent snapshot of the event graph.
pub trait EventStore {
    /// Events with no incoming happens-before edge.
    fn roots(&self) -> Vec<EventId>;

    /// Every event id in the snapshot.
    fn event_ids(&self) -> Vec<EventId>;

    /// Direct causal successors of `id`: the targets of its outgoing edges.
    fn successors(&self, id: &EventId) -> Vec<EventId>;

    /// Total number of direct causal predecessors of `id`.
    fn in_degree(&self, id: &EventId) -> usize;

    /// Look up an event record.
    fn get(&self, id: &EventId) -> Option<&Event>;

    /// Persist the scalar logical time of `id`.
    fn set_lamport_time(&mut self, id: &EventId, lamport: u64);

    /// Persist the serialized vector time of `id`.
    fn set_vector_time(&mut self, id: &EventId, encoded: &str);

    /// Events whose assigned Lamport time lies in `lo..=hi`.
    ///
    /// Events that have not been assigned a Lamport time are never returned.
    /// The default implementation scans [`event_ids`](Self::event_ids);
    /// stores with an index on the property should override it.
    fn events_in_lamport_range(&self, lo: u64, hi: u64) -> Vec<EventId> {
        self.event_ids()
            .into_iter()
            .filter(|id| {
                self.get(id)
                    .and_then(|event| event.lamport_time)
                    .is_some_and(|lamport| lamport >= lo && lamport <= hi)
            })
            .collect()
    }
}
