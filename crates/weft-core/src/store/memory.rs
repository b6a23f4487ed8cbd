//! In-memory event store with happens-before traversal.
//!
//! [`MemoryStore`] indexes events by id for O(1) lookup and keeps
//! bidirectional predecessor/successor links per event.
//!
//! # Construction
//!
//! The store is built incrementally via [`MemoryStore::insert`] and
//! [`MemoryStore::link`]. Events and edges can arrive in any order: an edge
//! whose endpoints are not both present yet is parked and resolved when the
//! missing event arrives.
//!
//! # Deduplication
//!
//! Duplicate events (same id) and duplicate edges (same source and target)
//! are silently skipped, so replaying an ingest is harmless.

use std::collections::HashMap;

use crate::event::{Event, EventId};

use super::EventStore;

// ---------------------------------------------------------------------------
// StoredNode
// ---------------------------------------------------------------------------

/// An event plus its bidirectional happens-before links.
#[derive(Debug, Clone)]
struct StoredNode {
    event: Event,
    /// Ids of direct causal predecessors.
    parents: Vec<EventId>,
    /// Ids of direct causal successors.
    children: Vec<EventId>,
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-memory happens-before graph of events, indexed by event id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: HashMap<EventId, StoredNode>,
    /// Edges whose endpoints were not both present at link time.
    parked_edges: Vec<(EventId, EventId)>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the store holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if the store contains an event with the given id.
    #[must_use]
    pub fn contains(&self, id: &EventId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert an event. A duplicate id is silently skipped.
    ///
    /// Any parked edges naming this event are resolved.
    pub fn insert(&mut self, event: Event) {
        if self.nodes.contains_key(&event.id) {
            return;
        }

        let id = event.id.clone();
        self.nodes.insert(
            id.clone(),
            StoredNode {
                event,
                parents: Vec::new(),
                children: Vec::new(),
            },
        );

        let ready: Vec<(EventId, EventId)> = {
            let (ready, parked) = std::mem::take(&mut self.parked_edges)
                .into_iter()
                .partition(|(from, to)| from == &id || to == &id);
            self.parked_edges = parked;
            ready
        };
        for (from, to) in ready {
            self.link(&from, &to);
        }
    }

    /// Record a happens-before edge `from → to`.
    ///
    /// Self-loops and duplicate edges are skipped. If either endpoint has not
    /// been inserted yet, the edge is parked until it arrives.
    pub fn link(&mut self, from: &EventId, to: &EventId) {
        if from == to {
            return;
        }
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            self.parked_edges.push((from.clone(), to.clone()));
            return;
        }

        if let Some(node) = self.nodes.get_mut(from) {
            if node.children.contains(to) {
                return;
            }
            node.children.push(to.clone());
        }
        if let Some(node) = self.nodes.get_mut(to) {
            node.parents.push(from.clone());
        }
    }

    /// Direct causal predecessors of `id`.
    #[must_use]
    pub fn predecessors(&self, id: &EventId) -> Vec<EventId> {
        self.nodes
            .get(id)
            .map(|node| node.parents.clone())
            .unwrap_or_default()
    }
}

impl EventStore for MemoryStore {
    fn roots(&self) -> Vec<EventId> {
        let mut roots: Vec<EventId> = self
            .nodes
            .values()
            .filter(|node| node.parents.is_empty())
            .map(|node| node.event.id.clone())
            .collect();
        // Sorted for deterministic traversal seeding; the final clocks do
        // not depend on it.
        roots.sort();
        roots
    }

    fn event_ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn successors(&self, id: &EventId) -> Vec<EventId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn in_degree(&self, id: &EventId) -> usize {
        self.nodes.get(id).map_or(0, |node| node.parents.len())
    }

    fn get(&self, id: &EventId) -> Option<&Event> {
        self.nodes.get(id).map(|node| &node.event)
    }

    fn set_lamport_time(&mut self, id: &EventId, lamport: u64) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.event.lamport_time = Some(lamport);
        }
    }

    fn set_vector_time(&mut self, id: &EventId, encoded: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.event.vector_time = Some(encoded.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_chain(ids: &[&str], timeline: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        for id in ids {
            store.insert(Event::new(*id, timeline));
        }
        for pair in ids.windows(2) {
            store.link(&EventId::from(pair[0]), &EventId::from(pair[1]));
        }
        store
    }

    #[test]
    fn empty_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(store.roots().is_empty());
        assert!(store.event_ids().is_empty());
    }

    #[test]
    fn linear_chain_links() {
        let store = store_with_chain(&["a", "b", "c"], "t1");

        assert_eq!(store.len(), 3);
        assert_eq!(store.roots(), vec![EventId::from("a")]);
        assert_eq!(store.successors(&EventId::from("a")), vec![EventId::from("b")]);
        assert_eq!(store.predecessors(&EventId::from("b")), vec![EventId::from("a")]);
        assert_eq!(store.in_degree(&EventId::from("a")), 0);
        assert_eq!(store.in_degree(&EventId::from("c")), 1);
    }

    #[test]
    fn convergent_edges_raise_in_degree() {
        let mut store = MemoryStore::new();
        store.insert(Event::new("left", "t1"));
        store.insert(Event::new("right", "t2"));
        store.insert(Event::new("join", "t1"));
        store.link(&EventId::from("left"), &EventId::from("join"));
        store.link(&EventId::from("right"), &EventId::from("join"));

        assert_eq!(store.in_degree(&EventId::from("join")), 2);
        assert_eq!(store.roots().len(), 2);
    }

    #[test]
    fn duplicate_insert_and_link_are_noops() {
        let mut store = MemoryStore::new();
        store.insert(Event::new("a", "t1"));
        store.insert(Event::new("a", "t1"));
        store.insert(Event::new("b", "t1"));
        store.link(&EventId::from("a"), &EventId::from("b"));
        store.link(&EventId::from("a"), &EventId::from("b"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.in_degree(&EventId::from("b")), 1);
    }

    #[test]
    fn self_loop_is_ignored() {
        let mut store = MemoryStore::new();
        store.insert(Event::new("a", "t1"));
        store.link(&EventId::from("a"), &EventId::from("a"));

        assert_eq!(store.in_degree(&EventId::from("a")), 0);
        assert_eq!(store.roots(), vec![EventId::from("a")]);
    }

    #[test]
    fn out_of_order_link_resolves_on_insert() {
        let mut store = MemoryStore::new();
        store.link(&EventId::from("a"), &EventId::from("b"));
        store.insert(Event::new("b", "t1"));
        store.insert(Event::new("a", "t1"));

        assert_eq!(store.successors(&EventId::from("a")), vec![EventId::from("b")]);
        assert_eq!(store.in_degree(&EventId::from("b")), 1);
        assert_eq!(store.roots(), vec![EventId::from("a")]);
    }

    #[test]
    fn timestamp_writes_land_on_the_event() {
        let mut store = MemoryStore::new();
        store.insert(Event::new("a", "t1"));

        store.set_lamport_time(&EventId::from("a"), 4);
        store.set_vector_time(&EventId::from("a"), r#"{"t1":4}"#);

        let event = store.get(&EventId::from("a")).expect("event");
        assert_eq!(event.lamport_time, Some(4));
        assert_eq!(event.vector_time.as_deref(), Some(r#"{"t1":4}"#));
    }

    #[test]
    fn lamport_range_scan_skips_unassigned_events() {
        let mut store = store_with_chain(&["a", "b", "c"], "t1");
        store.set_lamport_time(&EventId::from("a"), 1);
        store.set_lamport_time(&EventId::from("b"), 2);
        // "c" never assigned.

        let hits = store.events_in_lamport_range(1, 5);
        assert_eq!(hits, vec![EventId::from("a"), EventId::from("b")]);

        let hits = store.events_in_lamport_range(2, 2);
        assert_eq!(hits, vec![EventId::from("b")]);
    }
}
