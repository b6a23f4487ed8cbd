//! End-to-end clock assignment over a woven multi-timeline trace.
//!
//! The fixture models a client/server execution: three timelines of four
//! events each, cross-linked by six happens-before edges (spawns, a
//! send/receive pair, and joins), plus a fourth, fully disconnected timeline
//! with a single event.
//!
//! ```text
//! t1:  a1 → a2 → a3 → a4
//! t2:  b1 → b2 → b3 → b4
//! t3:  c1 → c2 → c3 → c4
//! t4:  d1
//!
//! cross: a1→b1, a2→c1, b3→c3, b4→a4, c2→b2, c4→a3
//! ```

use weft_core::{Event, EventId, EventStore, MemoryStore, VectorClock, annotate_logical_time};

fn id(raw: &str) -> EventId {
    EventId::from(raw)
}

fn client_server_trace() -> MemoryStore {
    let mut store = MemoryStore::new();
    for (timeline, ids) in [
        ("t1", ["a1", "a2", "a3", "a4"]),
        ("t2", ["b1", "b2", "b3", "b4"]),
        ("t3", ["c1", "c2", "c3", "c4"]),
    ] {
        for raw in ids {
            store.insert(Event::new(raw, timeline));
        }
        for pair in ids.windows(2) {
            store.link(&id(pair[0]), &id(pair[1]));
        }
    }
    store.insert(Event::new("d1", "t4"));

    for (from, to) in [
        ("a1", "b1"),
        ("a2", "c1"),
        ("b3", "c3"),
        ("b4", "a4"),
        ("c2", "b2"),
        ("c4", "a3"),
    ] {
        store.link(&id(from), &id(to));
    }
    store
}

fn annotated_trace() -> MemoryStore {
    let mut store = client_server_trace();
    annotate_logical_time(&mut store, None).expect("annotate");
    store
}

fn times(store: &MemoryStore, raw: &str) -> (u64, VectorClock) {
    let event = store.get(&id(raw)).expect("event");
    let lamport = event.lamport_time.expect("lamport assigned");
    let encoded = event.vector_time.as_deref().expect("vector assigned");
    let clock = weft_core::clock::serde::decode_vector_time(
        event.timeline.as_deref().expect("timeline"),
        encoded,
    )
    .expect("stored clock parses");
    (lamport, clock)
}

fn assert_clock(clock: &VectorClock, expected: &[(&str, u64)]) {
    for (timeline, counter) in expected {
        assert_eq!(
            clock.get(timeline),
            *counter,
            "counter for {timeline} in {clock}"
        );
    }
}

// ---------------------------------------------------------------------------
// Exact clocks
// ---------------------------------------------------------------------------

#[test]
fn first_event_of_a_timeline_gets_a_unit_clock() {
    let store = annotated_trace();
    let (lamport, clock) = times(&store, "a1");

    assert_eq!(lamport, 1);
    assert_clock(&clock, &[("t1", 1), ("t2", 0), ("t3", 0)]);
}

#[test]
fn receive_side_of_the_trace_accumulates_all_senders() {
    let store = annotated_trace();
    let (lamport, clock) = times(&store, "c4");

    assert_eq!(lamport, 8);
    assert_clock(&clock, &[("t1", 2), ("t2", 3), ("t3", 4)]);
}

#[test]
fn final_join_sees_every_timeline() {
    let store = annotated_trace();
    let (lamport, clock) = times(&store, "a4");

    assert_eq!(lamport, 10);
    assert_clock(&clock, &[("t1", 4), ("t2", 4), ("t3", 4)]);
}

#[test]
fn disconnected_timeline_is_unaffected_by_the_rest() {
    let store = annotated_trace();
    let (lamport, clock) = times(&store, "d1");

    assert_eq!(lamport, 1);
    assert_clock(&clock, &[("t1", 0), ("t2", 0), ("t3", 0), ("t4", 1)]);
}

#[test]
fn every_lamport_time_matches_the_trace() {
    let store = annotated_trace();
    let expected = [
        ("a1", 1),
        ("a2", 2),
        ("a3", 9),
        ("a4", 10),
        ("b1", 2),
        ("b2", 5),
        ("b3", 6),
        ("b4", 7),
        ("c1", 3),
        ("c2", 4),
        ("c3", 7),
        ("c4", 8),
        ("d1", 1),
    ];
    for (raw, lamport) in expected {
        assert_eq!(times(&store, raw).0, lamport, "lamport time of {raw}");
    }
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn every_event_dominates_its_predecessors() {
    let store = annotated_trace();
    for event_id in store.event_ids() {
        let (lamport, clock) = times(&store, event_id.as_str());
        for parent in store.predecessors(&event_id) {
            let (parent_lamport, parent_clock) = times(&store, parent.as_str());
            assert!(
                parent_clock.less_than(&clock),
                "{parent} must precede {event_id}"
            );
            assert!(
                lamport >= parent_lamport + 1,
                "{event_id} must out-count {parent}"
            );
        }
    }
}

#[test]
fn result_is_independent_of_ingest_order() {
    let reference = annotated_trace();

    // Same trace, events and edges fed in reverse.
    let mut reversed = MemoryStore::new();
    let mut edges = vec![
        ("a1", "b1"),
        ("a2", "c1"),
        ("b3", "c3"),
        ("b4", "a4"),
        ("c2", "b2"),
        ("c4", "a3"),
        ("a1", "a2"),
        ("a2", "a3"),
        ("a3", "a4"),
        ("b1", "b2"),
        ("b2", "b3"),
        ("b3", "b4"),
        ("c1", "c2"),
        ("c2", "c3"),
        ("c3", "c4"),
    ];
    edges.reverse();
    for (from, to) in edges {
        reversed.link(&id(from), &id(to));
    }
    for (timeline, ids) in [
        ("t4", vec!["d1"]),
        ("t3", vec!["c4", "c3", "c2", "c1"]),
        ("t2", vec!["b4", "b3", "b2", "b1"]),
        ("t1", vec!["a4", "a3", "a2", "a1"]),
    ] {
        for raw in ids {
            reversed.insert(Event::new(raw, timeline));
        }
    }
    annotate_logical_time(&mut reversed, None).expect("annotate");

    for event_id in reference.event_ids() {
        let expected = times(&reference, event_id.as_str());
        let actual = times(&reversed, event_id.as_str());
        assert_eq!(expected, actual, "timestamps of {event_id}");
    }
}
