//! Causal range queries: which events lie on causal paths between two
//! endpoints.
//!
//! # Candidate selection
//!
//! The Lamport window `[from, to]` is a cheap necessary-but-not-sufficient
//! pre-filter: Lamport time is a total order consistent with, but coarser
//! than, the causal partial order. Exact membership is then decided by
//! vector-clock containment
//! ([`VectorClock::within_causal_path`]), which
//! rejects concurrent siblings that happen to share the Lamport window.
//!
//! # Scoped re-assignment
//!
//! [`causal_graph`] additionally rebuilds the join-barrier walk of
//! [`super::assign`] over the subgraph induced by the surviving candidates,
//! starting from the `from` endpoint only. The clocks it computes live on
//! ephemeral [`CausalNode`] values returned to the caller; the globally
//! assigned timestamps in the store are never overwritten.
//!
//! In only-matching mode the walk withholds the clock tick from every node
//! that is not a `LOG` event on an allowed host, collapsing the causal
//! contribution of intermediate events into the merged clock without letting
//! them consume a tick of their own. An empty host allow-list matches no
//! host, so no node ticks at all.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::clock::VectorClock;
use crate::error::CausalityError;
use crate::event::{Event, EventId, LOG_LABEL};
use crate::stats::ExecutionStats;
use crate::store::EventStore;

use super::{assigned_times, lookup, timeline_of};

// ---------------------------------------------------------------------------
// CausalNode
// ---------------------------------------------------------------------------

/// An event surviving a causal range query, paired with the query-scoped
/// timestamps the scoped re-assignment computed for it.
///
/// The timestamps are `None` when the walk never reached the event (it
/// survived filtering but lies on no path out of the `from` endpoint inside
/// the induced subgraph). `CausalNode`s are ephemeral query results; nothing
/// here is written back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalNode {
    /// The surviving event.
    pub id: EventId,
    /// Query-scoped Lamport time.
    pub lamport_time: Option<u64>,
    /// Query-scoped vector clock.
    pub vector_time: Option<VectorClock>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// The events causally between `from` and `to`, inclusive of both endpoints,
/// in id order.
///
/// Pass a collector to have the call recorded under `"causal_nodes"`.
///
/// # Errors
///
/// [`CausalityError::MissingTimestamp`] when an endpoint or a candidate in
/// the Lamport window was never assigned, [`CausalityError::MalformedClock`]
/// when a stored clock does not parse, [`CausalityError::EventNotFound`] for
/// an unknown endpoint.
pub fn causal_nodes(
    store: &impl EventStore,
    from: &EventId,
    to: &EventId,
    stats: Option<&mut ExecutionStats>,
) -> Result<Vec<EventId>, CausalityError> {
    let started = Instant::now();
    let result = collect_members(store, from, to);
    if let Some(stats) = stats {
        stats.record("causal_nodes", started.elapsed());
    }
    result
}

/// The causally-between events together with query-scoped clocks from a
/// re-assignment over the induced subgraph, in id order.
///
/// With `only_logs = false` every surviving event is returned and every join
/// completion ticks. With `only_logs = true` only `LOG`-labelled events
/// passing the host allow-list receive ticks, and the result is restricted
/// to `LOG` events passing the same check, except that an empty allow-list
/// restricts the ticks (to nothing) but not the result set.
///
/// Pass a collector to have the call recorded under `"causal_graph"`.
///
/// # Errors
///
/// As for [`causal_nodes`], plus [`CausalityError::MissingTimelineId`] when
/// a surviving event lacks the timeline needed to key its scoped clock.
pub fn causal_graph(
    store: &impl EventStore,
    from: &EventId,
    to: &EventId,
    only_logs: bool,
    filter_hosts: &[String],
    stats: Option<&mut ExecutionStats>,
) -> Result<Vec<CausalNode>, CausalityError> {
    let started = Instant::now();
    let result = build_causal_graph(store, from, to, only_logs, filter_hosts);
    if let Some(stats) = stats {
        stats.record("causal_graph", started.elapsed());
    }
    result
}

fn collect_members(
    store: &impl EventStore,
    from: &EventId,
    to: &EventId,
) -> Result<Vec<EventId>, CausalityError> {
    let (from_lamport, from_clock) = assigned_times(store, from)?;
    let (to_lamport, to_clock) = assigned_times(store, to)?;

    let candidates = store.events_in_lamport_range(from_lamport, to_lamport);
    debug!(
        candidates = candidates.len(),
        from_lamport, to_lamport, "filtering Lamport-window candidates"
    );

    let mut members = Vec::new();
    for candidate in candidates {
        let (_, clock) = assigned_times(store, &candidate)?;
        if clock.within_causal_path(&from_clock, &to_clock) {
            members.push(candidate);
        }
    }
    members.sort();
    Ok(members)
}

fn build_causal_graph(
    store: &impl EventStore,
    from: &EventId,
    to: &EventId,
    only_logs: bool,
    filter_hosts: &[String],
) -> Result<Vec<CausalNode>, CausalityError> {
    let members = collect_members(store, from, to)?;
    let (graph, index_of) = induced_subgraph(store, &members);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        only_logs,
        "re-assigning clocks over induced subgraph"
    );

    let rule = if only_logs {
        TickRule::MatchingOnly {
            hosts: filter_hosts,
        }
    } else {
        TickRule::Always
    };

    // The from endpoint survives its own filter whenever the window is
    // non-empty; reversed endpoints yield an empty member set and no walk.
    let scoped = match index_of.get(from) {
        Some(&start) => scoped_assignment(store, &graph, start, &rule)?,
        None => HashMap::new(),
    };

    let mut results = Vec::with_capacity(members.len());
    for member in members {
        let event = lookup(store, &member)?;
        if only_logs && !returned_in_log_mode(event, filter_hosts) {
            continue;
        }
        let times = index_of.get(&member).and_then(|index| scoped.get(index));
        results.push(CausalNode {
            id: member,
            lamport_time: times.map(|(lamport, _)| *lamport),
            vector_time: times.map(|(_, clock)| clock.clone()),
        });
    }
    Ok(results)
}

/// Only `LOG` events are returned in only-matching mode; a non-empty host
/// allow-list additionally restricts them, while an empty one does not.
fn returned_in_log_mode(event: &Event, filter_hosts: &[String]) -> bool {
    if !event.has_label(LOG_LABEL) {
        return false;
    }
    filter_hosts.is_empty() || host_allowed(event, filter_hosts)
}

fn host_allowed(event: &Event, filter_hosts: &[String]) -> bool {
    event
        .host
        .as_deref()
        .is_some_and(|host| filter_hosts.iter().any(|allowed| allowed == host))
}

// ---------------------------------------------------------------------------
// Induced subgraph
// ---------------------------------------------------------------------------

/// The subgraph induced by `members`: an edge survives only when both of its
/// endpoints did.
fn induced_subgraph(
    store: &impl EventStore,
    members: &[EventId],
) -> (DiGraph<EventId, ()>, HashMap<EventId, NodeIndex>) {
    let member_set: HashSet<&EventId> = members.iter().collect();
    let mut graph = DiGraph::new();
    let mut index_of = HashMap::with_capacity(members.len());

    for member in members {
        index_of.insert(member.clone(), graph.add_node(member.clone()));
    }

    for member in members {
        for successor in store.successors(member) {
            if !member_set.contains(&successor) {
                continue;
            }
            if let (Some(&source), Some(&target)) =
                (index_of.get(member), index_of.get(&successor))
            {
                if !graph.contains_edge(source, target) {
                    graph.add_edge(source, target, ());
                }
            }
        }
    }

    (graph, index_of)
}

// ---------------------------------------------------------------------------
// Scoped assignment
// ---------------------------------------------------------------------------

/// When a node of the induced subgraph earns its own clock tick at join
/// completion.
enum TickRule<'a> {
    /// Every join completion ticks.
    Always,
    /// Only `LOG` events on an allowed host tick. An empty allow-list
    /// matches no host.
    MatchingOnly { hosts: &'a [String] },
}

impl TickRule<'_> {
    fn should_tick(&self, event: &Event) -> bool {
        match self {
            Self::Always => true,
            Self::MatchingOnly { hosts } => {
                event.has_label(LOG_LABEL) && host_allowed(event, hosts)
            }
        }
    }
}

/// The join-barrier walk of [`super::assign`], run over the induced subgraph
/// from the `start` node only, with clocks kept in a side table instead of
/// the store.
///
/// Nodes the walk never reaches are absent from the returned table. A node
/// denied its tick by the rule is still finalized (with the non-ticking
/// merge) and traversal continues past it.
fn scoped_assignment(
    store: &impl EventStore,
    graph: &DiGraph<EventId, ()>,
    start: NodeIndex,
    rule: &TickRule<'_>,
) -> Result<HashMap<NodeIndex, (u64, VectorClock)>, CausalityError> {
    let mut times: HashMap<NodeIndex, (u64, VectorClock)> = HashMap::new();
    let mut arrivals: HashMap<NodeIndex, usize> = HashMap::new();
    // Each entry carries the finalized timestamps of the edge's source.
    let mut queue: VecDeque<(u64, VectorClock, NodeIndex)> = VecDeque::new();

    // The start endpoint anchors the walk like a root, tick included,
    // whatever the rule says.
    let timeline = timeline_of(store, &graph[start])?;
    let mut clock = VectorClock::new(timeline);
    clock.increment();
    for successor in graph.neighbors_directed(start, Direction::Outgoing) {
        queue.push_back((1, clock.clone(), successor));
    }
    times.insert(start, (1, clock));

    while let Some((parent_lamport, parent_clock, current)) = queue.pop_front() {
        let current_id = &graph[current];
        let timeline = timeline_of(store, current_id)?;
        let parents = graph
            .neighbors_directed(current, Direction::Incoming)
            .count();

        let seen = arrivals.entry(current).or_insert(0);
        *seen += 1;
        let arrived = *seen;

        let (mut lamport, mut clock) = times
            .get(&current)
            .cloned()
            .unwrap_or_else(|| (1, VectorClock::new(timeline)));

        if arrived == parents {
            arrivals.remove(&current);
            if rule.should_tick(lookup(store, current_id)?) {
                clock.merge(&parent_clock);
                lamport = lamport.max(parent_lamport) + 1;
            } else {
                clock.merge_without_increment(&parent_clock);
                lamport = lamport.max(parent_lamport);
            }
            for successor in graph.neighbors_directed(current, Direction::Outgoing) {
                queue.push_back((lamport, clock.clone(), successor));
            }
            times.insert(current, (lamport, clock));
        } else {
            clock.merge_without_increment(&parent_clock);
            lamport = lamport.max(parent_lamport);
            times.insert(current, (lamport, clock));
        }
    }

    Ok(times)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
