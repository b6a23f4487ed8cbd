//! Causal-order computations over the happens-before DAG.
//!
//! # Sub-modules
//!
//! - [`assign`]: whole-graph clock assignment with a join barrier.
//!   ([`assign::annotate_logical_time`])
//! - [`range`]: causally-between queries, with an optional query-scoped
//!   re-assignment over the induced subgraph.
//!   ([`range::causal_nodes`], [`range::causal_graph`])
//! - [`order`]: the happens-before predicate on assigned clocks.
//!   ([`order::happens_before`])

pub mod assign;
pub mod order;
pub mod range;

use crate::clock::VectorClock;
use crate::clock::serde::decode_vector_time;
use crate::error::CausalityError;
use crate::event::{Event, EventId};
use crate::store::EventStore;

/// Look up an event, failing with the id of the missing record.
pub(crate) fn lookup<'a>(
    store: &'a impl EventStore,
    id: &EventId,
) -> Result<&'a Event, CausalityError> {
    store.get(id).ok_or_else(|| CausalityError::EventNotFound {
        event: id.clone(),
    })
}

/// The timeline an event's own clock ticks for.
pub(crate) fn timeline_of(
    store: &impl EventStore,
    id: &EventId,
) -> Result<String, CausalityError> {
    lookup(store, id)?
        .timeline
        .clone()
        .ok_or_else(|| CausalityError::MissingTimelineId {
            event: id.clone(),
        })
}

/// Both assigned timestamps of an event, decoded.
///
/// Fails with [`CausalityError::MissingTimestamp`] when the event never went
/// through assignment, and [`CausalityError::MalformedClock`] when the stored
/// vector time does not parse.
pub(crate) fn assigned_times(
    store: &impl EventStore,
    id: &EventId,
) -> Result<(u64, VectorClock), CausalityError> {
    let timeline = timeline_of(store, id)?;
    let event = lookup(store, id)?;

    let lamport = event
        .lamport_time
        .ok_or_else(|| CausalityError::MissingTimestamp {
            event: id.clone(),
        })?;
    let raw = event
        .vector_time
        .as_deref()
        .ok_or_else(|| CausalityError::MissingTimestamp {
            event: id.clone(),
        })?;

    let clock =
        decode_vector_time(&timeline, raw).map_err(|source| CausalityError::MalformedClock {
            event: id.clone(),
            source,
        })?;

    Ok((lamport, clock))
}
