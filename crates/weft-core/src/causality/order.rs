//! The happens-before predicate on assigned clocks.

use std::time::Instant;

use crate::error::CausalityError;
use crate::event::EventId;
use crate::stats::ExecutionStats;
use crate::store::EventStore;

use super::assigned_times;

/// Returns `true` iff `from` causally precedes `to`, by strict vector-clock
/// dominance on the stored timestamps.
///
/// Two concurrent events compare `false` in both directions; so do equal
/// clocks. Pass a collector to have the call recorded under
/// `"happens_before"`.
///
/// # Errors
///
/// [`CausalityError::MissingTimestamp`] when either event has not been
/// through clock assignment, [`CausalityError::MalformedClock`] when a
/// stored clock does not parse, [`CausalityError::EventNotFound`] for an
/// unknown id.
pub fn happens_before(
    store: &impl EventStore,
    from: &EventId,
    to: &EventId,
    stats: Option<&mut ExecutionStats>,
) -> Result<bool, CausalityError> {
    let started = Instant::now();
    let result = check(store, from, to);
    if let Some(stats) = stats {
        stats.record("happens_before", started.elapsed());
    }
    result
}

fn check(
    store: &impl EventStore,
    from: &EventId,
    to: &EventId,
) -> Result<bool, CausalityError> {
    let (_, from_clock) = assigned_times(store, from)?;
    let (_, to_clock) = assigned_times(store, to)?;
    Ok(from_clock.less_than(&to_clock))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
