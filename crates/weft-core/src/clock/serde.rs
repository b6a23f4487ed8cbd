//! Persisted vector-time codec.
//!
//! # Stored format
//!
//! `vectorLogicalTime` round-trips through a flat JSON object of timeline id
//! to non-negative integer counter:
//!
//! ```text
//! {"t1":2,"t2":0}
//! ```
//!
//! Key order is insignificant and omitted timelines read as 0, so readers
//! must treat omission as a designed default rather than an error. Any other
//! shape (a non-object, or a fractional, negative, or non-numeric value)
//! is a decode failure. The scalar `lamportLogicalTime` property is a plain
//! non-negative integer and needs no codec of its own.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::vector::VectorClock;

/// Errors from decoding a stored vector time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockCodecError {
    /// The stored value is not a flat map of non-negative integers.
    #[error("not a flat map of non-negative integers: {reason}")]
    Malformed {
        /// Parser diagnostic for the offending value.
        reason: String,
    },
}

/// Clocks serialize as their counter map; the owner tag is carried by the
/// event's own `timelineId` and is not part of the stored value.
impl Serialize for VectorClock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let counters = self.counters();
        let mut map = serializer.serialize_map(Some(counters.len()))?;
        for (timeline, counter) in counters {
            map.serialize_entry(timeline, counter)?;
        }
        map.end()
    }
}

/// Encode a clock as the persisted `vectorLogicalTime` string.
#[must_use]
pub fn encode_vector_time(clock: &VectorClock) -> String {
    serde_json::to_string(clock).expect("a string-to-integer map always serializes")
}

/// Decode a persisted `vectorLogicalTime` string into a clock owned by
/// `owner`.
///
/// # Errors
///
/// Returns [`ClockCodecError::Malformed`] when the stored value is not a
/// flat JSON object of non-negative integers.
pub fn decode_vector_time(owner: &str, raw: &str) -> Result<VectorClock, ClockCodecError> {
    let counters: BTreeMap<String, u64> =
        serde_json::from_str(raw).map_err(|err| ClockCodecError::Malformed {
            reason: err.to_string(),
        })?;

    Ok(VectorClock::from_counters(owner, counters))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
