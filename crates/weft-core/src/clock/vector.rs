//! Per-timeline vector clocks and their partial order.
//!
//! A [`VectorClock`] maps timeline ids to counters and is conceptually
//! infinite-dimensional: a timeline the clock has never observed reads as 0.
//! Each clock is tagged with the timeline that owns it; [`VectorClock::increment`]
//! advances only the owner's counter.
//!
//! # Merge rules
//!
//! - [`merge_without_increment`](VectorClock::merge_without_increment) takes
//!   the component-wise maximum over the key union. It is used for partial
//!   updates while an event still waits on unresolved predecessors.
//! - [`merge`](VectorClock::merge) is max-merge followed by an owner tick:
//!   the standard vector-clock "receive" rule, applied exactly once per
//!   event, on the branch that completes its join.
//!
//! # Comparison
//!
//! [`less_than`](VectorClock::less_than) is the strict causal-precedes
//! relation: every component ≤ with at least one strict. Two concurrent
//! clocks compare false in both directions. Equality is taken over the key
//! union, so a stored zero entry and an absent entry are indistinguishable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One timeline's view of logical time across every timeline it has observed.
#[derive(Debug, Clone)]
pub struct VectorClock {
    owner: String,
    counters: BTreeMap<String, u64>,
}

impl VectorClock {
    /// An empty clock owned by `owner`: every counter implicitly 0.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            counters: BTreeMap::new(),
        }
    }

    /// Reconstruct a clock from a stored counter snapshot.
    ///
    /// Counters are already non-negative by type; rejecting malformed stored
    /// values happens in the codec ([`crate::clock::serde`]), which carries
    /// the event context needed for a useful error.
    pub fn from_counters(owner: impl Into<String>, counters: BTreeMap<String, u64>) -> Self {
        Self {
            owner: owner.into(),
            counters,
        }
    }

    /// The timeline this clock ticks for.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The counter for `timeline`, or 0 if the clock has never observed it.
    #[must_use]
    pub fn get(&self, timeline: &str) -> u64 {
        self.counters.get(timeline).copied().unwrap_or(0)
    }

    /// The counters the clock has explicitly observed. Absent keys read as 0.
    #[must_use]
    pub fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    /// Advance the owner's own counter by 1.
    pub fn increment(&mut self) -> &mut Self {
        *self.counters.entry(self.owner.clone()).or_insert(0) += 1;
        self
    }

    /// Component-wise maximum over the key union, without ticking the owner.
    pub fn merge_without_increment(&mut self, other: &Self) -> &mut Self {
        for (timeline, &theirs) in &other.counters {
            let entry = self.counters.entry(timeline.clone()).or_insert(0);
            if *entry < theirs {
                *entry = theirs;
            }
        }
        self
    }

    /// Max-merge with `other`, then tick the owner: the vector-clock
    /// "receive event" rule.
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        self.merge_without_increment(other);
        self.increment()
    }

    /// Strict causal-precedes: every component `<=` and at least one strict.
    ///
    /// Irreflexive and antisymmetric; two concurrent clocks compare false in
    /// both directions.
    #[must_use]
    pub fn less_than(&self, other: &Self) -> bool {
        let mut found_less = false;
        for timeline in self.key_union(other) {
            let mine = self.get(timeline);
            let theirs = other.get(timeline);
            if mine > theirs {
                return false;
            }
            found_less = found_less || mine < theirs;
        }
        found_less
    }

    /// Membership on a causal path between two endpoint clocks, inclusive of
    /// the endpoints themselves.
    #[must_use]
    pub fn within_causal_path(&self, from: &Self, to: &Self) -> bool {
        if self == from || self == to {
            return true;
        }
        from.less_than(self) && self.less_than(to)
    }

    fn key_union<'a>(&'a self, other: &'a Self) -> BTreeSet<&'a str> {
        self.counters
            .keys()
            .chain(other.counters.keys())
            .map(String::as_str)
            .collect()
    }
}

/// Equality over the key union; the owner tag does not participate, and a
/// zero-valued entry equals an absent one.
impl PartialEq for VectorClock {
    fn eq(&self, other: &Self) -> bool {
        self.key_union(other)
            .iter()
            .all(|timeline| self.get(timeline) == other.get(timeline))
    }
}

impl Eq for VectorClock {}

impl fmt::Display for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (timeline, counter)) in self.counters.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{timeline}:{counter}")?;
        }
        write!(f, "}}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
