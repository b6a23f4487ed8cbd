//! Property suite for the vector-clock algebra.
//!
//! Checks the laws the traversal relies on: absent counters read as zero,
//! the increment is local to the owner, the strict order is irreflexive and
//! antisymmetric, and the merge dominates both inputs.

use std::collections::BTreeMap;

use proptest::prelude::*;
use weft_core::VectorClock;
use weft_core::clock::serde::{decode_vector_time, encode_vector_time};

const TIMELINES: [&str; 4] = ["t1", "t2", "t3", "t4"];

fn arb_timeline() -> impl Strategy<Value = String> {
    (0usize..TIMELINES.len()).prop_map(|i| TIMELINES[i].to_string())
}

fn arb_counters() -> impl Strategy<Value = BTreeMap<String, u64>> {
    prop::collection::btree_map(arb_timeline(), 0u64..16, 0..TIMELINES.len())
}

fn arb_clock() -> impl Strategy<Value = VectorClock> {
    (arb_timeline(), arb_counters())
        .prop_map(|(owner, counters)| VectorClock::from_counters(owner, counters))
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2048))]

    #[test]
    fn absent_counters_read_zero(counters in arb_counters(), timeline in arb_timeline()) {
        let clock = VectorClock::from_counters("t1", counters.clone());
        prop_assert_eq!(clock.get(&timeline), counters.get(&timeline).copied().unwrap_or(0));
    }

    #[test]
    fn increment_ticks_exactly_the_owner(clock in arb_clock()) {
        let mut ticked = clock.clone();
        ticked.increment();

        for timeline in TIMELINES {
            let expected = if timeline == ticked.owner() {
                clock.get(timeline) + 1
            } else {
                clock.get(timeline)
            };
            prop_assert_eq!(ticked.get(timeline), expected);
        }
    }

    #[test]
    fn less_than_is_irreflexive(clock in arb_clock()) {
        prop_assert!(!clock.less_than(&clock.clone()));
    }

    #[test]
    fn less_than_never_holds_both_ways(a in arb_clock(), b in arb_clock()) {
        prop_assert!(!(a.less_than(&b) && b.less_than(&a)));
    }

    #[test]
    fn merge_dominates_the_merged_parent(child in arb_clock(), parent in arb_clock()) {
        let mut merged = child.clone();
        merged.merge(&parent);

        // The merge takes the component-wise max and then ticks the child's
        // owner, so the parent ends up strictly below the result.
        prop_assert!(parent.less_than(&merged));
        for timeline in TIMELINES {
            prop_assert!(merged.get(timeline) >= child.get(timeline));
        }
    }

    #[test]
    fn merge_without_increment_is_the_component_max(a in arb_clock(), b in arb_clock()) {
        let mut merged = a.clone();
        merged.merge_without_increment(&b);

        for timeline in TIMELINES {
            prop_assert_eq!(merged.get(timeline), a.get(timeline).max(b.get(timeline)));
        }
    }

    #[test]
    fn merge_without_increment_is_idempotent(a in arb_clock()) {
        let mut merged = a.clone();
        merged.merge_without_increment(&a);
        prop_assert_eq!(merged, a);
    }

    #[test]
    fn equality_is_insensitive_to_zero_padding(clock in arb_clock(), timeline in arb_timeline()) {
        let mut counters = clock.counters().clone();
        counters.entry(timeline).or_insert(0);
        let padded = VectorClock::from_counters(clock.owner(), counters);

        prop_assert_eq!(&padded, &clock);
    }

    #[test]
    fn endpoints_are_always_within_their_own_path(from in arb_clock(), to in arb_clock()) {
        prop_assert!(from.within_causal_path(&from, &to));
        prop_assert!(to.within_causal_path(&from, &to));
    }

    #[test]
    fn stored_form_round_trips(clock in arb_clock()) {
        let decoded = decode_vector_time(clock.owner(), &encode_vector_time(&clock))
            .expect("round trip");
        prop_assert_eq!(decoded, clock);
    }
}
