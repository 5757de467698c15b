/// No-double-counting property
///
/// For any partition of a run's events across output files, the ranges
/// attributed to the files are pairwise disjoint and together cover every
/// processed event.
/// Run with: cargo test --test no_double_counting_tests

use eventspan::prelude::*;
use eventspan::ranges;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn arb_kind() -> impl Strategy<Value = TrackerKind> {
    prop_oneof![
        Just(TrackerKind::Unbounded),
        Just(TrackerKind::Open),
        Just(TrackerKind::Closed),
        Just(TrackerKind::Bounded),
    ]
}

/// Events per subrun and, for each event, whether the output file is
/// switched right after it.
fn arb_partition() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), 1..12), 1..4)
}

fn full_ranges(partition: &[Vec<bool>]) -> RangeSet {
    RangeSet::new(
        1,
        partition
            .iter()
            .enumerate()
            .map(|(sr, events)| EventRange::new(sr as u32, 1, events.len() as u32 + 1)),
    )
}

fn tracker_for(kind: TrackerKind, inherited: &RangeSet) -> RangeTracker {
    match kind {
        TrackerKind::Unbounded => RangeTracker::unbounded(1),
        TrackerKind::Open => RangeTracker::open(1),
        TrackerKind::Closed => RangeTracker::closed(inherited.clone()).unwrap(),
        TrackerKind::Bounded => RangeTracker::bounded(inherited.clone()).unwrap(),
    }
}

/// Drives one run tracker through the partition and returns the ranges
/// each file received.
fn files_for(kind: TrackerKind, partition: &[Vec<bool>]) -> Vec<RangeSet> {
    let mut tracker = tracker_for(kind, &full_ranges(partition));
    let mut files = Vec::new();

    for (sr, switches) in partition.iter().enumerate() {
        let last = switches.len() - 1;
        for (i, switch_after) in switches.iter().enumerate() {
            let id = EventId::new(1, sr as u32, i as u32 + 1);
            tracker.advance(id, i == last);
            if *switch_after {
                files.push(tracker.split_for_file_switch());
            }
        }
    }
    tracker.flush();
    files.push(tracker.seen_ranges());
    files
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn test_files_partition_the_run(kind in arb_kind(), partition in arb_partition()) {
        let files = files_for(kind, &partition);

        for (i, a) in files.iter().enumerate() {
            for b in &files[i + 1..] {
                prop_assert!(ranges::disjoint_ranges(a, b), "{} overlaps {}", a, b);
            }
        }

        let mut union = RangeSet::empty(1);
        for file in &files {
            union.merge(file).unwrap();
        }
        prop_assert_eq!(union.collapse(), full_ranges(&partition).collapse());
    }

    #[test]
    fn test_aggregated_counts_match_events(partition in arb_partition()) {
        let files = files_for(TrackerKind::Unbounded, &partition);
        let expected: usize = partition.iter().map(Vec::len).sum();

        let mut cell: Aggregator<u64> = Aggregator::new();
        for file in files.iter().filter(|f| !f.is_empty()) {
            let count = file.events().count() as u64;
            prop_assert!(cell.update(&Reading::run(count, file.clone())).unwrap());
        }
        prop_assert_eq!(*cell.product().unwrap() as usize, expected);
    }
}
