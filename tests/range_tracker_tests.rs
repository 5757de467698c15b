/// Range tracker tests
///
/// Seen ranges reported at file switches and at the end of subruns/runs,
/// for every tracker strategy.
/// Run with: cargo test --test range_tracker_tests

use eventspan::prelude::*;
use pretty_assertions::assert_eq;

// Run 1 as read from an earlier file:
//   SubRun: 0 Event range: [5,11)
//   SubRun: 1 Event range: [1,7)
//   SubRun: 1 Event range: [9,15)
//   SubRun: 2 Event range: [3,15)
fn inherited_ranges(subrun: u32) -> Vec<EventRange> {
    match subrun {
        0 => vec![EventRange::new(0, 5, 11)],
        1 => vec![EventRange::new(1, 1, 7), EventRange::new(1, 9, 15)],
        2 => vec![EventRange::new(2, 3, 15)],
        _ => Vec::new(),
    }
}

fn run_ranges() -> Vec<EventRange> {
    (0..3).flat_map(inherited_ranges).collect()
}

fn closed_fixture() -> (Vec<RangeTracker>, RangeTracker) {
    let subruns = (0..3)
        .map(|sr| RangeTracker::closed(RangeSet::new(1, inherited_ranges(sr))).unwrap())
        .collect();
    let run = RangeTracker::closed(RangeSet::new(1, run_ranges())).unwrap();
    (subruns, run)
}

#[test]
fn test_closed_empty_run_and_subruns() {
    let (mut subruns, mut run) = closed_fixture();
    for (sr, tracker) in subruns.iter_mut().enumerate() {
        tracker.flush();
        assert_eq!(tracker.seen_ranges(), RangeSet::new(1, inherited_ranges(sr as u32)));
    }
    run.flush();
    assert_eq!(run.seen_ranges(), RangeSet::new(1, run_ranges()));
}

#[test]
fn test_closed_split_on_non_last_subrun_event() {
    let (mut subruns, mut run) = closed_fixture();
    let subrun = &mut subruns[1];

    for event in [3, 4, 5] {
        subrun.advance(EventId::new(1, 1, event), false);
        run.advance(EventId::new(1, 1, event), false);
    }

    subrun.maybe_split();
    run.maybe_split();
    assert_eq!(subrun.seen_ranges(), RangeSet::new(1, [EventRange::new(1, 1, 6)]));
    assert_eq!(
        run.seen_ranges(),
        RangeSet::new(1, [EventRange::new(0, 5, 11), EventRange::new(1, 1, 6)])
    );

    subrun.rebase();
    run.rebase();

    subrun.advance(EventId::new(1, 1, 10), true);
    run.advance(EventId::new(1, 1, 10), true);
    subrun.flush();
    run.flush();

    assert_eq!(
        subrun.seen_ranges(),
        RangeSet::new(1, [EventRange::new(1, 6, 7), EventRange::new(1, 9, 15)])
    );
    assert_eq!(
        run.seen_ranges(),
        RangeSet::new(
            1,
            [
                EventRange::new(1, 6, 7),
                EventRange::new(1, 9, 15),
                EventRange::new(2, 3, 15)
            ]
        )
    );
}

#[test]
fn test_closed_split_on_last_subrun_event() {
    let (mut subruns, mut run) = closed_fixture();
    let subrun = &mut subruns[1];

    subrun.advance(EventId::new(1, 1, 3), false);
    run.advance(EventId::new(1, 1, 3), false);
    subrun.advance(EventId::new(1, 1, 4), false);
    run.advance(EventId::new(1, 1, 4), false);
    subrun.advance(EventId::new(1, 1, 5), true);
    run.advance(EventId::new(1, 1, 5), true);

    subrun.maybe_split();
    run.maybe_split();
    assert_eq!(subrun.seen_ranges(), RangeSet::new(1, inherited_ranges(1)));
    let mut expected = inherited_ranges(0);
    expected.extend(inherited_ranges(1));
    assert_eq!(run.seen_ranges(), RangeSet::new(1, expected));

    subrun.rebase();
    run.rebase();
    assert_eq!(subrun.seen_ranges(), RangeSet::empty(1));
    assert_eq!(run.seen_ranges(), RangeSet::empty(1));
}

#[test]
fn test_closed_split_reconstructs_inherited_range() {
    let inherited = RangeSet::new(1, [EventRange::new(0, 1, 10)]);
    let mut tracker = RangeTracker::closed(inherited.clone()).unwrap();
    for event in 1..=4 {
        tracker.advance(EventId::new(1, 0, event), false);
    }

    let first = tracker.split_for_file_switch();
    tracker.flush();
    let second = tracker.seen_ranges();

    assert_eq!(first, RangeSet::new(1, [EventRange::new(0, 1, 5)]));
    assert_eq!(second, RangeSet::new(1, [EventRange::new(0, 5, 10)]));

    let mut union = first.clone();
    union.merge(&second).unwrap();
    assert_eq!(union.collapse(), inherited);
}

#[test]
fn test_closed_more_switches_than_ranges() {
    let mut tracker = RangeTracker::closed(RangeSet::new(1, [EventRange::new(0, 1, 4)])).unwrap();
    for event in 1..=3 {
        tracker.advance(EventId::new(1, 0, event), event == 3);
    }
    assert_eq!(tracker.split_for_file_switch(), RangeSet::new(1, [EventRange::new(0, 1, 4)]));
    assert_eq!(tracker.split_for_file_switch(), RangeSet::empty(1));
    assert_eq!(tracker.split_for_file_switch(), RangeSet::empty(1));
}

#[test]
fn test_closed_rejects_invalid_inherited_ranges() {
    let err = RangeTracker::closed(RangeSet::invalid()).unwrap_err();
    assert!(err.is_logic_error());

    let overlapping = RangeSet::new(1, [EventRange::new(0, 1, 5), EventRange::new(0, 3, 8)]);
    assert!(RangeTracker::bounded(overlapping).unwrap_err().is_configuration_error());
}

#[test]
fn test_bounded_never_cuts_ranges() {
    let mut tracker = RangeTracker::bounded(RangeSet::new(
        1,
        [EventRange::new(0, 1, 5), EventRange::new(0, 5, 9)],
    ))
    .unwrap();
    tracker.advance(EventId::new(1, 0, 1), false);
    tracker.advance(EventId::new(1, 0, 2), false);

    // The switch lands inside [1,5); the whole range stays with the next file.
    assert_eq!(tracker.split_for_file_switch(), RangeSet::empty(1));
    assert_eq!(tracker.state(), TrackerState::Rebased);

    for event in 3..=8 {
        tracker.advance(EventId::new(1, 0, event), event == 8);
    }
    tracker.flush();
    assert_eq!(
        tracker.seen_ranges(),
        RangeSet::new(1, [EventRange::new(0, 1, 5), EventRange::new(0, 5, 9)])
    );
}

#[test]
fn test_unbounded_split_mid_subrun() {
    let mut tracker = RangeTracker::unbounded(1);
    tracker.advance(EventId::new(1, 0, 1), false);
    tracker.advance(EventId::new(1, 0, 2), false);

    let file_a = tracker.split_for_file_switch();
    assert_eq!(file_a, RangeSet::new(1, [EventRange::new(0, 1, 3)]));

    tracker.advance(EventId::new(1, 0, 3), true);
    let file_b = tracker.seen_ranges();
    assert_eq!(file_b, RangeSet::new(1, [EventRange::new(0, 3, 4)]));

    let mut union = file_a;
    union.merge(&file_b).unwrap();
    assert_eq!(union.collapse(), RangeSet::new(1, [EventRange::new(0, 1, 4)]));
}

#[test]
fn test_open_file_switch_after_event() {
    let events: Vec<(EventId, bool)> = (0..3)
        .flat_map(|sr| {
            [
                (EventId::new(1, sr, 1), false),
                (EventId::new(1, sr, 2), false),
                (EventId::new(1, sr, 3), true),
            ]
        })
        .collect();

    let mut run = RangeTracker::open(1);
    let mut subrun = RangeTracker::open(1);
    for &(id, last) in &events[..5] {
        subrun.advance(id, last);
        run.advance(id, last);
        if last {
            subrun.flush();
            assert_eq!(
                subrun.seen_ranges(),
                RangeSet::new(1, [EventRange::new(id.subrun(), 1, 4)])
            );
            subrun = RangeTracker::open(1);
        }
    }

    subrun.maybe_split();
    run.maybe_split();
    assert_eq!(subrun.seen_ranges(), RangeSet::new(1, [EventRange::new(1, 1, 3)]));
    assert_eq!(
        run.seen_ranges(),
        RangeSet::new(1, [EventRange::new(0, 1, 4), EventRange::new(1, 1, 3)])
    );
    subrun.rebase();
    run.rebase();

    let (id, last) = events[5];
    subrun.advance(id, last);
    run.advance(id, last);
    subrun.flush();
    assert_eq!(subrun.seen_ranges(), RangeSet::new(1, [EventRange::new(1, 3, 4)]));
    subrun = RangeTracker::open(1);

    for &(id, last) in &events[6..] {
        subrun.advance(id, last);
        run.advance(id, last);
    }
    subrun.flush();
    run.flush();
    assert_eq!(subrun.seen_ranges(), RangeSet::new(1, [EventRange::new(2, 1, 4)]));
    assert_eq!(
        run.seen_ranges(),
        RangeSet::new(1, [EventRange::new(1, 3, 4), EventRange::new(2, 1, 4)])
    );
}

#[test]
fn test_policy_from_source() {
    let inherited = RangeSet::new(1, [EventRange::new(0, 1, 3)]);

    let tracker = RangeTracker::for_source(TrackerPolicy::Auto, 1, Some(inherited.clone())).unwrap();
    assert_eq!(tracker.kind(), TrackerKind::Closed);

    let tracker = RangeTracker::for_source(TrackerPolicy::Auto, 1, None).unwrap();
    assert_eq!(tracker.kind(), TrackerKind::Unbounded);

    let tracker = RangeTracker::for_source(TrackerPolicy::Open, 1, Some(inherited)).unwrap();
    assert_eq!(tracker.kind(), TrackerKind::Open);

    let err = RangeTracker::for_source(TrackerPolicy::Bounded, 1, None).unwrap_err();
    assert!(err.is_configuration_error());
}
