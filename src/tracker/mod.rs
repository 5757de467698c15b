// ============================================================================
// Range trackers
// ============================================================================
//
// Every open Run and SubRun working record owns one tracker. As events are
// processed the tracker advances; at an output-file switch the writer calls
// `maybe_split` (so the part already written and the part still pending
// are disjoint), reads `seen_ranges` for the closing file, then `rebase`s
// so the next file starts from the remainder.
//
// Four strategies share the contract:
// - Unbounded: grows ranges from events; pending tail continues after a
//   mid-subrun split.
// - Open:      grows ranges from events, always at the logical end; rebase
//   forgets everything.
// - Closed:    walks a range set inherited from upstream, cutting ranges at
//   file switches.
// - Bounded:   walks an inherited set without ever cutting; rebase replaces
//   the tracker with one built from the remainder.
//
// ============================================================================

pub mod bounded;
pub mod closed;
pub mod open;
pub mod state;
pub mod unbounded;

pub use bounded::BoundedTracker;
pub use closed::ClosedTracker;
pub use open::OpenTracker;
pub use state::{EventInfo, TrackerState};
pub use unbounded::UnboundedTracker;

use crate::core::{EventId, Result, RunNumber, SpanError};
use crate::ranges::RangeSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Uniform protocol of all tracker strategies.
pub trait RangeHandler {
    fn kind(&self) -> TrackerKind;

    fn state(&self) -> TrackerState;

    /// Records that `id` was processed; `last_in_subrun` closes the
    /// subrun's span.
    fn advance(&mut self, id: EventId, last_in_subrun: bool);

    /// Moves the cursor to the logical end (end of subrun or job).
    fn flush(&mut self);

    /// Called before an output-file switch. Safe to call repeatedly.
    fn maybe_split(&mut self);

    /// Called after a switch: drops what the closed file received.
    fn rebase(&mut self);

    /// Exactly what has been processed up to the cursor.
    fn seen_ranges(&self) -> RangeSet;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerKind {
    Unbounded,
    Open,
    Closed,
    Bounded,
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerKind::Unbounded => write!(f, "unbounded"),
            TrackerKind::Open => write!(f, "open"),
            TrackerKind::Closed => write!(f, "closed"),
            TrackerKind::Bounded => write!(f, "bounded"),
        }
    }
}

/// Which tracker a source asks for. `Auto` picks Closed when an inherited
/// range set exists and Unbounded otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerPolicy {
    #[default]
    Auto,
    Unbounded,
    Open,
    Closed,
    Bounded,
}

impl FromStr for TrackerPolicy {
    type Err = SpanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "unbounded" => Ok(Self::Unbounded),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "bounded" => Ok(Self::Bounded),
            other => Err(SpanError::Configuration(format!(
                "Illegal tracker policy: '{}'. Legal values are 'auto', 'unbounded', 'open', 'closed' and 'bounded'",
                other
            ))),
        }
    }
}

impl fmt::Display for TrackerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerPolicy::Auto => write!(f, "auto"),
            TrackerPolicy::Unbounded => write!(f, "unbounded"),
            TrackerPolicy::Open => write!(f, "open"),
            TrackerPolicy::Closed => write!(f, "closed"),
            TrackerPolicy::Bounded => write!(f, "bounded"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RangeTracker {
    Unbounded(UnboundedTracker),
    Open(OpenTracker),
    Closed(ClosedTracker),
    Bounded(BoundedTracker),
}

impl RangeTracker {
    pub fn unbounded(run: RunNumber) -> Self {
        Self::Unbounded(UnboundedTracker::new(run))
    }

    pub fn open(run: RunNumber) -> Self {
        Self::Open(OpenTracker::new(run))
    }

    pub fn closed(inherited: RangeSet) -> Result<Self> {
        ClosedTracker::new(inherited).map(Self::Closed)
    }

    pub fn bounded(inherited: RangeSet) -> Result<Self> {
        BoundedTracker::new(inherited).map(Self::Bounded)
    }

    /// Builds the tracker a source asks for.
    pub fn for_source(
        policy: TrackerPolicy,
        run: RunNumber,
        inherited: Option<RangeSet>,
    ) -> Result<Self> {
        match (policy, inherited) {
            (TrackerPolicy::Auto | TrackerPolicy::Closed, Some(inherited)) => Self::closed(inherited),
            (TrackerPolicy::Bounded, Some(inherited)) => Self::bounded(inherited),
            (TrackerPolicy::Auto, None) => Ok(Self::unbounded(run)),
            (TrackerPolicy::Unbounded, inherited) => {
                if inherited.is_some() {
                    debug!(run, "unbounded tracker ignores the inherited range set");
                }
                Ok(Self::unbounded(run))
            }
            (TrackerPolicy::Open, inherited) => {
                if inherited.is_some() {
                    debug!(run, "open tracker ignores the inherited range set");
                }
                Ok(Self::open(run))
            }
            (policy @ (TrackerPolicy::Closed | TrackerPolicy::Bounded), None) => {
                Err(SpanError::Configuration(format!(
                    "{} tracker for run {} requires an inherited range set",
                    policy, run
                )))
            }
        }
    }

    /// The writer-side file switch: split, capture what the closing file
    /// receives, then rebase.
    pub fn split_for_file_switch(&mut self) -> RangeSet {
        self.maybe_split();
        let seen = self.seen_ranges();
        self.rebase();
        seen
    }

    fn handler(&self) -> &dyn RangeHandler {
        match self {
            RangeTracker::Unbounded(t) => t,
            RangeTracker::Open(t) => t,
            RangeTracker::Closed(t) => t,
            RangeTracker::Bounded(t) => t,
        }
    }

    fn handler_mut(&mut self) -> &mut dyn RangeHandler {
        match self {
            RangeTracker::Unbounded(t) => t,
            RangeTracker::Open(t) => t,
            RangeTracker::Closed(t) => t,
            RangeTracker::Bounded(t) => t,
        }
    }
}

impl RangeHandler for RangeTracker {
    fn kind(&self) -> TrackerKind {
        self.handler().kind()
    }

    fn state(&self) -> TrackerState {
        self.handler().state()
    }

    fn advance(&mut self, id: EventId, last_in_subrun: bool) {
        self.handler_mut().advance(id, last_in_subrun)
    }

    fn flush(&mut self) {
        self.handler_mut().flush()
    }

    fn maybe_split(&mut self) {
        self.handler_mut().maybe_split()
    }

    fn rebase(&mut self) {
        self.handler_mut().rebase()
    }

    fn seen_ranges(&self) -> RangeSet {
        self.handler().seen_ranges()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::EventRange;

    #[test]
    fn test_policy_selection() {
        let inherited = RangeSet::new(1, [EventRange::new(0, 1, 10)]);
        let auto = RangeTracker::for_source(TrackerPolicy::Auto, 1, Some(inherited.clone())).unwrap();
        assert_eq!(auto.kind(), TrackerKind::Closed);

        let auto = RangeTracker::for_source(TrackerPolicy::Auto, 1, None).unwrap();
        assert_eq!(auto.kind(), TrackerKind::Unbounded);

        let bounded =
            RangeTracker::for_source(TrackerPolicy::Bounded, 1, Some(inherited)).unwrap();
        assert_eq!(bounded.kind(), TrackerKind::Bounded);

        let err = RangeTracker::for_source(TrackerPolicy::Closed, 1, None).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Closed".parse::<TrackerPolicy>().unwrap(), TrackerPolicy::Closed);
        assert_eq!("".parse::<TrackerPolicy>().unwrap(), TrackerPolicy::Auto);
        assert!("sideways".parse::<TrackerPolicy>().is_err());
    }

    #[test]
    fn test_state_transitions() {
        let mut tracker = RangeTracker::unbounded(1);
        assert_eq!(tracker.state(), TrackerState::Growing);
        tracker.advance(EventId::new(1, 0, 1), false);
        assert_eq!(tracker.state(), TrackerState::Growing);
        tracker.advance(EventId::new(1, 0, 2), true);
        assert_eq!(tracker.state(), TrackerState::AtBoundary);
        tracker.split_for_file_switch();
        assert_eq!(tracker.state(), TrackerState::Rebased);
        tracker.advance(EventId::new(1, 1, 1), false);
        assert_eq!(tracker.state(), TrackerState::Growing);
    }
}
