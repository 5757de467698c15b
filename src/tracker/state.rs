use crate::core::{EventId, Result, SpanError};
use crate::ranges::RangeSet;
use std::fmt;

/// Tracker lifecycle
///
/// ```text
/// Growing ──advance(last_in_subrun)──> AtBoundary
///   │                                    │
///   └───────maybe_split + rebase─────────┴──> Rebased ──advance──> Growing
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackerState {
    #[default]
    Growing,
    AtBoundary,
    Rebased,
}

impl TrackerState {
    pub(crate) fn after_event(last_in_subrun: bool) -> Self {
        if last_in_subrun {
            TrackerState::AtBoundary
        } else {
            TrackerState::Growing
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Growing => write!(f, "GROWING"),
            TrackerState::AtBoundary => write!(f, "AT_BOUNDARY"),
            TrackerState::Rebased => write!(f, "REBASED"),
        }
    }
}

/// The most recent event a tracker was advanced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventInfo {
    pub id: EventId,
    pub last_in_subrun: bool,
}

/// Moves a cursor over `ranges` past everything that `info` proves has
/// been processed. Ranges before the returned index are attributed to the
/// current output; the range at the index (if any) may still be open.
pub(crate) fn advance_cursor(ranges: &RangeSet, idx: usize, info: EventInfo) -> usize {
    let ranges = ranges.ranges();
    let (subrun, event) = (info.id.subrun(), info.id.event());
    let mut i = idx;
    if info.last_in_subrun {
        while i < ranges.len() && ranges[i].subrun() <= subrun {
            i += 1;
        }
    } else {
        while i < ranges.len()
            && (ranges[i].subrun() < subrun
                || (ranges[i].subrun() == subrun && ranges[i].end() <= event))
        {
            i += 1;
        }
    }
    i
}

/// Closed and Bounded trackers refuse to start from anything but a valid,
/// well-formed inherited set.
pub(crate) fn validate_inherited(component: &'static str, inherited: &RangeSet) -> Result<()> {
    if !inherited.is_valid() {
        return Err(SpanError::logic(
            component,
            "cannot track an invalid inherited range set",
        ));
    }
    if !inherited.is_well_formed() {
        return Err(SpanError::Configuration(format!(
            "{}: malformed inherited range set (overlapping or inverted ranges):\n{}",
            component, inherited
        )));
    }
    Ok(())
}
