// ============================================================================
// Run / SubRun / Event identifiers
// ============================================================================
//
// Identifiers nest: SubRunId = (run, subrun), EventId = (subrun id, event).
// Field order gives the derived total order, which is the order events are
// delivered in a sequential read.
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

pub type RunNumber = u32;
pub type SubRunNumber = u32;
pub type EventNumber = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(RunNumber);

impl RunId {
    pub fn new(run: RunNumber) -> Self {
        Self(run)
    }

    pub fn run(&self) -> RunNumber {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run: {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubRunId {
    run: RunId,
    subrun: SubRunNumber,
}

impl SubRunId {
    pub fn new(run: RunNumber, subrun: SubRunNumber) -> Self {
        Self {
            run: RunId::new(run),
            subrun,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn run(&self) -> RunNumber {
        self.run.run()
    }

    pub fn subrun(&self) -> SubRunNumber {
        self.subrun
    }

    pub fn next(&self) -> Self {
        Self {
            run: self.run,
            subrun: self.subrun.saturating_add(1),
        }
    }
}

impl fmt::Display for SubRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} subRun: {}", self.run, self.subrun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId {
    subrun: SubRunId,
    event: EventNumber,
}

impl EventId {
    pub fn new(run: RunNumber, subrun: SubRunNumber, event: EventNumber) -> Self {
        Self {
            subrun: SubRunId::new(run, subrun),
            event,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.subrun.run_id()
    }

    pub fn subrun_id(&self) -> SubRunId {
        self.subrun
    }

    pub fn run(&self) -> RunNumber {
        self.subrun.run()
    }

    pub fn subrun(&self) -> SubRunNumber {
        self.subrun.subrun()
    }

    pub fn event(&self) -> EventNumber {
        self.event
    }

    /// Successor within the same subrun.
    pub fn next(&self) -> Self {
        Self {
            subrun: self.subrun,
            event: self.event.saturating_add(1),
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} event: {}", self.subrun, self.event)
    }
}
