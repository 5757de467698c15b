use crate::core::{EventId, Result, SpanError};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Admits one random-access seek at a time.
#[derive(Debug, Default)]
pub struct SeekGate {
    in_progress: AtomicBool,
}

impl SeekGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeking(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Starts a seek to `target`. A second seek while the returned guard is
    /// alive is a logic error.
    pub fn begin(&self, target: EventId) -> Result<SeekGuard<'_>> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SpanError::logic(
                "SeekGate",
                format!("seek to {} requested while another seek is in progress", target),
            ));
        }
        debug!(%target, "seek started");
        Ok(SeekGuard { gate: self, target })
    }
}

/// Held for the duration of one seek; releases the gate on drop.
#[derive(Debug)]
pub struct SeekGuard<'a> {
    gate: &'a SeekGate,
    target: EventId,
}

impl SeekGuard<'_> {
    pub fn target(&self) -> EventId {
        self.target
    }
}

impl Drop for SeekGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_progress.store(false, Ordering::Release);
        debug!(target = %self.target, "seek finished");
    }
}
