use crate::config::OutputConfig;
use crate::core::{Result, RunId, SpanError, SubRunId};
use crate::principal::{EventPrincipal, ProductDescription, ProductTable};
use crate::provenance::{FileProvenance, ParentageRegistry, ProductProvenance, ProvenanceLedger};
use crate::ranges::RangeSet;
use crate::tracker::{RangeHandler, RangeTracker};
use tracing::{debug, info_span};

/// What one closed output file received.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFragment {
    /// Position of the file in the stream, starting at 0.
    pub index: usize,
    /// Ranges of the open run written to this file, if a run was open.
    pub run_ranges: Option<RangeSet>,
    /// Ranges of the open subrun written to this file, if one was open.
    pub subrun_ranges: Option<RangeSet>,
    pub provenance: FileProvenance,
}

/// One output stream: the trackers for the open Run and SubRun and the
/// provenance ledger of the file being written.
pub struct OutputStream<'r, R: ParentageRegistry + ?Sized> {
    config: OutputConfig,
    run: Option<(RunId, RangeTracker)>,
    subrun: Option<(SubRunId, RangeTracker)>,
    ledger: ProvenanceLedger<'r, R>,
    files_closed: usize,
}

impl<'r, R: ParentageRegistry + ?Sized> OutputStream<'r, R> {
    pub fn new(registry: &'r R, config: OutputConfig) -> Result<Self> {
        config.validate()?;
        let ledger = ProvenanceLedger::new(registry, &config);
        Ok(Self {
            config,
            run: None,
            subrun: None,
            ledger,
            files_closed: 0,
        })
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ProvenanceLedger<'r, R> {
        &self.ledger
    }

    pub fn run_tracker(&self) -> Option<&RangeTracker> {
        self.run.as_ref().map(|(_, tracker)| tracker)
    }

    pub fn subrun_tracker(&self) -> Option<&RangeTracker> {
        self.subrun.as_ref().map(|(_, tracker)| tracker)
    }

    /// Opens `run`. `inherited` is the range set the run carried in its
    /// input file, if any.
    pub fn begin_run(&mut self, run: RunId, inherited: Option<RangeSet>) -> Result<()> {
        if let Some((open, _)) = &self.run {
            return Err(SpanError::logic(
                "OutputStream",
                format!("{} opened while {} is still open", run, open),
            ));
        }
        let tracker = RangeTracker::for_source(self.config.tracker, run.run(), inherited)?;
        debug!(run = run.run(), tracker = %tracker.kind(), "run opened");
        self.run = Some((run, tracker));
        Ok(())
    }

    pub fn begin_subrun(&mut self, subrun: SubRunId, inherited: Option<RangeSet>) -> Result<()> {
        match &self.run {
            Some((run, _)) if *run == subrun.run_id() => {}
            Some((run, _)) => {
                return Err(SpanError::logic(
                    "OutputStream",
                    format!("{} opened inside {}", subrun, run),
                ));
            }
            None => {
                return Err(SpanError::logic(
                    "OutputStream",
                    format!("{} opened with no open run", subrun),
                ));
            }
        }
        if let Some((open, _)) = &self.subrun {
            return Err(SpanError::logic(
                "OutputStream",
                format!("{} opened while {} is still open", subrun, open),
            ));
        }
        let tracker = RangeTracker::for_source(self.config.tracker, subrun.run(), inherited)?;
        debug!(run = subrun.run(), subrun = subrun.subrun(), tracker = %tracker.kind(), "subrun opened");
        self.subrun = Some((subrun, tracker));
        Ok(())
    }

    /// Records one written event against both trackers and the ledger.
    pub fn process_event(&mut self, event: &EventPrincipal) -> Result<()> {
        let id = event.id();
        let Some((subrun, subrun_tracker)) = self.subrun.as_mut() else {
            return Err(SpanError::logic(
                "OutputStream",
                format!("{} processed with no open subrun", id),
            ));
        };
        if *subrun != id.subrun_id() {
            return Err(SpanError::logic(
                "OutputStream",
                format!("{} processed inside {}", id, subrun),
            ));
        }
        // An open subrun implies an open run of the same number.
        let Some((_, run_tracker)) = self.run.as_mut() else {
            return Err(SpanError::logic(
                "OutputStream",
                format!("{} processed with no open run", id),
            ));
        };

        run_tracker.advance(id, event.is_last_in_subrun());
        subrun_tracker.advance(id, event.is_last_in_subrun());
        self.ledger.update_branch_parents(event);
        Ok(())
    }

    /// Keeps provenance for one record being written to the current file.
    /// `seen_ranges` are the events the record was built from; pass an
    /// invalid set for Event records.
    pub fn write_principal(
        &mut self,
        products: &ProductTable,
        seen_ranges: &RangeSet,
        selected: &[ProductDescription],
    ) -> Result<Vec<ProductProvenance>> {
        self.ledger.keep_provenance(products, seen_ranges, selected)
    }

    /// Closes the current output file and starts the next one. The open
    /// run and subrun stay open; their trackers are split at the switch.
    pub fn switch_output_file(&mut self) -> FileFragment {
        let span = info_span!("switch_output_file", file = self.files_closed);
        let _enter = span.enter();

        let run_ranges = self
            .run
            .as_mut()
            .map(|(_, tracker)| tracker.split_for_file_switch());
        let subrun_ranges = self
            .subrun
            .as_mut()
            .map(|(_, tracker)| tracker.split_for_file_switch());
        self.close_fragment(run_ranges, subrun_ranges)
    }

    /// Closes the open subrun, returning the ranges the current file
    /// receives for it.
    pub fn end_subrun(&mut self) -> Result<RangeSet> {
        let Some((subrun, mut tracker)) = self.subrun.take() else {
            return Err(SpanError::logic("OutputStream", "end of subrun with no open subrun"));
        };
        tracker.flush();
        let seen = tracker.seen_ranges();
        debug!(run = subrun.run(), subrun = subrun.subrun(), ranges = %seen, "subrun closed");
        Ok(seen)
    }

    /// Closes the open run. The subrun must be closed first.
    pub fn end_run(&mut self) -> Result<RangeSet> {
        if let Some((subrun, _)) = &self.subrun {
            return Err(SpanError::logic(
                "OutputStream",
                format!("end of run while {} is still open", subrun),
            ));
        }
        let Some((run, mut tracker)) = self.run.take() else {
            return Err(SpanError::logic("OutputStream", "end of run with no open run"));
        };
        tracker.flush();
        let seen = tracker.seen_ranges();
        debug!(run = run.run(), ranges = %seen, "run closed");
        Ok(seen)
    }

    /// Closes the last file. Trackers still open are flushed and their
    /// ranges attributed to this file.
    pub fn close(mut self) -> FileFragment {
        let subrun_ranges = self.subrun.take().map(|(_, mut tracker)| {
            tracker.flush();
            tracker.seen_ranges()
        });
        let run_ranges = self.run.take().map(|(_, mut tracker)| {
            tracker.flush();
            tracker.seen_ranges()
        });
        self.close_fragment(run_ranges, subrun_ranges)
    }

    fn close_fragment(
        &mut self,
        run_ranges: Option<RangeSet>,
        subrun_ranges: Option<RangeSet>,
    ) -> FileFragment {
        let provenance = self.ledger.close_file();
        let index = self.files_closed;
        self.files_closed += 1;
        debug!(file = index, kept = provenance.kept.len(), "output file closed");
        FileFragment {
            index,
            run_ranges,
            subrun_ranges,
            provenance,
        }
    }
}
