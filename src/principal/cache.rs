use super::record::{Principal, PrincipalKey, RunPrincipal, SubRunPrincipal};
use crate::core::{Result, RunId, SpanError, SubRunId};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub type SharedPrincipal<K> = Arc<RwLock<Principal<K>>>;

#[derive(Debug)]
struct PrincipalMap<K> {
    records: BTreeMap<K, SharedPrincipal<K>>,
    current: Option<SharedPrincipal<K>>,
}

impl<K> Default for PrincipalMap<K> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            current: None,
        }
    }
}

impl<K: PrincipalKey> PrincipalMap<K> {
    fn insert(&mut self, record: Principal<K>) -> Result<SharedPrincipal<K>> {
        let id = record.id();
        if let Some(existing) = self.records.get(&id).cloned() {
            existing.write()?.merge(&record)?;
            debug!(kind = K::KIND, id = %id, "merged into cached record");
            self.current = Some(existing.clone());
            return Ok(existing);
        }

        let shared = Arc::new(RwLock::new(record));
        self.records.insert(id, shared.clone());
        self.current = Some(shared.clone());
        Ok(shared)
    }

    fn get(&self, id: &K) -> Result<SharedPrincipal<K>> {
        self.records.get(id).cloned().ok_or_else(|| {
            SpanError::logic(
                "PrincipalCache",
                format!("requested a {} that is not in the cache ({})", K::KIND, id),
            )
        })
    }

    fn current(&self) -> Result<SharedPrincipal<K>> {
        self.current.clone().ok_or_else(|| {
            SpanError::logic(
                "PrincipalCache",
                format!("requested the current {} but none is set", K::KIND),
            )
        })
    }

    fn erase(&mut self, id: &K) -> Option<SharedPrincipal<K>> {
        let removed = self.records.remove(id)?;
        if self
            .current
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &removed))
        {
            self.current = None;
        }
        Some(removed)
    }

    fn lowest(&self) -> Option<SharedPrincipal<K>> {
        self.records.values().next().cloned()
    }

    fn delete_lowest(&mut self) -> Option<SharedPrincipal<K>> {
        let id = *self.records.keys().next()?;
        self.erase(&id)
    }

    fn clear(&mut self) {
        self.records.clear();
        self.current = None;
    }
}

/// Holds the Run and SubRun records that are open or waiting to be
/// written. Records are shared: the cache, the event loop and output
/// streams may all hold handles to the same record.
#[derive(Debug, Default)]
pub struct PrincipalCache {
    runs: PrincipalMap<RunId>,
    subruns: PrincipalMap<SubRunId>,
}

impl PrincipalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record`, merging it into an existing record with the same id.
    /// The stored record becomes the current run.
    pub fn insert_run(&mut self, record: RunPrincipal) -> Result<SharedPrincipal<RunId>> {
        self.runs.insert(record)
    }

    pub fn insert_subrun(&mut self, record: SubRunPrincipal) -> Result<SharedPrincipal<SubRunId>> {
        self.subruns.insert(record)
    }

    pub fn run_principal(&self, id: RunId) -> Result<SharedPrincipal<RunId>> {
        self.runs.get(&id)
    }

    pub fn subrun_principal(&self, id: SubRunId) -> Result<SharedPrincipal<SubRunId>> {
        self.subruns.get(&id)
    }

    pub fn current_run(&self) -> Result<SharedPrincipal<RunId>> {
        self.runs.current()
    }

    pub fn current_subrun(&self) -> Result<SharedPrincipal<SubRunId>> {
        self.subruns.current()
    }

    pub fn has_run(&self, id: RunId) -> bool {
        self.runs.records.contains_key(&id)
    }

    pub fn has_subrun(&self, id: SubRunId) -> bool {
        self.subruns.records.contains_key(&id)
    }

    pub fn erase_run(&mut self, id: RunId) -> Option<SharedPrincipal<RunId>> {
        self.runs.erase(&id)
    }

    pub fn erase_subrun(&mut self, id: SubRunId) -> Option<SharedPrincipal<SubRunId>> {
        self.subruns.erase(&id)
    }

    pub fn lowest_run(&self) -> Option<SharedPrincipal<RunId>> {
        self.runs.lowest()
    }

    pub fn lowest_subrun(&self) -> Option<SharedPrincipal<SubRunId>> {
        self.subruns.lowest()
    }

    pub fn delete_lowest_run(&mut self) -> Option<SharedPrincipal<RunId>> {
        self.runs.delete_lowest()
    }

    pub fn delete_lowest_subrun(&mut self) -> Option<SharedPrincipal<SubRunId>> {
        self.subruns.delete_lowest()
    }

    pub fn no_more_runs(&self) -> bool {
        self.runs.records.is_empty()
    }

    pub fn no_more_subruns(&self) -> bool {
        self.subruns.records.is_empty()
    }

    pub fn run_ids(&self) -> Vec<RunId> {
        self.runs.records.keys().copied().collect()
    }

    pub fn subrun_ids(&self) -> Vec<SubRunId> {
        self.subruns.records.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
        self.subruns.clear();
    }
}
