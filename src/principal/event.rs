use super::cache::SharedPrincipal;
use super::product::{ProductEntry, ProductTable};
use super::record::SubRunPrincipal;
use crate::core::{BranchType, EventId, Result, SpanError, SubRunId};
use std::sync::{Arc, RwLock, Weak};

/// One event's products, as seen by output streams.
///
/// The enclosing subrun record is owned by the cache; the event holds a
/// weak handle to it.
#[derive(Debug, Clone)]
pub struct EventPrincipal {
    id: EventId,
    last_in_subrun: bool,
    products: ProductTable,
    subrun: Weak<RwLock<SubRunPrincipal>>,
}

impl EventPrincipal {
    pub fn new(id: EventId, last_in_subrun: bool) -> Self {
        Self {
            id,
            last_in_subrun,
            products: ProductTable::new(),
            subrun: Weak::new(),
        }
    }

    pub fn attach_subrun(&mut self, subrun: &SharedPrincipal<SubRunId>) -> Result<()> {
        let subrun_id = subrun.read()?.id();
        if subrun_id != self.id.subrun_id() {
            return Err(SpanError::logic(
                "EventPrincipal",
                format!("{} attached to {}", self.id, subrun_id),
            ));
        }
        self.subrun = Arc::downgrade(subrun);
        Ok(())
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn is_last_in_subrun(&self) -> bool {
        self.last_in_subrun
    }

    pub fn products(&self) -> &ProductTable {
        &self.products
    }

    pub fn put(&mut self, entry: ProductEntry) -> Result<()> {
        if entry.description().branch_type() != BranchType::Event {
            return Err(SpanError::logic(
                "EventPrincipal",
                format!(
                    "product {} ({}) put into {}",
                    entry.description().branch_name(),
                    entry.description().branch_type(),
                    self.id
                ),
            ));
        }
        self.products.put(entry)
    }

    /// The enclosing subrun record, if it is still cached.
    pub fn subrun_principal(&self) -> Option<SharedPrincipal<SubRunId>> {
        self.subrun.upgrade()
    }
}
