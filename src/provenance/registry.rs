use super::{Parentage, ParentageId};
use std::collections::BTreeMap;

/// Lookup of historical parentage by digest. Injected into the ledger by
/// reference; one registry serves a whole job.
pub trait ParentageRegistry {
    fn get(&self, id: &ParentageId) -> Option<&Parentage>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryParentageRegistry {
    entries: BTreeMap<ParentageId, Parentage>,
}

impl InMemoryParentageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parentage`, returning its id. Re-registering is harmless.
    pub fn put(&mut self, parentage: Parentage) -> ParentageId {
        let id = parentage.id();
        self.entries.entry(id).or_insert(parentage);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in id order, for writing the registry out with a file.
    pub fn iter(&self) -> impl Iterator<Item = (&ParentageId, &Parentage)> {
        self.entries.iter()
    }
}

impl ParentageRegistry for InMemoryParentageRegistry {
    fn get(&self, id: &ParentageId) -> Option<&Parentage> {
        self.entries.get(id)
    }
}
