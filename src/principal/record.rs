use super::product::{ProductEntry, ProductTable};
use crate::core::{BranchType, Result, RunId, RunNumber, SpanError, SubRunId};
use crate::provenance::ProductId;
use crate::ranges::RangeSet;
use std::fmt;
use std::hash::Hash;

/// Key of a cached principal.
pub trait PrincipalKey: Copy + Ord + Eq + Hash + fmt::Display + fmt::Debug {
    const BRANCH_TYPE: BranchType;
    const KIND: &'static str;

    fn run_number(&self) -> RunNumber;
}

impl PrincipalKey for RunId {
    const BRANCH_TYPE: BranchType = BranchType::Run;
    const KIND: &'static str = "run";

    fn run_number(&self) -> RunNumber {
        self.run()
    }
}

impl PrincipalKey for SubRunId {
    const BRANCH_TYPE: BranchType = BranchType::SubRun;
    const KIND: &'static str = "subRun";

    fn run_number(&self) -> RunNumber {
        self.run()
    }
}

/// A Run or SubRun record: its id, the event ranges it was built from and
/// its products.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal<K> {
    id: K,
    seen_ranges: RangeSet,
    products: ProductTable,
}

pub type RunPrincipal = Principal<RunId>;
pub type SubRunPrincipal = Principal<SubRunId>;

impl<K: PrincipalKey> Principal<K> {
    pub fn new(id: K) -> Self {
        Self {
            id,
            seen_ranges: RangeSet::empty(id.run_number()),
            products: ProductTable::new(),
        }
    }

    pub fn id(&self) -> K {
        self.id
    }

    pub fn branch_type(&self) -> BranchType {
        K::BRANCH_TYPE
    }

    pub fn seen_ranges(&self) -> &RangeSet {
        &self.seen_ranges
    }

    pub fn set_seen_ranges(&mut self, ranges: RangeSet) -> Result<()> {
        if ranges.is_valid() && ranges.run() != Some(self.id.run_number()) {
            return Err(SpanError::logic(
                "Principal",
                format!("ranges of another run attached to {}", self.id),
            ));
        }
        self.seen_ranges = ranges;
        Ok(())
    }

    pub fn products(&self) -> &ProductTable {
        &self.products
    }

    pub fn get(&self, id: &ProductId) -> Option<&ProductEntry> {
        self.products.get(id)
    }

    pub fn put(&mut self, entry: ProductEntry) -> Result<()> {
        let branch_type = entry.description().branch_type();
        if branch_type != K::BRANCH_TYPE {
            return Err(SpanError::logic(
                "Principal",
                format!(
                    "product {} ({}) put into {}",
                    entry.description().branch_name(),
                    branch_type,
                    self.id
                ),
            ));
        }
        self.products.put(entry)
    }

    /// Combines a second fragment of the same record into this one. On
    /// error the record is left as it was.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.id != other.id {
            return Err(SpanError::logic(
                "Principal",
                format!("cannot merge {} into {}", other.id, self.id),
            ));
        }
        let mut products = self.products.clone();
        products.merge(&other.products)?;
        let mut seen_ranges = self.seen_ranges.clone();
        seen_ranges.merge(&other.seen_ranges)?;

        self.products = products;
        self.seen_ranges = seen_ranges;
        Ok(())
    }
}
