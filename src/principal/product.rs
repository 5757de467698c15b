use crate::core::{BranchType, ProductValue, Result, SpanError};
use crate::provenance::{ProductId, ProductProvenance};
use crate::ranges::{self, RangeSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Static description of a product branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDescription {
    product_id: ProductId,
    branch_name: String,
    branch_type: BranchType,
    /// Produced in the current process rather than read from input.
    produced: bool,
}

impl ProductDescription {
    pub fn new(branch_name: impl Into<String>, branch_type: BranchType, produced: bool) -> Self {
        let branch_name = branch_name.into();
        Self {
            product_id: ProductId::from_branch_name(&branch_name),
            branch_name,
            branch_type,
            produced,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    pub fn branch_type(&self) -> BranchType {
        self.branch_type
    }

    pub fn is_produced(&self) -> bool {
        self.produced
    }
}

/// A product slot in a principal: the value (if any), the ranges it covers
/// and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEntry {
    description: ProductDescription,
    value: Option<ProductValue>,
    range_set: RangeSet,
    provenance: Option<ProductProvenance>,
}

impl ProductEntry {
    pub fn new(description: ProductDescription, value: ProductValue, range_set: RangeSet) -> Self {
        Self {
            description,
            value: Some(value),
            range_set,
            provenance: None,
        }
    }

    /// Slot for a product that was never put.
    pub fn absent(description: ProductDescription) -> Self {
        Self {
            description,
            value: None,
            range_set: RangeSet::invalid(),
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, provenance: ProductProvenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    pub fn description(&self) -> &ProductDescription {
        &self.description
    }

    pub fn product_id(&self) -> ProductId {
        self.description.product_id
    }

    pub fn value(&self) -> Option<&ProductValue> {
        self.value.as_ref()
    }

    pub fn range_set(&self) -> &RangeSet {
        &self.range_set
    }

    pub fn provenance(&self) -> Option<&ProductProvenance> {
        self.provenance.as_ref()
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Folds a second fragment of the same product into this one.
    ///
    /// A valid fragment replaces one whose ranges were invalidated.
    /// Identical ranges are the same fragment seen twice and are skipped.
    /// Disjoint ranges are aggregated. Overlapping ranges cannot be combined
    /// without double counting and fail with `ProductCannotBeAggregated`;
    /// `self` is untouched on any error.
    pub(crate) fn merge(&mut self, other: &ProductEntry) -> Result<()> {
        if self.product_id() != other.product_id() {
            return Err(SpanError::logic(
                "ProductEntry",
                format!(
                    "cannot merge product {} into {}",
                    other.description.branch_name, self.description.branch_name
                ),
            ));
        }

        let Some(incoming) = other.value.as_ref() else {
            return Ok(());
        };
        let Some(current) = self.value.as_ref() else {
            *self = other.clone();
            return Ok(());
        };

        if !self.range_set.is_valid() && other.range_set.is_valid() {
            *self = other.clone();
            return Ok(());
        }

        if ranges::disjoint_ranges(&self.range_set, &other.range_set) {
            let mut range_set = self.range_set.clone();
            range_set.merge(&other.range_set)?;
            let mut value = current.clone();
            value.try_aggregate(incoming)?;

            self.value = Some(value);
            self.range_set = range_set;
            if self.provenance.is_none() {
                self.provenance = other.provenance.clone();
            }
            return Ok(());
        }

        if ranges::same_ranges(&self.range_set, &other.range_set) {
            debug!(product = %self.description.branch_name, "identical fragment skipped");
            return Ok(());
        }

        if ranges::overlapping_ranges(&self.range_set, &other.range_set) {
            return Err(SpanError::ProductCannotBeAggregated(format!(
                "ranges of product {} cannot be aggregated: {} and {}",
                self.description.branch_name, self.range_set, other.range_set
            )));
        }

        // The incoming fragment was invalidated.
        Ok(())
    }
}

/// Products owned by one principal, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductTable {
    entries: BTreeMap<ProductId, ProductEntry>,
}

impl ProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, entry: ProductEntry) -> Result<()> {
        let id = entry.product_id();
        if self.entries.contains_key(&id) {
            return Err(SpanError::logic(
                "ProductTable",
                format!("product {} was already put", entry.description.branch_name),
            ));
        }
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn get(&self, id: &ProductId) -> Option<&ProductEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductId, &ProductEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn merge(&mut self, other: &ProductTable) -> Result<()> {
        for (id, entry) in &other.entries {
            match self.entries.get_mut(id) {
                Some(existing) => existing.merge(entry)?,
                None => {
                    self.entries.insert(*id, entry.clone());
                }
            }
        }
        Ok(())
    }
}
