use super::{
    DropMetaData, ParentageId, ParentageRegistry, ProductDependencyGraph, ProductId,
    ProductProvenance, ProductStatus,
};
use crate::config::OutputConfig;
use crate::core::{Result, SpanError};
use crate::principal::{EventPrincipal, ProductDescription, ProductTable};
use crate::ranges::{self, RangeSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{Level, debug, event, trace};

/// Everything the ledger hands to the writer when a file closes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProvenance {
    pub graph: ProductDependencyGraph,
    pub kept: Vec<ProductProvenance>,
    /// Every product whose history the file must carry.
    pub stored_history: BTreeSet<ProductId>,
}

impl FileProvenance {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Per-output-stream provenance bookkeeping for one file at a time.
pub struct ProvenanceLedger<'r, R: ParentageRegistry + ?Sized> {
    registry: &'r R,
    drop_meta_data: DropMetaData,
    drop_meta_data_for_dropped_data: bool,
    branch_parents: BTreeMap<ProductId, BTreeSet<ParentageId>>,
    graph: ProductDependencyGraph,
    kept: BTreeSet<ProductProvenance>,
    stored_history: BTreeSet<ProductId>,
}

impl<'r, R: ParentageRegistry + ?Sized> ProvenanceLedger<'r, R> {
    pub fn new(registry: &'r R, config: &OutputConfig) -> Self {
        Self {
            registry,
            drop_meta_data: config.drop_meta_data,
            drop_meta_data_for_dropped_data: config.drop_meta_data_for_dropped_data,
            branch_parents: BTreeMap::new(),
            graph: ProductDependencyGraph::new(),
            kept: BTreeSet::new(),
            stored_history: BTreeSet::new(),
        }
    }

    pub fn drop_meta_data(&self) -> DropMetaData {
        self.drop_meta_data
    }

    pub fn graph(&self) -> &ProductDependencyGraph {
        &self.graph
    }

    /// Parentage ids recorded so far for `id` in the current file.
    pub fn branch_parents(&self, id: ProductId) -> impl Iterator<Item = &ParentageId> {
        self.branch_parents.get(&id).into_iter().flatten()
    }

    /// Records the parentage id of every product the event carries.
    pub fn update_branch_parents(&mut self, event: &EventPrincipal) {
        for (id, entry) in event.products().iter() {
            let Some(provenance) = entry.provenance() else {
                continue;
            };
            self.branch_parents
                .entry(id)
                .or_default()
                .insert(provenance.parentage_id());
            self.graph.insert_empty(id);
        }
    }

    /// Resolves every collected parentage id into parent → child edges.
    /// Ids the registry does not know are skipped.
    pub fn fill_dependency_graph(&mut self) {
        let registry = self.registry;
        for (child, parentage_ids) in &self.branch_parents {
            for parentage_id in parentage_ids {
                match registry.get(parentage_id) {
                    Some(parentage) => {
                        for parent in parentage.parents() {
                            self.graph.insert_child(*parent, *child);
                        }
                    }
                    None => {
                        debug!(product = %child, parentage = %parentage_id, "parentage not in registry");
                    }
                }
            }
        }
    }

    /// Decides which provenance records persist with one written record.
    ///
    /// `products` is the record's product table, `seen_ranges` the events
    /// the record was built from (unused for Event records) and `selected`
    /// the branches the stream writes. Returns the kept set for this
    /// record; it is also accumulated into the file's kept set.
    pub fn keep_provenance(
        &mut self,
        products: &ProductTable,
        seen_ranges: &RangeSet,
        selected: &[ProductDescription],
    ) -> Result<Vec<ProductProvenance>> {
        let mut kept: BTreeMap<ProductId, ProductProvenance> = BTreeMap::new();

        for description in selected {
            let id = description.product_id();
            self.stored_history.insert(id);

            let produced = description.is_produced();
            let keep = match self.drop_meta_data {
                DropMetaData::DropNone => true,
                DropMetaData::DropPrior => produced,
                DropMetaData::DropAll => false,
            };
            if !keep {
                continue;
            }

            let entry = products.get(&id);
            match entry.and_then(|e| e.provenance()) {
                Some(provenance) => {
                    kept.insert(id, provenance.clone());
                    if self.drop_meta_data != DropMetaData::DropAll
                        && !self.drop_meta_data_for_dropped_data
                    {
                        self.keep_ancestors(provenance, products, &mut kept);
                    }
                }
                None => {
                    let status = if produced {
                        ProductStatus::NeverCreated
                    } else {
                        ProductStatus::Dropped
                    };
                    kept.insert(id, ProductProvenance::without_parents(id, status));
                }
            }

            let branch_type = description.branch_type();
            let invalidated = branch_type.supports_ranges()
                && entry.filter(|e| e.is_present()).is_some_and(|e| {
                    let written = if produced {
                        e.range_set().clone()
                    } else {
                        ranges::maybe_invalidate(branch_type, seen_ranges, e.range_set())
                    };
                    !written.is_valid()
                });
            if invalidated {
                if let Some(provenance) = kept.get_mut(&id) {
                    provenance.set_status(ProductStatus::DummyToPreventDoubleCount);
                }
                event!(
                    Level::DEBUG,
                    product = description.branch_name(),
                    "ranges invalidated; written as placeholder"
                );
            }
        }

        if let Some(bad) = kept
            .values()
            .find(|p| p.status() == ProductStatus::Uninitialized)
        {
            return Err(SpanError::logic(
                "ProvenanceLedger",
                format!("attempt to write product {} with uninitialized provenance", bad.product_id()),
            ));
        }

        let kept: Vec<ProductProvenance> = kept.into_values().collect();
        self.kept.extend(kept.iter().cloned());
        Ok(kept)
    }

    // Explicit work-stack; `kept` doubles as the visited set so each
    // ancestor's parentage is looked up at most once.
    fn keep_ancestors(
        &mut self,
        root: &ProductProvenance,
        products: &ProductTable,
        kept: &mut BTreeMap<ProductId, ProductProvenance>,
    ) {
        let registry = self.registry;
        let mut stack: Vec<ProductProvenance> = vec![root.clone()];

        while let Some(current) = stack.pop() {
            let Some(parentage) = registry.get(&current.parentage_id()) else {
                trace!(product = %current.product_id(), "no parentage for ancestor walk");
                continue;
            };
            for parent in parentage.parents() {
                self.stored_history.insert(*parent);

                if self.drop_meta_data != DropMetaData::DropNone || kept.contains_key(parent) {
                    continue;
                }
                let Some(parent_entry) = products.get(parent) else {
                    continue;
                };
                if !parent_entry.description().is_produced() {
                    continue;
                }
                let Some(parent_provenance) = parent_entry.provenance() else {
                    continue;
                };
                kept.insert(*parent, parent_provenance.clone());
                stack.push(parent_provenance.clone());
            }
        }
    }

    /// Finishes the current file: resolves the dependency graph, hands the
    /// per-file state to the caller and resets for the next file.
    pub fn close_file(&mut self) -> FileProvenance {
        self.fill_dependency_graph();
        self.branch_parents.clear();
        let provenance = FileProvenance {
            graph: std::mem::take(&mut self.graph),
            kept: std::mem::take(&mut self.kept).into_iter().collect(),
            stored_history: std::mem::take(&mut self.stored_history),
        };
        debug!(
            nodes = provenance.graph.len(),
            kept = provenance.kept.len(),
            "file provenance closed"
        );
        provenance
    }
}
