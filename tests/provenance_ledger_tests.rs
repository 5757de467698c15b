/// Provenance ledger tests
///
/// Kept-provenance selection under each dropMetaData policy and the
/// per-file dependency graph.
/// Run with: cargo test --test provenance_ledger_tests

use eventspan::prelude::*;
use eventspan::provenance::ParentageId;
use std::cell::Cell;
use std::collections::BTreeSet;

/// Registry wrapper that counts lookups.
#[derive(Default)]
struct CountingRegistry {
    inner: InMemoryParentageRegistry,
    lookups: Cell<usize>,
}

impl ParentageRegistry for CountingRegistry {
    fn get(&self, id: &ParentageId) -> Option<&Parentage> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.get(id)
    }
}

struct Lineage {
    registry: CountingRegistry,
    event: EventPrincipal,
    a: ProductDescription,
    b: ProductDescription,
    c: ProductDescription,
    d: ProductDescription,
}

fn put_product(
    registry: &mut InMemoryParentageRegistry,
    event: &mut EventPrincipal,
    description: &ProductDescription,
    parents: &[&ProductDescription],
) {
    let parentage = Parentage::new(parents.iter().map(|p| p.product_id()));
    registry.put(parentage.clone());
    event
        .put(
            ProductEntry::new(description.clone(), ProductValue::Integer(1), RangeSet::invalid())
                .with_provenance(ProductProvenance::present(description.product_id(), &parentage)),
        )
        .unwrap();
}

// a → b, a → c, b → d, c → d
fn diamond(a_produced: bool) -> Lineage {
    let a = ProductDescription::new("raw", BranchType::Event, a_produced);
    let b = ProductDescription::new("hits", BranchType::Event, true);
    let c = ProductDescription::new("clusters", BranchType::Event, true);
    let d = ProductDescription::new("tracks", BranchType::Event, true);

    let mut registry = CountingRegistry::default();
    let mut event = EventPrincipal::new(EventId::new(1, 0, 1), false);
    put_product(&mut registry.inner, &mut event, &a, &[]);
    put_product(&mut registry.inner, &mut event, &b, &[&a]);
    put_product(&mut registry.inner, &mut event, &c, &[&a]);
    put_product(&mut registry.inner, &mut event, &d, &[&b, &c]);

    Lineage {
        registry,
        event,
        a,
        b,
        c,
        d,
    }
}

fn kept_ids(kept: &[ProductProvenance]) -> BTreeSet<ProductId> {
    kept.iter().map(|p| p.product_id()).collect()
}

#[test]
fn test_diamond_ancestry_is_walked_once() {
    let lineage = diamond(true);
    let config = OutputConfig::new();
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &config);

    let kept = ledger
        .keep_provenance(lineage.event.products(), &RangeSet::invalid(), &[lineage.d.clone()])
        .unwrap();

    let expected: BTreeSet<ProductId> = [&lineage.a, &lineage.b, &lineage.c, &lineage.d]
        .iter()
        .map(|p| p.product_id())
        .collect();
    assert_eq!(kept_ids(&kept), expected);
    // One lookup per kept product; `a` is shared by both branches.
    assert_eq!(lineage.registry.lookups.get(), 4);
}

#[test]
fn test_input_ancestors_are_not_kept() {
    let lineage = diamond(false);
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &OutputConfig::new());

    let kept = ledger
        .keep_provenance(lineage.event.products(), &RangeSet::invalid(), &[lineage.d.clone()])
        .unwrap();
    assert!(!kept_ids(&kept).contains(&lineage.a.product_id()));
    assert_eq!(kept.len(), 3);

    let file = ledger.close_file();
    assert!(file.stored_history.contains(&lineage.a.product_id()));
}

#[test]
fn test_prior_keeps_only_produced_products() {
    let lineage = diamond(false);
    let config = OutputConfig::new().drop_meta_data(DropMetaData::DropPrior);
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &config);

    let kept = ledger
        .keep_provenance(
            lineage.event.products(),
            &RangeSet::invalid(),
            &[lineage.a.clone(), lineage.d.clone()],
        )
        .unwrap();
    assert_eq!(kept_ids(&kept), BTreeSet::from([lineage.d.product_id()]));
}

#[test]
fn test_all_keeps_nothing() {
    let lineage = diamond(true);
    let config = OutputConfig::new().drop_meta_data(DropMetaData::DropAll);
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &config);

    let kept = ledger
        .keep_provenance(lineage.event.products(), &RangeSet::invalid(), &[lineage.d.clone()])
        .unwrap();
    assert!(kept.is_empty());
    assert_eq!(lineage.registry.lookups.get(), 0);

    let file = ledger.close_file();
    assert_eq!(file.stored_history, BTreeSet::from([lineage.d.product_id()]));
}

#[test]
fn test_drop_for_dropped_data_skips_ancestors() {
    let lineage = diamond(true);
    let config = OutputConfig::new().drop_meta_data_for_dropped_data(true);
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &config);

    let kept = ledger
        .keep_provenance(lineage.event.products(), &RangeSet::invalid(), &[lineage.d.clone()])
        .unwrap();
    assert_eq!(kept_ids(&kept), BTreeSet::from([lineage.d.product_id()]));
}

#[test]
fn test_invalidated_ranges_written_as_placeholder() {
    let registry = InMemoryParentageRegistry::new();
    let mut ledger = ProvenanceLedger::new(&registry, &OutputConfig::new());

    let description = ProductDescription::new("nPOT", BranchType::SubRun, true);
    let mut record = SubRunPrincipal::new(SubRunId::new(1, 0));
    record
        .put(
            ProductEntry::new(description.clone(), ProductValue::Integer(5), RangeSet::invalid())
                .with_provenance(ProductProvenance::without_parents(
                    description.product_id(),
                    ProductStatus::Present,
                )),
        )
        .unwrap();

    let kept = ledger
        .keep_provenance(record.products(), record.seen_ranges(), &[description])
        .unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].status(), ProductStatus::DummyToPreventDoubleCount);
}

fn subrun_record(
    description: &ProductDescription,
    seen: RangeSet,
    product_ranges: RangeSet,
) -> SubRunPrincipal {
    let mut record = SubRunPrincipal::new(SubRunId::new(1, 0));
    record.set_seen_ranges(seen).unwrap();
    record
        .put(
            ProductEntry::new(description.clone(), ProductValue::Integer(5), product_ranges)
                .with_provenance(ProductProvenance::without_parents(
                    description.product_id(),
                    ProductStatus::Present,
                )),
        )
        .unwrap();
    record
}

fn subrun0(begin: u32, end: u32) -> RangeSet {
    RangeSet::new(1, [EventRange::new(0, begin, end)])
}

#[test]
fn test_partially_seen_input_product_written_as_placeholder() {
    let registry = InMemoryParentageRegistry::new();
    let mut ledger = ProvenanceLedger::new(&registry, &OutputConfig::new());
    let input = ProductDescription::new("nPOT", BranchType::SubRun, false);

    // Second output file of a concatenate-then-switch job: the input
    // product spans events the first file already carried.
    let record = subrun_record(&input, subrun0(9, 13), subrun0(5, 13));
    let kept = ledger
        .keep_provenance(record.products(), record.seen_ranges(), &[input.clone()])
        .unwrap();
    assert_eq!(kept[0].status(), ProductStatus::DummyToPreventDoubleCount);

    // First file: the product starts inside the record's seen ranges.
    let record = subrun_record(&input, subrun0(5, 9), subrun0(5, 13));
    let kept = ledger
        .keep_provenance(record.products(), record.seen_ranges(), &[input])
        .unwrap();
    assert_eq!(kept[0].status(), ProductStatus::Present);
}

#[test]
fn test_produced_and_full_subrun_products_are_never_invalidated() {
    let registry = InMemoryParentageRegistry::new();
    let mut ledger = ProvenanceLedger::new(&registry, &OutputConfig::new());

    let produced = ProductDescription::new("userSum", BranchType::SubRun, true);
    let record = subrun_record(&produced, subrun0(9, 13), subrun0(1, 4));
    let kept = ledger
        .keep_provenance(record.products(), record.seen_ranges(), &[produced])
        .unwrap();
    assert_eq!(kept[0].status(), ProductStatus::Present);

    let full = ProductDescription::new("nPOT", BranchType::SubRun, false);
    let record = subrun_record(&full, subrun0(9, 13), RangeSet::for_subrun(1, 0));
    let kept = ledger
        .keep_provenance(record.products(), record.seen_ranges(), &[full])
        .unwrap();
    assert_eq!(kept[0].status(), ProductStatus::Present);
}

#[test]
fn test_dependency_graph_from_events() {
    let lineage = diamond(true);
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &OutputConfig::new());
    ledger.update_branch_parents(&lineage.event);
    ledger.fill_dependency_graph();

    let mut descendants = ledger.graph().descendants(lineage.a.product_id());
    descendants.sort();
    let mut expected = vec![
        lineage.b.product_id(),
        lineage.c.product_id(),
        lineage.d.product_id(),
    ];
    expected.sort();
    assert_eq!(descendants, expected);

    // Every edge is backed by a registry entry reachable from the child.
    for (parent, child) in ledger.graph().edges() {
        let backed = ledger.branch_parents(child).any(|id| {
            lineage
                .registry
                .inner
                .get(id)
                .is_some_and(|p| p.parents().contains(&parent))
        });
        assert!(backed, "edge {} -> {} has no parentage", parent, child);
    }
}

#[test]
fn test_unresolvable_parentage_is_skipped() {
    let registry = InMemoryParentageRegistry::new();
    let mut ledger = ProvenanceLedger::new(&registry, &OutputConfig::new());

    let orphan = ProductDescription::new("orphan", BranchType::Event, false);
    let mut event = EventPrincipal::new(EventId::new(1, 0, 1), false);
    event
        .put(
            ProductEntry::new(orphan.clone(), ProductValue::Null, RangeSet::invalid())
                .with_provenance(ProductProvenance::present(
                    orphan.product_id(),
                    &Parentage::new([ProductId::new(42)]),
                )),
        )
        .unwrap();

    ledger.update_branch_parents(&event);
    let file = ledger.close_file();
    assert!(file.graph.contains(orphan.product_id()));
    assert_eq!(file.graph.edges().count(), 0);
}

#[test]
fn test_file_provenance_exports_json() {
    let lineage = diamond(true);
    let mut ledger = ProvenanceLedger::new(&lineage.registry, &OutputConfig::new());
    ledger.update_branch_parents(&lineage.event);
    ledger
        .keep_provenance(lineage.event.products(), &RangeSet::invalid(), &[lineage.d.clone()])
        .unwrap();

    let file = ledger.close_file();
    let json = file.to_json().unwrap();
    let parsed: eventspan::FileProvenance = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, file);
}
