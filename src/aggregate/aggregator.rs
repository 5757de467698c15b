use super::Aggregate;
use crate::core::{BranchType, Result, SpanError};
use crate::ranges::{self, RangeSet};
use tracing::debug;

/// A Run- or SubRun-scoped value together with the ranges it covers, as
/// read back from a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading<T> {
    value: T,
    range_set: RangeSet,
    branch_type: BranchType,
}

impl<T> Reading<T> {
    pub fn new(value: T, range_set: RangeSet, branch_type: BranchType) -> Self {
        Self {
            value,
            range_set,
            branch_type,
        }
    }

    pub fn subrun(value: T, range_set: RangeSet) -> Self {
        Self::new(value, range_set, BranchType::SubRun)
    }

    pub fn run(value: T, range_set: RangeSet) -> Self {
        Self::new(value, range_set, BranchType::Run)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn range_set(&self) -> &RangeSet {
        &self.range_set
    }

    pub fn branch_type(&self) -> BranchType {
        self.branch_type
    }
}

/// Running aggregate of Run/SubRun readings.
///
/// A reading is folded in only when its ranges are disjoint from what the
/// cell already holds, so the same events are never counted twice even
/// when readings arrive out of order or repeatedly. A reading from a
/// different Run (or SubRun, for SubRun products) starts the cell over.
#[derive(Debug, Clone)]
pub struct Aggregator<T> {
    value: Option<T>,
    range_set: RangeSet,
}

impl<T> Default for Aggregator<T> {
    fn default() -> Self {
        Self {
            value: None,
            range_set: RangeSet::invalid(),
        }
    }
}

impl<T: Aggregate + Clone> Aggregator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `reading` in. Returns whether it was accepted; overlapping
    /// readings are ignored.
    pub fn update(&mut self, reading: &Reading<T>) -> Result<bool> {
        self.update_impl(reading, reading.value())
    }

    /// Like [`update`](Self::update) but folds `value` instead of the
    /// reading's own value, keeping the reading's ranges.
    pub fn update_with(&mut self, reading: &Reading<T>, value: &T) -> Result<bool> {
        self.update_impl(reading, value)
    }

    fn update_impl(&mut self, reading: &Reading<T>, value: &T) -> Result<bool> {
        let incoming = reading.range_set();
        if !incoming.is_valid() {
            return Err(SpanError::logic(
                "Aggregator::update",
                format!(
                    "attempt to update {} from a reading with an invalid range set",
                    std::any::type_name::<Self>()
                ),
            ));
        }

        if self.should_reset(reading)? {
            self.value = Some(value.clone());
            self.range_set = incoming.collapse();
            return Ok(true);
        }

        if incoming.is_empty() || !ranges::disjoint_ranges(&self.range_set, incoming) {
            debug!(
                current = %self.range_set,
                rejected = %incoming,
                "reading overlaps the aggregated ranges; ignored"
            );
            return Ok(false);
        }

        let Some(current) = self.value.as_mut() else {
            return Err(SpanError::logic(
                "Aggregator::update",
                "valid range set without a value",
            ));
        };
        current.aggregate(value);
        self.range_set.merge(incoming)?;
        Ok(true)
    }

    fn should_reset(&self, reading: &Reading<T>) -> Result<bool> {
        if !self.range_set.is_valid() {
            return Ok(true);
        }
        let incoming = reading.range_set();
        match reading.branch_type() {
            BranchType::SubRun => {
                if self.range_set.is_empty() {
                    return Ok(true);
                }
                Ok(self.range_set.run() != incoming.run()
                    || (incoming.front_subrun().is_some()
                        && incoming.front_subrun() != self.range_set.front_subrun()))
            }
            BranchType::Run => Ok(self.range_set.run() != incoming.run()),
            BranchType::Event => Err(SpanError::ProductCannotBeAggregated(format!(
                "{} can only aggregate SubRun or Run products",
                std::any::type_name::<Self>()
            ))),
        }
    }
}

impl<T> Aggregator<T> {
    /// Default-constructed cells are invalid until their first update; no
    /// update can invalidate them again.
    pub fn is_valid(&self) -> bool {
        self.range_set.is_valid()
    }

    pub fn product(&self) -> Result<&T> {
        match (&self.value, self.is_valid()) {
            (Some(value), true) => Ok(value),
            _ => Err(SpanError::logic(
                "Aggregator::product",
                format!(
                    "{} read before any update; check is_valid() first",
                    std::any::type_name::<Self>()
                ),
            )),
        }
    }

    pub fn range_set(&self) -> Result<&RangeSet> {
        if !self.is_valid() {
            return Err(SpanError::logic(
                "Aggregator::range_set",
                format!(
                    "{} read before any update; check is_valid() first",
                    std::any::type_name::<Self>()
                ),
            ));
        }
        Ok(&self.range_set)
    }
}

fn valid_ranges<'a, T, U>(
    a: &'a Aggregator<T>,
    b: &'a Aggregator<U>,
) -> Result<(&'a RangeSet, &'a RangeSet)> {
    if !a.is_valid() || !b.is_valid() {
        return Err(SpanError::logic(
            "Aggregator",
            "attempt to compare range sets where one or both aggregators are invalid",
        ));
    }
    Ok((&a.range_set, &b.range_set))
}

pub fn same_ranges<T, U>(a: &Aggregator<T>, b: &Aggregator<U>) -> Result<bool> {
    let (a, b) = valid_ranges(a, b)?;
    Ok(ranges::same_ranges(a, b))
}

pub fn disjoint_ranges<T, U>(a: &Aggregator<T>, b: &Aggregator<U>) -> Result<bool> {
    let (a, b) = valid_ranges(a, b)?;
    Ok(ranges::disjoint_ranges(a, b))
}

pub fn overlapping_ranges<T, U>(a: &Aggregator<T>, b: &Aggregator<U>) -> Result<bool> {
    let (a, b) = valid_ranges(a, b)?;
    Ok(ranges::overlapping_ranges(a, b))
}
