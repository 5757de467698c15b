use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Types whose values can be folded together across disjoint event spans.
///
/// The combination must be associative and commutative; it does not need
/// to detect duplicates, the range gating of [`Aggregator`] takes care of
/// that.
///
/// [`Aggregator`]: super::Aggregator
pub trait Aggregate {
    fn aggregate(&mut self, other: &Self);
}

macro_rules! aggregate_by_sum {
    ($($t:ty),* $(,)?) => {
        $(
            impl Aggregate for $t {
                fn aggregate(&mut self, other: &Self) {
                    *self += *other;
                }
            }
        )*
    };
}

aggregate_by_sum!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl Aggregate for String {
    fn aggregate(&mut self, other: &Self) {
        self.push_str(other);
    }
}

impl<T: Clone> Aggregate for Vec<T> {
    fn aggregate(&mut self, other: &Self) {
        self.extend_from_slice(other);
    }
}

impl<T: Clone> Aggregate for VecDeque<T> {
    fn aggregate(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }
}

// Maps keep the value already present for a key.
impl<K: Ord + Clone, V: Clone> Aggregate for BTreeMap<K, V> {
    fn aggregate(&mut self, other: &Self) {
        for (key, value) in other {
            self.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Aggregate for HashMap<K, V> {
    fn aggregate(&mut self, other: &Self) {
        for (key, value) in other {
            self.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}

impl<T: Ord + Clone> Aggregate for BTreeSet<T> {
    fn aggregate(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }
}

impl<T: Eq + Hash + Clone> Aggregate for HashSet<T> {
    fn aggregate(&mut self, other: &Self) {
        self.extend(other.iter().cloned());
    }
}

impl<A: Aggregate, B: Aggregate> Aggregate for (A, B) {
    fn aggregate(&mut self, other: &Self) {
        self.0.aggregate(&other.0);
        self.1.aggregate(&other.1);
    }
}
