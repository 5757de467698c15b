use super::ProductId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Parent → children adjacency between product branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDependencyGraph {
    children: BTreeMap<ProductId, BTreeSet<ProductId>>,
}

impl ProductDependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` as a known node without children.
    pub fn insert_empty(&mut self, id: ProductId) {
        self.children.entry(id).or_default();
    }

    pub fn insert_child(&mut self, parent: ProductId, child: ProductId) {
        self.children.entry(parent).or_default().insert(child);
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.children.contains_key(&id)
    }

    pub fn children(&self, id: ProductId) -> impl Iterator<Item = ProductId> + '_ {
        self.children
            .get(&id)
            .into_iter()
            .flat_map(|children| children.iter().copied())
    }

    /// Every product reachable from `id`, excluding `id` itself.
    pub fn descendants(&self, id: ProductId) -> Vec<ProductId> {
        let mut visited: BTreeSet<ProductId> = BTreeSet::new();
        let mut stack: Vec<ProductId> = vec![id];
        let mut result = Vec::new();
        visited.insert(id);

        while let Some(current) = stack.pop() {
            for child in self.children(current) {
                if visited.insert(child) {
                    result.push(child);
                    stack.push(child);
                }
            }
        }
        result
    }

    pub fn nodes(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.children.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (ProductId, ProductId)> + '_ {
        self.children
            .iter()
            .flat_map(|(parent, children)| children.iter().map(move |child| (*parent, *child)))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }
}
