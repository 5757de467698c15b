use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identity of a product branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(u64);

impl ProductId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Stable id derived from the branch name (first eight bytes of its
    /// SHA-256 digest).
    pub fn from_branch_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid_{}", self.0)
    }
}

/// Digest of a [`Parentage`]; the lineage key each product's provenance
/// carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParentageId([u8; 32]);

impl ParentageId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ParentageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Immediate parents of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parentage {
    parents: Vec<ProductId>,
}

impl Parentage {
    pub fn new(parents: impl IntoIterator<Item = ProductId>) -> Self {
        let mut parents: Vec<ProductId> = parents.into_iter().collect();
        parents.sort();
        parents.dedup();
        Self { parents }
    }

    pub fn parents(&self) -> &[ProductId] {
        &self.parents
    }

    pub fn id(&self) -> ParentageId {
        let mut hasher = Sha256::new();
        for parent in &self.parents {
            hasher.update(parent.0.to_be_bytes());
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        ParentageId(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductStatus {
    Present,
    NeverCreated,
    Dropped,
    /// Written as an empty placeholder because its ranges were invalidated
    /// while combining Run/SubRun fragments.
    DummyToPreventDoubleCount,
    Unknown,
    Uninitialized,
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Present => write!(f, "present"),
            ProductStatus::NeverCreated => write!(f, "neverCreated"),
            ProductStatus::Dropped => write!(f, "dropped"),
            ProductStatus::DummyToPreventDoubleCount => write!(f, "dummyToPreventDoubleCount"),
            ProductStatus::Unknown => write!(f, "unknown"),
            ProductStatus::Uninitialized => write!(f, "uninitialized"),
        }
    }
}

/// Per-product provenance record, as persisted next to the product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductProvenance {
    product_id: ProductId,
    status: ProductStatus,
    parentage_id: ParentageId,
}

impl ProductProvenance {
    pub fn new(product_id: ProductId, status: ProductStatus, parentage_id: ParentageId) -> Self {
        Self {
            product_id,
            status,
            parentage_id,
        }
    }

    pub fn present(product_id: ProductId, parentage: &Parentage) -> Self {
        Self::new(product_id, ProductStatus::Present, parentage.id())
    }

    /// Provenance for a product with no recorded parents.
    pub fn without_parents(product_id: ProductId, status: ProductStatus) -> Self {
        Self::new(product_id, status, Parentage::default().id())
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: ProductStatus) {
        self.status = status;
    }

    pub fn parentage_id(&self) -> ParentageId {
        self.parentage_id
    }
}
