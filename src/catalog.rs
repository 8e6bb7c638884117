extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::PatternError;

/// One named entry in the reference thread catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceColor {
    /// Catalog id (e.g. a DMC floss number). Unique by convention; on
    /// duplicates, lookups resolve to the first entry in catalog order.
    pub id: String,
    pub rgb: rgb::RGB<u8>,
    pub name: String,
}

impl ReferenceColor {
    pub fn new(id: impl Into<String>, r: u8, g: u8, b: u8, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rgb: rgb::RGB { r, g, b },
            name: name.into(),
        }
    }
}

/// The catalog id of pure white, used as the matcher's fail-closed default.
pub const WHITE_ID: &str = "5200";

/// An immutable, ordered store of reference thread colors.
///
/// Order is insertion order and is load-bearing only for tie-breaking and
/// symbol assignment, never for distance comparisons. Safe for concurrent
/// readers; never mutated after construction.
#[derive(Debug, Clone)]
pub struct ThreadCatalog {
    entries: Vec<ReferenceColor>,
}

impl ThreadCatalog {
    /// Build a catalog from an ordered list of entries.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::EmptyCatalog`] for an empty list. Grid cells
    /// store catalog indices as `u16`, so more than 65535 entries is rejected
    /// with [`PatternError::CatalogTooLarge`].
    pub fn new(entries: Vec<ReferenceColor>) -> Result<Self, PatternError> {
        if entries.is_empty() {
            return Err(PatternError::EmptyCatalog);
        }
        if entries.len() > usize::from(u16::MAX) {
            return Err(PatternError::CatalogTooLarge(entries.len()));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[ReferenceColor] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ReferenceColor> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceColor> {
        self.entries.get(index)
    }

    /// Look up an entry by id. If ids are duplicated, the first entry in
    /// catalog order wins.
    pub fn by_id(&self, id: &str) -> Option<&ReferenceColor> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Index of the first entry with the given id, in catalog order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|c| c.id == id)
    }
}
