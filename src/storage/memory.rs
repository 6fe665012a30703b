use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::domain::{AssetRecord, AssetRegistry, RegistryError, catalog::AssetCategory};

/// An in-process registry.
///
/// Useful for tests and for embedding the generator in a service that holds
/// its collections in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    collections: RwLock<HashMap<AssetCategory, Vec<AssetRecord>>>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record to a category's collection.
    pub fn insert(&self, category: AssetCategory, record: AssetRecord) {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(category)
            .or_default()
            .push(record);
    }

    /// Returns the number of records in a category's collection.
    #[must_use]
    pub fn len(&self, category: AssetCategory) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
            .map_or(0, Vec::len)
    }
}

impl FromIterator<(AssetCategory, AssetRecord)> for MemoryRegistry {
    fn from_iter<T: IntoIterator<Item = (AssetCategory, AssetRecord)>>(iter: T) -> Self {
        let registry = Self::new();
        for (category, record) in iter {
            registry.insert(category, record);
        }
        registry
    }
}

impl AssetRegistry for MemoryRegistry {
    fn query(&self, category: AssetCategory) -> Result<Vec<AssetRecord>, RegistryError> {
        Ok(self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }
}
