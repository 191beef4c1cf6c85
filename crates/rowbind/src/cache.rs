use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rowbind_core::{DbFieldCollection, Provider};

/// Caches introspected column metadata per (provider, table).
///
/// Lookups race benignly: a miss computes outside the lock and the first
/// insert wins, so every caller of a key sees one shared collection.
#[derive(Default)]
pub struct FieldCache {
    entries: RwLock<HashMap<(Provider, String), Arc<DbFieldCollection>>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, provider: Provider, table: &str) -> Option<Arc<DbFieldCollection>> {
        self.entries
            .read()
            .expect("field cache lock poisoned")
            .get(&(provider, table.to_string()))
            .cloned()
    }

    /// Inserts a freshly introspected collection, keeping an already cached
    /// one when a racing introspection got there first.
    pub fn insert(
        &self,
        provider: Provider,
        table: &str,
        fields: DbFieldCollection,
    ) -> Arc<DbFieldCollection> {
        let mut entries = self.entries.write().expect("field cache lock poisoned");
        entries
            .entry((provider, table.to_string()))
            .or_insert_with(|| Arc::new(fields))
            .clone()
    }

    /// Drops every cached entry; the next lookup re-introspects.
    pub fn flush(&self) {
        self.entries
            .write()
            .expect("field cache lock poisoned")
            .clear();
    }

    /// Drops one table's entry, after a schema change to that table.
    pub fn invalidate(&self, provider: Provider, table: &str) {
        self.entries
            .write()
            .expect("field cache lock poisoned")
            .remove(&(provider, table.to_string()));
    }
}
