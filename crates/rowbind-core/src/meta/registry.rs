use super::EntityMap;
use crate::{Error, Result};

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Holds the registered [`EntityMap`]s, keyed by entity type.
///
/// Explicitly constructed and passed through rather than ambient: tests
/// build an isolated registry per test. The map is append-only; registering
/// the same type again replaces the entry wholesale, so readers only ever
/// observe fully constructed maps.
#[derive(Default)]
pub struct Registry {
    maps: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: 'static>(&self, map: EntityMap<T>) {
        self.maps
            .write()
            .expect("registry lock poisoned")
            .insert(TypeId::of::<T>(), Arc::new(Arc::new(map)));
    }

    /// Looks up the mapping for `T`, failing with a missing-mapping error
    /// when the type was never registered.
    pub fn entity<T: 'static>(&self) -> Result<Arc<EntityMap<T>>> {
        let maps = self.maps.read().expect("registry lock poisoned");
        let entry = maps.get(&TypeId::of::<T>()).ok_or_else(|| {
            Error::missing_mapping(format!(
                "entity type `{}` is not registered",
                type_name::<T>()
            ))
        })?;
        let map = entry
            .downcast_ref::<Arc<EntityMap<T>>>()
            .expect("registry entry holds a different type");
        Ok(map.clone())
    }
}
