use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use rowbind_core::{DbField, EntityMap, Result, Value};
use rowbind_sql::ParamMap;

/// A compiled write operation: finished SQL text plus the bindings that move
/// entity values into its placeholders.
///
/// Built once per distinct (entity, table, fields, qualifiers, batch, hints)
/// shape and cached; execution re-binds values through the entity map's
/// pre-built accessors without touching metadata again.
pub struct ExecutionContext<T> {
    sql: String,
    map: Arc<EntityMap<T>>,
    input: Vec<DbField>,
    batch: usize,
    key: Option<DbField>,
}

impl<T> ExecutionContext<T> {
    pub fn new(
        sql: String,
        map: Arc<EntityMap<T>>,
        input: Vec<DbField>,
        batch: usize,
        key: Option<DbField>,
    ) -> Self {
        Self {
            sql,
            map,
            input,
            batch,
            key,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The columns bound per row, generated columns already excluded.
    pub fn input_fields(&self) -> &[DbField] {
        &self.input
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    /// The column whose database-generated value is written back, if any.
    pub fn key(&self) -> Option<&DbField> {
        self.key.as_ref()
    }

    /// Binds one entity's values as row `row` of the batch. `None` binds
    /// unsuffixed names for single-row statements.
    pub fn bind(&self, entity: &T, row: Option<usize>, params: &mut ParamMap) -> Result<()> {
        for field in &self.input {
            let property = self.map.resolve(field.name())?;
            let name = match row {
                Some(row) => format!("{}_{row}", field.name()),
                None => field.name().to_string(),
            };
            params.insert(name, property.get(entity));
        }
        Ok(())
    }

    /// Writes a database-returned key value back into the entity.
    pub fn write_key(&self, entity: &mut T, value: Value) -> Result<()> {
        match &self.key {
            Some(key) => self.map.resolve(key.name())?.set(entity, value),
            None => Ok(()),
        }
    }
}

impl<T> fmt::Debug for ExecutionContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("sql", &self.sql)
            .field("input", &self.input)
            .field("batch", &self.batch)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Caches [`ExecutionContext`]s by their composite key.
///
/// Identical keys observe the same `Arc`; the double check under the write
/// lock keeps concurrent builders from installing two contexts for one key.
#[derive(Default)]
pub struct ContextCache {
    entries: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create<T, F>(&self, key: &str, build: F) -> Result<Arc<ExecutionContext<T>>>
    where
        T: 'static,
        F: FnOnce() -> Result<ExecutionContext<T>>,
    {
        {
            let entries = self.entries.read().expect("context cache lock poisoned");
            if let Some(hit) = entries.get(key) {
                return Ok(Self::downcast(hit));
            }
        }

        // Built outside the lock; a racing builder may win the insert.
        let built = Arc::new(build()?);

        let mut entries = self.entries.write().expect("context cache lock poisoned");
        if let Some(hit) = entries.get(key) {
            return Ok(Self::downcast(hit));
        }
        entries.insert(key.to_string(), Arc::new(built.clone()));
        Ok(built)
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("context cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush(&self) {
        self.entries
            .write()
            .expect("context cache lock poisoned")
            .clear();
    }

    fn downcast<T: 'static>(entry: &Arc<dyn Any + Send + Sync>) -> Arc<ExecutionContext<T>> {
        entry
            .downcast_ref::<Arc<ExecutionContext<T>>>()
            .expect("context cache entry holds a different type")
            .clone()
    }
}
