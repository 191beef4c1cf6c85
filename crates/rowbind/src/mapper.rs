use crate::cache::FieldCache;
use crate::connection::{AsyncConnection, Connection, Row};
use crate::context::{ContextCache, ExecutionContext};
use crate::helper::{self, DbHelper};
use crate::options::Options;

use rowbind_core::{
    parse, DbField, DbFieldCollection, DbSetting, EntityMap, Error, Expr, Field, Provider,
    QueryGroup, Registry, Result,
};
use rowbind_core::parse::ParseOptions;
use rowbind_sql::{Builder, ParamMap};

use std::sync::Arc;

/// The mapping facade: translates entity operations into dialect SQL and
/// runs them over a caller-owned connection.
///
/// Holds the entity registry, the schema cache, and the compiled-statement
/// cache; all three are shared state and the mapper is `Sync`, so one
/// instance serves an application.
pub struct Mapper {
    registry: Registry,
    setting: &'static DbSetting,
    builder: Builder,
    helper: Arc<dyn DbHelper>,
    fields: FieldCache,
    contexts: ContextCache,
    options: Options,
}

impl Mapper {
    pub fn new(provider: Provider, registry: Registry) -> Result<Self> {
        Self::with_options(provider, registry, Options::default())
    }

    pub fn with_options(provider: Provider, registry: Registry, options: Options) -> Result<Self> {
        Ok(Self {
            registry,
            setting: DbSetting::for_provider(provider),
            builder: Builder::for_provider(provider),
            helper: helper::for_provider(provider)?,
            fields: FieldCache::new(),
            contexts: ContextCache::new(),
            options,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn setting(&self) -> &'static DbSetting {
        self.setting
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn helper(&self) -> &dyn DbHelper {
        self.helper.as_ref()
    }

    /// Drops cached schema metadata and compiled statements, after a schema
    /// change.
    pub fn flush_caches(&self) {
        self.fields.flush();
        self.contexts.flush();
    }

    /// Compiles a predicate expression into a query group for `T`.
    pub fn compile<T: 'static>(&self, expr: &Expr) -> Result<QueryGroup> {
        let map = self.registry.entity::<T>()?;
        let options = ParseOptions {
            null_handling: self.options.null_handling,
        };
        parse::parse(expr, &map, &options)
    }

    // ---- query ----

    pub fn query<T>(
        &self,
        conn: &mut dyn Connection,
        wher: Option<&QueryGroup>,
        limit: Option<u64>,
        hints: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: Default + 'static,
    {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields(conn, map.table())?;
        let fields = map.fields();
        let mut params = ParamMap::new();
        let sql = self.builder.select(
            map.table(),
            &fields,
            wher,
            Some(&db_fields),
            limit,
            hints,
            &mut params,
        )?;
        let rows = conn.query(&sql, &params)?;
        rows.into_iter()
            .map(|row| Self::hydrate(&map, &fields, row))
            .collect()
    }

    /// Queries by a predicate expression instead of a pre-built group.
    pub fn query_by<T>(
        &self,
        conn: &mut dyn Connection,
        expr: &Expr,
        limit: Option<u64>,
        hints: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: Default + 'static,
    {
        let group = self.compile::<T>(expr)?;
        self.query(conn, Some(&group), limit, hints)
    }

    pub async fn query_async<T>(
        &self,
        conn: &mut dyn AsyncConnection,
        wher: Option<&QueryGroup>,
        limit: Option<u64>,
        hints: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: Default + 'static,
    {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields_async(conn, map.table()).await?;
        let fields = map.fields();
        let mut params = ParamMap::new();
        let sql = self.builder.select(
            map.table(),
            &fields,
            wher,
            Some(&db_fields),
            limit,
            hints,
            &mut params,
        )?;
        let rows = conn.query(&sql, &params).await?;
        rows.into_iter()
            .map(|row| Self::hydrate(&map, &fields, row))
            .collect()
    }

    pub async fn query_by_async<T>(
        &self,
        conn: &mut dyn AsyncConnection,
        expr: &Expr,
        limit: Option<u64>,
        hints: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: Default + 'static,
    {
        let group = self.compile::<T>(expr)?;
        self.query_async(conn, Some(&group), limit, hints).await
    }

    // ---- insert ----

    pub fn insert<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        entity: &mut T,
        hints: Option<&str>,
    ) -> Result<u64> {
        let context = self.insert_context::<T>(conn, 1, hints)?;
        let mut params = ParamMap::new();
        context.bind(entity, None, &mut params)?;
        self.run_keyed(conn, &context, &params, std::slice::from_mut(entity))
    }

    /// Inserts in chunks of at most `batch` rows; each distinct chunk size
    /// compiles (and caches) its own statement.
    pub fn insert_all<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        entities: &mut [T],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<u64> {
        let mut affected = 0;
        for chunk in entities.chunks_mut(batch.max(1)) {
            let context = self.insert_context::<T>(conn, chunk.len(), hints)?;
            let params = Self::bind_chunk(&context, chunk)?;
            affected += self.run_keyed(conn, &context, &params, chunk)?;
        }
        Ok(affected)
    }

    pub async fn insert_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        entity: &mut T,
        hints: Option<&str>,
    ) -> Result<u64> {
        let context = self.insert_context_async::<T>(conn, 1, hints).await?;
        let mut params = ParamMap::new();
        context.bind(entity, None, &mut params)?;
        self.run_keyed_async(conn, &context, &params, std::slice::from_mut(entity))
            .await
    }

    pub async fn insert_all_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        entities: &mut [T],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<u64> {
        let mut affected = 0;
        for chunk in entities.chunks_mut(batch.max(1)) {
            let context = self.insert_context_async::<T>(conn, chunk.len(), hints).await?;
            let params = Self::bind_chunk(&context, chunk)?;
            affected += self
                .run_keyed_async(conn, &context, &params, chunk)
                .await?;
        }
        Ok(affected)
    }

    // ---- update ----

    /// Updates the entity's writable columns, scoped by an explicit WHERE
    /// group. The group's shape varies per call, so this path is not
    /// statement-cached.
    pub fn update<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        entity: &T,
        wher: &QueryGroup,
        hints: Option<&str>,
    ) -> Result<u64> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields(conn, map.table())?;
        let (sql, params) = self.prepare_update(&map, &db_fields, entity, wher, hints)?;
        conn.execute(&sql, &params)
    }

    pub async fn update_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        entity: &T,
        wher: &QueryGroup,
        hints: Option<&str>,
    ) -> Result<u64> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields_async(conn, map.table()).await?;
        let (sql, params) = self.prepare_update(&map, &db_fields, entity, wher, hints)?;
        conn.execute(&sql, &params).await
    }

    /// Updates rows matched on the qualifier columns, in chunks of at most
    /// `batch`. Empty `qualifiers` fall back to the primary key, then to the
    /// resolved key column.
    pub fn update_all<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        entities: &[T],
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<u64> {
        let mut affected = 0;
        for chunk in entities.chunks(batch.max(1)) {
            let context = self.update_context::<T>(conn, qualifiers, chunk.len(), hints)?;
            let params = Self::bind_chunk(&context, chunk)?;
            affected += conn.execute(context.sql(), &params)?;
        }
        Ok(affected)
    }

    pub async fn update_all_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        entities: &[T],
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<u64> {
        let mut affected = 0;
        for chunk in entities.chunks(batch.max(1)) {
            let context = self
                .update_context_async::<T>(conn, qualifiers, chunk.len(), hints)
                .await?;
            let params = Self::bind_chunk(&context, chunk)?;
            affected += conn.execute(context.sql(), &params).await?;
        }
        Ok(affected)
    }

    // ---- merge ----

    pub fn merge<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        entity: &mut T,
        qualifiers: &[Field],
        hints: Option<&str>,
    ) -> Result<u64> {
        let context = self.merge_context::<T>(conn, qualifiers, 1, hints)?;
        let mut params = ParamMap::new();
        context.bind(entity, None, &mut params)?;
        self.run_keyed(conn, &context, &params, std::slice::from_mut(entity))
    }

    pub fn merge_all<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        entities: &mut [T],
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<u64> {
        let mut affected = 0;
        for chunk in entities.chunks_mut(batch.max(1)) {
            let context = self.merge_context::<T>(conn, qualifiers, chunk.len(), hints)?;
            let params = Self::bind_chunk(&context, chunk)?;
            affected += self.run_keyed(conn, &context, &params, chunk)?;
        }
        Ok(affected)
    }

    pub async fn merge_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        entity: &mut T,
        qualifiers: &[Field],
        hints: Option<&str>,
    ) -> Result<u64> {
        let context = self
            .merge_context_async::<T>(conn, qualifiers, 1, hints)
            .await?;
        let mut params = ParamMap::new();
        context.bind(entity, None, &mut params)?;
        self.run_keyed_async(conn, &context, &params, std::slice::from_mut(entity))
            .await
    }

    pub async fn merge_all_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        entities: &mut [T],
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<u64> {
        let mut affected = 0;
        for chunk in entities.chunks_mut(batch.max(1)) {
            let context = self
                .merge_context_async::<T>(conn, qualifiers, chunk.len(), hints)
                .await?;
            let params = Self::bind_chunk(&context, chunk)?;
            affected += self
                .run_keyed_async(conn, &context, &params, chunk)
                .await?;
        }
        Ok(affected)
    }

    // ---- delete ----

    pub fn delete<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        wher: Option<&QueryGroup>,
        hints: Option<&str>,
    ) -> Result<u64> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields(conn, map.table())?;
        let mut params = ParamMap::new();
        let sql = self
            .builder
            .delete(map.table(), wher, Some(&db_fields), hints, &mut params)?;
        conn.execute(&sql, &params)
    }

    pub async fn delete_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        wher: Option<&QueryGroup>,
        hints: Option<&str>,
    ) -> Result<u64> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields_async(conn, map.table()).await?;
        let mut params = ParamMap::new();
        let sql = self
            .builder
            .delete(map.table(), wher, Some(&db_fields), hints, &mut params)?;
        conn.execute(&sql, &params).await
    }

    // ---- internals ----

    fn db_fields(
        &self,
        conn: &mut dyn Connection,
        table: &str,
    ) -> Result<Arc<DbFieldCollection>> {
        if let Some(hit) = self.fields.get(self.setting.provider, table) {
            return Ok(hit);
        }
        let introspected = self.helper.get_fields(conn, table)?;
        Ok(self.fields.insert(self.setting.provider, table, introspected))
    }

    async fn db_fields_async(
        &self,
        conn: &mut dyn AsyncConnection,
        table: &str,
    ) -> Result<Arc<DbFieldCollection>> {
        if let Some(hit) = self.fields.get(self.setting.provider, table) {
            return Ok(hit);
        }
        let introspected = self.helper.get_fields_async(conn, table).await?;
        Ok(self.fields.insert(self.setting.provider, table, introspected))
    }

    fn insert_context<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields(conn, map.table())?;
        self.build_insert_context(map, db_fields, batch, hints)
    }

    async fn insert_context_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields_async(conn, map.table()).await?;
        self.build_insert_context(map, db_fields, batch, hints)
    }

    fn build_insert_context<T: 'static>(
        &self,
        map: Arc<EntityMap<T>>,
        db_fields: Arc<DbFieldCollection>,
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let key = self.cache_key("insert", &map, &[], batch, hints);
        self.contexts.get_or_create(&key, || {
            let input = Self::writable_fields(&map, &db_fields, true)?;
            let key_field = self.options.key_column_return_behavior.resolve(&db_fields);
            let sql =
                self.builder
                    .insert_all(map.table(), &input, key_field.as_ref(), batch, hints)?;
            Ok(ExecutionContext::new(sql, map, input, batch, key_field))
        })
    }

    fn update_context<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields(conn, map.table())?;
        self.build_update_context(map, db_fields, qualifiers, batch, hints)
    }

    async fn update_context_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields_async(conn, map.table()).await?;
        self.build_update_context(map, db_fields, qualifiers, batch, hints)
    }

    fn build_update_context<T: 'static>(
        &self,
        map: Arc<EntityMap<T>>,
        db_fields: Arc<DbFieldCollection>,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let qualifiers = self.resolve_qualifiers(&map, &db_fields, qualifiers)?;
        let key = self.cache_key("update", &map, &qualifiers, batch, hints);
        self.contexts.get_or_create(&key, || {
            let set_fields: Vec<DbField> = Self::writable_fields(&map, &db_fields, true)?
                .into_iter()
                .filter(|f| !qualifiers.contains(&f.field))
                .collect();
            if set_fields.is_empty() {
                return Err(Error::missing_mapping(format!(
                    "every mapped column of `{}` is a qualifier; nothing to update",
                    map.table()
                )));
            }
            let sql = self.builder.update_all(
                map.table(),
                &set_fields,
                &qualifiers,
                batch,
                hints,
            )?;
            // Qualifier values come from the entity too, so they join the
            // bound inputs.
            let mut input = set_fields;
            for qualifier in &qualifiers {
                if let Some(db_field) = db_fields.get_by_name(qualifier.unquoted()) {
                    input.push(db_field.clone());
                }
            }
            Ok(ExecutionContext::new(sql, map, input, batch, None))
        })
    }

    fn merge_context<T: 'static>(
        &self,
        conn: &mut dyn Connection,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields(conn, map.table())?;
        self.build_merge_context(map, db_fields, qualifiers, batch, hints)
    }

    async fn merge_context_async<T: 'static>(
        &self,
        conn: &mut dyn AsyncConnection,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let map = self.registry.entity::<T>()?;
        let db_fields = self.db_fields_async(conn, map.table()).await?;
        self.build_merge_context(map, db_fields, qualifiers, batch, hints)
    }

    fn build_merge_context<T: 'static>(
        &self,
        map: Arc<EntityMap<T>>,
        db_fields: Arc<DbFieldCollection>,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<Arc<ExecutionContext<T>>> {
        let qualifiers = self.resolve_qualifiers(&map, &db_fields, qualifiers)?;
        let key = self.cache_key("merge", &map, &qualifiers, batch, hints);
        self.contexts.get_or_create(&key, || {
            // The source row must carry the qualifier columns, identity
            // included; other identity columns stay out of the write set.
            let input: Vec<DbField> = {
                let mut out = Self::writable_fields(&map, &db_fields, false)?;
                out.retain(|f| !f.is_identity || qualifiers.contains(&f.field));
                out
            };
            if input.is_empty() {
                return Err(Error::missing_mapping(format!(
                    "no writable columns for table `{}`",
                    map.table()
                )));
            }
            let key_field = self.options.key_column_return_behavior.resolve(&db_fields);
            let sql = self.builder.merge_all(
                map.table(),
                &input,
                &qualifiers,
                key_field.as_ref(),
                batch,
                hints,
            )?;
            Ok(ExecutionContext::new(sql, map, input, batch, key_field))
        })
    }

    fn prepare_update<T>(
        &self,
        map: &EntityMap<T>,
        db_fields: &DbFieldCollection,
        entity: &T,
        wher: &QueryGroup,
        hints: Option<&str>,
    ) -> Result<(String, ParamMap)> {
        let input = Self::writable_fields(map, db_fields, true)?;
        // A WHERE parameter sharing a SET column's name is renamed so the
        // caller's filter value and the entity's new value both bind.
        let mut wher = wher.clone();
        wher.fix_parameters_reserving(input.iter().map(|f| f.name()));
        let mut params = ParamMap::new();
        for field in &input {
            params.insert(
                field.name().to_string(),
                map.resolve(field.name())?.get(entity),
            );
        }
        let sql = self.builder.update(
            map.table(),
            &input,
            &wher,
            Some(db_fields),
            hints,
            &mut params,
        )?;
        Ok((sql, params))
    }

    /// Explicit qualifiers win; otherwise the primary key columns; otherwise
    /// the resolved key column. A table offering none of these cannot be
    /// merge-matched.
    fn resolve_qualifiers<T>(
        &self,
        map: &EntityMap<T>,
        db_fields: &DbFieldCollection,
        qualifiers: &[Field],
    ) -> Result<Vec<Field>> {
        if !qualifiers.is_empty() {
            return Ok(qualifiers.to_vec());
        }
        let primaries: Vec<Field> = db_fields
            .primary_fields()
            .into_iter()
            .map(|f| f.field.clone())
            .collect();
        if !primaries.is_empty() {
            return Ok(primaries);
        }
        if let Some(key) = self.options.key_column_return_behavior.resolve(db_fields) {
            return Ok(vec![key.field]);
        }
        Err(Error::no_merge_key(map.entity(), map.table()))
    }

    /// Mapped columns that accept writes: present in the live schema, not
    /// generated, and (when `exclude_identity`) not identity either.
    fn writable_fields<T>(
        map: &EntityMap<T>,
        db_fields: &DbFieldCollection,
        exclude_identity: bool,
    ) -> Result<Vec<DbField>> {
        let mut out = vec![];
        for column in map.fields() {
            let Some(db_field) = db_fields.get_by_name(column.unquoted()) else {
                continue;
            };
            if db_field.is_generated() {
                continue;
            }
            if exclude_identity && db_field.is_identity {
                continue;
            }
            out.push(db_field.clone());
        }
        if out.is_empty() {
            return Err(Error::missing_mapping(format!(
                "no writable columns for table `{}`",
                map.table()
            )));
        }
        Ok(out)
    }

    fn bind_chunk<T>(context: &ExecutionContext<T>, chunk: &[T]) -> Result<ParamMap> {
        let mut params = ParamMap::new();
        if chunk.len() == 1 {
            context.bind(&chunk[0], None, &mut params)?;
        } else {
            for (row, entity) in chunk.iter().enumerate() {
                context.bind(entity, Some(row), &mut params)?;
            }
        }
        Ok(params)
    }

    /// Runs a statement that may return generated keys: a keyed context goes
    /// through `query` and writes the first column of each row back into the
    /// corresponding entity, otherwise plain `execute`.
    fn run_keyed<T>(
        &self,
        conn: &mut dyn Connection,
        context: &ExecutionContext<T>,
        params: &ParamMap,
        entities: &mut [T],
    ) -> Result<u64> {
        if context.key().is_none() {
            return conn.execute(context.sql(), params);
        }
        let rows = conn.query(context.sql(), params)?;
        Self::write_keys(context, rows, entities)?;
        Ok(entities.len() as u64)
    }

    async fn run_keyed_async<T>(
        &self,
        conn: &mut dyn AsyncConnection,
        context: &ExecutionContext<T>,
        params: &ParamMap,
        entities: &mut [T],
    ) -> Result<u64> {
        if context.key().is_none() {
            return conn.execute(context.sql(), params).await;
        }
        let rows = conn.query(context.sql(), params).await?;
        Self::write_keys(context, rows, entities)?;
        Ok(entities.len() as u64)
    }

    fn write_keys<T>(
        context: &ExecutionContext<T>,
        rows: Vec<Row>,
        entities: &mut [T],
    ) -> Result<()> {
        for (entity, row) in entities.iter_mut().zip(rows) {
            if let Some(value) = row.into_iter().next() {
                context.write_key(entity, value)?;
            }
        }
        Ok(())
    }

    fn hydrate<T: Default>(map: &EntityMap<T>, fields: &[Field], row: Row) -> Result<T> {
        let mut entity = T::default();
        for (field, value) in fields.iter().zip(row) {
            let property = map.resolve(field.unquoted())?;
            if property.has_setter() {
                property.set(&mut entity, value)?;
            }
        }
        Ok(entity)
    }

    fn cache_key<T>(
        &self,
        op: &str,
        map: &EntityMap<T>,
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> String {
        let fields: Vec<&str> = map
            .properties()
            .iter()
            .map(|p| p.column().unquoted())
            .collect();
        let qualifiers: Vec<&str> = qualifiers.iter().map(Field::unquoted).collect();
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.setting.provider,
            op,
            map.entity(),
            map.table(),
            fields.join(","),
            qualifiers.join(","),
            batch,
            hints.unwrap_or_default()
        )
    }
}
