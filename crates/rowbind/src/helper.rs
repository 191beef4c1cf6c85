mod mysql;
pub use mysql::MySqlHelper;

mod postgres;
pub use postgres::PostgresHelper;

mod sql_server;
pub use sql_server::SqlServerHelper;

mod sqlite;
pub use sqlite::SqliteHelper;

use crate::connection::{AsyncConnection, Connection, Row};

use async_trait::async_trait;
use regex::Regex;

use rowbind_core::{DbFieldCollection, Error, Provider, Result, Value};
use rowbind_sql::ParamMap;

use std::sync::{Arc, OnceLock};

/// What a catalog object is. Anything else the catalog reports fails fast;
/// an unknown kind means the introspection query itself is out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObjectKind {
    Table,
    View,
}

impl SchemaObjectKind {
    pub(crate) fn from_catalog(kind: &str) -> Result<Self> {
        match kind {
            "BASE TABLE" | "TABLE" | "table" | "U" => Ok(Self::Table),
            "VIEW" | "view" | "V" => Ok(Self::View),
            other => Err(Error::unrecognized_schema_object(other)),
        }
    }
}

/// One table or view visible in the connected database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObject {
    pub kind: SchemaObjectKind,
    pub schema: Option<String>,
    pub name: String,
}

/// The engine identity and version reported by a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbRuntimeSetting {
    pub engine: String,
    pub raw_version: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// MySQL connections may actually be talking to MariaDB; some behavior
    /// differences hinge on this.
    pub is_maria_db: bool,
}

impl DbRuntimeSetting {
    pub(crate) fn parse(engine: &str, raw: &str) -> Result<Self> {
        let caps = version_regex().captures(raw).ok_or_else(|| {
            Error::configuration(format!(
                "cannot parse version `{raw}` reported by {engine}"
            ))
        })?;
        let part = |i: usize| -> u32 {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or_default()
        };
        Ok(Self {
            engine: engine.to_string(),
            raw_version: raw.to_string(),
            major: part(1),
            minor: part(2),
            patch: part(3),
            is_maria_db: raw.contains("MariaDB"),
        })
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("static pattern"))
}

/// Per-backend schema introspection.
///
/// Implementations are pure translators: the `*_query` methods produce
/// catalog SQL, the `parse_*` methods map the rows that came back by fixed
/// column ordinal. The provided `get_*` methods wire the two through a
/// connection, once for the sync trait and once for the async one, so each
/// dialect is written exactly once.
#[async_trait]
pub trait DbHelper: Send + Sync {
    fn provider(&self) -> Provider;

    /// The catalog query returning one row per column of `table`.
    fn fields_query(&self, table: &str) -> (String, ParamMap);

    /// Maps catalog rows to column metadata.
    fn parse_fields(&self, table: &str, rows: Vec<Row>) -> Result<DbFieldCollection>;

    /// The catalog query listing tables and views.
    fn objects_query(&self) -> String;

    fn parse_objects(&self, rows: Vec<Row>) -> Result<Vec<SchemaObject>>;

    /// The query reporting the engine version.
    fn version_query(&self) -> String;

    fn parse_version(&self, value: Option<Value>) -> Result<DbRuntimeSetting>;

    fn get_fields(&self, conn: &mut dyn Connection, table: &str) -> Result<DbFieldCollection> {
        let (sql, params) = self.fields_query(table);
        let rows = conn.query(&sql, &params)?;
        self.parse_fields(table, rows)
    }

    fn get_schema_objects(&self, conn: &mut dyn Connection) -> Result<Vec<SchemaObject>> {
        let rows = conn.query(&self.objects_query(), &ParamMap::new())?;
        self.parse_objects(rows)
    }

    fn runtime_setting(&self, conn: &mut dyn Connection) -> Result<DbRuntimeSetting> {
        let value = conn.query_scalar(&self.version_query(), &ParamMap::new())?;
        self.parse_version(value)
    }

    async fn get_fields_async(
        &self,
        conn: &mut dyn AsyncConnection,
        table: &str,
    ) -> Result<DbFieldCollection> {
        let (sql, params) = self.fields_query(table);
        let rows = conn.query(&sql, &params).await?;
        self.parse_fields(table, rows)
    }

    async fn get_schema_objects_async(
        &self,
        conn: &mut dyn AsyncConnection,
    ) -> Result<Vec<SchemaObject>> {
        let rows = conn.query(&self.objects_query(), &ParamMap::new()).await?;
        self.parse_objects(rows)
    }

    async fn runtime_setting_async(
        &self,
        conn: &mut dyn AsyncConnection,
    ) -> Result<DbRuntimeSetting> {
        let value = conn.query_scalar(&self.version_query(), &ParamMap::new()).await?;
        self.parse_version(value)
    }
}

/// The helper for a provider. Oracle ships dialect settings but no catalog
/// helper; asking for one is a not-supported error rather than a panic.
pub fn for_provider(provider: Provider) -> Result<Arc<dyn DbHelper>> {
    match provider {
        Provider::SqlServer => Ok(Arc::new(SqlServerHelper)),
        Provider::PostgreSql => Ok(Arc::new(PostgresHelper)),
        Provider::MySql => Ok(Arc::new(MySqlHelper)),
        Provider::Sqlite => Ok(Arc::new(SqliteHelper)),
        Provider::Oracle => Err(Error::not_supported(
            "no schema helper is available for Oracle",
        )),
    }
}

pub(crate) fn str_at(row: &Row, idx: usize) -> Option<&str> {
    row.get(idx).and_then(Value::as_str)
}

pub(crate) fn required_str(row: &Row, idx: usize, what: &str) -> Result<String> {
    str_at(row, idx)
        .map(str::to_string)
        .ok_or_else(|| Error::configuration(format!("catalog row is missing {what}")))
}

pub(crate) fn i64_at(row: &Row, idx: usize) -> Option<i64> {
    row.get(idx).and_then(Value::as_i64)
}

/// Catalogs report booleans as integers, YES/NO strings, or real booleans
/// depending on the backend and driver.
pub(crate) fn flag_at(row: &Row, idx: usize) -> bool {
    match row.get(idx) {
        Some(Value::Bool(b)) => *b,
        Some(Value::I32(n)) => *n != 0,
        Some(Value::I64(n)) => *n != 0,
        Some(Value::String(s)) => {
            s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true") || s == "1"
        }
        _ => false,
    }
}

/// Maps a backend type name onto the closest value kind. Unrecognized names
/// land on String, the lossless fallback.
pub(crate) fn kind_for_db_type(db_type: &str) -> rowbind_core::ValueKind {
    use rowbind_core::ValueKind;

    let lowered = db_type.to_ascii_lowercase();
    let base = lowered.split(|c| c == '(' || c == ' ').next().unwrap_or("");
    match base {
        "bit" | "bool" | "boolean" => ValueKind::Bool,
        "tinyint" | "smallint" | "int" | "integer" | "mediumint" | "int4" | "int2" => {
            ValueKind::I32
        }
        "bigint" | "int8" => ValueKind::I64,
        "real" | "float" | "double" | "float4" | "float8" | "numeric" | "decimal" | "money" => {
            ValueKind::F64
        }
        "binary" | "varbinary" | "blob" | "bytea" | "image" => ValueKind::Bytes,
        _ => ValueKind::String,
    }
}
