use super::{
    flag_at, i64_at, kind_for_db_type, required_str, str_at, DbHelper, DbRuntimeSetting,
    SchemaObject, SchemaObjectKind,
};
use crate::connection::Row;

use async_trait::async_trait;

use rowbind_core::{DbField, DbFieldCollection, Error, Provider, Result, Value};
use rowbind_sql::ParamMap;

pub struct SqlServerHelper;

// Ordinals: name, is_identity, is_nullable, is_computed, type name,
// max_length, precision, scale, is_primary, has_default.
#[async_trait]
impl DbHelper for SqlServerHelper {
    fn provider(&self) -> Provider {
        Provider::SqlServer
    }

    fn fields_query(&self, table: &str) -> (String, ParamMap) {
        let sql = "select c.name, c.is_identity, c.is_nullable, c.is_computed, t.name, \
                   c.max_length, c.precision, c.scale, \
                   convert(bit, iif(ic.column_id is null, 0, 1)), \
                   convert(bit, iif(c.default_object_id <> 0, 1, 0)) \
                   from sys.columns c \
                   join sys.types t on t.user_type_id = c.user_type_id \
                   left join sys.indexes i \
                     on i.object_id = c.object_id and i.is_primary_key = 1 \
                   left join sys.index_columns ic \
                     on ic.object_id = c.object_id and ic.index_id = i.index_id \
                    and ic.column_id = c.column_id \
                   where c.object_id = object_id(@TableName) \
                   order by c.column_id ;"
            .to_string();
        let mut params = ParamMap::new();
        params.insert("TableName".to_string(), Value::from(table));
        (sql, params)
    }

    fn parse_fields(&self, table: &str, rows: Vec<Row>) -> Result<DbFieldCollection> {
        if rows.is_empty() {
            return Err(Error::missing_mapping(format!(
                "table `{table}` has no columns or does not exist"
            )));
        }

        let fields = rows.iter().map(|row| {
            let name = required_str(row, 0, "column name")?;
            let db_type = str_at(row, 4).unwrap_or_default().to_string();

            Ok(DbField {
                is_primary: flag_at(row, 8),
                is_identity: flag_at(row, 1),
                is_nullable: flag_at(row, 2),
                is_computed: flag_at(row, 3),
                has_default: flag_at(row, 9),
                size: i64_at(row, 5).map(|n| n as u32),
                precision: i64_at(row, 6).map(|n| n as u8),
                scale: i64_at(row, 7).map(|n| n as u8),
                db_type: Some(db_type.clone()),
                ..DbField::new(name, kind_for_db_type(&db_type), Provider::SqlServer)
            })
        });
        fields.collect::<Result<Vec<_>>>().map(DbFieldCollection::new)
    }

    fn objects_query(&self) -> String {
        "select type, schema_name(schema_id), name from sys.objects \
         where type in ('U', 'V') ;"
            .to_string()
    }

    fn parse_objects(&self, rows: Vec<Row>) -> Result<Vec<SchemaObject>> {
        rows.iter()
            .map(|row| {
                // sys.objects pads the type code to char(2).
                let kind =
                    SchemaObjectKind::from_catalog(str_at(row, 0).unwrap_or_default().trim())?;
                Ok(SchemaObject {
                    kind,
                    schema: str_at(row, 1).map(str::to_string),
                    name: required_str(row, 2, "object name")?,
                })
            })
            .collect()
    }

    fn version_query(&self) -> String {
        "select convert(nvarchar(128), serverproperty('ProductVersion')) ;".to_string()
    }

    fn parse_version(&self, value: Option<Value>) -> Result<DbRuntimeSetting> {
        let raw = value.as_ref().and_then(Value::as_str).ok_or_else(|| {
            Error::configuration("SQL Server did not report a version")
        })?;
        DbRuntimeSetting::parse("SQL Server", raw)
    }
}
