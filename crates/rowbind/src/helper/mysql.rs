use super::{
    flag_at, i64_at, kind_for_db_type, required_str, str_at, DbHelper, DbRuntimeSetting,
    SchemaObject, SchemaObjectKind,
};
use crate::connection::Row;

use async_trait::async_trait;

use rowbind_core::{DbField, DbFieldCollection, Error, Provider, Result, Value};
use rowbind_sql::ParamMap;

pub struct MySqlHelper;

// Ordinals: COLUMN_NAME, COLUMN_KEY, IS_NULLABLE, DATA_TYPE,
// CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE, EXTRA,
// COLUMN_DEFAULT.
#[async_trait]
impl DbHelper for MySqlHelper {
    fn provider(&self) -> Provider {
        Provider::MySql
    }

    fn fields_query(&self, table: &str) -> (String, ParamMap) {
        let sql = "select COLUMN_NAME, COLUMN_KEY, IS_NULLABLE, DATA_TYPE, \
                   CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE, EXTRA, \
                   COLUMN_DEFAULT \
                   from information_schema.COLUMNS \
                   where TABLE_SCHEMA = database() and TABLE_NAME = @TableName \
                   order by ORDINAL_POSITION ;"
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
            let is_primary = str_at(row, 1) == Some("PRI");
            let db_type = str_at(row, 3).unwrap_or_default().to_string();
            let extra = str_at(row, 7).unwrap_or_default().to_ascii_lowercase();

            // EXTRA separates the write-excluded cases: `auto_increment` is
            // the identity, `on update CURRENT_TIMESTAMP` rewrites on every
            // modification. A plain COLUMN_DEFAULT does neither and the
            // column stays writable.
            Ok(DbField {
                is_primary,
                is_identity: extra.contains("auto_increment"),
                is_nullable: flag_at(row, 2),
                // EXTRA says "VIRTUAL GENERATED" or "STORED GENERATED" for
                // computed columns; plain "DEFAULT_GENERATED" is just a
                // default expression.
                is_computed: extra.contains("virtual generated")
                    || extra.contains("stored generated"),
                is_auto_updated: extra.contains("on update"),
                has_default: !matches!(row.get(8), None | Some(Value::Null)),
                size: i64_at(row, 4).map(|n| n as u32),
                precision: i64_at(row, 5).map(|n| n as u8),
                scale: i64_at(row, 6).map(|n| n as u8),
                db_type: Some(db_type.clone()),
                ..DbField::new(name, kind_for_db_type(&db_type), Provider::MySql)
            })
        });
        fields.collect::<Result<Vec<_>>>().map(DbFieldCollection::new)
    }

    fn objects_query(&self) -> String {
        "select TABLE_TYPE, TABLE_SCHEMA, TABLE_NAME from information_schema.TABLES \
         where TABLE_SCHEMA = database() ;"
            .to_string()
    }

    fn parse_objects(&self, rows: Vec<Row>) -> Result<Vec<SchemaObject>> {
        rows.iter()
            .map(|row| {
                let kind = SchemaObjectKind::from_catalog(str_at(row, 0).unwrap_or_default())?;
                Ok(SchemaObject {
                    kind,
                    schema: str_at(row, 1).map(str::to_string),
                    name: required_str(row, 2, "object name")?,
                })
            })
            .collect()
    }

    fn version_query(&self) -> String {
        "select version() ;".to_string()
    }

    fn parse_version(&self, value: Option<Value>) -> Result<DbRuntimeSetting> {
        let raw = value.as_ref().and_then(Value::as_str).ok_or_else(|| {
            Error::configuration("MySQL did not report a version")
        })?;
        DbRuntimeSetting::parse("MySQL", raw)
    }
}
