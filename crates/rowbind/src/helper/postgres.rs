use super::{
    flag_at, i64_at, kind_for_db_type, required_str, str_at, DbHelper, DbRuntimeSetting,
    SchemaObject, SchemaObjectKind,
};
use crate::connection::Row;

use async_trait::async_trait;

use rowbind_core::{DbField, DbFieldCollection, Error, Provider, Result, Value};
use rowbind_sql::ParamMap;

pub struct PostgresHelper;

// Ordinals: column_name, primary flag, is_nullable, data_type,
// character_maximum_length, numeric_precision, numeric_scale, is_identity,
// column_default, is_generated.
#[async_trait]
impl DbHelper for PostgresHelper {
    fn provider(&self) -> Provider {
        Provider::PostgreSql
    }

    fn fields_query(&self, table: &str) -> (String, ParamMap) {
        let sql = "select c.column_name, \
                   exists (select 1 from information_schema.table_constraints tc \
                     join information_schema.key_column_usage kcu \
                       on kcu.constraint_name = tc.constraint_name \
                      and kcu.table_schema = tc.table_schema \
                    where tc.constraint_type = 'PRIMARY KEY' \
                      and tc.table_schema = c.table_schema \
                      and tc.table_name = c.table_name \
                      and kcu.column_name = c.column_name), \
                   c.is_nullable, c.data_type, c.character_maximum_length, \
                   c.numeric_precision, c.numeric_scale, c.is_identity, \
                   c.column_default, c.is_generated \
                   from information_schema.columns c \
                   where c.table_schema = current_schema() and c.table_name = @TableName \
                   order by c.ordinal_position ;"
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
            let db_type = str_at(row, 3).unwrap_or_default().to_string();
            let default = str_at(row, 8);
            // Serial columns predate declared identities and show up only as
            // a nextval() default.
            let sequence_default = default.is_some_and(|d| d.starts_with("nextval("));

            Ok(DbField {
                is_primary: flag_at(row, 1),
                is_identity: flag_at(row, 7) || sequence_default,
                is_nullable: flag_at(row, 2),
                is_computed: str_at(row, 9) == Some("ALWAYS"),
                has_default: default.is_some() && !sequence_default,
                size: i64_at(row, 4).map(|n| n as u32),
                precision: i64_at(row, 5).map(|n| n as u8),
                scale: i64_at(row, 6).map(|n| n as u8),
                db_type: Some(db_type.clone()),
                ..DbField::new(name, kind_for_db_type(&db_type), Provider::PostgreSql)
            })
        });
        fields.collect::<Result<Vec<_>>>().map(DbFieldCollection::new)
    }

    fn objects_query(&self) -> String {
        "select table_type, table_schema, table_name from information_schema.tables \
         where table_schema = current_schema() ;"
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
        "show server_version ;".to_string()
    }

    fn parse_version(&self, value: Option<Value>) -> Result<DbRuntimeSetting> {
        let raw = value.as_ref().and_then(Value::as_str).ok_or_else(|| {
            Error::configuration("PostgreSQL did not report a version")
        })?;
        DbRuntimeSetting::parse("PostgreSQL", raw)
    }
}
