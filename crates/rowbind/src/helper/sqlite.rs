use super::{
    flag_at, i64_at, kind_for_db_type, required_str, str_at, DbHelper, DbRuntimeSetting,
    SchemaObject, SchemaObjectKind,
};
use crate::connection::Row;

use async_trait::async_trait;

use rowbind_core::{DbField, DbFieldCollection, DbSetting, Error, Provider, Result, Value};
use rowbind_sql::ParamMap;

pub struct SqliteHelper;

// `pragma table_info` ordinals: cid, name, type, notnull, dflt_value, pk.
#[async_trait]
impl DbHelper for SqliteHelper {
    fn provider(&self) -> Provider {
        Provider::Sqlite
    }

    fn fields_query(&self, table: &str) -> (String, ParamMap) {
        // Pragmas take no bound parameters; the table name is quoted inline.
        let table = DbSetting::SQLITE.quote(table);
        (format!("pragma table_info({table}) ;"), ParamMap::new())
    }

    fn parse_fields(&self, table: &str, rows: Vec<Row>) -> Result<DbFieldCollection> {
        if rows.is_empty() {
            return Err(Error::missing_mapping(format!(
                "table `{table}` has no columns or does not exist"
            )));
        }

        let pk_count = rows
            .iter()
            .filter(|row| i64_at(row, 5).unwrap_or(0) > 0)
            .count();

        let fields = rows.iter().map(|row| {
            let name = required_str(row, 1, "column name")?;
            let db_type = str_at(row, 2).unwrap_or_default().to_string();
            let not_null = flag_at(row, 3);
            let has_default = !matches!(row.get(4), None | Some(Value::Null));
            let is_primary = i64_at(row, 5).unwrap_or(0) > 0;
            // A sole INTEGER primary key aliases the rowid and auto-assigns.
            let is_identity =
                is_primary && pk_count == 1 && db_type.eq_ignore_ascii_case("integer");

            Ok(DbField {
                is_primary,
                is_identity,
                is_nullable: !not_null && !is_primary,
                has_default,
                db_type: Some(db_type.clone()),
                ..DbField::new(name, kind_for_db_type(&db_type), Provider::Sqlite)
            })
        });
        fields.collect::<Result<Vec<_>>>().map(DbFieldCollection::new)
    }

    fn objects_query(&self) -> String {
        "select type, name from sqlite_master \
         where type in ('table', 'view') and name not like 'sqlite_%' ;"
            .to_string()
    }

    fn parse_objects(&self, rows: Vec<Row>) -> Result<Vec<SchemaObject>> {
        rows.iter()
            .map(|row| {
                let kind = SchemaObjectKind::from_catalog(str_at(row, 0).unwrap_or_default())?;
                Ok(SchemaObject {
                    kind,
                    schema: None,
                    name: required_str(row, 1, "object name")?,
                })
            })
            .collect()
    }

    fn version_query(&self) -> String {
        "select sqlite_version() ;".to_string()
    }

    fn parse_version(&self, value: Option<Value>) -> Result<DbRuntimeSetting> {
        let raw = value.as_ref().and_then(Value::as_str).ok_or_else(|| {
            Error::configuration("SQLite did not report a version")
        })?;
        DbRuntimeSetting::parse("SQLite", raw)
    }
}
