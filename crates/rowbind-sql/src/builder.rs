mod delete;
mod insert;
mod merge;
mod select;
mod update;

use crate::ser::{Formatter, Params};

use rowbind_core::{DbField, DbFieldCollection, DbSetting, Error, KeyReturn, Provider, QueryGroup, Result};

/// Renders query IR and column metadata into dialect-specific command text.
///
/// The builder owns no connection and performs no I/O; it produces SQL text
/// with named placeholders and, where a statement carries a WHERE group,
/// records the group's bound parameters into the supplied collector.
pub struct Builder {
    setting: &'static DbSetting,
}

impl Builder {
    pub fn new(setting: &'static DbSetting) -> Self {
        Self { setting }
    }

    pub fn for_provider(provider: Provider) -> Self {
        Self::new(DbSetting::for_provider(provider))
    }

    pub fn sql_server() -> Self {
        Self::new(&DbSetting::SQL_SERVER)
    }

    pub fn postgresql() -> Self {
        Self::new(&DbSetting::POSTGRESQL)
    }

    pub fn mysql() -> Self {
        Self::new(&DbSetting::MYSQL)
    }

    pub fn oracle() -> Self {
        Self::new(&DbSetting::ORACLE)
    }

    pub fn sqlite() -> Self {
        Self::new(&DbSetting::SQLITE)
    }

    pub fn setting(&self) -> &'static DbSetting {
        self.setting
    }

    /// Hints on a provider without hint support are an error, raised before
    /// any text is produced; silently dropping them would change semantics.
    fn check_hints(&self, hints: Option<&str>) -> Result<()> {
        if hints.is_some() && !self.setting.supports_hints {
            return Err(Error::not_supported(format!(
                "query hints are not supported on {}",
                self.setting.provider
            )));
        }
        Ok(())
    }

    /// Drops skippable null-rewrite predicates whose column is provably
    /// non-nullable in the live metadata.
    fn effective_where(&self, group: &QueryGroup, db_fields: Option<&DbFieldCollection>) -> QueryGroup {
        match db_fields {
            Some(db_fields) => group.prune(&|qf| {
                !(qf.can_skip()
                    && db_fields
                        .get_by_name(qf.field().unquoted())
                        .is_some_and(|f| !f.is_nullable))
            }),
            None => group.clone(),
        }
    }

    fn push_where<P: Params>(f: &mut Formatter<'_, P>, group: &QueryGroup) {
        if group.is_empty() {
            return;
        }
        f.dst.push_str(" WHERE ");
        let rendered = group.to_sql(f.setting);
        f.dst.push_str(&rendered);
        for (name, value) in group.parameters() {
            f.params.push(&name, &value);
        }
    }

    /// The clause returning a generated key from an insert or upsert.
    fn key_return_clause(&self, key: &DbField) -> String {
        let key = self.setting.quote(key.name());
        match self.setting.key_return {
            KeyReturn::ScopeIdentity => format!(" ; SELECT SCOPE_IDENTITY() AS {key}"),
            KeyReturn::Returning => format!(" RETURNING {key}"),
            KeyReturn::LastInsertId => format!(" ; SELECT LAST_INSERT_ID() AS {key}"),
            KeyReturn::LastInsertRowid => format!(" ; SELECT last_insert_rowid() AS {key}"),
        }
    }

    /// Placeholder name for a field, with the row suffix batched statements
    /// use (`Name` for row `None`, `Name_2` for row 2).
    fn row_param(name: &str, row: Option<usize>) -> String {
        match row {
            Some(row) => format!("{name}_{row}"),
            None => name.to_string(),
        }
    }
}
