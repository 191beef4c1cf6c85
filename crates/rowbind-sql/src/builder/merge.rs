use super::Builder;

use rowbind_core::{DbField, Error, Field, Provider, Result};

impl Builder {
    /// Upsert of a single row, matched on the qualifier columns.
    ///
    /// SQL Server and Oracle render `MERGE INTO`; PostgreSQL and SQLite
    /// render `INSERT .. ON CONFLICT`; MySQL renders
    /// `INSERT .. ON DUPLICATE KEY UPDATE`.
    pub fn merge(
        &self,
        table: &str,
        fields: &[DbField],
        qualifiers: &[Field],
        key: Option<&DbField>,
        hints: Option<&str>,
    ) -> Result<String> {
        self.merge_all(table, fields, qualifiers, key, 1, hints)
    }

    /// Upsert of `batch` rows, row values suffixed `_0 .. _{batch - 1}`.
    pub fn merge_all(
        &self,
        table: &str,
        fields: &[DbField],
        qualifiers: &[Field],
        key: Option<&DbField>,
        batch: usize,
        hints: Option<&str>,
    ) -> Result<String> {
        self.check_hints(hints)?;
        if fields.is_empty() {
            return Err(Error::missing_mapping(format!(
                "no columns mapped for merge into `{table}`"
            )));
        }
        if qualifiers.is_empty() {
            return Err(Error::configuration(format!(
                "merge into `{table}` requires qualifier fields"
            )));
        }
        if batch == 0 {
            return Err(Error::configuration("merge batch size must be at least 1"));
        }

        match self.setting.provider {
            Provider::SqlServer | Provider::Oracle => {
                Ok(self.merge_statements(table, fields, qualifiers, key, batch, hints))
            }
            _ => Ok(self.upsert_statement(table, fields, qualifiers, key, batch)),
        }
    }

    /// One `MERGE INTO` statement per row. The source row is a one-row
    /// `SELECT` of placeholders aliased to the column names.
    fn merge_statements(
        &self,
        table: &str,
        fields: &[DbField],
        qualifiers: &[Field],
        key: Option<&DbField>,
        batch: usize,
        hints: Option<&str>,
    ) -> String {
        let updates = Self::non_qualifier_fields(fields, qualifiers);
        let oracle = self.setting.provider == Provider::Oracle;
        let mut dst = String::new();

        for row in 0..batch {
            let row_suffix = (batch > 1).then_some(row);
            if row > 0 {
                dst.push(' ');
            }

            dst.push_str("MERGE INTO ");
            dst.push_str(&self.setting.quote(table));
            if let Some(hints) = hints {
                dst.push(' ');
                dst.push_str(hints);
            }

            // Oracle rejects AS on table aliases.
            dst.push_str(if oracle { " T USING (SELECT " } else { " AS T USING (SELECT " });
            let source: Vec<String> = fields
                .iter()
                .map(|field| {
                    format!(
                        "{} AS {}",
                        self.setting
                            .parameter(&Self::row_param(field.name(), row_suffix)),
                        self.setting.quote(field.name())
                    )
                })
                .collect();
            dst.push_str(&source.join(", "));
            if oracle {
                dst.push_str(" FROM DUAL");
            }
            dst.push_str(if oracle { ") S ON (" } else { ") AS S ON (" });

            let on: Vec<String> = qualifiers
                .iter()
                .map(|q| {
                    let col = self.setting.quote(q.unquoted());
                    format!("T.{col} = S.{col}")
                })
                .collect();
            dst.push_str(&on.join(" AND "));
            dst.push(')');

            if !updates.is_empty() {
                dst.push_str(" WHEN MATCHED THEN UPDATE SET ");
                let set: Vec<String> = updates
                    .iter()
                    .map(|field| {
                        let col = self.setting.quote(field.name());
                        format!("T.{col} = S.{col}")
                    })
                    .collect();
                dst.push_str(&set.join(", "));
            }

            dst.push_str(" WHEN NOT MATCHED THEN INSERT (");
            let columns: Vec<String> = fields
                .iter()
                .map(|field| self.setting.quote(field.name()))
                .collect();
            dst.push_str(&columns.join(", "));
            dst.push_str(") VALUES (");
            let values: Vec<String> = fields
                .iter()
                .map(|field| format!("S.{}", self.setting.quote(field.name())))
                .collect();
            dst.push_str(&values.join(", "));
            dst.push(')');

            // SCOPE_IDENTITY does not see rows a MERGE touches, so the key
            // comes back through an OUTPUT clause. Oracle offers no
            // equivalent on MERGE; callers re-query when they need the key.
            if let Some(key) = key {
                if !oracle {
                    let col = self.setting.quote(key.name());
                    dst.push_str(&format!(" OUTPUT INSERTED.{col} AS {col}"));
                }
            }

            dst.push_str(" ;");
        }

        dst
    }

    /// A single multi-row `INSERT` with the dialect's conflict clause.
    fn upsert_statement(
        &self,
        table: &str,
        fields: &[DbField],
        qualifiers: &[Field],
        key: Option<&DbField>,
        batch: usize,
    ) -> String {
        let updates = Self::non_qualifier_fields(fields, qualifiers);
        let mysql = self.setting.provider == Provider::MySql;
        let mut dst = String::new();

        dst.push_str("INSERT INTO ");
        dst.push_str(&self.setting.quote(table));
        dst.push_str(" (");
        let columns: Vec<String> = fields
            .iter()
            .map(|field| self.setting.quote(field.name()))
            .collect();
        dst.push_str(&columns.join(", "));
        dst.push_str(") VALUES ");

        let rows: Vec<String> = (0..batch)
            .map(|row| {
                let row = (batch > 1).then_some(row);
                let markers: Vec<String> = fields
                    .iter()
                    .map(|field| self.setting.parameter(&Self::row_param(field.name(), row)))
                    .collect();
                format!("({})", markers.join(", "))
            })
            .collect();
        dst.push_str(&rows.join(", "));

        if mysql {
            dst.push_str(" ON DUPLICATE KEY UPDATE ");
            if updates.is_empty() {
                // No-op assignment; MySQL has no DO NOTHING form.
                let col = self.setting.quote(qualifiers[0].unquoted());
                dst.push_str(&format!("{col} = {col}"));
            } else {
                let set: Vec<String> = updates
                    .iter()
                    .map(|field| {
                        let col = self.setting.quote(field.name());
                        format!("{col} = VALUES({col})")
                    })
                    .collect();
                dst.push_str(&set.join(", "));
            }
            if let Some(key) = key {
                dst.push_str(&self.key_return_clause(key));
            }
        } else {
            dst.push_str(" ON CONFLICT (");
            let conflict: Vec<String> = qualifiers
                .iter()
                .map(|q| self.setting.quote(q.unquoted()))
                .collect();
            dst.push_str(&conflict.join(", "));
            dst.push(')');
            if updates.is_empty() {
                dst.push_str(" DO NOTHING");
            } else {
                dst.push_str(" DO UPDATE SET ");
                let set: Vec<String> = updates
                    .iter()
                    .map(|field| {
                        let col = self.setting.quote(field.name());
                        format!("{col} = EXCLUDED.{col}")
                    })
                    .collect();
                dst.push_str(&set.join(", "));
            }
            // last_insert_rowid would miss the update arm, so SQLite joins
            // PostgreSQL on RETURNING here.
            if let Some(key) = key {
                let col = self.setting.quote(key.name());
                dst.push_str(&format!(" RETURNING {col}"));
            }
        }

        dst.push_str(" ;");
        dst
    }

    fn non_qualifier_fields<'a>(fields: &'a [DbField], qualifiers: &[Field]) -> Vec<&'a DbField> {
        fields
            .iter()
            .filter(|field| !qualifiers.iter().any(|q| *q == field.field))
            .collect()
    }
}
