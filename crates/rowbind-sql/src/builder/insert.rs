use super::Builder;
use crate::ser::{Delimited, Formatter, Ident, ToSql};

use rowbind_core::{DbField, Error, KeyReturn, Result};

impl Builder {
    /// `INSERT` for a single row. Values travel as named placeholders bound
    /// at execution time, so no parameter collector is involved here.
    pub fn insert(
        &self,
        table: &str,
        fields: &[DbField],
        key: Option<&DbField>,
        hints: Option<&str>,
    ) -> Result<String> {
        self.insert_all(table, fields, key, 1, hints)
    }

    /// `INSERT` for `batch` rows in one statement, row values suffixed
    /// `_0 .. _{batch - 1}`. A batch of one uses unsuffixed names.
    ///
    /// A keyed batch must return one key row per inserted row, so dialects
    /// whose single-row key clause cannot do that switch shape: SQL Server
    /// uses `OUTPUT INSERTED`, SQLite uses `RETURNING`, and MySQL falls back
    /// to one statement per row.
    pub fn insert_all(
        &self,
        table: &str,
        fields: &[DbField],
        key: Option<&DbField>,
        batch: usize,
        hints: Option<&str>,
    ) -> Result<String> {
        self.check_hints(hints)?;
        if fields.is_empty() {
            return Err(Error::missing_mapping(format!(
                "no columns mapped for insert into `{table}`"
            )));
        }
        if batch == 0 {
            return Err(Error::configuration("insert batch size must be at least 1"));
        }

        if batch > 1 && key.is_some() && self.setting.key_return == KeyReturn::LastInsertId {
            return Ok(self.insert_rows(table, fields, key, batch, hints));
        }

        let mut dst = String::new();
        let mut params = ();
        let mut f = Formatter {
            setting: self.setting,
            dst: &mut dst,
            params: &mut params,
        };

        fmt!(&mut f, "INSERT INTO " Ident(table));

        if let Some(hints) = hints {
            fmt!(&mut f, " " hints);
        }

        let columns: Vec<Ident<'_>> = fields.iter().map(|field| Ident(field.name())).collect();
        fmt!(&mut f, " (" Delimited(&columns, ", ") ")");

        if batch > 1 && self.setting.key_return == KeyReturn::ScopeIdentity {
            if let Some(key) = key {
                let col = self.setting.quote(key.name());
                fmt!(&mut f, format!(" OUTPUT INSERTED.{col} AS {col}"));
            }
        }
        fmt!(&mut f, " VALUES ");

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
        fmt!(&mut f, Delimited(&rows, ", "));

        if let Some(key) = key {
            match self.setting.key_return {
                KeyReturn::ScopeIdentity if batch > 1 => {}
                KeyReturn::LastInsertRowid if batch > 1 => {
                    let col = self.setting.quote(key.name());
                    fmt!(&mut f, format!(" RETURNING {col}"));
                }
                _ => {
                    let clause = self.key_return_clause(key);
                    fmt!(&mut f, clause);
                }
            }
        }

        fmt!(&mut f, " ;");
        Ok(dst)
    }

    /// One keyed `INSERT` per row, each returning its own generated key.
    fn insert_rows(
        &self,
        table: &str,
        fields: &[DbField],
        key: Option<&DbField>,
        batch: usize,
        hints: Option<&str>,
    ) -> String {
        let columns: Vec<String> = fields
            .iter()
            .map(|field| self.setting.quote(field.name()))
            .collect();
        let mut dst = String::new();
        for row in 0..batch {
            if row > 0 {
                dst.push(' ');
            }
            dst.push_str("INSERT INTO ");
            dst.push_str(&self.setting.quote(table));
            if let Some(hints) = hints {
                dst.push(' ');
                dst.push_str(hints);
            }
            dst.push_str(" (");
            dst.push_str(&columns.join(", "));
            dst.push_str(") VALUES (");
            let markers: Vec<String> = fields
                .iter()
                .map(|field| {
                    self.setting
                        .parameter(&Self::row_param(field.name(), Some(row)))
                })
                .collect();
            dst.push_str(&markers.join(", "));
            dst.push(')');
            if let Some(key) = key {
                dst.push_str(&self.key_return_clause(key));
            }
            dst.push_str(" ;");
        }
        dst
    }
}
