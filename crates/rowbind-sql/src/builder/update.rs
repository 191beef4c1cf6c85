use super::Builder;
use crate::ser::{Delimited, Formatter, Ident, Params, ToSql};

use rowbind_core::{DbField, DbFieldCollection, Error, Field, QueryGroup, Result};

impl Builder {
    /// `UPDATE` of the given columns, scoped by a WHERE group.
    pub fn update<P: Params>(
        &self,
        table: &str,
        fields: &[DbField],
        wher: &QueryGroup,
        db_fields: Option<&DbFieldCollection>,
        hints: Option<&str>,
        params: &mut P,
    ) -> Result<String> {
        self.check_hints(hints)?;
        if fields.is_empty() {
            return Err(Error::missing_mapping(format!(
                "no columns mapped for update of `{table}`"
            )));
        }

        let mut dst = String::new();
        let mut f = Formatter {
            setting: self.setting,
            dst: &mut dst,
            params,
        };

        fmt!(&mut f, "UPDATE " Ident(table));
        if let Some(hints) = hints {
            fmt!(&mut f, " " hints);
        }

        let assignments = self.assignments(fields, None);
        fmt!(&mut f, " SET " Delimited(&assignments, ", "));

        let group = self.effective_where(wher, db_fields);
        Self::push_where(&mut f, &group);

        fmt!(&mut f, " ;");
        Ok(dst)
    }

    /// One `UPDATE` per row, matched on the qualifier columns, row values
    /// suffixed `_0 .. _{batch - 1}`.
    pub fn update_all(
        &self,
        table: &str,
        fields: &[DbField],
        qualifiers: &[Field],
        batch: usize,
        hints: Option<&str>,
    ) -> Result<String> {
        self.check_hints(hints)?;
        if fields.is_empty() {
            return Err(Error::missing_mapping(format!(
                "no columns mapped for update of `{table}`"
            )));
        }
        if qualifiers.is_empty() {
            return Err(Error::configuration(format!(
                "batch update of `{table}` requires qualifier fields"
            )));
        }
        if batch == 0 {
            return Err(Error::configuration("update batch size must be at least 1"));
        }

        let mut dst = String::new();
        let mut params = ();

        for row in 0..batch {
            let row_suffix = (batch > 1).then_some(row);
            if row > 0 {
                dst.push(' ');
            }

            let mut f = Formatter {
                setting: self.setting,
                dst: &mut dst,
                params: &mut params,
            };

            fmt!(&mut f, "UPDATE " Ident(table));
            if let Some(hints) = hints {
                fmt!(&mut f, " " hints);
            }

            let assignments = self.assignments(fields, row_suffix);
            fmt!(&mut f, " SET " Delimited(&assignments, ", ") " WHERE (");

            let matches: Vec<String> = qualifiers
                .iter()
                .map(|q| {
                    format!(
                        "{} = {}",
                        self.setting.quote(q.unquoted()),
                        self.setting
                            .parameter(&Self::row_param(q.unquoted(), row_suffix))
                    )
                })
                .collect();
            fmt!(&mut f, Delimited(&matches, " AND ") ") ;");
        }

        Ok(dst)
    }

    fn assignments(&self, fields: &[DbField], row: Option<usize>) -> Vec<String> {
        fields
            .iter()
            .map(|field| {
                format!(
                    "{} = {}",
                    self.setting.quote(field.name()),
                    self.setting
                        .parameter(&Self::row_param(field.name(), row))
                )
            })
            .collect()
    }
}
