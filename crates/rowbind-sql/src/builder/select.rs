use super::Builder;
use crate::ser::{Delimited, Formatter, Ident, Params, ToSql};

use rowbind_core::{DbFieldCollection, Error, Field, QueryGroup, Result, RowLimit};

impl Builder {
    /// `SELECT` over an explicit field list, with optional WHERE group,
    /// row limit, and table hints.
    pub fn select<P: Params>(
        &self,
        table: &str,
        fields: &[Field],
        wher: Option<&QueryGroup>,
        db_fields: Option<&DbFieldCollection>,
        limit: Option<u64>,
        hints: Option<&str>,
        params: &mut P,
    ) -> Result<String> {
        self.check_hints(hints)?;
        if fields.is_empty() {
            return Err(Error::missing_mapping(format!(
                "no fields to select from `{table}`"
            )));
        }

        let mut dst = String::new();
        let mut f = Formatter {
            setting: self.setting,
            dst: &mut dst,
            params,
        };

        fmt!(&mut f, "SELECT ");

        if self.setting.row_limit == RowLimit::Top {
            if let Some(n) = limit {
                fmt!(&mut f, "TOP (" n ") ");
            }
        }

        let columns: Vec<Ident<'_>> = fields.iter().map(|field| Ident(field.unquoted())).collect();
        fmt!(&mut f, Delimited(&columns, ", ") " FROM " Ident(table));

        if let Some(hints) = hints {
            fmt!(&mut f, " " hints);
        }

        if let Some(group) = wher {
            let group = self.effective_where(group, db_fields);
            Self::push_where(&mut f, &group);
        }

        match (self.setting.row_limit, limit) {
            (RowLimit::Limit, Some(n)) => fmt!(&mut f, " LIMIT " n),
            (RowLimit::FetchFirst, Some(n)) => fmt!(&mut f, " FETCH FIRST " n " ROWS ONLY"),
            _ => {}
        }

        fmt!(&mut f, " ;");
        Ok(dst)
    }
}
