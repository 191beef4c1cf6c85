use super::Builder;
use crate::ser::{Formatter, Ident, Params, ToSql};

use rowbind_core::{DbFieldCollection, QueryGroup, Result};

impl Builder {
    /// `DELETE`, scoped by an optional WHERE group. No group deletes
    /// every row.
    pub fn delete<P: Params>(
        &self,
        table: &str,
        wher: Option<&QueryGroup>,
        db_fields: Option<&DbFieldCollection>,
        hints: Option<&str>,
        params: &mut P,
    ) -> Result<String> {
        self.check_hints(hints)?;

        let mut dst = String::new();
        let mut f = Formatter {
            setting: self.setting,
            dst: &mut dst,
            params,
        };

        fmt!(&mut f, "DELETE FROM " Ident(table));
        if let Some(hints) = hints {
            fmt!(&mut f, " " hints);
        }
        if let Some(group) = wher {
            let group = self.effective_where(group, db_fields);
            Self::push_where(&mut f, &group);
        }
        fmt!(&mut f, " ;");
        Ok(dst)
    }
}
