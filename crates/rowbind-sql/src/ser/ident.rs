use super::{Formatter, Params, ToSql};

/// An identifier quoted in the active dialect's style.
pub(crate) struct Ident<'a>(pub(crate) &'a str);

impl ToSql for Ident<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let quoted = f.setting.quote(self.0);
        f.dst.push_str(&quoted);
    }
}

impl ToSql for &Ident<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        Ident(self.0).to_sql(f);
    }
}
