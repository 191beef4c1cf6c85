use super::{Formatter, Params, ToSql};

/// Writes a slice of fragments separated by a delimiter.
pub(crate) struct Delimited<'a, T>(pub(crate) &'a [T], pub(crate) &'static str);

impl<'a, T> ToSql for Delimited<'a, T>
where
    &'a T: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut first = true;
        for item in self.0 {
            if !first {
                f.dst.push_str(self.1);
            }
            first = false;
            item.to_sql(f);
        }
    }
}
