use super::{Formatter, ToSql};

use indexmap::IndexMap;
use rowbind_core::Value;

/// Collects the named parameters a statement binds.
///
/// Named markers may appear more than once in the text (a merge reuses the
/// source row's values in several clauses); each name is bound exactly once,
/// first occurrence wins, insertion order preserved.
pub trait Params {
    fn push(&mut self, name: &str, value: &Value) -> Placeholder;
}

/// A named placeholder, rendered in the dialect's marker convention.
pub struct Placeholder(pub String);

/// The canonical parameter collection: name to value, ordered, deduplicated.
pub type ParamMap = IndexMap<String, Value>;

impl Params for ParamMap {
    fn push(&mut self, name: &str, value: &Value) -> Placeholder {
        self.entry(name.to_string())
            .or_insert_with(|| value.clone());
        Placeholder(name.to_string())
    }
}

/// Discards parameters; used when only the text matters.
impl Params for () {
    fn push(&mut self, name: &str, _value: &Value) -> Placeholder {
        Placeholder(name.to_string())
    }
}

impl ToSql for Placeholder {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let marker = f.setting.parameter(&self.0);
        f.dst.push_str(&marker);
    }
}
