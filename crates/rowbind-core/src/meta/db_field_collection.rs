use super::DbField;

use std::collections::HashMap;
use std::sync::OnceLock;

/// The collection switches from linear scan to a hashed index once it holds
/// this many fields.
const INDEX_THRESHOLD: usize = 10;

/// An immutable, set-like collection of column metadata for one table.
///
/// Built once per (provider, table) pair by the field cache and shared by
/// unbounded concurrent readers. Name lookup is case- and quote-insensitive;
/// collections above [`INDEX_THRESHOLD`] materialize a lookup index lazily,
/// smaller ones scan.
#[derive(Debug)]
pub struct DbFieldCollection {
    fields: Vec<DbField>,
    index: OnceLock<HashMap<String, usize>>,
}

impl DbFieldCollection {
    /// Builds the collection, dropping later duplicates of the same name.
    pub fn new(fields: impl IntoIterator<Item = DbField>) -> Self {
        let mut out: Vec<DbField> = vec![];
        for field in fields {
            if !out.iter().any(|f| f.field == field.field) {
                out.push(field);
            }
        }
        Self {
            fields: out,
            index: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DbField> {
        self.fields.iter()
    }

    pub fn as_slice(&self) -> &[DbField] {
        &self.fields
    }

    pub fn get_by_name(&self, name: &str) -> Option<&DbField> {
        let unquoted = name.trim_matches(['[', ']', '"', '`']);

        if self.fields.len() < INDEX_THRESHOLD {
            return self
                .fields
                .iter()
                .find(|f| f.name().eq_ignore_ascii_case(unquoted));
        }

        let index = self.index.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name().to_ascii_lowercase(), i))
                .collect()
        });

        index
            .get(&unquoted.to_ascii_lowercase())
            .map(|&i| &self.fields[i])
    }

    /// The unique primary-key field, defined only when exactly one column is
    /// marked primary. Composite keys go through [`primary_fields`].
    ///
    /// [`primary_fields`]: Self::primary_fields
    pub fn get_primary(&self) -> Option<&DbField> {
        let mut primaries = self.fields.iter().filter(|f| f.is_primary);
        match (primaries.next(), primaries.next()) {
            (Some(field), None) => Some(field),
            _ => None,
        }
    }

    /// All primary-key fields, zero or many.
    pub fn primary_fields(&self) -> Vec<&DbField> {
        self.fields.iter().filter(|f| f.is_primary).collect()
    }

    /// The identity field. At most one is expected; the first wins.
    pub fn identity(&self) -> Option<&DbField> {
        self.fields.iter().find(|f| f.is_identity)
    }
}

impl PartialEq for DbFieldCollection {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|f| other.fields.iter().any(|o| o == f))
    }
}

impl FromIterator<DbField> for DbFieldCollection {
    fn from_iter<I: IntoIterator<Item = DbField>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Provider, ValueKind};

    fn field(name: &str) -> DbField {
        DbField::new(name, ValueKind::I64, Provider::Sqlite)
    }

    fn collection(names: &[&str]) -> DbFieldCollection {
        DbFieldCollection::new(names.iter().map(|n| field(n)))
    }

    #[test]
    fn count_matches_distinct_input() {
        let c = collection(&["Id", "Name", "Age"]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn duplicate_names_collapse() {
        let c = collection(&["Id", "[id]", "ID"]);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn lookup_ignores_casing_and_quoting_below_threshold() {
        let c = collection(&["Id", "Name"]);
        assert!(c.get_by_name("[ID]").is_some());
        assert!(c.get_by_name("name").is_some());
        assert!(c.get_by_name("Missing").is_none());
    }

    #[test]
    fn lookup_ignores_casing_and_quoting_above_threshold() {
        let names: Vec<String> = (0..12).map(|i| format!("Col{i}")).collect();
        let c = DbFieldCollection::new(names.iter().map(|n| field(n)));
        assert_eq!(c.len(), 12);
        assert!(c.get_by_name("[COL7]").is_some());
        assert!(c.get_by_name("col11").is_some());
        assert!(c.get_by_name("Col12").is_none());
    }

    #[test]
    fn unique_primary_resolution() {
        let mut id = field("Id");
        id.is_primary = true;
        let c = DbFieldCollection::new([id, field("Name")]);
        assert_eq!(c.get_primary().unwrap().name(), "Id");
        assert_eq!(c.primary_fields().len(), 1);
    }

    #[test]
    fn composite_primary_yields_none_from_get_primary() {
        let mut a = field("A");
        a.is_primary = true;
        let mut b = field("B");
        b.is_primary = true;
        let c = DbFieldCollection::new([a, b]);
        assert!(c.get_primary().is_none());
        assert_eq!(c.primary_fields().len(), 2);

        let none = collection(&["A", "B"]);
        assert!(none.get_primary().is_none());
        assert!(none.primary_fields().is_empty());
    }

    #[test]
    fn first_identity_wins() {
        let mut a = field("A");
        a.is_identity = true;
        let mut b = field("B");
        b.is_identity = true;
        let c = DbFieldCollection::new([field("Z"), a, b]);
        assert_eq!(c.identity().unwrap().name(), "A");
    }

    #[test]
    fn set_equality_ignores_order() {
        let a = collection(&["Id", "Name"]);
        let b = collection(&["Name", "Id"]);
        assert_eq!(a, b);
        assert_ne!(a, collection(&["Id"]));
    }
}
