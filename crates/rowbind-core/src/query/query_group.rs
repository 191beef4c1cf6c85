use super::{FieldComparisonQueryField, QueryField};
use crate::{DbSetting, Value};

use std::collections::HashMap;

/// The token joining a group's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One child of a [`QueryGroup`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryItem {
    Field(QueryField),
    Comparison(FieldComparisonQueryField),
    Group(QueryGroup),
}

impl From<QueryField> for QueryItem {
    fn from(value: QueryField) -> Self {
        Self::Field(value)
    }
}

impl From<FieldComparisonQueryField> for QueryItem {
    fn from(value: FieldComparisonQueryField) -> Self {
        Self::Comparison(value)
    }
}

impl From<QueryGroup> for QueryItem {
    fn from(value: QueryGroup) -> Self {
        Self::Group(value)
    }
}

/// A boolean tree of predicates joined by AND/OR.
///
/// Child order is insertion order and is never reordered; rendering is fully
/// parenthesized and deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGroup {
    conjunction: Conjunction,
    items: Vec<QueryItem>,
}

impl QueryGroup {
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            items: vec![],
        }
    }

    pub fn and<I: Into<QueryItem>>(items: impl IntoIterator<Item = I>) -> Self {
        Self {
            conjunction: Conjunction::And,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn or<I: Into<QueryItem>>(items: impl IntoIterator<Item = I>) -> Self {
        Self {
            conjunction: Conjunction::Or,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds an AND group of Equal predicates from an explicit ordered list
    /// of (name, value) pairs. A null value yields an Equal predicate whose
    /// parameter value is null.
    pub fn parse<N: Into<String>, V: Into<Value>>(
        pairs: impl IntoIterator<Item = (N, V)>,
    ) -> Self {
        let mut group = Self::and(
            pairs
                .into_iter()
                .map(|(name, value)| QueryField::equal(name.into(), value)),
        );
        group.fix_parameters();
        group
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: impl Into<QueryItem>) {
        self.items.push(item.into());
    }

    /// Every leaf [`QueryField`], depth-first, left-to-right, nested groups
    /// unwrapped, without de-duplication. Duplicate field names across
    /// operations are legal and preserved.
    pub fn fields(&self) -> Vec<&QueryField> {
        let mut out = vec![];
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a QueryField>) {
        for item in &self.items {
            match item {
                QueryItem::Field(field) => out.push(field),
                QueryItem::Comparison(_) => {}
                QueryItem::Group(group) => group.collect_fields(out),
            }
        }
    }

    /// All bound (name, value) pairs in render order, `In` and `Between`
    /// parameters expanded.
    pub fn parameters(&self) -> Vec<(String, Value)> {
        self.fields()
            .into_iter()
            .flat_map(|f| f.bound_parameters())
            .collect()
    }

    /// Makes duplicate parameter names unique (`Name`, `Name_1`, `Name_2`,
    /// ...) across the whole tree, preserving depth-first order.
    pub fn fix_parameters(&mut self) {
        let mut seen: HashMap<String, usize> = HashMap::new();
        self.fix_parameters_inner(&mut seen);
    }

    /// Like [`fix_parameters`](Self::fix_parameters), with `reserved` names
    /// treated as already bound, so a parameter colliding with one is
    /// renamed away from it.
    pub fn fix_parameters_reserving<'a>(&mut self, reserved: impl IntoIterator<Item = &'a str>) {
        let mut seen: HashMap<String, usize> = reserved
            .into_iter()
            .map(|name| (name.to_ascii_lowercase(), 1))
            .collect();
        self.fix_parameters_inner(&mut seen);
    }

    fn fix_parameters_inner(&mut self, seen: &mut HashMap<String, usize>) {
        for item in &mut self.items {
            match item {
                QueryItem::Field(field) => {
                    let Some(parameter) = field.parameter() else {
                        continue;
                    };
                    let key = parameter.name().to_ascii_lowercase();
                    let n = seen.entry(key).or_insert(0);
                    if *n > 0 {
                        field.rename_parameter(format!("{}_{}", field.field().unquoted(), n));
                    }
                    *n += 1;
                }
                QueryItem::Comparison(_) => {}
                QueryItem::Group(group) => group.fix_parameters_inner(seen),
            }
        }
    }

    /// A copy of the tree with the leaves failing `keep` removed, empty
    /// subgroups dropped. Used by the SQL builder to drop skippable
    /// null-rewrite predicates on non-nullable columns.
    pub fn prune(&self, keep: &impl Fn(&QueryField) -> bool) -> Self {
        let items = self
            .items
            .iter()
            .filter_map(|item| match item {
                QueryItem::Field(field) => keep(field).then(|| QueryItem::Field(field.clone())),
                QueryItem::Comparison(cmp) => Some(QueryItem::Comparison(cmp.clone())),
                QueryItem::Group(group) => {
                    let pruned = group.prune(keep);
                    (!pruned.is_empty()).then_some(QueryItem::Group(pruned))
                }
            })
            .collect();
        Self {
            conjunction: self.conjunction,
            items,
        }
    }

    /// Renders a fully parenthesized boolean expression, children joined by
    /// the group's conjunction token.
    pub fn to_sql(&self, setting: &DbSetting) -> String {
        let mut out = String::from("(");
        let mut first = true;
        for item in &self.items {
            if !first {
                out.push(' ');
                out.push_str(self.conjunction.as_sql());
                out.push(' ');
            }
            first = false;
            match item {
                QueryItem::Field(field) => out.push_str(&field.to_sql(setting)),
                QueryItem::Comparison(cmp) => out.push_str(&cmp.to_sql(setting)),
                QueryItem::Group(group) => out.push_str(&group.to_sql(setting)),
            }
        }
        out.push(')');
        out
    }
}
