use super::{Operation, Parameter};
use crate::{DbSetting, Field, Value};

/// One atomic predicate: a field, an operation, and the bound parameter.
///
/// `IsNull` / `IsNotNull` carry no parameter. `In` carries the full typed
/// list in one parameter and expands into per-element placeholders at
/// render time; `Between` carries a two-element list rendered as a
/// `_Left` / `_Right` placeholder pair.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryField {
    field: Field,
    operation: Operation,
    parameter: Option<Parameter>,

    /// Marks a predicate added by the null-semantics rewrite that the SQL
    /// builder may drop when the column is provably non-nullable.
    can_skip: bool,
}

impl QueryField {
    pub fn new(field: impl Into<Field>, operation: Operation, value: impl Into<Value>) -> Self {
        debug_assert!(!operation.is_null_check());
        let field = field.into();
        let parameter = Parameter::new(field.unquoted(), value);
        Self {
            field,
            operation,
            parameter: Some(parameter),
            can_skip: false,
        }
    }

    pub fn equal(field: impl Into<Field>, value: impl Into<Value>) -> Self {
        Self::new(field, Operation::Equal, value)
    }

    pub fn is_null(field: impl Into<Field>) -> Self {
        Self::null_check(field, Operation::IsNull)
    }

    pub fn is_not_null(field: impl Into<Field>) -> Self {
        Self::null_check(field, Operation::IsNotNull)
    }

    pub fn between(
        field: impl Into<Field>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::new(
            field,
            Operation::Between,
            Value::List(vec![low.into(), high.into()]),
        )
    }

    pub fn in_values<V: Into<Value>>(
        field: impl Into<Field>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            field,
            Operation::In,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    fn null_check(field: impl Into<Field>, operation: Operation) -> Self {
        Self {
            field: field.into(),
            operation,
            parameter: None,
            can_skip: false,
        }
    }

    pub fn with_can_skip(mut self) -> Self {
        self.can_skip = true;
        self
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn parameter(&self) -> Option<&Parameter> {
        self.parameter.as_ref()
    }

    pub fn can_skip(&self) -> bool {
        self.can_skip
    }

    pub(crate) fn rename_parameter(&mut self, name: String) {
        if let Some(parameter) = &mut self.parameter {
            parameter.rename(name);
        }
    }

    /// Renders `<quoted field> <operator> <placeholder(s)>`. Dialect
    /// differences enter only through the supplied setting.
    pub fn to_sql(&self, setting: &DbSetting) -> String {
        let field = setting.quote(self.field.unquoted());

        match self.operation {
            Operation::IsNull | Operation::IsNotNull => {
                format!("{field} {}", self.operation)
            }
            Operation::In | Operation::NotIn => {
                let placeholders = self
                    .bound_parameters()
                    .into_iter()
                    .map(|(name, _)| setting.parameter(&name))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{field} {} ({placeholders})", self.operation)
            }
            Operation::Between | Operation::NotBetween => {
                let name = self.parameter_name();
                format!(
                    "{field} {} {} AND {}",
                    self.operation,
                    setting.parameter(&format!("{name}_Left")),
                    setting.parameter(&format!("{name}_Right")),
                )
            }
            _ => {
                let name = self.parameter_name();
                format!("{field} {} {}", self.operation, setting.parameter(&name))
            }
        }
    }

    /// The (name, value) pairs this predicate binds, with `In` lists and
    /// `Between` ranges expanded the same way [`to_sql`](Self::to_sql)
    /// renders them.
    pub fn bound_parameters(&self) -> Vec<(String, Value)> {
        let Some(parameter) = &self.parameter else {
            return vec![];
        };
        let name = parameter.name();

        match self.operation {
            Operation::In | Operation::NotIn => {
                let items = parameter.value().as_list().unwrap_or_default();
                items
                    .iter()
                    .enumerate()
                    .map(|(i, value)| (format!("{name}_In_{i}"), value.clone()))
                    .collect()
            }
            Operation::Between | Operation::NotBetween => {
                let items = parameter.value().as_list().unwrap_or_default();
                let mut out = Vec::with_capacity(2);
                if let Some(low) = items.first() {
                    out.push((format!("{name}_Left"), low.clone()));
                }
                if let Some(high) = items.get(1) {
                    out.push((format!("{name}_Right"), high.clone()));
                }
                out
            }
            _ => vec![(name.to_string(), parameter.value().clone())],
        }
    }

    fn parameter_name(&self) -> String {
        self.parameter
            .as_ref()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| self.field.unquoted().to_string())
    }
}
