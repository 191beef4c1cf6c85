use super::Operation;
use crate::{DbSetting, Field};

/// A column-to-column comparison: the right-hand side is another field, not
/// a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparisonQueryField {
    left: Field,
    operation: Operation,
    right: Field,
}

impl FieldComparisonQueryField {
    pub fn new(left: impl Into<Field>, operation: Operation, right: impl Into<Field>) -> Self {
        Self {
            left: left.into(),
            operation,
            right: right.into(),
        }
    }

    pub fn left(&self) -> &Field {
        &self.left
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn right(&self) -> &Field {
        &self.right
    }

    pub fn to_sql(&self, setting: &DbSetting) -> String {
        format!(
            "{} {} {}",
            setting.quote(self.left.unquoted()),
            self.operation,
            setting.quote(self.right.unquoted()),
        )
    }
}
