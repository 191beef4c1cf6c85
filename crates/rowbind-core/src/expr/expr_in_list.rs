use super::{Expr, ExprMember};
use crate::Value;

/// Membership of a member in a typed value list.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub member: ExprMember,
    pub values: Vec<Value>,
}

impl Expr {
    pub fn in_list<V: Into<Value>>(
        member: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        ExprInList {
            member: ExprMember {
                name: member.into(),
            },
            values: values.into_iter().map(Into::into).collect(),
        }
        .into()
    }
}

impl From<ExprInList> for Expr {
    fn from(value: ExprInList) -> Self {
        Self::InList(value)
    }
}
