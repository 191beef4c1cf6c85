use super::{Expr, ExprMember};
use crate::Value;

/// `member ?? default`: a member access with a fallback when the member is
/// null. Only meaningful as an operand of an equality comparison, where the
/// parser rewrites it into a null-aware disjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprCoalesce {
    pub member: ExprMember,
    pub default: Value,
}

impl Expr {
    pub fn coalesce(member: impl Into<String>, default: impl Into<Value>) -> Self {
        ExprCoalesce {
            member: ExprMember {
                name: member.into(),
            },
            default: default.into(),
        }
        .into()
    }
}

impl From<ExprCoalesce> for Expr {
    fn from(value: ExprCoalesce) -> Self {
        Self::Coalesce(value)
    }
}
