use super::{Expr, ExprMember};
use crate::Value;

/// `All` / `Any` of a value list compared for equality against a member.
///
/// Unlike [`ExprInList`](super::ExprInList), which collapses into a single
/// bound collection parameter, a quantified comparison expands into one
/// discrete predicate per element.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprQuantified {
    pub quantifier: Quantifier,
    pub member: ExprMember,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    All,
    Any,
}

impl Expr {
    pub fn all<V: Into<Value>>(
        member: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::quantified(Quantifier::All, member, values)
    }

    pub fn any<V: Into<Value>>(
        member: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::quantified(Quantifier::Any, member, values)
    }

    fn quantified<V: Into<Value>>(
        quantifier: Quantifier,
        member: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        ExprQuantified {
            quantifier,
            member: ExprMember {
                name: member.into(),
            },
            values: values.into_iter().map(Into::into).collect(),
        }
        .into()
    }
}

impl From<ExprQuantified> for Expr {
    fn from(value: ExprQuantified) -> Self {
        Self::Quantified(value)
    }
}
