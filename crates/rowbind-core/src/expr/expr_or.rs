use super::Expr;

/// OR over a set of predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprOr {
    pub operands: Vec<Expr>,
}

impl Expr {
    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Self {
        ExprOr {
            operands: operands.into_iter().collect(),
        }
        .into()
    }
}

impl From<ExprOr> for Expr {
    fn from(value: ExprOr) -> Self {
        Self::Or(value)
    }
}
