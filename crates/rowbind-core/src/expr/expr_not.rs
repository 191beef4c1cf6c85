use super::Expr;

/// Logical negation of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNot {
    pub operand: Box<Expr>,
}

impl Expr {
    pub fn not(operand: impl Into<Self>) -> Self {
        ExprNot {
            operand: Box::new(operand.into()),
        }
        .into()
    }
}

impl From<ExprNot> for Expr {
    fn from(value: ExprNot) -> Self {
        Self::Not(value)
    }
}
