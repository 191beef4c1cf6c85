use super::Expr;

/// References a mapped property on the target entity by member name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprMember {
    pub name: String,
}

impl Expr {
    pub fn member(name: impl Into<String>) -> Self {
        ExprMember { name: name.into() }.into()
    }
}

impl From<ExprMember> for Expr {
    fn from(value: ExprMember) -> Self {
        Self::Member(value)
    }
}
