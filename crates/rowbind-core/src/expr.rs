mod expr_and;
pub use expr_and::ExprAnd;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_coalesce;
pub use expr_coalesce::ExprCoalesce;

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod expr_member;
pub use expr_member::ExprMember;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod expr_pattern;
pub use expr_pattern::{ExprPattern, PatternKind};

mod expr_quantified;
pub use expr_quantified::{ExprQuantified, Quantifier};

mod op_binary;
pub use op_binary::BinaryOp;

use crate::Value;
use std::fmt;

/// A typed boolean predicate over one entity type.
///
/// This is the supported subset the expression parser accepts; anything the
/// parser cannot translate fails with an unsupported-expression error
/// carrying the rendered node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND over a set of predicates
    And(ExprAnd),

    /// Binary comparison
    BinaryOp(ExprBinaryOp),

    /// `member ?? default`, meaningful only inside a comparison
    Coalesce(ExprCoalesce),

    /// Membership of a member in a typed value list
    InList(ExprInList),

    /// References a mapped property on the target entity
    Member(ExprMember),

    /// Logical negation
    Not(ExprNot),

    /// OR over a set of predicates
    Or(ExprOr),

    /// String pattern match (contains / begins-with / ends-with)
    Pattern(ExprPattern),

    /// All/Any of a value list compared against a member
    Quantified(ExprQuantified),

    /// A literal value
    Value(Value),
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member(_))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn as_member(&self) -> Option<&ExprMember> {
        match self {
            Self::Member(member) => Some(member),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Value(value.into())
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Self::Value(value.into())
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Value(value.into())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Value(value.into())
    }
}

/// Renders a readable pseudo-syntax, used by unsupported-expression errors.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, operands: &[Expr], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            let mut first = true;
            for operand in operands {
                if !first {
                    f.write_str(sep)?;
                }
                first = false;
                write!(f, "{operand}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::And(e) => join(f, &e.operands, " AND "),
            Self::Or(e) => join(f, &e.operands, " OR "),
            Self::BinaryOp(e) => write!(f, "({} {} {})", e.lhs, e.op, e.rhs),
            Self::Coalesce(e) => write!(f, "({} ?? {:?})", e.member.name, e.default),
            Self::InList(e) => write!(f, "({} IN {:?})", e.member.name, e.values),
            Self::Member(e) => f.write_str(&e.name),
            Self::Not(e) => write!(f, "NOT {}", e.operand),
            Self::Pattern(e) => write!(f, "({} {:?} {:?})", e.member.name, e.kind, e.pattern),
            Self::Quantified(e) => {
                write!(f, "({:?} of {:?} == {})", e.quantifier, e.values, e.member.name)
            }
            Self::Value(Value::String(s)) => write!(f, "{s:?}"),
            Self::Value(v) => write!(f, "{v:?}"),
        }
    }
}
