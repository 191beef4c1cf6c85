use super::{Expr, ExprMember};

/// Tests a string member against a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprPattern {
    pub member: ExprMember,
    pub kind: PatternKind,
    pub pattern: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Contains,
    BeginsWith,
    EndsWith,
}

impl Expr {
    pub fn contains(member: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::pattern(member, PatternKind::Contains, pattern)
    }

    pub fn begins_with(member: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::pattern(member, PatternKind::BeginsWith, pattern)
    }

    pub fn ends_with(member: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::pattern(member, PatternKind::EndsWith, pattern)
    }

    fn pattern(member: impl Into<String>, kind: PatternKind, pattern: impl Into<String>) -> Self {
        ExprPattern {
            member: ExprMember {
                name: member.into(),
            },
            kind,
            pattern: pattern.into(),
        }
        .into()
    }
}

impl From<ExprPattern> for Expr {
    fn from(value: ExprPattern) -> Self {
        Self::Pattern(value)
    }
}
