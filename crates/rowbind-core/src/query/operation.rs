use std::fmt;

/// The comparison a [`QueryField`](super::QueryField) performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
}

impl Operation {
    /// The SQL token. Dialects agree on all of these; dialect differences
    /// live entirely in quoting and parameter markers.
    pub fn as_sql(self) -> &'static str {
        use Operation::*;

        match self {
            Equal => "=",
            NotEqual => "<>",
            LessThan => "<",
            GreaterThan => ">",
            LessThanOrEqual => "<=",
            GreaterThanOrEqual => ">=",
            Like => "LIKE",
            NotLike => "NOT LIKE",
            In => "IN",
            NotIn => "NOT IN",
            Between => "BETWEEN",
            NotBetween => "NOT BETWEEN",
            IsNull => "IS NULL",
            IsNotNull => "IS NOT NULL",
        }
    }

    /// True for the operations that carry no bound parameter value.
    pub fn is_null_check(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
