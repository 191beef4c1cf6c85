use std::fmt;

/// The relational backend a piece of metadata or SQL text targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    SqlServer,
    PostgreSql,
    MySql,
    Oracle,
    Sqlite,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqlServer => "SQL Server".fmt(f),
            Self::PostgreSql => "PostgreSQL".fmt(f),
            Self::MySql => "MySQL".fmt(f),
            Self::Oracle => "Oracle".fmt(f),
            Self::Sqlite => "SQLite".fmt(f),
        }
    }
}
