use crate::Provider;

/// How a dialect limits the number of rows a SELECT returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLimit {
    /// `SELECT TOP (n) ...`
    Top,
    /// `... LIMIT n`
    Limit,
    /// `... FETCH FIRST n ROWS ONLY`
    FetchFirst,
}

/// How a dialect returns a generated key from an INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyReturn {
    /// Append `; SELECT SCOPE_IDENTITY() ...`
    ScopeIdentity,
    /// `RETURNING <column>`
    Returning,
    /// Append `; SELECT LAST_INSERT_ID() ...`
    LastInsertId,
    /// Append `; SELECT last_insert_rowid() ...`
    LastInsertRowid,
}

/// Dialect-specific rendering settings: identifier quoting, parameter
/// markers, and the few per-provider statement shapes the builders need.
///
/// This is the only channel through which dialect differences reach the
/// query IR's rendering.
#[derive(Debug, PartialEq, Eq)]
pub struct DbSetting {
    pub provider: Provider,
    pub opening_quote: &'static str,
    pub closing_quote: &'static str,
    pub parameter_prefix: &'static str,
    /// Whether the provider accepts query hints. Hints supplied to a
    /// provider that does not are rejected, never silently ignored.
    pub supports_hints: bool,
    pub row_limit: RowLimit,
    pub key_return: KeyReturn,
}

impl DbSetting {
    pub const SQL_SERVER: Self = Self {
        provider: Provider::SqlServer,
        opening_quote: "[",
        closing_quote: "]",
        parameter_prefix: "@",
        supports_hints: true,
        row_limit: RowLimit::Top,
        key_return: KeyReturn::ScopeIdentity,
    };

    pub const POSTGRESQL: Self = Self {
        provider: Provider::PostgreSql,
        opening_quote: "\"",
        closing_quote: "\"",
        supports_hints: false,
        row_limit: RowLimit::Limit,
        key_return: KeyReturn::Returning,
        ..Self::SQL_SERVER
    };

    pub const MYSQL: Self = Self {
        provider: Provider::MySql,
        opening_quote: "`",
        closing_quote: "`",
        supports_hints: false,
        row_limit: RowLimit::Limit,
        key_return: KeyReturn::LastInsertId,
        ..Self::SQL_SERVER
    };

    pub const ORACLE: Self = Self {
        provider: Provider::Oracle,
        opening_quote: "\"",
        closing_quote: "\"",
        parameter_prefix: ":",
        supports_hints: false,
        row_limit: RowLimit::FetchFirst,
        key_return: KeyReturn::Returning,
    };

    pub const SQLITE: Self = Self {
        provider: Provider::Sqlite,
        supports_hints: false,
        row_limit: RowLimit::Limit,
        key_return: KeyReturn::LastInsertRowid,
        ..Self::SQL_SERVER
    };

    pub fn for_provider(provider: Provider) -> &'static Self {
        match provider {
            Provider::SqlServer => &Self::SQL_SERVER,
            Provider::PostgreSql => &Self::POSTGRESQL,
            Provider::MySql => &Self::MYSQL,
            Provider::Oracle => &Self::ORACLE,
            Provider::Sqlite => &Self::SQLITE,
        }
    }

    /// Wraps a name in the dialect's quotes, stripping any quoting already
    /// present so quoting is idempotent.
    pub fn quote(&self, name: &str) -> String {
        let unquoted = name.trim_matches(['[', ']', '"', '`']);
        format!("{}{}{}", self.opening_quote, unquoted, self.closing_quote)
    }

    /// Renders a parameter placeholder in the dialect's marker convention.
    pub fn parameter(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_is_idempotent_per_dialect() {
        assert_eq!(DbSetting::SQL_SERVER.quote("Id"), "[Id]");
        assert_eq!(DbSetting::SQL_SERVER.quote("[Id]"), "[Id]");
        assert_eq!(DbSetting::POSTGRESQL.quote("[Id]"), "\"Id\"");
        assert_eq!(DbSetting::MYSQL.quote("\"Id\""), "`Id`");
    }

    #[test]
    fn parameter_markers_per_dialect() {
        assert_eq!(DbSetting::SQL_SERVER.parameter("Name"), "@Name");
        assert_eq!(DbSetting::ORACLE.parameter("Name"), ":Name");
        assert_eq!(DbSetting::SQLITE.parameter("Name"), "@Name");
    }
}
