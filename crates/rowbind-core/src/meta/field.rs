use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a logical column by name.
///
/// Equality and hashing are case-insensitive on the unquoted name, so
/// `[Id]`, `"id"` and `ID` all identify the same column.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
}

const QUOTES: &[char] = &['[', ']', '"', '`'];

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name exactly as supplied.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with any quoting characters stripped.
    pub fn unquoted(&self) -> &str {
        self.name.trim_matches(QUOTES)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.unquoted().eq_ignore_ascii_case(other.unquoted())
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.unquoted().bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_case_and_quotes() {
        assert_eq!(Field::new("[Id]"), Field::new("id"));
        assert_eq!(Field::new("`Name`"), Field::new("\"NAME\""));
        assert_ne!(Field::new("Id"), Field::new("Name"));
    }

    #[test]
    fn unquoted_strips_all_quote_styles() {
        assert_eq!(Field::new("[Order]").unquoted(), "Order");
        assert_eq!(Field::new("\"Order\"").unquoted(), "Order");
        assert_eq!(Field::new("`Order`").unquoted(), "Order");
    }
}
