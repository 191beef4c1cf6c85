use super::{Field, Provider};
use crate::ValueKind;

/// A physical column descriptor, read once from the backend catalog and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DbField {
    /// The column name. Comparison is case- and quote-insensitive.
    pub field: Field,

    /// True if the column is part of the table's primary key.
    pub is_primary: bool,

    /// True if the column value is produced by an identity/auto-increment
    /// sequence.
    pub is_identity: bool,

    pub is_nullable: bool,

    /// True if the column value is computed by the database.
    pub is_computed: bool,

    /// True if the database rewrites the column on modification (for example
    /// MySQL's `ON UPDATE CURRENT_TIMESTAMP`). A column with only a static
    /// default is not auto-updated; it can still be written on insert.
    pub is_auto_updated: bool,

    pub has_default: bool,

    /// The value shape the mapping layer binds for this column.
    pub kind: ValueKind,

    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,

    /// The raw type string reported by the backend catalog.
    pub db_type: Option<String>,

    /// The backend this descriptor was read from.
    pub provider: Provider,
}

impl DbField {
    pub fn new(name: impl Into<Field>, kind: ValueKind, provider: Provider) -> Self {
        Self {
            field: name.into(),
            is_primary: false,
            is_identity: false,
            is_nullable: true,
            is_computed: false,
            is_auto_updated: false,
            has_default: false,
            kind,
            size: None,
            precision: None,
            scale: None,
            db_type: None,
            provider,
        }
    }

    pub fn name(&self) -> &str {
        self.field.unquoted()
    }

    /// A generated column is computed or auto-maintained by the database and
    /// must never be supplied by the application on write.
    pub fn is_generated(&self) -> bool {
        self.is_computed || self.is_auto_updated
    }
}
