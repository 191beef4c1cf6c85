use std::fmt;
use std::str::FromStr;

use rowbind_core::{DbField, DbFieldCollection, Error, NullHandling, Result};

/// Which column an insert or merge reads back into the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyColumnReturnBehavior {
    /// The sole primary key column, or nothing.
    Primary,
    /// The identity column, or nothing.
    Identity,
    /// The sole primary key column, falling back to the identity column.
    #[default]
    PrimaryOrElseIdentity,
    /// The identity column, falling back to the sole primary key column.
    IdentityOrElsePrimary,
}

impl KeyColumnReturnBehavior {
    /// Resolves the behavior against live column metadata. A table with no
    /// matching column simply returns no key; that is not an error.
    pub fn resolve(&self, fields: &DbFieldCollection) -> Option<DbField> {
        let primary = fields.get_primary().cloned();
        let identity = fields.identity().cloned();
        match self {
            Self::Primary => primary,
            Self::Identity => identity,
            Self::PrimaryOrElseIdentity => primary.or(identity),
            Self::IdentityOrElsePrimary => identity.or(primary),
        }
    }
}

impl FromStr for KeyColumnReturnBehavior {
    type Err = Error;

    /// Case-insensitive. An unrecognized name is a configuration error, not
    /// a silent fallback to the default.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "identity" => Ok(Self::Identity),
            "primaryorelseidentity" => Ok(Self::PrimaryOrElseIdentity),
            "identityorelseprimary" => Ok(Self::IdentityOrElsePrimary),
            _ => Err(Error::configuration(format!(
                "unrecognized key column return behavior `{s}`"
            ))),
        }
    }
}

impl fmt::Display for KeyColumnReturnBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "Primary",
            Self::Identity => "Identity",
            Self::PrimaryOrElseIdentity => "PrimaryOrElseIdentity",
            Self::IdentityOrElsePrimary => "IdentityOrElsePrimary",
        };
        f.write_str(name)
    }
}

/// Mapper-wide behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub key_column_return_behavior: KeyColumnReturnBehavior,
    pub null_handling: NullHandling,
}
