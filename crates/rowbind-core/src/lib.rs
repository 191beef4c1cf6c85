mod error;
pub use error::Error;

pub mod expr;
pub use expr::Expr;

pub mod meta;
pub use meta::{DbField, DbFieldCollection, EntityMap, Field, Provider, Registry};

pub mod parse;
pub use parse::{NullHandling, ParseOptions};

pub mod query;
pub use query::{Operation, QueryField, QueryGroup};

mod setting;
pub use setting::{DbSetting, KeyReturn, RowLimit};

mod value;
pub use value::{EnumValue, Value, ValueKind};

/// A Result type alias that uses rowbind's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
