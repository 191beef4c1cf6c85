#[macro_use]
mod fmt;
pub(crate) use fmt::ToSql;

mod delim;
pub(crate) use delim::Delimited;

mod ident;
pub(crate) use ident::Ident;

mod params;
pub use params::{ParamMap, Params, Placeholder};

use rowbind_core::DbSetting;

/// Writes SQL text while collecting the named parameters the text refers to.
pub(crate) struct Formatter<'a, P> {
    /// Dialect settings for quoting and parameter markers
    pub(crate) setting: &'a DbSetting,

    /// Where to write the serialized SQL
    pub(crate) dst: &'a mut String,

    /// Where to store parameters
    pub(crate) params: &'a mut P,
}
