#[macro_use]
pub mod ser;
pub use ser::{ParamMap, Params, Placeholder};

mod builder;
pub use builder::Builder;
