mod field_comparison;
pub use field_comparison::FieldComparisonQueryField;

mod operation;
pub use operation::Operation;

mod parameter;
pub use parameter::Parameter;

mod query_field;
pub use query_field::QueryField;

mod query_group;
pub use query_group::{Conjunction, QueryGroup, QueryItem};
