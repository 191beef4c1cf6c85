mod db_field;
pub use db_field::DbField;

mod db_field_collection;
pub use db_field_collection::DbFieldCollection;

mod entity;
pub use entity::{EntityMap, EntityMapBuilder, PropertyMap};

mod field;
pub use field::Field;

mod provider;
pub use provider::Provider;

mod registry;
pub use registry::Registry;
