mod cache;
pub use cache::FieldCache;

mod connection;
pub use connection::{AsyncConnection, Connection, Row};

mod context;
pub use context::{ContextCache, ExecutionContext};

pub mod helper;
pub use helper::{DbHelper, DbRuntimeSetting, SchemaObject, SchemaObjectKind};

mod mapper;
pub use mapper::Mapper;

mod options;
pub use options::{KeyColumnReturnBehavior, Options};

pub use rowbind_core::{
    DbField, DbFieldCollection, DbSetting, EntityMap, Error, Expr, Field, NullHandling, Operation,
    Provider, QueryField, QueryGroup, Registry, Result, Value, ValueKind,
};
pub use rowbind_sql::{Builder, ParamMap};
