use async_trait::async_trait;

use rowbind_core::{Result, Value};
use rowbind_sql::ParamMap;

/// A result row: values in select-list order.
pub type Row = Vec<Value>;

/// A caller-owned database connection.
///
/// The mapper executes statements through this trait and nothing else; it
/// never opens, pools, or closes connections. Dropping an in-flight call's
/// future (on the async variant) is the cancellation mechanism.
pub trait Connection {
    /// Executes a statement and returns the affected row count.
    fn execute(&mut self, sql: &str, params: &ParamMap) -> Result<u64>;

    /// Executes a query and returns all rows.
    fn query(&mut self, sql: &str, params: &ParamMap) -> Result<Vec<Row>>;

    /// Executes a query and returns the first column of the first row,
    /// if any.
    fn query_scalar(&mut self, sql: &str, params: &ParamMap) -> Result<Option<Value>>;
}

#[async_trait]
pub trait AsyncConnection: Send {
    async fn execute(&mut self, sql: &str, params: &ParamMap) -> Result<u64>;

    async fn query(&mut self, sql: &str, params: &ParamMap) -> Result<Vec<Row>>;

    async fn query_scalar(&mut self, sql: &str, params: &ParamMap) -> Result<Option<Value>>;
}
