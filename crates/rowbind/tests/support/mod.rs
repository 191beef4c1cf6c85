#![allow(dead_code)]

use async_trait::async_trait;

use rowbind::{AsyncConnection, Connection, ParamMap, Row};
use rowbind_core::{Result, Value};

use std::collections::VecDeque;

/// Records every statement and replays queued results, in order.
#[derive(Default)]
pub struct FakeConnection {
    pub calls: Vec<(String, ParamMap)>,
    pub rows: VecDeque<Vec<Row>>,
    pub scalars: VecDeque<Option<Value>>,
    pub affected: u64,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self {
            affected: 1,
            ..Default::default()
        }
    }

    pub fn queue_rows(&mut self, rows: Vec<Row>) {
        self.rows.push_back(rows);
    }

    pub fn queue_scalar(&mut self, value: Option<Value>) {
        self.scalars.push_back(value);
    }

    pub fn last_sql(&self) -> &str {
        self.calls.last().map(|(sql, _)| sql.as_str()).unwrap_or("")
    }

    pub fn last_params(&self) -> &ParamMap {
        &self.calls.last().expect("no statement was executed").1
    }
}

impl Connection for FakeConnection {
    fn execute(&mut self, sql: &str, params: &ParamMap) -> Result<u64> {
        self.calls.push((sql.to_string(), params.clone()));
        Ok(self.affected)
    }

    fn query(&mut self, sql: &str, params: &ParamMap) -> Result<Vec<Row>> {
        self.calls.push((sql.to_string(), params.clone()));
        Ok(self.rows.pop_front().unwrap_or_default())
    }

    fn query_scalar(&mut self, sql: &str, params: &ParamMap) -> Result<Option<Value>> {
        self.calls.push((sql.to_string(), params.clone()));
        Ok(self.scalars.pop_front().flatten())
    }
}

/// The same fake behind the async trait.
#[derive(Default)]
pub struct FakeAsyncConnection {
    pub inner: FakeConnection,
}

impl FakeAsyncConnection {
    pub fn new() -> Self {
        Self {
            inner: FakeConnection::new(),
        }
    }
}

#[async_trait]
impl AsyncConnection for FakeAsyncConnection {
    async fn execute(&mut self, sql: &str, params: &ParamMap) -> Result<u64> {
        Connection::execute(&mut self.inner, sql, params)
    }

    async fn query(&mut self, sql: &str, params: &ParamMap) -> Result<Vec<Row>> {
        Connection::query(&mut self.inner, sql, params)
    }

    async fn query_scalar(&mut self, sql: &str, params: &ParamMap) -> Result<Option<Value>> {
        Connection::query_scalar(&mut self.inner, sql, params)
    }
}

/// `pragma table_info` rows for a Person table whose Id is the rowid alias.
pub fn sqlite_person_catalog() -> Vec<Row> {
    vec![
        sqlite_column(0, "Id", "INTEGER", true, false, true),
        sqlite_column(1, "Name", "TEXT", false, false, false),
        sqlite_column(2, "Age", "INTEGER", false, false, false),
    ]
}

pub fn sqlite_column(
    cid: i64,
    name: &str,
    db_type: &str,
    not_null: bool,
    has_default: bool,
    primary: bool,
) -> Row {
    vec![
        Value::I64(cid),
        Value::from(name),
        Value::from(db_type),
        Value::I64(not_null as i64),
        if has_default {
            Value::from("0")
        } else {
            Value::Null
        },
        Value::I64(primary as i64),
    ]
}
