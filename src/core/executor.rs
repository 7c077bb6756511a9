//! Backing store contract
//!
//! The store only ever talks to durable storage through [`Executor`]: a
//! statement with no result rows, a single-row query, and a multi-row query.
//! Statements are parameterized with `$1..$n` placeholders; values are never
//! spliced into SQL text.

use crate::core::types::{byte_to_text, Action, RoleCode};
use crate::error::StorageError;
use std::sync::Arc;

/// A bound parameter or a decoded column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<RoleCode> for Value {
    fn from(code: RoleCode) -> Self {
        Value::Text(byte_to_text(code.as_byte()))
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        Value::Text(byte_to_text(action.as_byte()))
    }
}

/// One result row, owned
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&Value> {
        self.values.get(column)
    }

    /// Borrow a TEXT column
    pub fn text(&self, column: usize) -> Result<&str, StorageError> {
        match self.values.get(column) {
            Some(Value::Text(s)) => Ok(s),
            Some(other) => Err(StorageError::Decode {
                column,
                reason: format!("expected text, got {:?}", other),
            }),
            None => Err(StorageError::Decode {
                column,
                reason: format!("row has only {} columns", self.values.len()),
            }),
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::new(values)
    }
}

/// Rows of a multi-row query. Dropping the iterator releases whatever the
/// executor still holds for the query; an iteration failure surfaces as an
/// `Err` item. [`SqliteExecutor`](crate::SqliteExecutor) reads the result set
/// eagerly, so its cursor is already closed when the iterator is returned.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, StorageError>> + 'a>;

/// Abstract statement/query execution against a relational store
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no rows
    fn execute(&self, sql: &str, params: &[Value]) -> Result<(), StorageError>;

    /// Execute a query expected to return one row.
    ///
    /// Returns [`StorageError::NoRows`] when nothing matched.
    fn query_row(&self, sql: &str, params: &[Value]) -> Result<Row, StorageError>;

    /// Execute a query returning any number of rows
    fn query(&self, sql: &str, params: &[Value]) -> Result<RowIter<'_>, StorageError>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<(), StorageError> {
        (**self).execute(sql, params)
    }

    fn query_row(&self, sql: &str, params: &[Value]) -> Result<Row, StorageError> {
        (**self).query_row(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<RowIter<'_>, StorageError> {
        (**self).query(sql, params)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<(), StorageError> {
        (**self).execute(sql, params)
    }

    fn query_row(&self, sql: &str, params: &[Value]) -> Result<Row, StorageError> {
        (**self).query_row(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<RowIter<'_>, StorageError> {
        (**self).query(sql, params)
    }
}
