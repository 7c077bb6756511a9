//! SQLite backing store
//!
//! [`SqliteExecutor`] implements [`Executor`] over a single rusqlite
//! connection. Statements are written with `$N` placeholders and rewritten to
//! SQLite's `?N` form before preparation.

use crate::core::config::StorageConfig;
use crate::core::executor::{Executor, Row, RowIter, Value};
use crate::error::StorageError;
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// Rewrite `$N` placeholders to `?N`
pub(crate) fn rewrite_placeholders(sql: &str) -> Cow<'_, str> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\$(\d+)").expect("valid placeholder pattern"));
    re.replace_all(sql, "?$1")
}

fn convert_row(row: &rusqlite::Row<'_>) -> Result<Row, StorageError> {
    let count = row.as_ref().column_count();
    let mut values = Vec::with_capacity(count);
    for column in 0..count {
        let value = match row.get_ref(column)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(bytes) => Value::Text(
                std::str::from_utf8(bytes)
                    .map_err(|e| StorageError::Decode {
                        column,
                        reason: e.to_string(),
                    })?
                    .to_string(),
            ),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        };
        values.push(value);
    }
    Ok(Row::new(values))
}

/// [`Executor`] over one SQLite connection
///
/// The connection is guarded by a mutex, so one executor can be shared by
/// every thread using the store.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
}

impl SqliteExecutor {
    /// Open (or create) a database file with foreign keys enabled
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        debug!("Opening SQLite store at {:?}", path.as_ref());
        let conn = Connection::open(path)?;
        Self::configure(conn, &StorageConfig::default())
    }

    /// Open a private in-memory database with foreign keys enabled
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn, &StorageConfig::default())
    }

    /// Open the database described by `config`
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let conn = match &config.path {
            Some(path) => {
                debug!("Opening SQLite store at {:?}", path);
                Connection::open(path)?
            }
            None => Connection::open_in_memory()?,
        };
        Self::configure(conn, config)
    }

    /// Wrap an already-open connection as-is
    pub fn from_connection(conn: Connection) -> Self {
        SqliteExecutor {
            conn: Mutex::new(conn),
        }
    }

    fn configure(conn: Connection, config: &StorageConfig) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        if !config.foreign_keys {
            warn!("SQLite foreign keys disabled; deletes will not cascade in storage");
        }
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(Self::from_connection(conn))
    }

    /// Run `f` with exclusive access to the underlying connection
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let conn = self.conn.lock();
        f(&conn)
    }
}

impl Executor for SqliteExecutor {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<(), StorageError> {
        let sql = rewrite_placeholders(sql);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(params.iter()))?;
        Ok(())
    }

    fn query_row(&self, sql: &str, params: &[Value]) -> Result<Row, StorageError> {
        let sql = rewrite_placeholders(sql);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let first = match rows.next()? {
            Some(row) => convert_row(row),
            None => Err(StorageError::NoRows),
        };
        first
    }

    fn query(&self, sql: &str, params: &[Value]) -> Result<RowIter<'_>, StorageError> {
        let sql = rewrite_placeholders(sql);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        // The connection lock cannot outlive this call, so rows are read eagerly
        let mut out = Vec::new();
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let converted = convert_row(row);
                    let failed = converted.is_err();
                    out.push(converted);
                    if failed {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    out.push(Err(e.into()));
                    break;
                }
            }
        }
        Ok(Box::new(out.into_iter()))
    }
}
