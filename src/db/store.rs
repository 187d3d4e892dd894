//! Embedded relational store.
//!
//! Holds the session's dataset as a single table inside an in-memory SQLite
//! database. `load` rebuilds the engine from scratch (full replace, never a
//! merge); `execute` runs a validated query and collects the result. All
//! access goes through a `Mutex` because `rusqlite::Connection` is not
//! `Sync`, which also serializes executions.

use parking_lot::Mutex;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use tracing::{debug, info};

use crate::dataset::{Dataset, Value, TABLE_NAME};
use crate::error::ExecutionError;
use crate::guard::ValidatedQuery;

use super::ResultSet;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// The session-private store. One dataset, one table, no cross-session
/// sharing.
pub struct DataStore {
    conn: Mutex<Connection>,
}

impl DataStore {
    /// Create an empty store. Queries fail until a dataset is loaded.
    pub fn new() -> Result<Self, ExecutionError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Materialize the dataset into the `data` table of a fresh engine
    /// instance, replacing any prior contents entirely.
    ///
    /// This is the sole writer for the session; it completes before any
    /// `execute` is issued.
    pub fn load(&self, dataset: &Dataset) -> Result<(), ExecutionError> {
        let fresh = Connection::open_in_memory()?;

        let defs: Vec<String> = dataset
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} {}", quote_ident(name), column_affinity(dataset, i)))
            .collect();
        fresh.execute_batch(&format!(
            "CREATE TABLE {} ({})",
            quote_ident(TABLE_NAME),
            defs.join(", ")
        ))?;

        {
            let placeholders = vec!["?"; dataset.columns.len()].join(", ");
            let mut stmt = fresh.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(TABLE_NAME),
                placeholders
            ))?;
            for row in &dataset.rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }

        *self.conn.lock() = fresh;
        info!(
            rows = dataset.rows.len(),
            columns = dataset.columns.len(),
            "dataset loaded"
        );
        Ok(())
    }

    /// Execute a validated query and collect the full result set.
    ///
    /// Read-only from the caller's perspective. Any engine parse or runtime
    /// error (including unknown column names, which the guard deliberately
    /// does not check) is reported as an `ExecutionError` carrying the
    /// engine's message.
    pub fn execute(&self, query: &ValidatedQuery) -> Result<ResultSet, ExecutionError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(query.as_str())?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut raw = stmt.query([])?;
        while let Some(row) = raw.next()? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = match row.get_ref(i)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Integer(n),
                    ValueRef::Real(f) => Value::Real(f),
                    ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
                    ValueRef::Blob(b) => Value::Text(format!("[{} bytes]", b.len())),
                };
                values.push(value);
            }
            rows.push(values);
        }

        debug!(rows = rows.len(), "query executed");
        Ok(ResultSet { columns, rows })
    }
}

/// Pick a column affinity from the dataset's typed cells: all-integer
/// columns get INTEGER, numeric columns with any real get REAL, anything
/// else (including all-null) gets TEXT.
fn column_affinity(dataset: &Dataset, idx: usize) -> &'static str {
    let mut saw_number = false;
    let mut saw_real = false;
    for row in &dataset.rows {
        match row.get(idx) {
            Some(Value::Integer(_)) => saw_number = true,
            Some(Value::Real(_)) => {
                saw_number = true;
                saw_real = true;
            }
            Some(Value::Text(_)) => return "TEXT",
            _ => {}
        }
    }
    if !saw_number {
        "TEXT"
    } else if saw_real {
        "REAL"
    } else {
        "INTEGER"
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
