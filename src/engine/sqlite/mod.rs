//! `SQLite` Database Engine Implementation
//!
//! This module implements the `Database` trait for `SQLite` databases.
//!
//! # Features
//! - File-based connections (`/path/to/employees.db`)
//! - In-memory connections (`:memory:`)
//! - Foreign keys enforced (`PRAGMA foreign_keys = ON`)
//!
//! # Implementation Notes
//! - Uses `rusqlite` (synchronous driver, no async needed)
//! - `$n` placeholders are named parameters to `SQLite`; they receive
//!   indexes in order of first appearance and are bound positionally
//! - Timeouts enforced via `busy_timeout`
//! - BLOB columns are rejected, the schema has none

use rusqlite::types::{Null, ToSqlOutput};
use rusqlite::{Connection, OpenFlags, Row, ToSql};
use std::sync::Mutex;

use crate::engine::{ConnectionConfig, Database, DatabaseType, QueryResult, SqlParam};
use crate::error::{Result, TrackerError};

/// `SQLite` database engine implementation
pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    /// Open the database file named by `config`
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        // Validate config is for SQLite
        if config.engine != DatabaseType::SQLite {
            return Err(TrackerError::configuration(format!(
                "Expected SQLite engine, got {}",
                config.engine
            )));
        }

        let file_path = config
            .file
            .as_ref()
            .ok_or_else(|| TrackerError::configuration("SQLite requires 'file' parameter"))?;

        let path_str = file_path.to_str().ok_or_else(|| {
            TrackerError::configuration("SQLite file path contains invalid UTF-8 characters")
        })?;

        let conn = open_connection(path_str)?;

        if let Some(timeout) = config.statement_timeout() {
            conn.busy_timeout(timeout).map_err(|e| {
                TrackerError::connection_failed(format!("Failed to set SQLite busy timeout: {e}"))
            })?;
        }

        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            TrackerError::connection_failed(format!("Failed to open in-memory SQLite database: {e}"))
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true).map_err(|e| {
            TrackerError::connection_failed(format!("Failed to enable foreign keys: {e}"))
        })?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Run a batch of semicolon-separated statements (schema and seed scripts)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock()?
            .execute_batch(sql)
            .map_err(|e| TrackerError::database(format!("Failed to execute batch: {e}")))
    }

    /// Close the connection
    pub fn close(self) {
        let conn = match self.conn.into_inner() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err((_, e)) = conn.close() {
            tracing::warn!(error = %e, "failed to close SQLite connection cleanly");
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| TrackerError::database("SQLite connection lock poisoned"))
    }
}

impl Database for SqliteEngine {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult> {
        tracing::debug!(engine = "sqlite", params = params.len(), "executing statement");
        let conn = self.lock()?;
        execute_query(&conn, sql, params)
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Int(v) => ToSqlOutput::from(*v),
            Self::Float(v) => ToSqlOutput::from(*v),
            Self::Text(v) => ToSqlOutput::from(v.as_str()),
            Self::Null => ToSqlOutput::from(Null),
        })
    }
}

/// Open a `SQLite` connection with read-write flags
fn open_connection(path: &str) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;

    Connection::open_with_flags(path, flags).map_err(|e| {
        TrackerError::connection_failed(format!("Failed to open SQLite database: {e}"))
    })
}

/// Prepare, execute and collect rows into a `QueryResult`
fn execute_query(conn: &Connection, sql: &str, params: &[SqlParam]) -> Result<QueryResult> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| TrackerError::database(format!("Failed to prepare statement: {e}")))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|s| (*s).to_string()).collect();
    let width = columns.len();

    let mut rows = stmt
        .query(rusqlite::params_from_iter(params.iter()))
        .map_err(|e| TrackerError::database(format!("Failed to execute statement: {e}")))?;

    let mut rows_data = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| TrackerError::database(format!("Failed to fetch row: {e}")))?
    {
        let values = row_to_json(width, row)
            .map_err(|e| TrackerError::database(format!("Failed to read row: {e}")))?;
        rows_data.push(values);
    }

    Ok(QueryResult { columns, rows: rows_data })
}

/// Convert a `SQLite` row to a list of JSON values
fn row_to_json(width: usize, row: &Row) -> rusqlite::Result<Vec<serde_json::Value>> {
    (0..width).map(|idx| sqlite_value_to_json(row, idx)).collect()
}

/// Convert `SQLite` value to JSON value
fn sqlite_value_to_json(row: &Row, idx: usize) -> rusqlite::Result<serde_json::Value> {
    use rusqlite::types::{Type, ValueRef};

    Ok(match row.get_ref(idx)? {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number), // NaN/Infinity as null
        ValueRef::Text(s) => {
            let text = std::str::from_utf8(s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })?;
            serde_json::Value::String(text.to_string())
        }
        ValueRef::Blob(_) => {
            return Err(rusqlite::Error::InvalidColumnType(idx, format!("#{idx}"), Type::Blob))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_open_memory() {
        let config = ConnectionConfig::sqlite(PathBuf::from(":memory:"));
        assert!(SqliteEngine::open(&config).is_ok());
    }

    #[test]
    fn test_open_wrong_engine() {
        let mut config = ConnectionConfig::sqlite(PathBuf::from(":memory:"));
        config.engine = DatabaseType::Postgres;

        let result = SqliteEngine::open(&config);
        assert!(matches!(result, Err(TrackerError::Configuration(_))));
    }

    #[test]
    fn test_open_missing_file_parameter() {
        let mut config = ConnectionConfig::sqlite(PathBuf::from(":memory:"));
        config.file = None;

        let error = SqliteEngine::open(&config).err().unwrap();
        assert!(error.message().contains("'file'"));
    }

    #[tokio::test]
    async fn test_value_mapping() {
        let engine = SqliteEngine::open_in_memory().unwrap();

        let result = engine
            .query("SELECT 1 AS i, 2.5 AS r, 'x' AS t, NULL AS n", &[])
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["i", "r", "t", "n"]);
        assert_eq!(result.rows, vec![vec![json!(1), json!(2.5), json!("x"), json!(null)]]);
    }

    #[tokio::test]
    async fn test_dollar_placeholders_bind_in_order() {
        let engine = SqliteEngine::open_in_memory().unwrap();

        let result = engine
            .query(
                "SELECT $1 AS a, $2 AS b, $1 AS c",
                &[SqlParam::Text("first".to_string()), SqlParam::Int(2)],
            )
            .await
            .unwrap();

        assert_eq!(result.rows, vec![vec![json!("first"), json!(2), json!("first")]]);
    }

    #[tokio::test]
    async fn test_statement_without_rows() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT);").unwrap();

        let result = engine.query("INSERT INTO t (v) VALUES ($1)", &["a".into()]).await.unwrap();
        assert!(result.rows.is_empty());

        let result = engine
            .query("INSERT INTO t (v) VALUES ($1) RETURNING id, v", &["b".into()])
            .await
            .unwrap();
        assert_eq!(result.rows, vec![vec![json!(2), json!("b")]]);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        engine
            .execute_batch(
                "CREATE TABLE parent (id INTEGER PRIMARY KEY);
                 CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id));",
            )
            .unwrap();

        let result = engine.query("INSERT INTO child (parent_id) VALUES ($1)", &[SqlParam::Int(9)]).await;
        assert!(matches!(result, Err(TrackerError::Database(_))));
    }

    #[tokio::test]
    async fn test_invalid_sql_is_database_error() {
        let engine = SqliteEngine::open_in_memory().unwrap();
        let error = engine.query("SELECT * FROM missing_table", &[]).await.unwrap_err();
        assert_eq!(error.error_code(), "DATABASE_ERROR");
        assert!(!error.is_fatal());
    }
}
