//! Database Engine Trait and Core Types
//!
//! This module is the connection provider for the repositories.
//! Each engine (`PostgreSQL`, `SQLite`) implements the `Database` trait and
//! [`acquire`] opens exactly one of them for the lifetime of the process.
//!
//! # Statements
//! SQL text uses `$1..$n` placeholders, numbered in order of first
//! appearance. Every value travels as a bound [`SqlParam`]; the only text
//! ever spliced into a statement comes from the sort allow-lists in
//! [`crate::repo`].
//!
//! # Engine Isolation
//! Each engine implementation is completely independent.
//! Shared behaviour lives here, in [`QueryResult`] decoding.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TrackerError};

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("enable at least one of the `postgres` or `sqlite` features");

/// Default per-statement bound in milliseconds
pub const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 30_000;

/// Supported database engine types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// `PostgreSQL` database
    Postgres,
    /// `SQLite` database
    SQLite,
}

impl DatabaseType {
    /// Get the engine name as a string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::SQLite => "sqlite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Connection configuration for database engines
///
/// Fields are engine-specific (e.g., `file` only applies to `SQLite`).
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionConfig {
    /// Database engine type
    pub engine: DatabaseType,

    /// Hostname (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Port number (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Username (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Password (for postgres)
    /// WARNING: Sensitive data, do not log or include in error messages
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Database name (for postgres)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Database file path (for sqlite)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Per-statement bound in milliseconds, `None` means unbounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_timeout_ms: Option<u64>,
}

impl ConnectionConfig {
    /// Create a new `PostgreSQL` connection config
    #[must_use]
    pub const fn postgres(
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    ) -> Self {
        Self {
            engine: DatabaseType::Postgres,
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            database: Some(database),
            file: None,
            statement_timeout_ms: Some(DEFAULT_STATEMENT_TIMEOUT_MS),
        }
    }

    /// Create a new `SQLite` connection config
    #[must_use]
    pub const fn sqlite(file: PathBuf) -> Self {
        Self {
            engine: DatabaseType::SQLite,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            file: Some(file),
            statement_timeout_ms: Some(DEFAULT_STATEMENT_TIMEOUT_MS),
        }
    }

    /// Replace the per-statement bound (`0` disables it)
    #[must_use]
    pub const fn with_statement_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.statement_timeout_ms = if timeout_ms == 0 { None } else { Some(timeout_ms) };
        self
    }

    /// Per-statement bound as a `Duration`
    #[must_use]
    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }
}

/// A value bound to a `$n` placeholder
///
/// Identifiers are `INTEGER`/`SERIAL` columns, so integers travel as `i32`.
/// `Null` is bound as a nullable integer (it only ever clears a foreign key).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Integer value (ids, foreign keys)
    Int(i32),
    /// Floating point value (salaries, always cast in SQL)
    Float(f64),
    /// Text value
    Text(String),
    /// SQL NULL
    Null,
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Option<i32>> for SqlParam {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }
}

/// Query execution result
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names in result set
    pub columns: Vec<String>,

    /// Result rows (each row is a list of values in column order)
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    /// Decode every row into `T`, matching columns to fields by name
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let Self { columns, rows } = self;
        rows.into_iter()
            .map(|values| {
                let object: serde_json::Map<String, serde_json::Value> =
                    columns.iter().cloned().zip(values).collect();
                serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| {
                    TrackerError::database(format!("Unexpected row shape: {e}"))
                })
            })
            .collect()
    }

    /// Decode the first row into `T`, `None` when the statement matched nothing
    pub fn decode_first<T: DeserializeOwned>(self) -> Result<Option<T>> {
        Ok(self.decode()?.into_iter().next())
    }
}

/// Database engine trait
///
/// A single execution primitive. Engines hold one open connection; callers
/// issue statements sequentially and never concurrently.
pub trait Database {
    /// Execute one statement with bound parameters and collect its rows
    ///
    /// Statements without a result set (or without `RETURNING`) yield an
    /// empty `QueryResult`. Failures map to [`TrackerError::Database`].
    fn query(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = Result<QueryResult>> + Send;
}

/// The process-wide database handle
pub enum Handle {
    /// Open `PostgreSQL` client
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresEngine),
    /// Open `SQLite` connection
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteEngine),
}

impl Handle {
    /// Release the underlying connection
    pub async fn close(self) {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(engine) => engine.close().await,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(engine) => engine.close(),
        }
    }
}

impl Database for Handle {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult> {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(engine) => engine.query(sql, params).await,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(engine) => engine.query(sql, params).await,
        }
    }
}

/// Open the database handle described by `config`
///
/// Fails with [`TrackerError::ConnectionFailed`] when the database is
/// unreachable, or [`TrackerError::Configuration`] when the engine was not
/// compiled in or required settings are absent.
pub async fn acquire(config: &ConnectionConfig) -> Result<Handle> {
    let handle = match config.engine {
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => Handle::Postgres(postgres::PostgresEngine::connect(config).await?),
        #[cfg(feature = "sqlite")]
        DatabaseType::SQLite => Handle::Sqlite(sqlite::SqliteEngine::open(config)?),
        #[allow(unreachable_patterns)]
        other => {
            return Err(TrackerError::configuration(format!(
                "Engine '{other}' is not enabled in this build"
            )))
        }
    };

    tracing::info!(engine = %config.engine, "database handle acquired");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        id: i32,
        name: Option<String>,
    }

    #[test]
    fn test_database_type_serialization() {
        assert_eq!(serde_json::to_string(&DatabaseType::Postgres).unwrap(), r#""postgres""#);
        assert_eq!(serde_json::to_string(&DatabaseType::SQLite).unwrap(), r#""sqlite""#);
    }

    #[test]
    fn test_connection_config_constructors() {
        let pg_config = ConnectionConfig::postgres(
            "localhost".to_string(),
            5432,
            "user".to_string(),
            "pass".to_string(),
            "db".to_string(),
        );
        assert_eq!(pg_config.engine, DatabaseType::Postgres);
        assert_eq!(pg_config.port, Some(5432));
        assert_eq!(pg_config.statement_timeout(), Some(Duration::from_secs(30)));

        let sqlite_config = ConnectionConfig::sqlite(PathBuf::from("/tmp/test.db"))
            .with_statement_timeout_ms(0);
        assert_eq!(sqlite_config.engine, DatabaseType::SQLite);
        assert!(sqlite_config.file.is_some());
        assert!(sqlite_config.statement_timeout().is_none());
    }

    #[test]
    fn test_password_never_serialized() {
        let config = ConnectionConfig::postgres(
            "localhost".to_string(),
            5432,
            "user".to_string(),
            "hunter2".to_string(),
            "db".to_string(),
        );
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_param_conversions() {
        assert_eq!(SqlParam::from(Some(3)), SqlParam::Int(3));
        assert_eq!(SqlParam::from(None::<i32>), SqlParam::Null);
        assert_eq!(SqlParam::from("Sales"), SqlParam::Text("Sales".to_string()));
    }

    #[test]
    fn test_decode_rows_by_column_name() {
        let result = QueryResult {
            columns: vec!["name".to_string(), "id".to_string()],
            rows: vec![vec![json!("Sales"), json!(1)], vec![json!(null), json!(2)]],
        };

        let rows: Vec<Sample> = result.decode().unwrap();
        assert_eq!(
            rows,
            vec![
                Sample { id: 1, name: Some("Sales".to_string()) },
                Sample { id: 2, name: None },
            ]
        );
    }

    #[test]
    fn test_decode_first_on_empty_result() {
        let result = QueryResult { columns: vec!["id".to_string()], rows: Vec::new() };
        assert!(result.decode_first::<Sample>().unwrap().is_none());
    }

    #[test]
    fn test_decode_reports_shape_mismatch() {
        let result = QueryResult { columns: vec!["id".to_string()], rows: vec![vec![json!("x")]] };
        let err = result.decode::<Sample>().unwrap_err();
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
