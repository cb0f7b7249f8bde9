//! `PostgreSQL` Database Engine Implementation
//!
//! This module implements the `Database` trait for `PostgreSQL` databases.
//!
//! # Implementation Notes
//! - Uses `tokio-postgres` (async driver, requires tokio runtime)
//! - One client is opened at startup and reused for every statement
//! - Timeouts enforced via `tokio::time::timeout` around each round trip
//! - `NUMERIC` columns are cast to `DOUBLE PRECISION` by the repositories,
//!   so only integer, float, text and boolean columns are decoded here

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{Client, Config, NoTls, Row};

use crate::engine::{ConnectionConfig, Database, DatabaseType, QueryResult, SqlParam};
use crate::error::{Result, TrackerError};

/// Bound for a nullable integer parameter
static NULL_INT: Option<i32> = None;

/// `PostgreSQL` database engine implementation
pub struct PostgresEngine {
    client: Client,
    connection: JoinHandle<()>,
    timeout: Option<Duration>,
}

impl PostgresEngine {
    /// Open a client for `config` and spawn its connection task
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        // Validate config is for PostgreSQL
        if config.engine != DatabaseType::Postgres {
            return Err(TrackerError::configuration(format!(
                "Expected PostgreSQL engine, got {}",
                config.engine
            )));
        }

        let pg_config = build_pg_config(config)?;

        let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
            TrackerError::connection_failed(format!("Failed to connect to PostgreSQL: {e}"))
        })?;

        // Note: Connection errors are not logged to prevent credential leakage
        let connection = tokio::spawn(async move {
            let _ = connection.await;
        });

        Ok(Self { client, connection, timeout: config.statement_timeout() })
    }

    /// Drop the client and wait for the connection task to finish
    pub async fn close(self) {
        let Self { client, connection, .. } = self;
        drop(client);
        let _ = connection.await;
    }
}

impl Database for PostgresEngine {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult> {
        tracing::debug!(engine = "postgres", params = params.len(), "executing statement");

        if let Some(timeout) = self.timeout {
            tokio::time::timeout(timeout, execute_query(&self.client, sql, params))
                .await
                .map_err(|_| {
                    TrackerError::database(format!(
                        "Statement exceeded timeout of {}ms",
                        timeout.as_millis()
                    ))
                })?
        } else {
            execute_query(&self.client, sql, params).await
        }
    }
}

/// Build `PostgreSQL` connection config from `ConnectionConfig`
fn build_pg_config(config: &ConnectionConfig) -> Result<Config> {
    let host = config
        .host
        .as_ref()
        .ok_or_else(|| TrackerError::configuration("PostgreSQL requires 'host' parameter"))?;

    let port = config
        .port
        .ok_or_else(|| TrackerError::configuration("PostgreSQL requires 'port' parameter"))?;

    let user = config
        .user
        .as_ref()
        .ok_or_else(|| TrackerError::configuration("PostgreSQL requires 'user' parameter"))?;

    let password = config
        .password
        .as_ref()
        .ok_or_else(|| TrackerError::configuration("PostgreSQL requires 'password' parameter"))?;

    let database = config
        .database
        .as_ref()
        .ok_or_else(|| TrackerError::configuration("PostgreSQL requires 'database' parameter"))?;

    let mut pg_config = Config::new();
    pg_config.host(host).port(port).user(user).password(password).dbname(database);

    if let Some(timeout) = config.statement_timeout() {
        pg_config.connect_timeout(timeout);
    }

    Ok(pg_config)
}

/// Borrow a parameter as a driver value
fn bind(param: &SqlParam) -> &(dyn ToSql + Sync) {
    match param {
        SqlParam::Int(v) => v,
        SqlParam::Float(v) => v,
        SqlParam::Text(v) => v,
        SqlParam::Null => &NULL_INT,
    }
}

/// Prepare, execute and collect rows into a `QueryResult`
async fn execute_query(client: &Client, sql: &str, params: &[SqlParam]) -> Result<QueryResult> {
    let stmt = client
        .prepare(sql)
        .await
        .map_err(|e| TrackerError::database(format!("Failed to prepare statement: {e}")))?;

    let bound: Vec<&(dyn ToSql + Sync)> = params.iter().map(bind).collect();

    let rows = client
        .query(&stmt, &bound)
        .await
        .map_err(|e| TrackerError::database(format!("Failed to execute statement: {e}")))?;

    let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();

    let rows: Vec<Vec<serde_json::Value>> =
        rows.iter().map(|row| row_to_json(columns.len(), row)).collect::<Result<_>>()?;

    Ok(QueryResult { columns, rows })
}

/// Convert a `PostgreSQL` row to a list of JSON values
fn row_to_json(width: usize, row: &Row) -> Result<Vec<serde_json::Value>> {
    (0..width).map(|idx| postgres_value_to_json(row, idx)).collect()
}

/// Read one nullable column as `T`
fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Result<Option<T>> {
    row.try_get(idx).map_err(|e| {
        TrackerError::database(format!("Failed to read column '{}': {e}", row.columns()[idx].name()))
    })
}

/// Convert `PostgreSQL` value to JSON value
fn postgres_value_to_json(row: &Row, idx: usize) -> Result<serde_json::Value> {
    let col_type = row.columns()[idx].type_();

    let value = match *col_type {
        Type::BOOL => get::<bool>(row, idx)?.map(serde_json::Value::from),
        Type::INT2 => get::<i16>(row, idx)?.map(serde_json::Value::from),
        Type::INT4 => get::<i32>(row, idx)?.map(serde_json::Value::from),
        Type::INT8 => get::<i64>(row, idx)?.map(serde_json::Value::from),
        Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| serde_json::Value::from(f64::from(v))),
        Type::FLOAT8 => get::<f64>(row, idx)?.map(serde_json::Value::from),
        Type::VARCHAR | Type::TEXT | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx)?.map(serde_json::Value::from)
        }
        _ => {
            return Err(TrackerError::database(format!(
                "Unsupported PostgreSQL type '{}' in column '{}'",
                col_type.name(),
                row.columns()[idx].name()
            )))
        }
    };

    Ok(value.unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: Tests marked #[ignore] require a running PostgreSQL instance
    // with db/schema.sql applied. Run them with:
    // cargo test --features postgres -- --ignored

    fn local_config() -> ConnectionConfig {
        ConnectionConfig::postgres(
            "localhost".to_string(),
            5432,
            "postgres".to_string(),
            "postgres".to_string(),
            "employees".to_string(),
        )
    }

    #[test]
    fn test_build_pg_config() {
        let result = build_pg_config(&local_config());
        assert!(result.is_ok(), "Failed to build Postgres config: {:?}", result.err());
    }

    #[test]
    fn test_missing_database_error() {
        let mut config = local_config();
        config.database = None;

        let error = build_pg_config(&config).unwrap_err();
        assert_eq!(error.error_code(), "CONFIG_ERROR");
        assert!(error.message().contains("PostgreSQL requires 'database' parameter"));
    }

    #[test]
    fn test_missing_password_error() {
        let mut config = local_config();
        config.password = None;

        let error = build_pg_config(&config).unwrap_err();
        assert!(error.message().contains("'password'"));
    }

    #[tokio::test]
    async fn test_connect_wrong_engine() {
        let mut config = local_config();
        config.engine = DatabaseType::SQLite;

        let result = PostgresEngine::connect(&config).await;
        assert!(matches!(result, Err(TrackerError::Configuration(_))));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_round_trip_with_params() {
        let engine = PostgresEngine::connect(&local_config()).await.unwrap();

        let result = engine
            .query(
                "SELECT CAST($1 AS DOUBLE PRECISION) AS salary, $2::text AS name",
                &[SqlParam::Float(50000.5), SqlParam::Text("Ada".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(result.columns, vec!["salary", "name"]);
        assert_eq!(result.rows[0][0], serde_json::json!(50000.5));
        assert_eq!(result.rows[0][1], serde_json::json!("Ada"));

        engine.close().await;
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_null_integer_column() {
        let engine = PostgresEngine::connect(&local_config()).await.unwrap();

        let result = engine.query("SELECT CAST(NULL AS INTEGER) AS manager_id", &[]).await.unwrap();
        assert_eq!(result.rows[0][0], serde_json::Value::Null);

        engine.close().await;
    }
}
