//! Configuration Management
//!
//! This module resolves the database connection from the process
//! environment.
//!
//! # Environment Variables
//! - `DB_ENGINE`: `postgres` (default) or `sqlite`
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_DATABASE`: `PostgreSQL`
//! - `DB_FILE`: `SQLite` database path (or `:memory:`)
//! - `DB_STATEMENT_TIMEOUT_MS`: per-statement bound, `0` disables it
//!
//! # `.env` Files
//! Loaded in order, never overriding variables that are already set:
//! 1. `./.env`
//! 2. `<config dir>/emptrack/.env` (e.g. `~/.config/emptrack/.env`)

use std::path::PathBuf;

use crate::engine::{ConnectionConfig, DatabaseType, DEFAULT_STATEMENT_TIMEOUT_MS};
use crate::error::{Result, TrackerError};

/// Load `.env` files into the process environment
///
/// Returns the files that were loaded, for logging.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }

    if let Some(path) = global_env_path() {
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(()) => loaded.push(path),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to load .env"),
            }
        }
    }

    loaded
}

/// Get path to the per-user `.env` file (`<config dir>/emptrack/.env`)
pub fn global_env_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("emptrack").join(".env"))
}

/// Resolve the connection from the process environment
pub fn resolve_connection() -> Result<ConnectionConfig> {
    resolve_connection_with(|key| std::env::var(key).ok())
}

/// Resolve the connection from an arbitrary key lookup
///
/// Every required value must be present and non-empty; the `PostgreSQL`
/// password may be empty but not absent.
pub fn resolve_connection_with<F>(lookup: F) -> Result<ConnectionConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let engine = match lookup("DB_ENGINE").as_deref().map(str::trim) {
        None | Some("" | "postgres" | "postgresql") => DatabaseType::Postgres,
        Some("sqlite") => DatabaseType::SQLite,
        Some(other) => {
            return Err(TrackerError::configuration(format!(
                "DB_ENGINE must be 'postgres' or 'sqlite', got '{other}'"
            )))
        }
    };

    let config = match engine {
        DatabaseType::Postgres => {
            let port = required(&lookup, "DB_PORT")?;
            let port = port.parse::<u16>().map_err(|_| {
                TrackerError::configuration(format!("DB_PORT must be a port number, got '{port}'"))
            })?;
            let password = lookup("DB_PASSWORD")
                .ok_or_else(|| TrackerError::configuration("DB_PASSWORD is not set"))?;

            ConnectionConfig::postgres(
                required(&lookup, "DB_HOST")?,
                port,
                required(&lookup, "DB_USER")?,
                password,
                required(&lookup, "DB_DATABASE")?,
            )
        }
        DatabaseType::SQLite => ConnectionConfig::sqlite(PathBuf::from(required(&lookup, "DB_FILE")?)),
    };

    let timeout_ms = match lookup("DB_STATEMENT_TIMEOUT_MS") {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            TrackerError::configuration(format!(
                "DB_STATEMENT_TIMEOUT_MS must be a whole number of milliseconds, got '{raw}'"
            ))
        })?,
        None => DEFAULT_STATEMENT_TIMEOUT_MS,
    };

    Ok(config.with_statement_timeout_ms(timeout_ms))
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(TrackerError::configuration(format!("{key} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const POSTGRES_ENV: &[(&str, &str)] = &[
        ("DB_HOST", "localhost"),
        ("DB_PORT", "5432"),
        ("DB_USER", "postgres"),
        ("DB_PASSWORD", "secret"),
        ("DB_DATABASE", "employees"),
    ];

    #[test]
    fn test_postgres_from_env() {
        let config = resolve_connection_with(env(POSTGRES_ENV)).unwrap();
        assert_eq!(config.engine, DatabaseType::Postgres);
        assert_eq!(config.host.as_deref(), Some("localhost"));
        assert_eq!(config.port, Some(5432));
        assert_eq!(config.database.as_deref(), Some("employees"));
        assert_eq!(config.statement_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_value_is_configuration_error() {
        for missing in ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASSWORD", "DB_DATABASE"] {
            let pairs: Vec<_> = POSTGRES_ENV.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = resolve_connection_with(env(&pairs)).unwrap_err();
            assert_eq!(err.error_code(), "CONFIG_ERROR");
            assert!(err.message().contains(missing), "{missing}: {}", err.message());
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = POSTGRES_ENV.to_vec();
        pairs.retain(|(k, _)| *k != "DB_PORT");
        pairs.push(("DB_PORT", "not-a-port"));

        let err = resolve_connection_with(env(&pairs)).unwrap_err();
        assert!(err.message().contains("DB_PORT"));
    }

    #[test]
    fn test_sqlite_engine() {
        let config =
            resolve_connection_with(env(&[("DB_ENGINE", "sqlite"), ("DB_FILE", ":memory:")])).unwrap();
        assert_eq!(config.engine, DatabaseType::SQLite);
        assert_eq!(config.file, Some(PathBuf::from(":memory:")));

        let err = resolve_connection_with(env(&[("DB_ENGINE", "sqlite")])).unwrap_err();
        assert!(err.message().contains("DB_FILE"));
    }

    #[test]
    fn test_unknown_engine() {
        let err = resolve_connection_with(env(&[("DB_ENGINE", "oracle")])).unwrap_err();
        assert!(err.message().contains("oracle"));
    }

    #[test]
    fn test_statement_timeout_override() {
        let mut pairs = POSTGRES_ENV.to_vec();
        pairs.push(("DB_STATEMENT_TIMEOUT_MS", "0"));
        let config = resolve_connection_with(env(&pairs)).unwrap();
        assert!(config.statement_timeout().is_none());

        pairs.pop();
        pairs.push(("DB_STATEMENT_TIMEOUT_MS", "soon"));
        assert!(resolve_connection_with(env(&pairs)).is_err());
    }
}
