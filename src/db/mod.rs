//! Persistence shim: one `Backend` (PostgreSQL or SQLite) chosen at startup, rows as JSON records.
//! Request-time calls never fail: errors are logged and turned into empty results or `None`.

mod params;
mod postgres;
pub mod schema;
mod sqlite;
mod translate;

pub use params::SqlValue;
pub use postgres::PostgresBackend;
pub use schema::ensure_schema;
pub use sqlite::SqliteBackend;
pub use translate::{is_insert, translate_placeholders};

use crate::error::AppError;
use crate::settings::AppConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// One result row, keyed by column name.
pub type Record = serde_json::Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl BackendKind {
    pub fn is_sqlite(self) -> bool {
        !matches!(self, BackendKind::Postgres)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgres",
            BackendKind::SqliteFile => "sqlite_file",
            BackendKind::SqliteMemory => "sqlite_memory",
        }
    }
}

/// Result of a mutating statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// INSERT with the new row id.
    Inserted(i64),
    /// Any other statement (or an INSERT whose id could not be read), with rows affected.
    Applied(u64),
}

impl UpdateOutcome {
    pub fn inserted_id(self) -> Option<i64> {
        match self {
            UpdateOutcome::Inserted(id) => Some(id),
            UpdateOutcome::Applied(_) => None,
        }
    }
}

/// A concrete storage engine. SQL passed in already uses the backend's placeholder syntax.
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Record>, sqlx::Error>;

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<UpdateOutcome, sqlx::Error>;
}

/// Handle to the backend selected at startup. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
}

impl Database {
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Database {
            backend: Arc::new(backend),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Run a SELECT. Failures are logged and yield no rows.
    pub async fn query(&self, sql: &str, params: &[SqlValue]) -> Vec<Record> {
        let sql = self.prepare(sql, params);
        match self.backend.fetch_all(&sql, params).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, sql = %sql, params = ?params, "query failed");
                Vec::new()
            }
        }
    }

    /// First row of `query`, if any.
    pub async fn query_one(&self, sql: &str, params: &[SqlValue]) -> Option<Record> {
        self.query(sql, params).await.into_iter().next()
    }

    /// Run a mutating statement. Failures are logged and yield `None`.
    pub async fn update(&self, sql: &str, params: &[SqlValue]) -> Option<UpdateOutcome> {
        let sql = self.prepare(sql, params);
        match self.backend.execute(&sql, params).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(error = %e, sql = %sql, params = ?params, "update failed");
                None
            }
        }
    }

    /// Run a statement and surface the error. Used by schema setup and diagnostics only.
    pub async fn execute_checked(&self, sql: &str) -> Result<UpdateOutcome, sqlx::Error> {
        self.backend.execute(sql, &[]).await
    }

    /// Connectivity probe.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        self.backend.fetch_all("SELECT 1 AS ok", &[]).await.map(|_| ())
    }

    /// Parameterless statements are sent verbatim, so interpolated input reaches the backend untouched.
    fn prepare(&self, sql: &str, params: &[SqlValue]) -> String {
        if params.is_empty() {
            sql.to_string()
        } else {
            translate_placeholders(sql, self.kind())
        }
    }
}

/// Select a backend: PostgreSQL, then the SQLite file, then in-memory SQLite. Each downgrade is logged.
pub async fn connect(config: &AppConfig) -> Result<Database, AppError> {
    match config.database_url.as_deref() {
        Some(url) => match PostgresBackend::connect(url).await {
            Ok(backend) => {
                tracing::info!("connected to PostgreSQL");
                return Ok(Database::new(backend));
            }
            Err(e) => {
                tracing::warn!(error = %e, "PostgreSQL unavailable, falling back to SQLite file");
            }
        },
        None => tracing::warn!("DATABASE_URL not set, using SQLite file"),
    }

    match SqliteBackend::open_file(Path::new(&config.sqlite_path)).await {
        Ok(backend) => {
            tracing::info!(path = %config.sqlite_path, "opened SQLite database");
            return Ok(Database::new(backend));
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %config.sqlite_path,
                "SQLite file unavailable, falling back to in-memory SQLite"
            );
        }
    }

    let backend = SqliteBackend::open_memory().await?;
    tracing::warn!("using in-memory SQLite; data is lost on restart");
    Ok(Database::new(backend))
}

/// Read an integer column, accepting numbers stored as text.
pub fn record_i64(record: &Record, key: &str) -> Option<i64> {
    match record.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Read a string column; numbers are rendered.
pub fn record_str(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
