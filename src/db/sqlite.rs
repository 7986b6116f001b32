//! SQLite backend: a file on disk, or an in-memory database as the last resort.

use super::{is_insert, Backend, BackendKind, Record, SqlValue, UpdateOutcome};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Sqlite;
use std::path::Path;
use std::str::FromStr;

pub struct SqliteBackend {
    pool: SqlitePool,
    kind: BackendKind,
}

impl SqliteBackend {
    /// Open (creating if missing) the database file, creating parent directories first.
    pub async fn open_file(path: &Path) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(SqliteBackend {
            pool,
            kind: BackendKind::SqliteFile,
        })
    }

    /// In-memory database. Each connection would see its own database, so the pool pins exactly one.
    pub async fn open_memory() -> Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        Ok(SqliteBackend {
            pool,
            kind: BackendKind::SqliteMemory,
        })
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::Real(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Record>, sqlx::Error> {
        tracing::debug!(sql = %sql, params = ?params, "query");
        let mut query = sqlx::query(sql);
        for p in params {
            query = bind_value(query, p);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<UpdateOutcome, sqlx::Error> {
        tracing::debug!(sql = %sql, params = ?params, "execute");
        let mut query = sqlx::query(sql);
        for p in params {
            query = bind_value(query, p);
        }
        let result = query.execute(&self.pool).await?;
        if is_insert(sql) {
            return Ok(UpdateOutcome::Inserted(result.last_insert_rowid()));
        }
        Ok(UpdateOutcome::Applied(result.rows_affected()))
    }
}

fn row_to_record(row: &SqliteRow) -> Record {
    use sqlx::{Column, Row, TypeInfo};
    let mut map = Record::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let declared = col.type_info().name().to_ascii_uppercase();
        map.insert(col.name().to_string(), cell_to_value(row, idx, &declared));
    }
    map
}

/// SQLite stores booleans as integers; the declared column type tells them apart.
fn cell_to_value(row: &SqliteRow, idx: usize, declared: &str) -> Value {
    use sqlx::{Row, ValueRef};
    if row.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(true) {
        return Value::Null;
    }
    if declared == "BOOLEAN" || declared == "BOOL" {
        if let Ok(b) = row.try_get::<bool, _>(idx) {
            return Value::Bool(b);
        }
        if let Ok(n) = row.try_get_unchecked::<i64, _>(idx) {
            return Value::Bool(n != 0);
        }
    }
    if let Ok(n) = row.try_get::<i64, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<f64, _>(idx) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Value::String(s);
    }
    if let Ok(bytes) = row.try_get::<Vec<u8>, _>(idx) {
        return Value::String(String::from_utf8_lossy(&bytes).into_owned());
    }
    Value::Null
}
