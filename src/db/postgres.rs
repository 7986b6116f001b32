//! PostgreSQL backend.

use super::{is_insert, Backend, BackendKind, Record, SqlValue, UpdateOutcome};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::Postgres;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect with a short timeout and verify with `SELECT 1`.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(database_url)
            .await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(PostgresBackend { pool })
    }
}

fn bind_value<'q>(query: Query<'q, Postgres, PgArguments>, value: &SqlValue) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(n) => query.bind(*n),
        SqlValue::Real(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Postgres
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
        // lastval() is per-session, so the INSERT and the lookup share one connection.
        let mut conn = self.pool.acquire().await?;
        let mut query = sqlx::query(sql);
        for p in params {
            query = bind_value(query, p);
        }
        let result = query.execute(&mut *conn).await?;
        if is_insert(sql) {
            match sqlx::query_scalar::<_, i64>("SELECT lastval()")
                .fetch_one(&mut *conn)
                .await
            {
                Ok(id) => return Ok(UpdateOutcome::Inserted(id)),
                Err(e) => tracing::debug!(error = %e, "lastval() unavailable after insert"),
            }
        }
        Ok(UpdateOutcome::Applied(result.rows_affected()))
    }
}

fn row_to_record(row: &PgRow) -> Record {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Record::new();
    for (idx, col) in row.columns().iter().enumerate() {
        map.insert(col.name().to_string(), cell_to_value(row, idx));
    }
    map
}

fn cell_to_value(row: &PgRow, idx: usize) -> Value {
    use sqlx::{Row, ValueRef};
    if row.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(true) {
        return Value::Null;
    }
    if let Ok(n) = row.try_get::<i16, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<i32, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<i64, _>(idx) {
        return Value::Number(n.into());
    }
    if let Ok(n) = row.try_get::<f32, _>(idx) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(n) = row.try_get::<f64, _>(idx) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(b) = row.try_get::<bool, _>(idx) {
        return Value::Bool(b);
    }
    if let Ok(d) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(idx) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
        return Value::String(d.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDate, _>(idx) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Value::String(s);
    }
    if let Ok(j) = row.try_get::<serde_json::Value, _>(idx) {
        return j;
    }
    Value::Null
}
