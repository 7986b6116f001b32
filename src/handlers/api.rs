//! JSON diagnostics under `/api`.

use crate::db::{ensure_schema, record_i64, schema::TABLES};
use crate::error::AppError;
use crate::models::{decode, decode_all, Product};
use crate::response::{success_many, success_one_ok, success_one_with_meta};
use crate::sql_params;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
pub struct StatusBody {
    pub backend: &'static str,
    pub connected: bool,
    pub database_url_configured: bool,
    pub custom_secret_key: bool,
    pub production: bool,
}

/// GET /api/status: which backend is live and whether it answers.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let connected = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            false
        }
    };
    success_one_ok(StatusBody {
        backend: state.db.kind().as_str(),
        connected,
        database_url_configured: state.config.database_url.is_some(),
        custom_secret_key: state.config.has_custom_secret(),
        production: state.config.production,
    })
}

#[derive(Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: Option<i64>,
}

/// GET /api/db-test: round-trip timing and per-table row counts.
pub async fn db_test(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let ping = state.db.ping().await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let mut counts = Vec::with_capacity(TABLES.len());
    for &table in TABLES {
        let rows = state
            .db
            .query_one(&format!("SELECT COUNT(*) AS n FROM {}", table), &[])
            .await
            .and_then(|r| record_i64(&r, "n"));
        counts.push(TableCount { table, rows });
    }
    let meta = serde_json::json!({
        "backend": state.db.kind().as_str(),
        "ok": ping.is_ok(),
        "error": ping.err().map(|e| e.to_string()),
        "elapsed_ms": elapsed_ms,
    });
    success_one_with_meta(counts, meta)
}

/// GET /api/products
pub async fn products(State(state): State<AppState>) -> impl IntoResponse {
    let products: Vec<Product> = decode_all(state.db.query("SELECT * FROM products ORDER BY id", &[]).await);
    success_many(products)
}

/// GET /api/products/:id
pub async fn product(State(state): State<AppState>, Path(id): Path<i64>) -> Result<impl IntoResponse, AppError> {
    let product = state
        .db
        .query_one("SELECT * FROM products WHERE id = ?", &sql_params![id])
        .await
        .and_then(decode::<Product>)
        .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
    Ok(success_one_ok(product))
}

/// POST /api/init-db: re-run table creation and seeding.
pub async fn init_db(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    ensure_schema(&state.db).await?;
    tracing::info!(backend = state.db.kind().as_str(), "schema initialized on request");
    Ok(success_one_ok(serde_json::json!({
        "initialized": true,
        "backend": state.db.kind().as_str(),
    })))
}
