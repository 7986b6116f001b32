//! Admin and `/api` diagnostic routes.

use crate::handlers::{admin, api};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/products", post(admin::create_product))
        .route("/admin/products/:id/delete", post(admin::delete_product))
        .with_state(state)
}

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/status", get(api::status))
        .route("/db-test", get(api::db_test))
        .route("/products", get(api::products))
        .route("/products/:id", get(api::product))
        .route("/init-db", post(api::init_db))
        .with_state(state)
}
