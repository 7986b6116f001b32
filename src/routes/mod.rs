//! Route tables and the assembled application router.

mod admin;
mod common;
mod shop;

pub use admin::{admin_routes, api_routes};
pub use common::common_routes;
pub use shop::{auth_routes, shop_routes};

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Form posts are small; anything larger is rejected before extraction.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Every route group merged into one router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(shop_routes(state.clone()))
        .merge(auth_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .nest("/api", api_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
