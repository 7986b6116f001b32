//! Storefront routes: catalogue, reviews, cart, orders, account and contact.

use crate::handlers::{auth, cart, contact, order, product, shop};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn shop_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(shop::home))
        .route("/products", get(shop::products))
        .route("/search", get(shop::search))
        .route("/about", get(shop::about))
        .route("/categories", get(product::categories))
        .route("/product/:id", get(product::detail))
        .route("/product/:id/review", post(product::add_review))
        .route("/cart", get(cart::view))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove/:product_id", post(cart::remove))
        .route("/checkout", post(order::checkout))
        .route("/orders", get(order::list))
        .route("/orders/:id", get(order::detail))
        .route("/contact", get(contact::contact_page).post(contact::contact))
        .route("/mail", get(contact::inbox))
        .route("/mail/:id", get(contact::message))
        .with_state(state)
}

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/profile", get(auth::profile))
        .route("/user/:id", get(auth::user_page))
        .with_state(state)
}
