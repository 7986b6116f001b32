//! Session-scoped cart.

use super::product::find_product;
use super::{page, redirect};
use crate::models::Product;
use crate::session::{CartLine, FlashKind, Session};
use crate::state::AppState;
use crate::views::{self, CartRow};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use serde::Deserialize;

/// Cart lines resolved against current product rows; lines for vanished products are dropped.
pub(crate) struct LoadedCart {
    pub lines: Vec<(Product, i64)>,
    pub total: f64,
}

pub(crate) async fn load_cart(state: &AppState, cart: &[CartLine]) -> LoadedCart {
    let mut lines = Vec::with_capacity(cart.len());
    for line in cart {
        match find_product(state, line.product_id).await {
            Some(product) => lines.push((product, line.quantity)),
            None => tracing::debug!(product_id = line.product_id, "cart line for missing product"),
        }
    }
    let total = lines.iter().map(|(p, q)| p.price * *q as f64).sum::<f64>();
    LoadedCart { lines, total }
}

pub async fn view(State(state): State<AppState>, session: Session) -> Response {
    let loaded = load_cart(&state, &session.cart).await;
    let rows: Vec<CartRow<'_>> = loaded
        .lines
        .iter()
        .map(|(product, quantity)| CartRow {
            product,
            quantity: *quantity,
        })
        .collect();
    let body = views::cart(&rows, loaded.total);
    page(&state, session, "Cart", body)
}

#[derive(Deserialize)]
pub struct CartForm {
    pub product_id: i64,
    pub quantity: Option<String>,
}

fn parse_quantity(raw: Option<&str>, default: i64) -> Option<i64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().ok(),
        None => Some(default),
    }
}

pub async fn add(State(state): State<AppState>, mut session: Session, Form(form): Form<CartForm>) -> Response {
    let Some(product) = find_product(&state, form.product_id).await else {
        session.flash(FlashKind::Error, "Product not found");
        return redirect(&state, &session, "/products");
    };
    let quantity = match parse_quantity(form.quantity.as_deref(), 1) {
        Some(q) if q > 0 => q,
        _ => {
            session.flash(FlashKind::Error, "Quantity must be a positive number");
            return redirect(&state, &session, &format!("/product/{}", product.id));
        }
    };
    session.add_to_cart(product.id, quantity);
    session.flash(FlashKind::Success, format!("Added {} to cart", product.name));
    redirect(&state, &session, "/cart")
}

pub async fn update(State(state): State<AppState>, mut session: Session, Form(form): Form<CartForm>) -> Response {
    match parse_quantity(form.quantity.as_deref(), 0) {
        Some(q) if session.set_quantity(form.product_id, q) => {
            session.flash(FlashKind::Success, "Cart updated");
        }
        Some(_) => session.flash(FlashKind::Error, "Product is not in your cart"),
        None => session.flash(FlashKind::Error, "Quantity must be a number"),
    }
    redirect(&state, &session, "/cart")
}

pub async fn remove(State(state): State<AppState>, mut session: Session, Path(product_id): Path<i64>) -> Response {
    session.remove_from_cart(product_id);
    session.flash(FlashKind::Success, "Removed from cart");
    redirect(&state, &session, "/cart")
}
