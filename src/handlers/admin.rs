//! Admin dashboard and product management. Access hinges on the session's admin flag,
//! which the login role override can set.

use super::{non_empty, page, redirect};
use crate::db::{record_i64, UpdateOutcome};
use crate::models::{decode_all, Product, User};
use crate::session::{FlashKind, Session};
use crate::sql_params;
use crate::state::AppState;
use crate::views;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use serde::Deserialize;

fn require_admin(state: &AppState, session: &mut Session) -> Result<(), Response> {
    if session.is_admin() {
        return Ok(());
    }
    tracing::info!(user_id = ?session.user_id(), "admin area refused");
    session.flash(FlashKind::Error, "Administrator access required");
    Err(redirect(state, session, "/"))
}

pub async fn dashboard(State(state): State<AppState>, mut session: Session) -> Response {
    if let Err(resp) = require_admin(&state, &mut session) {
        return resp;
    }
    let users: Vec<User> = decode_all(state.db.query("SELECT * FROM users ORDER BY id", &[]).await);
    let products: Vec<Product> = decode_all(state.db.query("SELECT * FROM products ORDER BY id", &[]).await);
    let message_count = state
        .db
        .query_one("SELECT COUNT(*) AS n FROM emails", &[])
        .await
        .and_then(|r| record_i64(&r, "n"))
        .unwrap_or(0);
    page(&state, session, "Admin", views::admin_dashboard(&users, &products, message_count))
}

#[derive(Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

pub async fn create_product(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<ProductForm>,
) -> Response {
    if let Err(resp) = require_admin(&state, &mut session) {
        return resp;
    }
    let Some(name) = non_empty(form.name) else {
        session.flash(FlashKind::Error, "Product name is required");
        return redirect(&state, &session, "/admin");
    };
    let Some(price) = non_empty(form.price).and_then(|p| p.parse::<f64>().ok()) else {
        session.flash(FlashKind::Error, "Price must be a number");
        return redirect(&state, &session, "/admin");
    };
    let stock = non_empty(form.stock).and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);

    let result = state
        .db
        .update(
            "INSERT INTO products (name, description, price, stock, category, image_url) VALUES (?, ?, ?, ?, ?, ?)",
            &sql_params![
                &name,
                non_empty(form.description),
                price,
                stock,
                non_empty(form.category),
                non_empty(form.image_url)
            ],
        )
        .await;
    match result.and_then(|o| o.inserted_id()) {
        Some(id) => {
            tracing::info!(product_id = id, "product created");
            session.flash(FlashKind::Success, format!("Created {}", name));
        }
        None => session.flash(FlashKind::Error, "Could not create product"),
    }
    redirect(&state, &session, "/admin")
}

/// Reviews go with the product; products that appear in orders cannot be deleted.
pub async fn delete_product(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = require_admin(&state, &mut session) {
        return resp;
    }
    let ordered = state
        .db
        .query_one("SELECT COUNT(*) AS n FROM order_items WHERE product_id = ?", &sql_params![id])
        .await
        .and_then(|r| record_i64(&r, "n"))
        .unwrap_or(0);
    if ordered > 0 {
        session.flash(FlashKind::Error, "Product has orders and cannot be deleted");
        return redirect(&state, &session, "/admin");
    }
    state
        .db
        .update("DELETE FROM reviews WHERE product_id = ?", &sql_params![id])
        .await;
    match state.db.update("DELETE FROM products WHERE id = ?", &sql_params![id]).await {
        Some(UpdateOutcome::Applied(n)) if n > 0 => {
            session.flash(FlashKind::Success, "Product deleted")
        }
        _ => session.flash(FlashKind::Error, "Product not found"),
    }
    redirect(&state, &session, "/admin")
}
