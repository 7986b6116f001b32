//! Checkout and order history.

use super::cart::load_cart;
use super::{non_empty, page, redirect, require_login};
use crate::db::Database;
use crate::models::{decode, decode_all, Order, OrderItem, Product, User};
use crate::session::{FlashKind, Session};
use crate::sql_params;
use crate::state::AppState;
use crate::views;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CheckoutForm {
    pub shipping_address: Option<String>,
}

/// Persist the cart as an order at current prices, decrement stock, then empty the cart.
pub async fn checkout(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let loaded = load_cart(&state, &session.cart).await;
    if loaded.lines.is_empty() {
        session.flash(FlashKind::Error, "Your cart is empty");
        return redirect(&state, &session, "/cart");
    }

    let shipping_address = match non_empty(form.shipping_address) {
        Some(a) => Some(a),
        None => state
            .db
            .query_one("SELECT * FROM users WHERE id = ?", &sql_params![user_id])
            .await
            .and_then(decode::<User>)
            .and_then(|u| u.address),
    };

    let order_id = state
        .db
        .update(
            "INSERT INTO orders (user_id, total, shipping_address, status) VALUES (?, ?, ?, ?)",
            &sql_params![user_id, loaded.total, shipping_address, "pending"],
        )
        .await
        .and_then(|o| o.inserted_id());
    let Some(order_id) = order_id else {
        session.flash(FlashKind::Error, "Checkout failed, please try again");
        return redirect(&state, &session, "/cart");
    };

    let mut failed_lines = 0usize;
    for (product, quantity) in &loaded.lines {
        if !record_order_line(&state.db, order_id, product, *quantity).await {
            failed_lines += 1;
        }
    }
    tracing::info!(
        order_id,
        user_id,
        total = loaded.total,
        lines = loaded.lines.len(),
        failed_lines,
        "order placed"
    );
    if failed_lines > 0 {
        session.flash(
            FlashKind::Error,
            format!("{} item(s) could not be recorded on this order", failed_lines),
        );
    }

    session.cart.clear();
    session.flash(FlashKind::Success, format!("Order #{} placed", order_id));
    redirect(&state, &session, &format!("/orders/{}", order_id))
}

/// Persist one order line and take its quantity off stock. Failures are logged per line.
pub(crate) async fn record_order_line(db: &Database, order_id: i64, product: &Product, quantity: i64) -> bool {
    let inserted = db
        .update(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
            &sql_params![order_id, product.id, quantity, product.price],
        )
        .await
        .is_some();
    if !inserted {
        tracing::warn!(order_id, product_id = product.id, quantity, "order line not recorded");
        return false;
    }
    let decremented = db
        .update(
            "UPDATE products SET stock = stock - ? WHERE id = ?",
            &sql_params![quantity, product.id],
        )
        .await
        .is_some();
    if !decremented {
        tracing::warn!(order_id, product_id = product.id, quantity, "stock not decremented");
    }
    true
}

pub async fn list(State(state): State<AppState>, mut session: Session) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let orders: Vec<Order> = decode_all(
        state
            .db
            .query("SELECT * FROM orders WHERE user_id = ? ORDER BY id DESC", &sql_params![user_id])
            .await,
    );
    page(&state, session, "Your orders", views::orders(&orders))
}

/// Visible to the owner and to admins.
pub async fn detail(State(state): State<AppState>, mut session: Session, Path(id): Path<i64>) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let order = state
        .db
        .query_one("SELECT * FROM orders WHERE id = ?", &sql_params![id])
        .await
        .and_then(decode::<Order>)
        .filter(|o| o.user_id == user_id || session.is_admin());
    let Some(order) = order else {
        session.flash(FlashKind::Error, "Order not found");
        return redirect(&state, &session, "/orders");
    };
    let items: Vec<OrderItem> = decode_all(
        state
            .db
            .query(
                "SELECT oi.*, p.name AS product_name FROM order_items oi \
                 LEFT JOIN products p ON oi.product_id = p.id WHERE oi.order_id = ? ORDER BY oi.id",
                &sql_params![id],
            )
            .await,
    );
    page(&state, session, &format!("Order #{}", order.id), views::order_detail(&order, &items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ensure_schema, record_i64, SqliteBackend};

    async fn seeded() -> (Database, Product) {
        let db = Database::new(SqliteBackend::open_memory().await.unwrap());
        ensure_schema(&db).await.unwrap();
        let product = db
            .query_one("SELECT * FROM products WHERE id = ?", &sql_params![1i64])
            .await
            .and_then(decode::<Product>)
            .unwrap();
        (db, product)
    }

    #[tokio::test]
    async fn order_line_is_stored_and_stock_drops() {
        let (db, product) = seeded().await;
        assert!(record_order_line(&db, 1, &product, 2).await);
        let stock = db
            .query_one("SELECT stock FROM products WHERE id = ?", &sql_params![1i64])
            .await
            .and_then(|r| record_i64(&r, "stock"));
        assert_eq!(stock, Some(product.stock - 2));
    }

    #[tokio::test]
    async fn failed_order_line_is_reported_and_keeps_stock() {
        let (db, product) = seeded().await;
        db.execute_checked("DROP TABLE order_items").await.unwrap();
        assert!(!record_order_line(&db, 1, &product, 2).await);
        let stock = db
            .query_one("SELECT stock FROM products WHERE id = ?", &sql_params![1i64])
            .await
            .and_then(|r| record_i64(&r, "stock"));
        assert_eq!(stock, Some(product.stock));
    }
}
