//! Product detail, review submission and category listing.

use super::{page, redirect, require_login};
use crate::db::{record_i64, record_str};
use crate::models::{decode, decode_all, Product, Review};
use crate::session::{FlashKind, Session};
use crate::sql_params;
use crate::state::AppState;
use crate::views;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use serde::Deserialize;

pub(crate) async fn find_product(state: &AppState, id: i64) -> Option<Product> {
    state
        .db
        .query_one("SELECT * FROM products WHERE id = ?", &sql_params![id])
        .await
        .and_then(decode)
}

pub async fn detail(State(state): State<AppState>, mut session: Session, Path(id): Path<i64>) -> Response {
    let Some(product) = find_product(&state, id).await else {
        session.flash(FlashKind::Error, "Product not found");
        return redirect(&state, &session, "/products");
    };
    let reviews: Vec<Review> = decode_all(
        state
            .db
            .query(
                "SELECT r.*, u.username FROM reviews r JOIN users u ON r.user_id = u.id \
                 WHERE r.product_id = ? ORDER BY r.created_at DESC, r.id DESC",
                &sql_params![id],
            )
            .await,
    );
    let body = views::product_detail(&product, &reviews, session.user_id().is_some());
    page(&state, session, &product.name, body)
}

#[derive(Deserialize)]
pub struct ReviewForm {
    pub rating: Option<String>,
    pub comment: Option<String>,
}

/// The comment is stored exactly as submitted.
pub async fn add_review(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<i64>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let back = format!("/product/{}", id);
    let comment = form.comment.filter(|c| !c.trim().is_empty());
    let rating = form.rating.filter(|r| !r.trim().is_empty());
    let (Some(rating), Some(comment)) = (rating, comment) else {
        session.flash(FlashKind::Error, "Please enter a rating and a comment");
        return redirect(&state, &session, &back);
    };
    let Ok(rating) = rating.trim().parse::<i64>() else {
        session.flash(FlashKind::Error, "Rating must be a number");
        return redirect(&state, &session, &back);
    };

    let result = state
        .db
        .update(
            "INSERT INTO reviews (product_id, user_id, rating, comment) VALUES (?, ?, ?, ?)",
            &sql_params![id, user_id, rating, comment],
        )
        .await;
    match result {
        Some(_) => session.flash(FlashKind::Success, "Review posted"),
        None => session.flash(FlashKind::Error, "Could not post review"),
    }
    redirect(&state, &session, &back)
}

pub async fn categories(State(state): State<AppState>, session: Session) -> Response {
    let counts: Vec<(String, i64)> = state
        .db
        .query(
            "SELECT category, COUNT(*) AS count FROM products \
             WHERE category IS NOT NULL GROUP BY category ORDER BY category",
            &[],
        )
        .await
        .iter()
        .filter_map(|r| Some((record_str(r, "category")?, record_i64(r, "count").unwrap_or(0))))
        .collect();
    page(&state, session, "Categories", views::categories(&counts))
}
