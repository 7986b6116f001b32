//! Home, catalogue listing, search and about pages.

use super::page;
use crate::models::{decode_all, Product, Review};
use crate::pagination::{paginate, parse_page, PER_PAGE};
use crate::session::Session;
use crate::sql_params;
use crate::state::AppState;
use crate::views;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

const RECENT_REVIEWS: &str = "SELECT r.*, u.username, p.name AS product_name, p.image_url \
    FROM reviews r JOIN users u ON r.user_id = u.id JOIN products p ON r.product_id = p.id";

#[derive(Deserialize)]
pub struct HomeParams {
    #[serde(default)]
    pub review_search: String,
}

pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HomeParams>,
) -> Response {
    let featured: Vec<Product> = decode_all(
        state
            .db
            .query("SELECT * FROM products ORDER BY id DESC LIMIT 4", &[])
            .await,
    );
    let review_query = params.review_search;
    let reviews: Vec<Review> = if review_query.is_empty() {
        decode_all(
            state
                .db
                .query(&format!("{} ORDER BY r.created_at DESC, r.id DESC LIMIT 10", RECENT_REVIEWS), &[])
                .await,
        )
    } else {
        let pattern = format!("%{}%", review_query);
        decode_all(
            state
                .db
                .query(
                    &format!(
                        "{} WHERE r.comment LIKE ? OR u.username LIKE ? OR p.name LIKE ? \
                         ORDER BY r.created_at DESC, r.id DESC LIMIT 10",
                        RECENT_REVIEWS
                    ),
                    &sql_params![&pattern, &pattern, &pattern],
                )
                .await,
        )
    };
    page(&state, session, "Welcome", views::home(&featured, &reviews, &review_query))
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub category: String,
    pub page: Option<String>,
}

pub async fn products(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Response {
    let records = if params.category.is_empty() {
        state.db.query("SELECT * FROM products ORDER BY id", &[]).await
    } else {
        state
            .db
            .query(
                "SELECT * FROM products WHERE category = ? ORDER BY id",
                &sql_params![&params.category],
            )
            .await
    };
    let all: Vec<Product> = decode_all(records);
    let page_no = parse_page(params.page.as_deref());
    let listing = paginate(all, page_no, PER_PAGE);
    page(&state, session, "Products", views::products_page(&listing, &params.category))
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub page: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Response {
    if params.q.is_empty() {
        return page(&state, session, "Search", views::search_form(""));
    }
    let pattern = format!("%{}%", params.q);
    let all: Vec<Product> = decode_all(
        state
            .db
            .query(
                "SELECT * FROM products WHERE name LIKE ? OR description LIKE ? ORDER BY id",
                &sql_params![&pattern, &pattern],
            )
            .await,
    );
    let results = paginate(all, parse_page(params.page.as_deref()), PER_PAGE);
    page(&state, session, "Search", views::search_page(&results, &params.q))
}

pub async fn about(State(state): State<AppState>, session: Session) -> Response {
    page(&state, session, "About", views::about())
}
