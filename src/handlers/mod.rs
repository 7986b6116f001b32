//! HTTP handlers for pages, forms, admin and diagnostics.

pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod order;
pub mod product;
pub mod shop;

use crate::session::{FlashKind, Session};
use crate::state::AppState;
use crate::views;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};

/// Render a page, consuming pending flashes and re-issuing the session cookie.
pub(crate) fn page(state: &AppState, mut session: Session, title: &str, body: String) -> Response {
    let flashes = session.take_flashes();
    let html = views::layout(title, &session, &flashes, &body);
    (
        AppendHeaders([(SET_COOKIE, session.set_cookie(&state.config.secret_key))]),
        Html(html),
    )
        .into_response()
}

/// Redirect, persisting the session (and any flash queued on it).
pub(crate) fn redirect(state: &AppState, session: &Session, to: &str) -> Response {
    (
        AppendHeaders([(SET_COOKIE, session.set_cookie(&state.config.secret_key))]),
        Redirect::to(to),
    )
        .into_response()
}

/// Flash and redirect to the login page when there is no logged-in user.
pub(crate) fn require_login(state: &AppState, session: &mut Session) -> Result<i64, Response> {
    match session.user_id() {
        Some(id) => Ok(id),
        None => {
            session.flash(FlashKind::Error, "Please log in first");
            Err(redirect(state, session, "/login"))
        }
    }
}

/// Form fields arrive as text; empty means absent.
pub(crate) fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
