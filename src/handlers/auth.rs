//! Login, registration, logout and profile pages.
//!
//! Login builds its query by string interpolation and honours a client-supplied `role`;
//! registration honours a hidden `is_admin` field. Both are training targets.

use super::{non_empty, page, redirect, require_login};
use crate::db::{record_i64, record_str};
use crate::models::{decode, value_is_true, User};
use crate::session::{expired_identity_cookies, identity_cookies, FlashKind, Identity, Session};
use crate::sql_params;
use crate::state::AppState;
use crate::views;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderName;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

/// Roles that grant admin regardless of the stored flag.
pub const ELEVATED_ROLES: &[&str] = &["admin", "super_admin", "moderator"];
pub const DEFAULT_ROLE: &str = "user";

/// Admin state for a login: an elevated `role` wins, otherwise the stored flag stands.
pub fn effective_admin(role: &str, stored_is_admin: bool) -> bool {
    ELEVATED_ROLES.contains(&role) || stored_is_admin
}

/// Checkbox-style form flag.
pub fn form_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes")
}

pub async fn login_page(State(state): State<AppState>, session: Session) -> Response {
    page(&state, session, "Login", views::login_form())
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

pub async fn login(State(state): State<AppState>, mut session: Session, Form(form): Form<LoginForm>) -> Response {
    let sql = format!(
        "SELECT * FROM users WHERE username='{}' AND password='{}'",
        form.username, form.password
    );
    let Some(user) = state.db.query(&sql, &[]).await.into_iter().next() else {
        tracing::info!(username = %form.username, "login failed");
        session.flash(FlashKind::Error, "Invalid username or password");
        return page(&state, session, "Login", views::login_form());
    };

    // Compared verbatim; only a missing field means the default role.
    let role = form.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
    let stored_is_admin = user.get("is_admin").map(value_is_true).unwrap_or(false);
    let identity = Identity {
        user_id: record_i64(&user, "id").unwrap_or(0),
        username: record_str(&user, "username").unwrap_or(form.username),
        is_admin: effective_admin(&role, stored_is_admin),
        role,
    };
    tracing::info!(
        user_id = identity.user_id,
        role = %identity.role,
        is_admin = identity.is_admin,
        "login"
    );

    session.login(identity.clone());
    session.flash(FlashKind::Success, format!("Logged in (role: {})", identity.role));
    let mut cookies: Vec<(HeaderName, String)> = vec![(SET_COOKIE, session.set_cookie(&state.config.secret_key))];
    cookies.extend(identity_cookies(&identity).into_iter().map(|c| (SET_COOKIE, c)));
    (AppendHeaders(cookies), Redirect::to("/")).into_response()
}

pub async fn register_page(State(state): State<AppState>, session: Session) -> Response {
    page(&state, session, "Register", views::register_form())
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_admin: Option<String>,
}

pub async fn register(State(state): State<AppState>, mut session: Session, Form(form): Form<RegisterForm>) -> Response {
    if form.username.trim().is_empty() || form.password.is_empty() {
        session.flash(FlashKind::Error, "Username and password are required");
        return page(&state, session, "Register", views::register_form());
    }
    let is_admin = form.is_admin.as_deref().map(form_flag).unwrap_or(false);
    let result = state
        .db
        .update(
            "INSERT INTO users (username, password, email, address, phone, is_admin) VALUES (?, ?, ?, ?, ?, ?)",
            &sql_params![
                form.username.trim(),
                &form.password,
                non_empty(form.email),
                non_empty(form.address),
                non_empty(form.phone),
                is_admin
            ],
        )
        .await;
    match result {
        Some(_) => {
            tracing::info!(username = %form.username, is_admin, "registered user");
            session.flash(FlashKind::Success, "Registration complete, please log in");
            redirect(&state, &session, "/login")
        }
        None => {
            session.flash(FlashKind::Error, "Username already taken");
            page(&state, session, "Register", views::register_form())
        }
    }
}

pub async fn logout(State(state): State<AppState>, mut session: Session) -> Response {
    session.clear();
    session.flash(FlashKind::Success, "Logged out");
    let mut cookies: Vec<(HeaderName, String)> = vec![(SET_COOKIE, session.set_cookie(&state.config.secret_key))];
    cookies.extend(expired_identity_cookies().into_iter().map(|c| (SET_COOKIE, c)));
    (AppendHeaders(cookies), Redirect::to("/")).into_response()
}

/// Looks the user up with the session id interpolated into the SQL.
pub async fn profile(State(state): State<AppState>, mut session: Session) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let sql = format!("SELECT * FROM users WHERE id = {}", user_id);
    let Some(user) = state.db.query_one(&sql, &[]).await.and_then(decode::<User>) else {
        session.flash(FlashKind::Error, "User not found");
        return redirect(&state, &session, "/");
    };
    page(&state, session, "Profile", views::profile(&user))
}

pub async fn user_page(State(state): State<AppState>, mut session: Session, Path(id): Path<i64>) -> Response {
    let Some(user) = state
        .db
        .query_one("SELECT * FROM users WHERE id = ?", &sql_params![id])
        .await
        .and_then(decode::<User>)
    else {
        session.flash(FlashKind::Error, "User not found");
        return redirect(&state, &session, "/");
    };
    let title = user.username.clone();
    page(&state, session, &title, views::public_profile(&user))
}
