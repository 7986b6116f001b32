//! Extract the signed session from the `Cookie` header.

use crate::session::{parse_cookie_header, Session, SESSION_COOKIE};
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::COOKIE, request::Parts},
};

/// A missing, unreadable or tampered session cookie yields an empty session.
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|header| parse_cookie_header(header).remove(SESSION_COOKIE))
            .and_then(|value| Session::decode(&value, &state.config.secret_key))
            .unwrap_or_default();
        Ok(session)
    }
}
