//! Contact form relay and the internal mailbox.

use super::{page, redirect, require_login};
use crate::mail::relay_contact;
use crate::models::{decode, decode_all, Message};
use crate::session::{FlashKind, Session};
use crate::sql_params;
use crate::state::AppState;
use crate::views;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use serde::Deserialize;

pub async fn contact_page(State(state): State<AppState>, mut session: Session) -> Response {
    if let Err(resp) = require_login(&state, &mut session) {
        return resp;
    }
    page(&state, session, "Contact", views::contact_form())
}

#[derive(Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
}

pub async fn contact(State(state): State<AppState>, mut session: Session, Form(form): Form<ContactForm>) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    relay_contact(&state.db, user_id, &form.title, &form.email, &form.content).await;
    session.flash(FlashKind::Success, "Your inquiry was sent");
    redirect(&state, &session, "/")
}

pub async fn inbox(State(state): State<AppState>, mut session: Session) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let messages: Vec<Message> = decode_all(
        state
            .db
            .query(
                "SELECT e.*, u.username AS sender_name FROM emails e LEFT JOIN users u ON e.sender_id = u.id \
                 WHERE e.recipient_id = ? ORDER BY e.id DESC",
                &sql_params![user_id],
            )
            .await,
    );
    page(&state, session, "Mailbox", views::inbox(&messages))
}

/// Only the recipient can open a message; opening marks it read.
pub async fn message(State(state): State<AppState>, mut session: Session, Path(id): Path<i64>) -> Response {
    let user_id = match require_login(&state, &mut session) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Some(message) = state
        .db
        .query_one(
            "SELECT e.*, u.username AS sender_name FROM emails e LEFT JOIN users u ON e.sender_id = u.id \
             WHERE e.id = ? AND e.recipient_id = ?",
            &sql_params![id, user_id],
        )
        .await
        .and_then(decode::<Message>)
    else {
        session.flash(FlashKind::Error, "Message not found");
        return redirect(&state, &session, "/mail");
    };
    if !message.is_read {
        state
            .db
            .update("UPDATE emails SET is_read = ? WHERE id = ?", &sql_params![true, id])
            .await;
    }
    let title = message.subject.clone().unwrap_or_else(|| "(no subject)".into());
    page(&state, session, &title, views::message(&message))
}
