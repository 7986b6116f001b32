//! Contact-form relay: one `emails` row per recipient, with BCC targets split out of a single free-text field.

use crate::db::{record_i64, schema::ADMIN_USERNAME, Database};
use crate::sql_params;
use regex::Regex;
use std::sync::OnceLock;

const INSERT_MESSAGE: &str = "INSERT INTO emails (sender_id, recipient_id, subject, content) VALUES (?, ?, ?, ?)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    pub primary: String,
    pub bcc: Vec<String>,
}

fn bcc_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*bcc:\s*").expect("static regex"))
}

/// Split a comma-separated address field. The first address is primary, the rest are BCC
/// with any `bcc:` prefix removed. `None` when no address is present.
pub fn parse_recipients(input: &str) -> Option<Recipients> {
    let mut addresses = input
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty());
    let primary = addresses.next()?.to_string();
    let bcc = addresses
        .map(|a| bcc_prefix().replace(a, "").trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    Some(Recipients { primary, bcc })
}

pub fn contact_body(primary: &str, content: &str) -> String {
    format!("Contact email: {}\n\nMessage:\n{}", primary, content)
}

pub fn bcc_body(primary: &str, content: &str) -> String {
    format!("{}\n\n(This message was sent via BCC.)", contact_body(primary, content))
}

/// Counts of persisted messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Rows addressed to the admin or a matched BCC user.
    pub delivered: usize,
    /// Unmatched BCC addresses rerouted to the admin.
    pub rerouted: usize,
}

/// Persist the contact message for the admin and each BCC target.
pub async fn relay_contact(
    db: &Database,
    sender_id: i64,
    title: &str,
    email_field: &str,
    content: &str,
) -> RelayReport {
    let mut report = RelayReport::default();
    let admin_id = match db
        .query_one("SELECT id FROM users WHERE username = ?", &sql_params![ADMIN_USERNAME])
        .await
        .and_then(|r| record_i64(&r, "id"))
    {
        Some(id) => id,
        None => {
            tracing::warn!("no admin account; contact message dropped");
            return report;
        }
    };
    let Some(recipients) = parse_recipients(email_field) else {
        tracing::info!("contact form without an address; nothing sent");
        return report;
    };

    let body = contact_body(&recipients.primary, content);
    if db
        .update(INSERT_MESSAGE, &sql_params![sender_id, admin_id, title, body])
        .await
        .is_some()
    {
        report.delivered += 1;
    }

    for address in &recipients.bcc {
        let body = bcc_body(&recipients.primary, content);
        let matched = db
            .query_one("SELECT id FROM users WHERE email = ?", &sql_params![address.as_str()])
            .await
            .and_then(|r| record_i64(&r, "id"));
        match matched {
            Some(user_id) => {
                if db
                    .update(INSERT_MESSAGE, &sql_params![sender_id, user_id, title, body])
                    .await
                    .is_some()
                {
                    report.delivered += 1;
                }
            }
            None => {
                let rerouted = format!("[BCC to {}] {}", address, body);
                if db
                    .update(INSERT_MESSAGE, &sql_params![sender_id, admin_id, title, rerouted])
                    .await
                    .is_some()
                {
                    report.rerouted += 1;
                }
            }
        }
    }
    tracing::info!(sender_id, delivered = report.delivered, rerouted = report.rerouted, "contact relayed");
    report
}
