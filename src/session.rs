//! Cookie-backed session, identity cookies and the base64 "auth token".
//!
//! The `session` cookie is `base64url(json).hex(sha256(secret "." payload))`. Only that cookie is signed:
//! `user_id`, `username`, `is_admin`, `role` and `auth_token` are plain copies of the identity, and
//! `auth_token` is unsigned base64 JSON, which is how the site is meant to be attacked.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

pub const SESSION_COOKIE: &str = "session";
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";
/// Plain identity cookies issued alongside the session on login.
pub const IDENTITY_COOKIES: &[&str] = &["user_id", "username", "is_admin", "role", AUTH_TOKEN_COOKIE];
pub const IDENTITY_MAX_AGE: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
            FlashKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub cart: Vec<CartLine>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        self.identity.as_ref().map(|i| i.user_id)
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().map(|i| i.is_admin).unwrap_or(false)
    }

    pub fn login(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// Drop identity and cart. Pending flashes survive so the next page can show them.
    pub fn clear(&mut self) {
        self.identity = None;
        self.cart.clear();
    }

    pub fn flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.flashes.push(Flash {
            kind,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    /// Add to an existing line or append a new one.
    pub fn add_to_cart(&mut self, product_id: i64, quantity: i64) {
        match self.cart.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.cart.push(CartLine {
                product_id,
                quantity,
            }),
        }
        self.cart.retain(|l| l.quantity > 0);
    }

    /// Set the quantity of an existing line; zero or less removes it.
    /// Returns false when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) -> bool {
        if !self.cart.iter().any(|l| l.product_id == product_id) {
            return false;
        }
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return true;
        }
        if let Some(line) = self.cart.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
        true
    }

    pub fn remove_from_cart(&mut self, product_id: i64) {
        self.cart.retain(|l| l.product_id != product_id);
    }

    pub fn encode(&self, secret: &str) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = sign(secret, &payload);
        format!("{}.{}", payload, signature)
    }

    /// Verify and decode. Returns `None` for a bad signature or payload.
    pub fn decode(value: &str, secret: &str) -> Option<Session> {
        let (payload, signature) = value.rsplit_once('.')?;
        if sign(secret, payload) != signature {
            tracing::debug!("rejecting session cookie with bad signature");
            return None;
        }
        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }

    pub fn set_cookie(&self, secret: &str) -> String {
        format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, self.encode(secret))
    }
}

fn sign(secret: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Unsigned JWT look-alike: standard base64 of the identity JSON.
pub fn encode_auth_token(identity: &Identity) -> String {
    STANDARD.encode(serde_json::to_vec(identity).unwrap_or_default())
}

pub fn decode_auth_token(token: &str) -> Option<Identity> {
    let json = STANDARD.decode(token.trim()).ok()?;
    serde_json::from_slice(&json).ok()
}

/// Plain cookies that duplicate the identity, plus the auth token.
pub fn identity_cookies(identity: &Identity) -> Vec<String> {
    let is_admin = if identity.is_admin { "true" } else { "false" };
    vec![
        cookie("user_id", &identity.user_id.to_string(), IDENTITY_MAX_AGE),
        cookie("username", &identity.username, IDENTITY_MAX_AGE),
        cookie("is_admin", is_admin, IDENTITY_MAX_AGE),
        cookie("role", &identity.role, IDENTITY_MAX_AGE),
        cookie(AUTH_TOKEN_COOKIE, &encode_auth_token(identity), IDENTITY_MAX_AGE),
    ]
}

/// Expire every identity cookie.
pub fn expired_identity_cookies() -> Vec<String> {
    IDENTITY_COOKIES
        .iter()
        .map(|name| format!("{}=; Path=/; Max-Age=0", name))
        .collect()
}

/// `Set-Cookie` value. Characters a cookie value cannot carry are dropped.
pub fn cookie(name: &str, value: &str, max_age: u32) -> String {
    let value: String = value
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\'))
        .collect();
    format!("{}={}; Path=/; Max-Age={}", name, value, max_age)
}

/// Parse a `Cookie` request header into name/value pairs.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}
