//! In-process client over the full router, backed by in-memory SQLite.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use std::collections::HashMap;
use tower::ServiceExt;
use vulnshop::db::SqliteBackend;
use vulnshop::{app_router, ensure_schema, AppConfig, AppState, Database};

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

/// Keeps cookies across requests the way a browser would.
pub struct Client {
    app: Router,
    pub db: Database,
    pub cookies: HashMap<String, String>,
}

pub async fn seeded_db() -> Database {
    let db = Database::new(SqliteBackend::open_memory().await.unwrap());
    ensure_schema(&db).await.unwrap();
    db
}

impl Client {
    pub async fn new() -> Self {
        let db = seeded_db().await;
        let app = app_router(AppState::new(db.clone(), AppConfig::default()));
        Client {
            app,
            db,
            cookies: HashMap::new(),
        }
    }

    /// A second browser against the same app and database.
    pub fn fresh(&self) -> Self {
        Client {
            app: self.app.clone(),
            db: self.db.clone(),
            cookies: HashMap::new(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(req).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form(fields)))
            .unwrap();
        self.send(req).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post("/login", &[("username", username), ("password", password)]).await
    }

    pub async fn register(&mut self, username: &str, password: &str, email: &str) -> TestResponse {
        self.post(
            "/register",
            &[("username", username), ("password", password), ("email", email)],
        )
        .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp: Response = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookies: Vec<String> = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        for c in &set_cookies {
            let pair = c.split(';').next().unwrap_or("");
            let Some((name, value)) = pair.split_once('=') else { continue };
            if c.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            location,
            set_cookies,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// `application/x-www-form-urlencoded` body.
pub fn form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn encode(s: &str) -> String {
    let mut out = String::new();
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
