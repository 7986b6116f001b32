mod common;

use axum::http::StatusCode;
use common::Client;
use vulnshop::session::decode_auth_token;

#[tokio::test]
async fn seeded_admin_logs_in_with_identity_cookies() {
    let mut client = Client::new().await;
    let resp = client.login("admin", "admin123").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert_eq!(client.cookies.get("username").map(String::as_str), Some("admin"));
    assert_eq!(client.cookies.get("is_admin").map(String::as_str), Some("true"));
    assert_eq!(client.cookies.get("role").map(String::as_str), Some("user"));
    assert!(resp.set_cookies.iter().any(|c| c.starts_with("user_id=") && c.contains("Max-Age=3600")));

    let token = client.cookies.get("auth_token").cloned().unwrap();
    let identity = decode_auth_token(&token).unwrap();
    assert_eq!(identity.username, "admin");
    assert!(identity.is_admin);

    let home = client.get("/").await;
    assert!(home.body.contains("Logged in (role: user)"));
    assert!(home.body.contains(r#"<a href="/admin">Admin</a>"#));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let mut client = Client::new().await;
    let resp = client.login("admin", "nope").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid username or password"));
    assert!(!client.cookies.contains_key("user_id"));
}

#[tokio::test]
async fn interpolated_login_accepts_sql_injection() {
    let mut client = Client::new().await;
    let resp = client.login("' OR '1'='1' --", "anything").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(client.cookies.get("username").map(String::as_str), Some("admin"));
    assert_eq!(client.cookies.get("is_admin").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn role_field_elevates_a_normal_user() {
    let mut client = Client::new().await;
    let resp = client.register("bob", "pw", "bob@example.com").await;
    assert_eq!(resp.location.as_deref(), Some("/login"));

    client.login("bob", "pw").await;
    assert_eq!(client.cookies.get("is_admin").map(String::as_str), Some("false"));
    let refused = client.get("/admin").await;
    assert_eq!(refused.status, StatusCode::SEE_OTHER);
    assert_eq!(refused.location.as_deref(), Some("/"));

    let mut elevated = client.fresh();
    elevated
        .post("/login", &[("username", "bob"), ("password", "pw"), ("role", "admin")])
        .await;
    assert_eq!(elevated.cookies.get("is_admin").map(String::as_str), Some("true"));
    assert_eq!(elevated.cookies.get("role").map(String::as_str), Some("admin"));
    let dashboard = elevated.get("/admin").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("admin123"));
}

#[tokio::test]
async fn hidden_is_admin_field_is_honoured_at_registration() {
    let mut client = Client::new().await;
    client
        .post(
            "/register",
            &[("username", "mallory"), ("password", "pw"), ("is_admin", "1")],
        )
        .await;
    client.login("mallory", "pw").await;
    assert_eq!(client.cookies.get("is_admin").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn duplicate_and_incomplete_registrations_fail() {
    let mut client = Client::new().await;
    let taken = client.register("admin", "x", "").await;
    assert_eq!(taken.status, StatusCode::OK);
    assert!(taken.body.contains("Username already taken"));

    let incomplete = client.register("", "", "").await;
    assert!(incomplete.body.contains("Username and password are required"));
}

#[tokio::test]
async fn logout_expires_identity_cookies() {
    let mut client = Client::new().await;
    client.login("admin", "admin123").await;
    let resp = client.get("/logout").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert!(resp.set_cookies.iter().any(|c| c == "auth_token=; Path=/; Max-Age=0"));
    assert!(!client.cookies.contains_key("is_admin"));

    let profile = client.get("/profile").await;
    assert_eq!(profile.location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn profile_and_public_user_pages() {
    let mut client = Client::new().await;
    client.register("carol", "pw", "carol@example.com").await;
    client.login("carol", "pw").await;
    let profile = client.get("/profile").await;
    assert_eq!(profile.status, StatusCode::OK);
    assert!(profile.body.contains("carol@example.com"));

    let public = client.get("/user/1").await;
    assert!(public.body.contains("admin"));
    let missing = client.get("/user/999").await;
    assert_eq!(missing.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn role_override_must_match_exactly() {
    let mut client = Client::new().await;
    client.register("bob", "pw", "").await;
    client
        .post("/login", &[("username", "bob"), ("password", "pw"), ("role", " admin ")])
        .await;
    assert_eq!(client.cookies.get("is_admin").map(String::as_str), Some("false"));

    let mut blank = client.fresh();
    blank
        .post("/login", &[("username", "bob"), ("password", "pw"), ("role", "")])
        .await;
    assert_eq!(blank.cookies.get("is_admin").map(String::as_str), Some("false"));
    assert_eq!(blank.cookies.get("role").map(String::as_str), Some(""));
}
