mod common;

use axum::http::StatusCode;
use common::{encode, Client};
use vulnshop::sql_params;

#[tokio::test]
async fn review_comments_are_rendered_raw() {
    let mut client = Client::new().await;
    client.login("admin", "admin123").await;
    let payload = "<script>alert('xss')</script>";
    let resp = client
        .post("/product/1/review", &[("rating", "5"), ("comment", payload)])
        .await;
    assert_eq!(resp.location.as_deref(), Some("/product/1"));

    let detail = client.get("/product/1").await;
    assert!(detail.body.contains("Review posted"));
    assert!(detail.body.contains(payload));

    let home = client.get("/").await;
    assert!(home.body.contains(payload));
}

#[tokio::test]
async fn reviews_need_login_and_valid_fields() {
    let mut client = Client::new().await;
    let anonymous = client.post("/product/1/review", &[("rating", "5"), ("comment", "hi")]).await;
    assert_eq!(anonymous.location.as_deref(), Some("/login"));

    client.login("admin", "admin123").await;
    client.post("/product/1/review", &[("rating", "five"), ("comment", "hi")]).await;
    let detail = client.get("/product/1").await;
    assert!(detail.body.contains("Rating must be a number"));
    assert!(detail.body.contains("No reviews yet."));
}

#[tokio::test]
async fn review_search_term_is_echoed_unescaped() {
    let mut client = Client::new().await;
    let term = "<b>bold</b>";
    let resp = client.get(&format!("/?review_search={}", encode(term))).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Reviews matching: <b>bold</b>"));
}

#[tokio::test]
async fn product_listing_paginates_by_nine() {
    let mut client = Client::new().await;
    for i in 0..15 {
        client
            .db
            .update(
                "INSERT INTO products (name, price, stock, category) VALUES (?, ?, ?, ?)",
                &sql_params![format!("Widget {}", i), 100.0, 1i64, "tools"],
            )
            .await
            .unwrap();
    }
    let first = client.get("/products").await;
    assert!(first.body.contains("20 products"));
    assert!(first.body.contains("Page 1 of 3"));
    assert!(first.body.contains(r#"href="/products?page=2""#));

    let last = client.get("/products?page=3").await;
    assert!(last.body.contains("Page 3 of 3"));
    assert!(last.body.contains("Widget 14"));
    assert!(!last.body.contains("iPhone 15 Pro"));

    let tools = client.get("/products?category=tools&page=2").await;
    assert!(tools.body.contains("Page 2 of 2"));
}

#[tokio::test]
async fn search_matches_name_and_description() {
    let mut client = Client::new().await;
    let by_name = client.get("/search?q=MacBook").await;
    assert!(by_name.body.contains("1 results"));
    assert!(by_name.body.contains("MacBook Air M3"));

    let by_description = client.get("/search?q=running").await;
    assert!(by_description.body.contains("Nike Air Max"));

    let none = client.get("/search?q=zzz").await;
    assert!(none.body.contains("No products found."));
    assert!(none.body.contains("Page 1 of 1"));
}

#[tokio::test]
async fn categories_and_missing_products() {
    let mut client = Client::new().await;
    let categories = client.get("/categories").await;
    assert!(categories.body.contains("electronics</a> (4)"));
    assert!(categories.body.contains("fashion</a> (1)"));

    let missing = client.get("/product/999").await;
    assert_eq!(missing.status, StatusCode::SEE_OTHER);
    assert_eq!(missing.location.as_deref(), Some("/products"));
    let listing = client.get("/products").await;
    assert!(listing.body.contains("Product not found"));
}

#[tokio::test]
async fn product_api_and_health() {
    let mut client = Client::new().await;
    let all = client.get("/api/products").await;
    let json: serde_json::Value = serde_json::from_str(&all.body).unwrap();
    assert_eq!(json["meta"]["count"], 5);
    assert_eq!(json["data"][0]["name"], "iPhone 15 Pro");

    let missing = client.get("/api/products/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let status = client.get("/api/status").await;
    let json: serde_json::Value = serde_json::from_str(&status.body).unwrap();
    assert_eq!(json["data"]["backend"], "sqlite_memory");
    assert_eq!(json["data"]["connected"], true);

    let db_test = client.get("/api/db-test").await;
    let json: serde_json::Value = serde_json::from_str(&db_test.body).unwrap();
    assert_eq!(json["meta"]["ok"], true);
    assert_eq!(json["data"][1]["table"], "products");
    assert_eq!(json["data"][1]["rows"], 5);

    let init = client.post("/api/init-db", &[]).await;
    assert_eq!(init.status, StatusCode::OK);
    let again = client.get("/api/products").await;
    let json: serde_json::Value = serde_json::from_str(&again.body).unwrap();
    assert_eq!(json["meta"]["count"], 5);

    assert_eq!(client.get("/health").await.status, StatusCode::OK);
    assert!(client.get("/ping").await.body.contains("pong"));
}

#[tokio::test]
async fn category_links_survive_reserved_characters() {
    let mut client = Client::new().await;
    for i in 0..10 {
        client
            .db
            .update(
                "INSERT INTO products (name, price, stock, category) VALUES (?, ?, ?, ?)",
                &sql_params![format!("Planter {}", i), 10.0, 1i64, "home & garden #1"],
            )
            .await
            .unwrap();
    }
    let categories = client.get("/categories").await;
    assert!(categories.body.contains(r#"href="/products?category=home+%26+garden+%231""#));
    assert!(categories.body.contains("home &amp; garden #1</a> (10)"));

    let first = client.get("/products?category=home+%26+garden+%231").await;
    assert!(first.body.contains("10 products"));
    assert!(first.body.contains(r#"href="/products?category=home+%26+garden+%231&page=2""#));
    let second = client.get("/products?category=home+%26+garden+%231&page=2").await;
    assert!(second.body.contains("Page 2 of 2"));
    assert!(second.body.contains("Planter 9"));
}
