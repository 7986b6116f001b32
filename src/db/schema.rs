//! Table DDL for both backends and the demo seed data.

use super::{record_i64, BackendKind, Database, SqlValue};
use crate::error::AppError;
use crate::sql_params;

/// Every table the shop uses, in creation order.
pub const TABLES: &[&str] = &["users", "products", "reviews", "emails", "orders", "order_items"];

/// Column types that differ between the backends.
struct Dialect {
    id: &'static str,
    timestamp: &'static str,
    real: &'static str,
    bool_false: &'static str,
    int: &'static str,
}

impl Dialect {
    fn for_kind(kind: BackendKind) -> Self {
        if kind.is_sqlite() {
            Dialect {
                id: "INTEGER PRIMARY KEY AUTOINCREMENT",
                timestamp: "TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP",
                real: "REAL",
                bool_false: "BOOLEAN NOT NULL DEFAULT 0",
                int: "INTEGER",
            }
        } else {
            Dialect {
                id: "BIGSERIAL PRIMARY KEY",
                timestamp: "TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP",
                real: "DOUBLE PRECISION",
                bool_false: "BOOLEAN NOT NULL DEFAULT FALSE",
                int: "BIGINT",
            }
        }
    }
}

fn table_ddl(d: &Dialect) -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id {id},
                username TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                email TEXT,
                address TEXT,
                phone TEXT,
                is_admin {flag},
                created_at {ts}
            )
            "#,
            id = d.id,
            flag = d.bool_false,
            ts = d.timestamp
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id {id},
                name TEXT NOT NULL,
                description TEXT,
                price {real} NOT NULL,
                stock {int} NOT NULL DEFAULT 0,
                category TEXT,
                image_url TEXT,
                created_at {ts}
            )
            "#,
            id = d.id,
            real = d.real,
            int = d.int,
            ts = d.timestamp
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id {id},
                product_id {int} NOT NULL REFERENCES products (id),
                user_id {int} NOT NULL REFERENCES users (id),
                rating {int} NOT NULL,
                comment TEXT NOT NULL,
                created_at {ts}
            )
            "#,
            id = d.id,
            int = d.int,
            ts = d.timestamp
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS emails (
                id {id},
                sender_id {int} REFERENCES users (id),
                recipient_id {int} NOT NULL REFERENCES users (id),
                subject TEXT,
                content TEXT NOT NULL,
                is_read {flag},
                created_at {ts}
            )
            "#,
            id = d.id,
            int = d.int,
            flag = d.bool_false,
            ts = d.timestamp
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id {id},
                user_id {int} NOT NULL REFERENCES users (id),
                total {real} NOT NULL,
                shipping_address TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at {ts}
            )
            "#,
            id = d.id,
            int = d.int,
            real = d.real,
            ts = d.timestamp
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS order_items (
                id {id},
                order_id {int} NOT NULL REFERENCES orders (id),
                product_id {int} NOT NULL,
                quantity {int} NOT NULL,
                price {real} NOT NULL
            )
            "#,
            id = d.id,
            int = d.int,
            real = d.real
        ),
    ]
}

/// (name, price, description, image_url, category, stock)
const SAMPLE_PRODUCTS: &[(&str, f64, &str, &str, &str, i64)] = &[
    ("iPhone 15 Pro", 149999.0, "Latest iPhone with advanced features", "/static/uploads/iphone.jpg", "electronics", 25),
    ("MacBook Air M3", 199999.0, "Ultra-thin laptop with M3 chip", "/static/uploads/macbook.jpg", "electronics", 10),
    ("AirPods Pro", 39999.0, "Premium wireless earbuds", "/static/uploads/airpods.jpg", "electronics", 50),
    ("Nike Air Max", 15999.0, "Comfortable running shoes", "/static/uploads/nike.jpg", "fashion", 40),
    ("Sony Camera", 89999.0, "Professional digital camera", "/static/uploads/camera.jpg", "electronics", 8),
];

pub const ADMIN_USERNAME: &str = "admin";

/// Create missing tables, then seed the admin account and the sample catalogue if absent.
/// Idempotent; safe to call on every startup and from `POST /api/init-db`.
pub async fn ensure_schema(db: &Database) -> Result<(), AppError> {
    let dialect = Dialect::for_kind(db.kind());
    for ddl in table_ddl(&dialect) {
        db.execute_checked(&ddl).await?;
    }

    let admins = db
        .query("SELECT COUNT(*) AS n FROM users WHERE username = ?", &sql_params![ADMIN_USERNAME])
        .await;
    if admins.first().and_then(|r| record_i64(r, "n")).unwrap_or(0) == 0 {
        db.update(
            "INSERT INTO users (username, password, email, is_admin) VALUES (?, ?, ?, ?)",
            &sql_params![ADMIN_USERNAME, "admin123", "admin@shop.com", true],
        )
        .await;
        tracing::info!("seeded admin user");
    }

    let products = db.query("SELECT COUNT(*) AS n FROM products", &[]).await;
    if products.first().and_then(|r| record_i64(r, "n")).unwrap_or(0) == 0 {
        for (name, price, description, image_url, category, stock) in SAMPLE_PRODUCTS {
            let params: Vec<SqlValue> = sql_params![*name, *price, *description, *image_url, *category, *stock];
            db.update(
                "INSERT INTO products (name, price, description, image_url, category, stock) VALUES (?, ?, ?, ?, ?, ?)",
                &params,
            )
            .await;
        }
        tracing::info!(count = SAMPLE_PRODUCTS.len(), "seeded sample products");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteBackend;

    #[tokio::test]
    async fn seeds_once() {
        let db = Database::new(SqliteBackend::open_memory().await.unwrap());
        ensure_schema(&db).await.unwrap();
        ensure_schema(&db).await.unwrap();
        let users = db.query("SELECT * FROM users", &[]).await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].get("is_admin"), Some(&serde_json::Value::Bool(true)));
        let products = db.query("SELECT * FROM products", &[]).await;
        assert_eq!(products.len(), SAMPLE_PRODUCTS.len());
    }

    #[test]
    fn dialects_differ_in_id_column() {
        assert!(Dialect::for_kind(BackendKind::Postgres).id.contains("BIGSERIAL"));
        assert!(Dialect::for_kind(BackendKind::SqliteMemory).id.contains("AUTOINCREMENT"));
    }
}
