//! Domain rows decoded from shim records.

use crate::db::Record;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a record into a typed row. Malformed rows are logged and skipped.
pub fn decode<T: DeserializeOwned>(record: Record) -> Option<T> {
    match serde_json::from_value(Value::Object(record)) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, row_type = std::any::type_name::<T>(), "skipping malformed row");
            None
        }
    }
}

pub fn decode_all<T: DeserializeOwned>(records: Vec<Record>) -> Vec<T> {
    records.into_iter().filter_map(decode).collect()
}

/// Truthiness as the backends store it: `true`, non-zero numbers, or "true"/"1"/"t".
pub fn value_is_true(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "t"),
        _ => false,
    }
}

fn flexible_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(value_is_true(&v))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored in plaintext.
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Review row, optionally joined with the author and product names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Row of the `emails` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub sender_id: Option<i64>,
    pub recipient_id: i64,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total: f64,
    #[serde(default)]
    pub shipping_address: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
    #[serde(default)]
    pub product_name: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}
