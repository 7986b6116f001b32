//! VulnShop: a deliberately vulnerable storefront for web-security training.
//!
//! Runs against PostgreSQL when `DATABASE_URL` is reachable, otherwise a SQLite file, otherwise
//! in-memory SQLite. Never expose it to an untrusted network.

pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod session;
pub mod settings;
pub mod state;
pub mod views;

pub use db::{connect, ensure_schema, BackendKind, Database};
pub use error::{AppError, ConfigError};
pub use routes::app_router;
pub use settings::AppConfig;
pub use state::AppState;
