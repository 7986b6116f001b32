//! Process configuration, read once from the environment at startup.

use crate::error::ConfigError;
use std::env;

/// Session signing key used when `SECRET_KEY` is unset. Public on purpose: forging sessions is one of the exercises.
pub const DEFAULT_SECRET_KEY: &str = "vulnerable_shop_secret_key_12345";
pub const DEFAULT_SQLITE_PATH: &str = "database/shop.db";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// PostgreSQL URL. When unset the SQLite fallback is used directly.
    pub database_url: Option<String>,
    pub sqlite_path: String,
    pub secret_key: String,
    pub production: bool,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            sqlite_path: DEFAULT_SQLITE_PATH.into(),
            secret_key: DEFAULT_SECRET_KEY.into(),
            production: false,
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Load from `DATABASE_URL`, `SQLITE_PATH`, `SECRET_KEY`, `APP_ENV`, `HOST`, `PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let secret_key = match non_empty_var("SECRET_KEY") {
            Some(k) => k,
            None => {
                tracing::warn!("SECRET_KEY not set, using the built-in default key");
                defaults.secret_key
            }
        };
        let port = match non_empty_var("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: p })?,
            None => defaults.port,
        };
        let production = non_empty_var("APP_ENV")
            .map(|e| e.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let config = AppConfig {
            database_url: non_empty_var("DATABASE_URL"),
            sqlite_path: non_empty_var("SQLITE_PATH").unwrap_or(defaults.sqlite_path),
            secret_key,
            production,
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
        };
        tracing::info!(
            database_url = config.database_url.is_some(),
            sqlite_path = %config.sqlite_path,
            production = config.production,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when a non-default signing key was supplied.
    pub fn has_custom_secret(&self) -> bool {
        self.secret_key != DEFAULT_SECRET_KEY
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
