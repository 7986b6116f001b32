//! Shared application state for all routes. Both parts are fixed at startup.

use crate::db::Database;
use crate::settings::AppConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
