//! Shared handler state.

use std::sync::Arc;

use tally_db::Database;

use crate::config::ApiConfig;

/// Everything a handler reaches through `Extension<Arc<AppState>>`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}

/// Shorthand used by every handler signature.
pub type SharedState = Arc<AppState>;
