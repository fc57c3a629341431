use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::media::MediaStore;

/// Shared by every handler through axum's `State`. The pool is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub media: Arc<dyn MediaStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, media: Arc<dyn MediaStore>, config: AppConfig) -> Self {
        Self {
            pool,
            media,
            config: Arc::new(config),
        }
    }
}
