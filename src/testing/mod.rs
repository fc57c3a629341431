use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::media::{ImageUpload, MediaError, MediaStore};
use crate::schemas::product::ProductForm;
use crate::services::{category_service, sub_category_service};
use crate::state::AppState;
use crate::workflow::ProductWorkflow;

/// In-memory media store that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingMediaStore {
    calls: AtomicUsize,
    /// 1-based upload call that fails
    fail_upload_at: Option<usize>,
    /// Uploads succeed but hand back an empty URL
    empty_urls: bool,
    fail_deletes: bool,
    /// 1-based upload call whose URL the database refuses to store
    unstorable_at: Option<usize>,
    uploaded: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl RecordingMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_upload(call: usize) -> Self {
        Self {
            fail_upload_at: Some(call),
            ..Self::default()
        }
    }

    pub fn returning_empty() -> Self {
        Self {
            empty_urls: true,
            ..Self::default()
        }
    }

    pub fn unstorable_upload(call: usize) -> Self {
        Self {
            unstorable_at: Some(call),
            ..Self::default()
        }
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    async fn upload(&self, image: &ImageUpload, product_id: i32) -> Result<String, MediaError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_upload_at == Some(call) {
            return Err(MediaError::Rejected {
                status: 500,
                message: format!("injected failure on upload {}", call),
            });
        }
        if self.empty_urls {
            return Ok(String::new());
        }

        let mut url = format!(
            "https://media.test/image/upload/v1/products/product_{}_{}_{}.jpg",
            product_id,
            call,
            image.stem()
        );
        if self.unstorable_at == Some(call) {
            // Postgres rejects NUL bytes in text columns
            url.push('\0');
        }
        self.uploaded.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        if self.fail_deletes {
            return Err(MediaError::Rejected {
                status: 500,
                message: "injected delete failure".to_string(),
            });
        }
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes: vec![0xff, 0xd8, 0xff],
    }
}

/// Unique per call, so tests can share one database.
pub fn unique(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}-{}-{}", prefix, nanos, COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Database-backed test harness. `connect` returns `None` (and the test should return early)
/// when `TEST_DATABASE_URL` is unset or unreachable.
pub struct TestContext {
    pub pool: PgPool,
    pub config: AppConfig,
}

impl TestContext {
    pub async fn connect() -> Option<Self> {
        let url = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("TEST_DATABASE_URL not set; skipping database test");
                return None;
            }
        };

        let mut config = AppConfig::for_tests();
        config.database.url = url;
        let pool = DatabaseManager::connect_lazy(&config.database).ok()?;
        if let Err(e) = DatabaseManager::migrate(&pool).await {
            eprintln!("test database unavailable ({}); skipping", e);
            return None;
        }

        Some(Self { pool, config })
    }

    pub fn state(&self, media: Arc<dyn MediaStore>) -> AppState {
        AppState::new(self.pool.clone(), media, self.config.clone())
    }

    pub fn workflow(&self, media: Arc<RecordingMediaStore>) -> ProductWorkflow {
        ProductWorkflow::new(self.pool.clone(), media, true)
    }

    /// Fresh category + sub-category; returns the sub-category id.
    pub async fn seed_sub_category(&self) -> anyhow::Result<i32> {
        let category = category_service::insert(&self.pool, &unique("cat"), "seeded").await?;
        let sub = sub_category_service::insert(&self.pool, category.id, &unique("sub"), "seeded").await?;
        Ok(sub.id)
    }

    /// Form for a valid product named `name` under `sub_category_id`.
    pub fn product_form(name: &str, sub_category_id: i32) -> ProductForm {
        ProductForm::new()
            .with_text("name", name)
            .with_text("description", "Seeded product")
            .with_text("subCategoryId", &sub_category_id.to_string())
            .with_text("originalPrice", "100.00")
            .with_text("discount", "25")
            .with_text("brand", "Acme")
    }

    pub async fn product_exists(&self, name: &str) -> anyhow::Result<bool> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE name = $1)")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}
