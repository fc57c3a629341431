//! Transactional product mutations.
//!
//! Each workflow validates and checks for duplicates before opening a transaction, then runs its
//! steps on a single checked-out connection. Any failure after `begin` issues an explicit
//! rollback before the error is returned; a dropped `Transaction` would also roll back and release its
//! connection. Images uploaded during a failed attempt are deleted again when
//! `compensate_uploads` is on. Remote deletions cannot be undone.

mod changes;
mod create;
mod delete;
mod update;

pub use changes::changed_fields;
pub use update::UpdateOutcome;

use futures::future::join_all;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::DatabaseError;
use crate::media::{ImageUpload, MediaError, MediaStore};
use crate::schemas::{parse_id, push_error, FieldErrors};
use crate::services::image_service;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Validation failed")]
    ValidationFailed(FieldErrors),

    #[error("Invalid product id '{0}'")]
    InvalidId(String),

    #[error("A product named '{0}' already exists")]
    DuplicateName(String),

    #[error("Product {0} not found")]
    NotFound(i32),

    #[error("Product insert returned no id")]
    InsertFailed,

    #[error("Product update affected no rows")]
    UpdateFailed,

    #[error("Failed to upload image: {0}")]
    ImageUploadFailed(#[source] MediaError),

    #[error("No images were uploaded")]
    NoImagesUploaded,

    #[error("Failed to save image record: {0}")]
    ImagePersistFailed(#[source] DatabaseError),

    #[error("Failed to delete image: {0}")]
    ImageDeleteFailed(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Database(err.into())
    }
}

impl WorkflowError {
    fn single_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        push_error(&mut errors, field, message);
        WorkflowError::ValidationFailed(errors)
    }

    /// Constraint violations raised by a product write, in workflow terms.
    fn from_write(err: DatabaseError, name: &str) -> Self {
        match err {
            DatabaseError::UniqueViolation(_) => WorkflowError::DuplicateName(name.to_string()),
            DatabaseError::ForeignKeyViolation(_) => {
                Self::single_field("subCategoryId", "Sub-category does not exist")
            }
            other => WorkflowError::Database(other),
        }
    }
}

pub fn parse_product_id(raw: &str) -> Result<i32, WorkflowError> {
    parse_id(raw).ok_or_else(|| WorkflowError::InvalidId(raw.to_string()))
}

/// Outcome of a parallel upload batch. `urls` holds every image that did reach the media
/// store, even when `failure` is set, so the caller can compensate.
struct UploadBatch {
    urls: Vec<String>,
    failure: Option<MediaError>,
}

pub struct ProductWorkflow {
    pool: PgPool,
    media: Arc<dyn MediaStore>,
    compensate_uploads: bool,
}

impl ProductWorkflow {
    pub fn new(pool: PgPool, media: Arc<dyn MediaStore>, compensate_uploads: bool) -> Self {
        Self {
            pool,
            media,
            compensate_uploads,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.pool.clone(),
            state.media.clone(),
            state.config.media.compensate_uploads,
        )
    }

    /// Upload every file concurrently and wait for all of them.
    async fn upload_images(&self, product_id: i32, files: &[ImageUpload]) -> UploadBatch {
        let results = join_all(files.iter().map(|file| self.media.upload(file, product_id))).await;

        let mut batch = UploadBatch {
            urls: Vec::with_capacity(files.len()),
            failure: None,
        };
        for result in results {
            match result {
                Ok(url) if url.is_empty() => {}
                Ok(url) => batch.urls.push(url),
                Err(e) => {
                    if batch.failure.is_none() {
                        batch.failure = Some(e);
                    }
                }
            }
        }
        debug!(product_id, uploaded = batch.urls.len(), "Image uploads finished");
        batch
    }

    /// Upload and record new images inside `tx`. On failure the transaction has already been
    /// rolled back and the error is ready to return.
    async fn attach_images(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        product_id: i32,
        files: &[ImageUpload],
    ) -> Result<Vec<String>, (Vec<String>, WorkflowError)> {
        let batch = self.upload_images(product_id, files).await;
        if let Some(err) = batch.failure {
            return Err((batch.urls, WorkflowError::ImageUploadFailed(err)));
        }
        if batch.urls.is_empty() {
            return Err((vec![], WorkflowError::NoImagesUploaded));
        }

        for url in &batch.urls {
            if let Err(e) = image_service::insert(&mut **tx, product_id, url).await {
                return Err((batch.urls, WorkflowError::ImagePersistFailed(e)));
            }
        }
        debug!(product_id, count = batch.urls.len(), "Image rows inserted");
        Ok(batch.urls)
    }

    /// Roll back, compensate this attempt's uploads, and hand back the error to return.
    async fn abort(
        &self,
        tx: Transaction<'static, Postgres>,
        uploaded: &[String],
        err: WorkflowError,
    ) -> WorkflowError {
        if let Err(e) = tx.rollback().await {
            warn!(error = %e, "Rollback failed; the connection is discarded");
        }
        debug!(error = %err, "Transaction rolled back");
        self.compensate(uploaded).await;
        err
    }

    /// Best-effort removal of uploads, newest first.
    async fn compensate(&self, uploaded: &[String]) {
        if uploaded.is_empty() {
            return;
        }
        if !self.compensate_uploads {
            warn!(count = uploaded.len(), "Leaving uploaded images of a failed mutation in place");
            return;
        }
        for url in uploaded.iter().rev() {
            match self.media.delete(url).await {
                Ok(()) => debug!(url = %url, "Compensated upload"),
                Err(e) => warn!(url = %url, error = %e, "Failed to compensate upload"),
            }
        }
    }
}
