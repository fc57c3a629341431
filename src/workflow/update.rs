use serde::Serialize;
use tracing::{debug, info};

use super::{changed_fields, parse_product_id, ProductWorkflow, WorkflowError};
use crate::database::models::{ProductDetailAdmin, ProductRow};
use crate::schemas::product::ProductForm;
use crate::services::{image_service, product_service};

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UpdateOutcome {
    Updated(ProductRow),
    /// Nothing differed from the stored row; no transaction was opened.
    NoChanges(ProductDetailAdmin),
}

impl ProductWorkflow {
    pub async fn update(&self, raw_id: &str, form: ProductForm) -> Result<UpdateOutcome, WorkflowError> {
        let id = parse_product_id(raw_id)?;
        let (update, files) = form.into_update().map_err(WorkflowError::ValidationFailed)?;

        let current = product_service::fetch_admin_detail(&self.pool, id)
            .await?
            .ok_or(WorkflowError::NotFound(id))?;

        if let Some(foreign) = update
            .deleted_images
            .iter()
            .find(|url| !current.images.contains(url))
        {
            return Err(WorkflowError::single_field(
                "deletedImages",
                format!("Image does not belong to this product: {}", foreign),
            ));
        }

        let changed = changed_fields(&current, &update, !files.is_empty());
        if changed.is_empty() {
            debug!(product_id = id, "Update: no changes");
            return Ok(UpdateOutcome::NoChanges(current));
        }
        debug!(product_id = id, ?changed, "Update: changes detected");

        let input = &update.input;
        if current.name != input.name
            && product_service::name_exists(&self.pool, &input.name, Some(id)).await?
        {
            return Err(WorkflowError::DuplicateName(input.name.clone()));
        }

        let mut tx = self.pool.begin().await?;
        let row = match product_service::update_by_id(&mut *tx, id, input, update.state).await {
            Ok(Some(row)) => row,
            Ok(None) => return Err(self.abort(tx, &[], WorkflowError::UpdateFailed).await),
            Err(e) => {
                let err = WorkflowError::from_write(e, &input.name);
                return Err(self.abort(tx, &[], err).await);
            }
        };
        debug!(product_id = id, "Update: product row updated");

        for url in &update.deleted_images {
            if let Err(e) = self.media.delete(url).await {
                let err = WorkflowError::ImageDeleteFailed(e.to_string());
                return Err(self.abort(tx, &[], err).await);
            }
            if let Err(e) = image_service::delete_by_url(&mut *tx, id, url).await {
                let err = WorkflowError::ImageDeleteFailed(e.to_string());
                return Err(self.abort(tx, &[], err).await);
            }
            debug!(product_id = id, url = %url, "Update: image deleted");
        }

        let mut added = vec![];
        if !files.is_empty() {
            added = match self.attach_images(&mut tx, id, &files).await {
                Ok(urls) => urls,
                Err((uploaded, err)) => return Err(self.abort(tx, &uploaded, err).await),
            };
        }

        if let Err(e) = tx.commit().await {
            self.compensate(&added).await;
            return Err(e.into());
        }
        info!(
            product_id = id,
            deleted = update.deleted_images.len(),
            added = added.len(),
            "Product updated"
        );

        Ok(UpdateOutcome::Updated(row))
    }
}
