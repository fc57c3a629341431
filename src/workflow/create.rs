use tracing::{debug, info};

use super::{ProductWorkflow, WorkflowError};
use crate::database::models::ProductCreated;
use crate::pricing::discounted_price;
use crate::schemas::product::ProductForm;
use crate::services::product_service;

impl ProductWorkflow {
    /// Validate, insert the product, upload its images and record them, all or nothing.
    pub async fn create(&self, form: ProductForm) -> Result<ProductCreated, WorkflowError> {
        let (input, files) = form.into_create().map_err(WorkflowError::ValidationFailed)?;
        debug!(name = %input.name, files = files.len(), "Create: validated");

        if product_service::name_exists(&self.pool, &input.name, None).await? {
            return Err(WorkflowError::DuplicateName(input.name));
        }

        let discounted = discounted_price(input.original_price, Some(input.discount));

        let mut tx = self.pool.begin().await?;
        let product_id = match product_service::insert(&mut *tx, &input).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(self.abort(tx, &[], WorkflowError::InsertFailed).await),
            Err(e) => {
                let err = WorkflowError::from_write(e, &input.name);
                return Err(self.abort(tx, &[], err).await);
            }
        };
        debug!(product_id, "Create: product row inserted");

        let images = match self.attach_images(&mut tx, product_id, &files).await {
            Ok(urls) => urls,
            Err((uploaded, err)) => return Err(self.abort(tx, &uploaded, err).await),
        };

        if let Err(e) = tx.commit().await {
            self.compensate(&images).await;
            return Err(e.into());
        }
        info!(product_id, images = images.len(), "Product created");

        Ok(ProductCreated {
            id: product_id,
            name: input.name,
            original_price: input.original_price,
            discount: input.discount,
            discounted_price: discounted,
            images,
        })
    }
}
