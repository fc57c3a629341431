use futures::future::join_all;
use tracing::{debug, info};

use super::{parse_product_id, ProductWorkflow, WorkflowError};
use crate::services::{image_service, product_service};

impl ProductWorkflow {
    /// Remove the remote images, then the product row; image rows cascade.
    pub async fn delete(&self, raw_id: &str) -> Result<i32, WorkflowError> {
        let id = parse_product_id(raw_id)?;
        let urls = image_service::urls_for_product(&self.pool, id).await?;

        let mut tx = self.pool.begin().await?;

        let results = join_all(urls.iter().map(|url| self.media.delete(url))).await;
        if let Some(e) = results.into_iter().find_map(Result::err) {
            let err = WorkflowError::ImageDeleteFailed(e.to_string());
            return Err(self.abort(tx, &[], err).await);
        }
        debug!(product_id = id, images = urls.len(), "Delete: remote images removed");

        match product_service::delete_by_id(&mut *tx, id).await {
            Ok(true) => {}
            Ok(false) => return Err(self.abort(tx, &[], WorkflowError::NotFound(id)).await),
            Err(e) => return Err(self.abort(tx, &[], e.into()).await),
        }

        tx.commit().await?;
        info!(product_id = id, "Product deleted");
        Ok(id)
    }
}
