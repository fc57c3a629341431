use serde::Serialize;
use sqlx::PgPool;

use crate::database::DatabaseError;
use crate::filter::ProductFilter;
use crate::services::{category_service, product_service, sub_category_service};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub categories: i64,
    pub sub_categories: i64,
    pub products: i64,
}

impl DashboardCounts {
    pub fn is_empty(&self) -> bool {
        self.categories == 0 && self.sub_categories == 0 && self.products == 0
    }
}

/// The three counts are independent and issued concurrently.
pub async fn counts(pool: &PgPool) -> Result<DashboardCounts, DatabaseError> {
    let all_products = ProductFilter::default();
    let (categories, sub_categories, products) = tokio::try_join!(
        category_service::count(pool),
        sub_category_service::count(pool),
        product_service::count(pool, &all_products),
    )?;

    Ok(DashboardCounts {
        categories,
        sub_categories,
        products,
    })
}
