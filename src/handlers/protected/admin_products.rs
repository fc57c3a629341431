use axum::extract::{Path, Query, State};

use crate::database::models::{ProductAdmin, ProductDetailAdmin};
use crate::error::ApiError;
use crate::filter::ProductFilter;
use crate::handlers::path_id;
use crate::handlers::public::products::{ProductPage, ProductQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{product_service, Pagination};
use crate::state::AppState;

/// GET /admin/products - every state, with category names
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<ProductPage<ProductAdmin>> {
    let filter = ProductFilter::admin(query.search);
    let page = Pagination::from_query(&query.page, &state.config.filter);

    let (total, products) = tokio::try_join!(
        product_service::count(&state.pool, &filter),
        product_service::fetch_admin_page(&state.pool, &filter, &page),
    )?;

    Ok(ApiResponse::ok("Products retrieved", ProductPage { total, products }))
}

/// GET /admin/products/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProductDetailAdmin> {
    let id = path_id(&id)?;
    let product = product_service::fetch_admin_detail(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(ApiResponse::ok("Product retrieved", product))
}
