use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::models::{ProductCreated, ProductDetail, ProductSummary};
use crate::error::ApiError;
use crate::filter::ProductFilter;
use crate::handlers::path_id;
use crate::media::ImageUpload;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schemas::product::ProductForm;
use crate::schemas::{parse_id, FieldErrors};
use crate::services::{product_service, PageQuery, Pagination};
use crate::state::AppState;
use crate::workflow::{ProductWorkflow, UpdateOutcome};

/// Multipart field carrying image files.
pub const IMAGE_FIELD: &str = "imgs";

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Serialize)]
pub struct ProductPage<T> {
    pub total: i64,
    pub products: Vec<T>,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(e.body_text())
    } else {
        ApiError::bad_request(format!("Multipart error: {}", e.body_text()))
    }
}

/// Collect a multipart body into a `ProductForm`, enforcing the per-product file limit.
pub async fn read_product_form(
    mut multipart: Multipart,
    max_images: usize,
) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD || field.file_name().is_some() {
            if form.files.len() >= max_images {
                let mut errors = FieldErrors::new();
                errors.insert(
                    IMAGE_FIELD.to_string(),
                    vec![format!("At most {} images are allowed", max_images)],
                );
                return Err(ApiError::validation_error("Validation failed", Some(errors)));
            }

            let file_name = field.file_name().unwrap_or("image").to_string();
            let content_type = field.content_type().map(str::to_string);
            if let Some(ct) = &content_type {
                if !ct.starts_with("image/") && ct != "application/octet-stream" {
                    let mut errors = FieldErrors::new();
                    errors.insert(
                        IMAGE_FIELD.to_string(),
                        vec![format!("'{}' is not an image", file_name)],
                    );
                    return Err(ApiError::validation_error("Validation failed", Some(errors)));
                }
            }

            let bytes = field
                .bytes()
                .await
                .map_err(multipart_error)?;
            if bytes.is_empty() {
                continue;
            }

            form.push_file(ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(multipart_error)?;
            form.push_text(name, value);
        }
    }

    Ok(form)
}

/// GET /products - available products only
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<ProductPage<ProductSummary>> {
    let category_id = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            parse_id(raw).ok_or_else(|| ApiError::bad_request(format!("Invalid category '{}'", raw)))?,
        ),
    };

    let filter = ProductFilter::public(query.search, category_id);
    let page = Pagination::from_query(&query.page, &state.config.filter);

    let (total, products) = tokio::try_join!(
        product_service::count(&state.pool, &filter),
        product_service::fetch_summary_page(&state.pool, &filter, &page),
    )?;

    Ok(ApiResponse::ok("Products retrieved", ProductPage { total, products }))
}

/// GET /products/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProductDetail> {
    let id = path_id(&id)?;
    let product = product_service::fetch_detail(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(ApiResponse::ok("Product retrieved", product))
}

/// POST /products - multipart form with images under `imgs`
pub async fn create(State(state): State<AppState>, multipart: Multipart) -> ApiResult<ProductCreated> {
    let form = read_product_form(multipart, state.config.api.max_images_per_product).await?;
    let created = ProductWorkflow::from_state(&state).create(form).await?;
    Ok(ApiResponse::created("Product created", created))
}

/// PATCH /products/:id - multipart form, optional `deletedImages` and new files
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<UpdateOutcome> {
    let form = read_product_form(multipart, state.config.api.max_images_per_product).await?;
    let outcome = ProductWorkflow::from_state(&state).update(&id, form).await?;

    let message = match &outcome {
        UpdateOutcome::Updated(_) => "Product updated",
        UpdateOutcome::NoChanges(_) => "No changes detected",
    };
    Ok(ApiResponse::ok(message, outcome))
}

/// DELETE /products/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = ProductWorkflow::from_state(&state).delete(&id).await?;
    Ok(ApiResponse::ok("Product deleted", json!({ "id": id })))
}
