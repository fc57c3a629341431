use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::SubCategory;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::path_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schemas::sub_category::{CreateSubCategory, UpdateSubCategory};
use crate::schemas::{parse_id, ValidatedJson};
use crate::services::sub_category_service;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryQuery {
    pub category_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategoryList {
    pub total: usize,
    pub sub_categories: Vec<SubCategory>,
}

fn duplicate(name: &str) -> ApiError {
    ApiError::bad_request(format!("Sub-category '{}' already exists", name))
}

/// GET /sub-categories[?categoryId=]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SubCategoryQuery>,
) -> ApiResult<SubCategoryList> {
    let sub_categories = match query.category_id.as_deref().map(str::trim) {
        None | Some("") => sub_category_service::fetch_all(&state.pool).await?,
        Some(raw) => {
            let category_id = parse_id(raw)
                .ok_or_else(|| ApiError::bad_request(format!("Invalid categoryId '{}'", raw)))?;
            sub_category_service::fetch_by_category(&state.pool, category_id).await?
        }
    };

    Ok(ApiResponse::ok(
        "Sub-categories retrieved",
        SubCategoryList {
            total: sub_categories.len(),
            sub_categories,
        },
    ))
}

/// GET /sub-categories/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SubCategory> {
    let id = path_id(&id)?;
    let sub_category = sub_category_service::fetch_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sub-category not found"))?;
    Ok(ApiResponse::ok("Sub-category retrieved", sub_category))
}

/// POST /categories/:id/sub-categories
pub async fn create(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateSubCategory>,
) -> ApiResult<SubCategory> {
    let category_id = path_id(&category_id)?;
    let name = body.name.trim();
    if sub_category_service::name_exists(&state.pool, name, None).await? {
        return Err(duplicate(name));
    }

    let created =
        sub_category_service::insert(&state.pool, category_id, name, body.description.trim()).await;
    let sub_category = match created {
        Ok(sub_category) => sub_category,
        Err(DatabaseError::UniqueViolation(_)) => return Err(duplicate(name)),
        Err(DatabaseError::ForeignKeyViolation(_)) => {
            return Err(ApiError::not_found("Category not found"))
        }
        Err(e) => return Err(e.into()),
    };

    info!(sub_category_id = sub_category.id, category_id, "Sub-category created");
    Ok(ApiResponse::created("Sub-category created", sub_category))
}

/// PUT /categories/:categoryId/sub-categories/:subCategoryId - may move it to another category
pub async fn update(
    State(state): State<AppState>,
    Path((category_id, sub_category_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateSubCategory>,
) -> ApiResult<SubCategory> {
    let category_id = path_id(&category_id)?;
    let id = path_id(&sub_category_id)?;

    let current = sub_category_service::fetch_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sub-category not found"))?;

    let name = body.name.as_deref().map(str::trim).unwrap_or(current.name.as_str()).to_string();
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or(current.description.as_str())
        .to_string();

    if name == current.name
        && description == current.description
        && category_id == current.category_id
    {
        return Ok(ApiResponse::ok("No changes detected", current));
    }

    if name != current.name
        && sub_category_service::name_exists(&state.pool, &name, Some(id)).await?
    {
        return Err(duplicate(&name));
    }

    let mut tx = state.pool.begin().await.map_err(DatabaseError::from)?;
    let result =
        sub_category_service::update_by_id(&mut *tx, id, category_id, &name, &description).await;
    let updated = match result {
        Ok(Some(sub_category)) => sub_category,
        Ok(None) => {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Err(ApiError::not_found("Sub-category not found"));
        }
        Err(e) => {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Err(match e {
                DatabaseError::UniqueViolation(_) => duplicate(&name),
                DatabaseError::ForeignKeyViolation(_) => ApiError::not_found("Category not found"),
                other => other.into(),
            });
        }
    };
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(sub_category_id = id, category_id, "Sub-category updated");
    Ok(ApiResponse::ok("Sub-category updated", updated))
}

/// DELETE /sub-categories/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = path_id(&id)?;
    match sub_category_service::delete_by_id(&state.pool, id).await {
        Ok(true) => {
            info!(sub_category_id = id, "Sub-category deleted");
            Ok(ApiResponse::ok("Sub-category deleted", json!({ "id": id })))
        }
        Ok(false) => Err(ApiError::not_found("Sub-category not found")),
        Err(DatabaseError::ForeignKeyViolation(_)) => Err(ApiError::conflict(
            "Sub-category still has products and cannot be deleted",
        )),
        Err(e) => Err(e.into()),
    }
}
