use axum::extract::{Path, State};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::Category;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::path_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::schemas::category::{CreateCategory, UpdateCategory};
use crate::schemas::ValidatedJson;
use crate::services::category_service;
use crate::state::AppState;

fn duplicate(name: &str) -> ApiError {
    ApiError::bad_request(format!("Category '{}' already exists", name))
}

/// GET /categories - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = category_service::fetch_all(&state.pool).await?;
    Ok(ApiResponse::ok("Categories retrieved", categories))
}

/// GET /categories/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Category> {
    let id = path_id(&id)?;
    let category = category_service::fetch_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;
    Ok(ApiResponse::ok("Category retrieved", category))
}

/// POST /categories
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateCategory>,
) -> ApiResult<Category> {
    let name = body.name.trim();
    if category_service::name_exists(&state.pool, name, None).await? {
        return Err(duplicate(name));
    }

    let category = match category_service::insert(&state.pool, name, body.description.trim()).await {
        Ok(category) => category,
        Err(DatabaseError::UniqueViolation(_)) => return Err(duplicate(name)),
        Err(e) => return Err(e.into()),
    };

    info!(category_id = category.id, "Category created");
    Ok(ApiResponse::created("Category created", category))
}

/// PATCH /categories/:id - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateCategory>,
) -> ApiResult<Category> {
    let id = path_id(&id)?;
    let current = category_service::fetch_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

    let name = body.name.as_deref().map(str::trim).unwrap_or(current.name.as_str()).to_string();
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or(current.description.as_str())
        .to_string();

    if name == current.name && description == current.description {
        return Ok(ApiResponse::ok("No changes detected", current));
    }

    if name != current.name && category_service::name_exists(&state.pool, &name, Some(id)).await? {
        return Err(duplicate(&name));
    }

    let mut tx = state.pool.begin().await.map_err(DatabaseError::from)?;
    let updated = match category_service::update_by_id(&mut *tx, id, &name, &description).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Err(ApiError::not_found("Category not found"));
        }
        Err(e) => {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Err(match e {
                DatabaseError::UniqueViolation(_) => duplicate(&name),
                other => other.into(),
            });
        }
    };
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(category_id = id, "Category updated");
    Ok(ApiResponse::ok("Category updated", updated))
}

/// DELETE /categories/:id - refused while sub-categories reference it
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = path_id(&id)?;
    match category_service::delete_by_id(&state.pool, id).await {
        Ok(true) => {
            info!(category_id = id, "Category deleted");
            Ok(ApiResponse::ok("Category deleted", json!({ "id": id })))
        }
        Ok(false) => Err(ApiError::not_found("Category not found")),
        Err(DatabaseError::ForeignKeyViolation(_)) => Err(ApiError::conflict(
            "Category still has sub-categories and cannot be deleted",
        )),
        Err(e) => Err(e.into()),
    }
}
