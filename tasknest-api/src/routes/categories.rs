/// Category endpoints
///
/// All endpoints require authentication and only ever see the caller's
/// categories.
///
/// # Endpoints
///
/// - `POST /categories` - Create a category
/// - `GET /categories` - List the caller's categories, newest first
/// - `GET /categories/:id` - Get one category
/// - `DELETE /categories/:id` - Delete a category; its tasks are kept, uncategorized

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasknest_shared::{
    auth::{
        authorization::{authorize, authorize_mutation, OwnerScope},
        middleware::AuthUser,
    },
    models::category::{Category, CreateCategory},
};
use validator::Validate;

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(req) = payload?;
    req.validate()?;

    let category = state
        .categories
        .create_category(&OwnerScope::from(&user), CreateCategory { name: req.name })
        .await?;

    tracing::info!(user_id = user.user_id, category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state
        .categories
        .list_categories(&OwnerScope::from(&user))
        .await?;

    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let found = state
        .categories
        .find_category(&OwnerScope::from(&user), id)
        .await?;

    Ok(Json(authorize(found)?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state
        .categories
        .delete_category(&OwnerScope::from(&user), id)
        .await?;
    authorize_mutation(deleted)?;

    tracing::info!(user_id = user.user_id, category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
