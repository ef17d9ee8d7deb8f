/// Task endpoints
///
/// All endpoints require authentication. Every storage call is scoped to the
/// caller; a task owned by someone else answers exactly like a missing one.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks?category_id=N` - List the caller's tasks, newest first
/// - `GET /tasks/:id` - Get one task
/// - `PUT /tasks/:id` - Replace a task
/// - `PATCH /tasks/:id` - Set the completion flag
/// - `DELETE /tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tasknest_shared::{
    auth::{
        authorization::{authorize, authorize_mutation, OwnerScope},
        middleware::AuthUser,
    },
    models::task::{CreateTask, Task, UpdateTask},
};
use validator::{Validate, ValidationError};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Title is required".into());
        return Err(err);
    }
    Ok(())
}

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(
        length(max = 255, message = "Title must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    pub description: Option<String>,

    pub category_id: Option<i64>,

    /// RFC 3339 timestamp, not in the past
    pub due_date: Option<String>,
}

/// Replace task request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(
        length(max = 255, message = "Title must be at most 255 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    pub description: Option<String>,

    pub category_id: Option<i64>,

    /// RFC 3339 timestamp, not in the past
    pub due_date: Option<String>,

    #[serde(default)]
    pub completed: bool,
}

/// Completion flag request
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub completed: bool,
}

/// Task list filter
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub category_id: Option<i64>,
}

/// Parses an optional RFC 3339 deadline and rejects past instants
fn parse_due_date(raw: Option<&str>, now: DateTime<Utc>) -> ApiResult<Option<DateTime<Utc>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let due = DateTime::parse_from_rfc3339(raw)
        .map_err(|_| {
            ApiError::ValidationError(vec![ValidationErrorDetail::new(
                "due_date",
                "Invalid date format, expected RFC 3339",
            )])
        })?
        .with_timezone(&Utc);

    if due < now {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail::new(
            "due_date",
            "Due date cannot be in the past",
        )]));
    }

    Ok(Some(due))
}

/// Fails with 404 unless `category_id` is absent or one of the caller's categories
async fn ensure_category(
    state: &AppState,
    scope: &OwnerScope,
    category_id: Option<i64>,
) -> ApiResult<()> {
    if let Some(id) = category_id {
        if state.categories.find_category(scope, id).await?.is_none() {
            return Err(ApiError::NotFound("Category not found".to_string()));
        }
    }
    Ok(())
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Missing title, bad or past due date
/// - `404 Not Found`: `category_id` is not one of the caller's categories
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;
    req.validate()?;

    let scope = OwnerScope::from(&user);
    let due_date = parse_due_date(req.due_date.as_deref(), Utc::now())?;
    ensure_category(&state, &scope, req.category_id).await?;

    let task = state
        .tasks
        .create_task(
            &scope,
            CreateTask {
                title: req.title,
                description: req.description,
                category_id: req.category_id,
                due_date,
            },
        )
        .await?
        // Category vanished between the check and the insert
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    tracing::info!(user_id = user.user_id, task_id = task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// List the caller's tasks, optionally filtered by category
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state
        .tasks
        .list_tasks(&OwnerScope::from(&user), query.category_id)
        .await?;

    Ok(Json(tasks))
}

/// Get one task
///
/// # Errors
///
/// - `404 Not Found`: No such task for this caller
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = authorize(state.tasks.find_task(&OwnerScope::from(&user), id).await?)?;
    Ok(Json(task))
}

/// Replace a task
///
/// # Errors
///
/// - `400 Bad Request`: Missing title, bad or past due date
/// - `404 Not Found`: No such task, or `category_id` is not the caller's
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = payload?;
    req.validate()?;

    let scope = OwnerScope::from(&user);
    let due_date = parse_due_date(req.due_date.as_deref(), Utc::now())?;
    ensure_category(&state, &scope, req.category_id).await?;

    let updated = state
        .tasks
        .update_task(
            &scope,
            id,
            UpdateTask {
                title: req.title,
                description: req.description,
                category_id: req.category_id,
                due_date,
                completed: req.completed,
            },
        )
        .await?;

    Ok(Json(authorize(updated)?))
}

/// Set the completion flag of a task
pub async fn set_task_completion(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<CompletionRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(req) = payload?;

    let updated = state
        .tasks
        .set_task_completed(&OwnerScope::from(&user), id, req.completed)
        .await?;

    Ok(Json(authorize(updated)?))
}

/// Delete a task
///
/// # Errors
///
/// - `404 Not Found`: No such task for this caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state.tasks.delete_task(&OwnerScope::from(&user), id).await?;
    authorize_mutation(deleted)?;

    tracing::info!(user_id = user.user_id, task_id = id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_due_date() {
        let now = Utc::now();

        assert_eq!(parse_due_date(None, now).unwrap(), None);

        let future = (now + Duration::days(1)).to_rfc3339();
        assert!(parse_due_date(Some(future.as_str()), now).unwrap().is_some());

        let past = (now - Duration::days(1)).to_rfc3339();
        assert!(matches!(
            parse_due_date(Some(past.as_str()), now),
            Err(ApiError::ValidationError(_))
        ));

        assert!(matches!(
            parse_due_date(Some("tomorrow"), now),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_blank_title_rejected() {
        let req = CreateTaskRequest {
            title: "   ".to_string(),
            description: None,
            category_id: None,
            due_date: None,
        };
        assert!(req.validate().is_err());
    }
}
