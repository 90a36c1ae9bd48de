/// Task endpoints
///
/// All routes here sit behind the bearer layer; the resolved identity is
/// read back from the request extensions.
///
/// # Endpoints
///
/// - `POST   /api/v1/tasks` - Create a task
/// - `GET    /api/v1/tasks` - List own tasks (query: status, page, limit)
/// - `GET    /api/v1/tasks/:id` - Fetch one task (owner or admin)
/// - `PUT    /api/v1/tasks/:id` - Partial update (owner only)
/// - `DELETE /api/v1/tasks/:id` - Delete (owner only)
///
/// Authorization is deliberately asymmetric: an admin may read any task,
/// but update and delete remain owner-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiResponse, PageParams, Pagination},
};
use taskdeck_shared::{
    auth::identity::CurrentUser,
    models::task::{CreateTask, Task, TaskStatus, TaskWithOwner, UpdateTask},
};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// Optional status, defaults to PENDING
    pub status: Option<String>,
}

/// Update task request
///
/// No length rules here: the update path applies a supplied-value-wins
/// merge and empty strings are skipped rather than rejected.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Exact status filter
    pub status: Option<String>,

    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Single-task payload with owner summary
#[derive(Debug, Serialize)]
pub struct TaskData {
    pub task: TaskWithOwner,
}

/// Updated-task payload (no owner join on this path)
#[derive(Debug, Serialize)]
pub struct UpdatedTaskData {
    pub task: Task,
}

/// List payload
#[derive(Debug, Serialize)]
pub struct TaskListData {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}

/// Parses an optional status string, treating empty as absent
fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ApiError::validation(
                "status",
                "Status must be one of PENDING, IN_PROGRESS, COMPLETED",
            )
        }),
    }
}

/// Create a new task owned by the caller
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: no valid token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskData>>)> {
    req.validate()?;
    let status = parse_status(req.status.as_deref())?.unwrap_or(TaskStatus::Pending);

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: user.id,
            title: req.title,
            description: req.description,
            status,
        },
    )
    .await?;

    // Re-read with the owner summary for the response body
    let task = Task::find_with_owner(&state.db, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Task created successfully",
            TaskData { task },
        )),
    ))
}

/// List the caller's tasks
///
/// Ordered newest first; optional exact status filter; page/limit default
/// to 1/10 when absent or non-numeric. A page past the end yields an
/// empty slice, not an error.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Json<ApiResponse<TaskListData>>> {
    let status = parse_status(query.status.as_deref())?;
    let paging = PageParams {
        page: query.page,
        limit: query.limit,
    };

    let total = Task::count_by_owner(&state.db, user.id, status).await?;
    let tasks =
        Task::list_by_owner(&state.db, user.id, status, paging.limit(), paging.offset()).await?;

    Ok(Json(ApiResponse::data(TaskListData {
        tasks,
        pagination: Pagination::new(paging.page(), paging.limit(), total),
    })))
}

/// Fetch a single task
///
/// # Errors
///
/// - `404 Not Found`: no task with that ID
/// - `403 Forbidden`: caller is neither the owner nor an admin
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TaskData>>> {
    let task = Task::find_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.user_id != user.id && !user.is_admin() {
        return Err(ApiError::Forbidden(
            "Not authorized to access this task".to_string(),
        ));
    }

    Ok(Json(ApiResponse::data(TaskData { task })))
}

/// Partially update a task
///
/// Only supplied, non-empty fields are written; everything else keeps its
/// stored value. Owner only, no admin override.
///
/// # Errors
///
/// - `404 Not Found`: no task with that ID
/// - `403 Forbidden`: caller is not the owner
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<UpdatedTaskData>>> {
    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if existing.user_id != user.id {
        return Err(ApiError::Forbidden(
            "Not authorized to update this task".to_string(),
        ));
    }

    let status = parse_status(req.status.as_deref())?;
    let update = UpdateTask {
        title: req.title,
        description: req.description,
        status,
    }
    .normalize();

    let task = Task::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(ApiResponse::with_message(
        "Task updated successfully",
        UpdatedTaskData { task },
    )))
}

/// Delete a task
///
/// Owner only; the acknowledgement carries a message and no payload.
///
/// # Errors
///
/// - `404 Not Found`: no task with that ID
/// - `403 Forbidden`: caller is not the owner
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if existing.user_id != user.id {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this task".to_string(),
        ));
    }

    Task::delete(&state.db, id).await?;

    Ok(Json(ApiResponse::message("Task deleted successfully")))
}
