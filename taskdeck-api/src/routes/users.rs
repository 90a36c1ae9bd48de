/// User management endpoints (admin only)
///
/// The whole group sits behind the bearer layer plus the admin gate.
///
/// # Endpoints
///
/// - `GET    /api/v1/users` - List users with task counts (query: page, limit)
/// - `GET    /api/v1/users/:id` - Fetch one user with their full task list
/// - `DELETE /api/v1/users/:id` - Delete a user (and, by cascade, their tasks)
///
/// An admin can never delete its own account through this endpoint; the
/// guard answers 400, not 403, because the request shape is wrong rather
/// than the caller's privileges.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    response::{ApiResponse, PageParams, Pagination},
};
use taskdeck_shared::{
    auth::identity::CurrentUser,
    models::{
        task::Task,
        user::{User, UserWithTaskCount},
    },
};

/// List payload
#[derive(Debug, Serialize)]
pub struct UserListData {
    pub users: Vec<UserWithTaskCount>,
    pub pagination: Pagination,
}

/// Detail payload: account fields flattened with the owned task list
#[derive(Debug, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,

    /// All tasks owned by this user, newest first
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct UserDetailData {
    pub user: UserDetail,
}

/// List all users with their task counts, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Json<ApiResponse<UserListData>>> {
    let total = User::count(&state.db).await?;
    let users = User::list_with_task_counts(&state.db, paging.limit(), paging.offset()).await?;

    Ok(Json(ApiResponse::data(UserListData {
        users,
        pagination: Pagination::new(paging.page(), paging.limit(), total),
    })))
}

/// Fetch one user together with every task they own
///
/// # Errors
///
/// - `404 Not Found`: no user with that ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserDetailData>>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let tasks = Task::list_by_user(&state.db, user.id).await?;

    Ok(Json(ApiResponse::data(UserDetailData {
        user: UserDetail { user, tasks },
    })))
}

/// Delete a user
///
/// Owned tasks are removed by the cascade on the tasks table.
///
/// # Errors
///
/// - `404 Not Found`: no user with that ID
/// - `400 Bad Request`: the admin targeted its own account
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(acting): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if target.id == acting.id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    User::delete(&state.db, id).await?;

    tracing::info!(user_id = %id, deleted_by = %acting.id, "User deleted");

    Ok(Json(ApiResponse::message("User deleted successfully")))
}
