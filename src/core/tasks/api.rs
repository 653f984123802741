//! Task API endpoints
//!
//! Provides REST API endpoints for Kanban task management:
//! - POST /api/tasks - Create a task owned by the caller
//! - GET /api/tasks - List the caller's tasks (optional ?status= filter)
//! - GET /api/tasks/:id - Get a task by ID
//! - PUT /api/tasks/:id - Partially update a task
//! - DELETE /api/tasks/:id - Delete a task
//!
//! Every route sits behind the session gateway, so handlers always have a
//! resolved [`CurrentUser`]. Mutations additionally pass the ownership
//! guard: a task that exists but belongs to someone else yields 403, one
//! that does not exist yields 404.

use axum::{
    Extension, Json, Router, middleware,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::auth::middleware::{CurrentUser, require_auth};
use crate::core::auth::service::AuthService;
use crate::core::db::models::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use crate::core::db::repositories::{TaskRepository, TaskRepositoryError};

/// Task API state containing the task repository
#[derive(Clone)]
pub struct TaskApiState {
    pub task_repo: TaskRepository,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// Task API error types
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    #[error("Title required")]
    TitleRequired,

    #[error("Task not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<TaskRepositoryError> for TaskApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound => TaskApiError::NotFound,
            TaskRepositoryError::DatabaseError(e) => TaskApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            TaskApiError::TitleRequired => (StatusCode::BAD_REQUEST, self.to_string()),
            TaskApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            TaskApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            TaskApiError::InternalError(detail) => {
                tracing::error!("task api internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(ApiError { message })).into_response()
    }
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request for creating a task. The owner is never taken from the payload.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Query parameters for listing tasks
#[derive(Debug, Deserialize, Default)]
pub struct ListTasksQuery {
    /// Filter by board column
    pub status: Option<TaskStatus>,
}

// ============================================================================
// Router
// ============================================================================

/// Create the task API router. All routes require a valid access token.
pub fn task_api_router(state: TaskApiState, auth_service: AuthService) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/tasks", post(create_task_handler))
        .route("/api/tasks", get(list_tasks_handler))
        .route("/api/tasks/{id}", get(get_task_handler))
        .route("/api/tasks/{id}", put(update_task_handler))
        .route("/api/tasks/{id}", delete(delete_task_handler))
        .route_layer(middleware::from_fn_with_state(auth_service, require_auth))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/tasks
/// Create a new task owned by the caller
async fn create_task_handler(
    State(state): State<Arc<TaskApiState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), TaskApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(TaskApiError::TitleRequired);
    }

    tracing::info!("Creating task '{}' for user {}", title, user.id);

    let dto = CreateTask {
        owner_id: user.id,
        title: title.to_string(),
        description: request.description,
        assignee: request.assignee,
        priority: request.priority.unwrap_or_default(),
        status: request.status.unwrap_or_default(),
    };

    let task = state.task_repo.create(&dto).await?;

    tracing::info!("Task created: {}", task.id);

    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks
/// List the caller's tasks, newest first
async fn list_tasks_handler(
    State(state): State<Arc<TaskApiState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, TaskApiError> {
    tracing::debug!(
        "Listing tasks for user {}, status: {:?}",
        user.id,
        query.status
    );

    let tasks = state.task_repo.list_by_owner(user.id, query.status).await?;

    Ok(Json(tasks))
}

/// GET /api/tasks/:id
/// Get a task by ID (owner only)
async fn get_task_handler(
    State(state): State<Arc<TaskApiState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, TaskApiError> {
    tracing::debug!("Getting task {}, user: {}", id, user.id);

    let task = ensure_owner(&state.task_repo, id, user.id).await?;

    Ok(Json(task))
}

/// PUT /api/tasks/:id
/// Partially update a task (owner only). Absent fields are untouched; an
/// explicit null clears description or assignee.
async fn update_task_handler(
    State(state): State<Arc<TaskApiState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTask>,
) -> Result<Json<Task>, TaskApiError> {
    tracing::info!("Updating task {} by user {}", id, user.id);

    ensure_owner(&state.task_repo, id, user.id).await?;

    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(TaskApiError::TitleRequired);
        }
    }

    let task = state.task_repo.update(id, &request).await?;

    tracing::info!("Task updated: {}", task.id);

    Ok(Json(task))
}

/// DELETE /api/tasks/:id
/// Delete a task (owner only)
async fn delete_task_handler(
    State(state): State<Arc<TaskApiState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, TaskApiError> {
    tracing::info!("Deleting task {} by user {}", id, user.id);

    ensure_owner(&state.task_repo, id, user.id).await?;

    state.task_repo.delete(id).await?;

    tracing::info!("Task deleted: {}", id);

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Ownership guard: resolve the task, then require the caller to own it.
/// A missing task is 404 regardless of the caller, so the two failure
/// modes never conflate.
async fn ensure_owner(
    task_repo: &TaskRepository,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<Task, TaskApiError> {
    let task = task_repo
        .find_by_id(task_id)
        .await?
        .ok_or(TaskApiError::NotFound)?;

    if task.owner_id != user_id {
        return Err(TaskApiError::Forbidden);
    }

    Ok(task)
}

// ============================================================================
// Tests
// ============================================================================
