//! Task API endpoints
//!
//! RESTful API for task CRUD operations.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use tasks_core::task::{Task, TaskDraft};

use crate::deadline::Deadline;
use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request extractors
// ============================================================================

/// The `{id}` path segment.
///
/// A segment that cannot be decoded (e.g. percent-encoded bytes that are not
/// UTF-8) is rejected with a JSON 400 rather than axum's plain-text one.
pub struct TaskId(pub String);

impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected task id");
                ApiError::InvalidTaskId
            })?;
        Ok(TaskId(id))
    }
}

/// A task draft decoded from the request body.
///
/// The body is parsed as JSON whatever the `Content-Type` says. Empty,
/// malformed or non-object bodies are rejected with 400, bodies over the
/// configured limit with 413.
pub struct DraftBody(pub TaskDraft);

impl<S> FromRequest<S> for DraftBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::InvalidPayload
            }
        })?;

        serde_json::from_slice(&bytes)
            .map(DraftBody)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected task payload");
                ApiError::InvalidPayload
            })
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - List all tasks
async fn list_tasks(
    State(state): State<AppState>,
    deadline: Deadline,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = deadline
        .run(state.task_store().find_all())
        .await
        .map_err(ApiError::listing)?;

    Ok(Json(tasks))
}

/// GET /tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    deadline: Deadline,
    TaskId(id): TaskId,
) -> Result<Json<Task>, ApiError> {
    let task = deadline
        .run(state.task_store().find_by_id(&id))
        .await
        .map_err(ApiError::FetchTask)?;

    task.map(Json).ok_or(ApiError::TaskNotFound)
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    deadline: Deadline,
    DraftBody(draft): DraftBody,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let new_task = draft.stamp();
    let id = deadline
        .run(state.task_store().insert(&new_task))
        .await
        .map_err(ApiError::CreateTask)?;

    tracing::debug!(task_id = %id, "Task created");
    Ok((StatusCode::CREATED, Json(new_task.into_task(id))))
}

/// PUT /tasks/{id} - Replace a task's name and completed flag
async fn replace_task(
    State(state): State<AppState>,
    deadline: Deadline,
    TaskId(id): TaskId,
    DraftBody(draft): DraftBody,
) -> Result<Json<Task>, ApiError> {
    let task = deadline
        .run(state.task_store().replace_by_id(&id, &draft))
        .await
        .map_err(ApiError::UpdateTask)?;

    task.map(Json).ok_or(ApiError::TaskNotFound)
}

/// DELETE /tasks/{id} - Delete a task
///
/// Deleting an unknown ID still answers 204.
async fn delete_task(
    State(state): State<AppState>,
    deadline: Deadline,
    TaskId(id): TaskId,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = deadline
        .run(state.task_store().delete_by_id(&id))
        .await
        .map_err(ApiError::DeleteTask)?;

    if !deleted {
        tracing::debug!(task_id = %id, "Delete of unknown task");
    }
    Ok((
        StatusCode::NO_CONTENT,
        [(header::CONTENT_TYPE, "application/json")],
    ))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(replace_task).delete(delete_task),
        )
}
