//! REST task API over an in-memory [`TaskRepository`].
//!
//! Routes follow the json-server layout the client expects:
//!
//! | Method   | Path          | Body        | Response          |
//! |----------|---------------|-------------|-------------------|
//! | `GET`    | `/tasks`      |             | `200` `[Task]`    |
//! | `POST`   | `/tasks`      | `NewTask`   | `201` `Task`      |
//! | `GET`    | `/tasks/{id}` |             | `200` `Task`      |
//! | `PATCH`  | `/tasks/{id}` | `TaskPatch` | `200` `Task`      |
//! | `DELETE` | `/tasks/{id}` |             | `204`             |
//!
//! Unknown ids answer `404`; an empty text or an empty patch answers `400`.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use taskboard_proto::routes;
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use crate::repository::TaskRepository;

/// Shared state handed to every handler.
pub struct ApiState {
    /// Backing task storage.
    pub repository: TaskRepository,
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new(TaskRepository::new())
    }
}

impl ApiState {
    /// Wraps a repository.
    #[must_use]
    pub const fn new(repository: TaskRepository) -> Self {
        Self { repository }
    }
}

/// Request failures, rendered as a status code plus `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    /// No task has the requested id.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// A task's text was empty or whitespace.
    #[error("task text cannot be empty")]
    EmptyText,
    /// A patch carried no fields.
    #[error("patch must set at least one field")]
    EmptyPatch,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyText | Self::EmptyPatch => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Builds the router with all task routes bound to `state`.
pub fn router(state: Arc<ApiState>) -> axum::Router {
    let collection = format!("/{}", routes::TASKS);
    let item = format!("/{}/{{id}}", routes::TASKS);
    axum::Router::new()
        .route(&collection, get(list_tasks).post(create_task))
        .route(
            &item,
            get(get_task).patch(update_task).delete(delete_task),
        )
        .with_state(state)
}

/// Starts the API server on the given address and returns the bound address
/// and a join handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(ApiState::default())).await
}

/// Starts the API server with a pre-populated [`ApiState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ApiState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task api server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn list_tasks(State(state): State<Arc<ApiState>>) -> Json<Vec<Task>> {
    Json(state.repository.list().await)
}

async fn get_task(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiFailure> {
    let id = TaskId::new(id);
    state
        .repository
        .get(&id)
        .await
        .map(Json)
        .ok_or(ApiFailure::NotFound(id))
}

async fn create_task(
    State(state): State<Arc<ApiState>>,
    Json(new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiFailure> {
    if new_task.text.trim().is_empty() {
        return Err(ApiFailure::EmptyText);
    }
    let task = state.repository.insert(new_task).await;
    tracing::info!(task_id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiFailure> {
    if patch.is_empty() {
        return Err(ApiFailure::EmptyPatch);
    }
    if patch.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiFailure::EmptyText);
    }
    let id = TaskId::new(id);
    let task = state
        .repository
        .patch(&id, &patch)
        .await
        .ok_or_else(|| ApiFailure::NotFound(id.clone()))?;
    tracing::debug!(task_id = %id, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let id = TaskId::new(id);
    if state.repository.remove(&id).await {
        tracing::info!(task_id = %id, "task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiFailure::NotFound(id))
    }
}
