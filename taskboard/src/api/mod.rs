//! Remote task API abstraction for `taskboard`.
//!
//! Defines the [`TaskApi`] trait that every backend must satisfy.
//! Concrete implementations:
//! - [`http::HttpTaskApi`] — REST client for a json-server style API
//! - [`memory::InMemoryTaskApi`] — in-process backend for offline use and testing

pub mod http;
pub mod memory;

use std::fmt;

use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

/// Describes which kind of backend is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote REST API over HTTP.
    Http,
    /// In-process store, nothing leaves the machine.
    InMemory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::InMemory => write!(f, "Offline"),
        }
    }
}

/// Errors that can occur while talking to the task API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The API could not be reached.
    #[error("network failure: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The API answered with a failure status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The API has no task with this id.
    #[error("task not found on server: {0}")]
    NotFound(TaskId),

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` for failures where the API was never reached.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }
}

/// Async CRUD interface over the remote task collection.
///
/// The server is authoritative: ids come from [`TaskApi::create`], and
/// every mutation answers with the full entity as stored.
pub trait TaskApi: Send + Sync {
    /// Fetch every task, in server order.
    fn fetch_all(&self) -> impl std::future::Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Create a task. The returned task carries the server-assigned id.
    fn create(
        &self,
        new_task: &NewTask,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Apply a partial update and return the full updated task.
    fn update(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<Task, ApiError>> + Send;

    /// Delete a task.
    fn delete(&self, id: &TaskId) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    /// Return the type of this backend.
    fn backend_kind(&self) -> BackendKind;
}
