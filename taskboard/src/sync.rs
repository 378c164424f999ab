//! Background worker that runs task API requests for the TUI.
//!
//! The TUI event loop is synchronous (crossterm poll-based) and must never
//! wait on the network. It hands [`ApiRequest`]s to a tokio worker through
//! a [`SyncCommand`] channel and drains finished [`ApiOutcome`]s on each
//! tick.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── ApiOutcome ───  tokio worker (one task per request)
//!                     ─── SyncCommand →
//! ```
//!
//! Requests run concurrently and are never cancelled or retried; outcomes
//! arrive in completion order, not submission order.

use std::sync::Arc;

use tokio::sync::mpsc;

use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use crate::api::{ApiError, TaskApi};

/// Default channel capacity for commands and outcomes.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Tags a create request so its reply can be matched to the editor that
/// sent it.
pub type Ticket = u64;

/// Why an update was sent; decides what the store does with the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    /// Completion flag flipped from the list.
    Toggle,
    /// Text/priority saved from the editor.
    Edit,
}

/// A call the store wants made against the task API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Load the whole collection.
    FetchAll,
    /// Create a task.
    Create {
        /// Matches the reply to the save that sent it.
        ticket: Ticket,
        /// Task to create.
        task: NewTask,
    },
    /// Patch an existing task.
    Update {
        /// Task to patch.
        id: TaskId,
        /// Fields to change.
        patch: TaskPatch,
        /// What triggered the update.
        reason: UpdateReason,
    },
    /// Delete a task.
    Delete(TaskId),
}

/// The settled result of an [`ApiRequest`], carrying enough context for
/// the store to apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    /// Result of [`ApiRequest::FetchAll`].
    Fetched(Result<Vec<Task>, ApiError>),
    /// Result of [`ApiRequest::Create`].
    Created {
        /// Ticket of the request.
        ticket: Ticket,
        /// Server reply.
        result: Result<Task, ApiError>,
    },
    /// Result of [`ApiRequest::Update`].
    Updated {
        /// Task the update was sent for.
        id: TaskId,
        /// What triggered the update.
        reason: UpdateReason,
        /// Server reply.
        result: Result<Task, ApiError>,
    },
    /// Result of [`ApiRequest::Delete`].
    Deleted {
        /// Task the delete was sent for.
        id: TaskId,
        /// Server reply.
        result: Result<(), ApiError>,
    },
}

impl ApiOutcome {
    /// The failure carried by this outcome, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Fetched(Err(e))
            | Self::Created { result: Err(e), .. }
            | Self::Updated { result: Err(e), .. }
            | Self::Deleted { result: Err(e), .. } => Some(e),
            _ => None,
        }
    }
}

/// Commands sent from the TUI main loop to the sync worker.
#[derive(Debug)]
pub enum SyncCommand {
    /// Run a request and report its outcome.
    Execute(ApiRequest),
    /// Stop accepting requests. In-flight requests still report.
    Shutdown,
}

/// Runs one request against `api` and wraps the reply as an outcome.
pub async fn execute<A: TaskApi + ?Sized>(api: &A, request: ApiRequest) -> ApiOutcome {
    match request {
        ApiRequest::FetchAll => ApiOutcome::Fetched(api.fetch_all().await),
        ApiRequest::Create { ticket, task } => ApiOutcome::Created {
            ticket,
            result: api.create(&task).await,
        },
        ApiRequest::Update { id, patch, reason } => {
            let result = api.update(&id, &patch).await;
            ApiOutcome::Updated { id, reason, result }
        }
        ApiRequest::Delete(id) => {
            let result = api.delete(&id).await;
            ApiOutcome::Deleted { id, result }
        }
    }
}

/// Spawn the sync worker and return channel handles.
///
/// Each [`SyncCommand::Execute`] runs as its own tokio task so a slow
/// request never holds up the next one. A `capacity` of zero is raised to one.
pub fn spawn_sync<A: TaskApi + 'static>(
    api: Arc<A>,
    capacity: usize,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<ApiOutcome>) {
    let capacity = capacity.max(1);
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<ApiOutcome>(capacity);

    tokio::spawn(async move {
        command_handler(api, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: receive commands and fan requests out to tasks.
async fn command_handler<A: TaskApi + 'static>(
    api: Arc<A>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<ApiOutcome>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SyncCommand::Execute(request) => {
                tracing::debug!(?request, "dispatching api request");
                let api = Arc::clone(&api);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    let outcome = execute(api.as_ref(), request).await;
                    if let Some(e) = outcome.error() {
                        tracing::warn!(error = %e, "api request failed");
                    }
                    if evt_tx.send(outcome).await.is_err() {
                        tracing::debug!("outcome receiver dropped");
                    }
                });
            }
            SyncCommand::Shutdown => {
                tracing::info!("sync worker shutting down");
                break;
            }
        }
    }
}
