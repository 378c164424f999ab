//! Task collection state and its synchronization with the API and cache.
//!
//! [`TaskStore`] owns the authoritative in-memory task list. UI actions
//! arrive as [`Intent`]s; anything that needs the server becomes an
//! [`ApiRequest`](crate::sync::ApiRequest), and the local collection only
//! changes once the matching outcome reports success.

pub mod filter;
pub mod intent;
pub mod store;

pub use filter::filter_tasks;
pub use intent::Intent;
pub use store::{Mode, Source, TaskStore};

use taskboard_proto::task::TaskId;
use thiserror::Error;

use crate::api::ApiError;

/// Problems with editor input, caught before any request is sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DraftError {
    /// Task text is empty or whitespace.
    #[error("task text cannot be empty")]
    TextEmpty,
    /// Task text exceeds the configured maximum.
    #[error("task text too long (max {max} characters)")]
    TextTooLong {
        /// Configured maximum, in characters.
        max: usize,
    },
}

/// Errors surfaced by [`TaskStore`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The task API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The operation targets an id that is not in the collection.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Editor input was rejected.
    #[error(transparent)]
    Draft(#[from] DraftError),
    /// An update was requested while no task is being edited.
    #[error("no task is being edited")]
    NotEditing,
    /// The server answered an update with a different task.
    #[error("server returned task {returned} for an update of {requested}")]
    IdMismatch {
        /// Id the update was sent for.
        requested: TaskId,
        /// Id in the server's response.
        returned: TaskId,
    },
}

impl StoreError {
    /// Returns `true` if the API could not be reached.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_network())
    }
}
