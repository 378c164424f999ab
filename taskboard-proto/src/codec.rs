//! JSON encoding for task collections.
//!
//! The persisted cache and the HTTP API both carry tasks as JSON. A
//! snapshot is a JSON array of [`Task`] in display order. Decoding checks
//! shape (via serde) and rejects snapshots whose ids are not unique.

use std::collections::HashSet;

use crate::task::{Task, TaskId};

/// Error type for snapshot encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Two tasks in one snapshot share an id.
    #[error("duplicate task id in snapshot: {0}")]
    DuplicateId(TaskId),
}

/// Encodes a task collection as a JSON array.
///
/// # Errors
///
/// Returns [`CodecError::Serialization`] if a task cannot be serialized.
pub fn encode_snapshot(tasks: &[Task]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(tasks)?)
}

/// Decodes a JSON array of tasks, preserving order.
///
/// # Errors
///
/// Returns [`CodecError::Serialization`] for malformed JSON or a wrong shape,
/// and [`CodecError::DuplicateId`] if any id appears twice.
pub fn decode_snapshot(json: &str) -> Result<Vec<Task>, CodecError> {
    let tasks: Vec<Task> = serde_json::from_str(json)?;
    ensure_unique_ids(&tasks)?;
    Ok(tasks)
}

/// Checks that no two tasks share an id.
///
/// # Errors
///
/// Returns [`CodecError::DuplicateId`] naming the first repeated id.
pub fn ensure_unique_ids(tasks: &[Task]) -> Result<(), CodecError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(&task.id) {
            return Err(CodecError::DuplicateId(task.id.clone()));
        }
    }
    Ok(())
}
