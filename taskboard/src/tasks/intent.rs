//! UI intents consumed by [`TaskStore`](super::TaskStore).

use taskboard_proto::task::{TaskDraft, TaskId};

/// Something the user asked for.
///
/// Views never call store methods directly; they produce intents and the
/// store decides what changes locally and what goes to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Replace the filter text.
    SetFilter(String),
    /// Open the editor for a new task.
    OpenCreate,
    /// Close the new-task editor without saving.
    CloseCreate,
    /// Open the editor for an existing task.
    OpenEdit(TaskId),
    /// Close the edit editor without saving.
    CloseEdit,
    /// Create a task from the draft.
    AddTask(TaskDraft),
    /// Save text and priority of the task being edited.
    UpdateTask(TaskDraft),
    /// Delete a task.
    Delete(TaskId),
    /// Flip a task's completion flag.
    ToggleCompleted(TaskId),
    /// Clear the surfaced error.
    DismissError,
}
