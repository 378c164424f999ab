//! Task model shared by the client, the cache, and the API server.
//!
//! A [`Task`] is a single to-do item. Its identifier is assigned by the
//! server and is opaque to clients; everything else is user-editable.
//! [`NewTask`] and [`TaskPatch`] are the request bodies for create and
//! update respectively.

use serde::{Deserialize, Serialize};

/// Default maximum length of a task's text, in characters.
pub const MAX_TASK_TEXT_LENGTH: usize = 256;

/// Server-assigned task identifier.
///
/// Clients never mint these; they only echo back what the API returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a server-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default.
    #[default]
    Normal,
    /// Do it first.
    High,
}

impl Priority {
    /// Every priority in ascending order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Normal, Self::High];

    /// Lowercase label, identical to the JSON form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// The next priority, wrapping from `High` back to `Low`.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Low => Self::Normal,
            Self::Normal => Self::High,
            Self::High => Self::Low,
        }
    }

    /// The previous priority, wrapping from `Low` back to `High`.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::Normal => Self::Low,
            Self::High => Self::Normal,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A to-do item as returned by the task API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier, unique within a collection.
    pub id: TaskId,
    /// Free-form user text.
    pub text: String,
    /// Priority.
    pub priority: Priority,
    /// Whether the task is done.
    #[serde(default)]
    pub completed: bool,
}

/// User input from the task editor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task text.
    pub text: String,
    /// Task priority.
    pub priority: Priority,
}

impl TaskDraft {
    /// Creates a draft from text and priority.
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }
}

/// Body of a create request. The server answers with a full [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task text.
    pub text: String,
    /// Task priority.
    pub priority: Priority,
    /// Always `false` for tasks created from the editor.
    #[serde(default)]
    pub completed: bool,
}

impl From<TaskDraft> for NewTask {
    fn from(draft: TaskDraft) -> Self {
        Self {
            text: draft.text,
            priority: draft.priority,
            completed: false,
        }
    }
}

impl NewTask {
    /// Attaches a server-assigned id, producing the stored task.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            text: self.text,
            priority: self.priority,
            completed: self.completed,
        }
    }
}

/// Body of a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// New priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New completion flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// A patch that only sets `completed`.
    #[must_use]
    pub const fn completed(completed: bool) -> Self {
        Self {
            text: None,
            priority: None,
            completed: Some(completed),
        }
    }

    /// A patch that replaces text and priority from an editor draft.
    #[must_use]
    pub fn from_draft(draft: TaskDraft) -> Self {
        Self {
            text: Some(draft.text),
            priority: Some(draft.priority),
            completed: None,
        }
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.priority.is_none() && self.completed.is_none()
    }

    /// Applies every present field to `task` in one step.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(text) = &self.text {
            task.text.clone_from(text);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
