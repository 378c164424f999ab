//! In-memory task repository backing the REST API.
//!
//! The [`TaskRepository`] keeps tasks in insertion order and assigns ids on
//! insert. Thread-safe via [`RwLock`]; every handler takes the lock for the
//! duration of one operation only.

use tokio::sync::RwLock;
use uuid::Uuid;

use taskboard_proto::codec::{CodecError, ensure_unique_ids};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

/// Ordered in-memory task collection.
pub struct TaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl Default for TaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
        }
    }

    /// Creates a repository preloaded with `tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateId`] if two seed tasks share an id.
    pub fn with_tasks(tasks: Vec<Task>) -> Result<Self, CodecError> {
        ensure_unique_ids(&tasks)?;
        Ok(Self {
            tasks: RwLock::new(tasks),
        })
    }

    /// Returns every task in insertion order.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Returns the task with `id`, if any.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().await.iter().find(|t| t.id == *id).cloned()
    }

    /// Stores a new task under a freshly generated id and returns it.
    pub async fn insert(&self, new_task: NewTask) -> Task {
        let task = new_task.into_task(TaskId::new(Uuid::now_v7().to_string()));
        self.tasks.write().await.push(task.clone());
        task
    }

    /// Applies `patch` to the task with `id` and returns the updated task.
    ///
    /// Returns `None` if no such task exists.
    pub async fn patch(&self, id: &TaskId, patch: &TaskPatch) -> Option<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.iter_mut().find(|t| t.id == *id)?;
        patch.apply_to(task);
        Some(task.clone())
    }

    /// Removes the task with `id`. Returns `false` if it did not exist.
    pub async fn remove(&self, id: &TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != *id);
        tasks.len() != before
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if no tasks are stored.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}
