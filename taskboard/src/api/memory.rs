//! In-process task API for offline use and testing.
//!
//! [`InMemoryTaskApi`] behaves like the remote server: it assigns ids,
//! answers updates with the full entity, and reports unknown ids as
//! [`ApiError::NotFound`]. Failures can be queued with
//! [`fail_next`](InMemoryTaskApi::fail_next) to exercise error paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use super::{ApiError, BackendKind, TaskApi};

/// Which operation a call was, for request accounting in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// `fetch_all`.
    FetchAll,
    /// `create`.
    Create,
    /// `update` of the given id.
    Update(TaskId),
    /// `delete` of the given id.
    Delete(TaskId),
}

/// Server-like task backend held entirely in memory.
pub struct InMemoryTaskApi {
    tasks: Mutex<Vec<Task>>,
    next_id: AtomicU64,
    failures: Mutex<VecDeque<ApiError>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl Default for InMemoryTaskApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTaskApi {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a backend preloaded with `tasks`.
    ///
    /// Generated ids are numeric strings starting above every numeric id
    /// already present. Ids held by existing tasks are skipped.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let highest = tasks
            .iter()
            .filter_map(|t| t.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            tasks: Mutex::new(tasks),
            next_id: AtomicU64::new(highest.saturating_add(1)),
            failures: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes the next call fail with `error` instead of touching any task.
    ///
    /// Queued failures are consumed in FIFO order, one per call.
    pub fn fail_next(&self, error: ApiError) {
        self.failures.lock().push_back(error);
    }

    /// Snapshot of the server-side collection.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    /// Records the call and pops a queued failure, if any.
    fn begin(&self, call: ApiCall) -> Result<(), ApiError> {
        self.calls.lock().push(call);
        self.failures.lock().pop_front().map_or(Ok(()), Err)
    }
}

impl TaskApi for InMemoryTaskApi {
    async fn fetch_all(&self) -> Result<Vec<Task>, ApiError> {
        self.begin(ApiCall::FetchAll)?;
        Ok(self.tasks())
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task, ApiError> {
        self.begin(ApiCall::Create)?;
        let mut tasks = self.tasks.lock();
        let id = loop {
            let candidate = TaskId::new(self.next_id.fetch_add(1, Ordering::Relaxed).to_string());
            if !tasks.iter().any(|t| t.id == candidate) {
                break candidate;
            }
        };
        let task = new_task.clone().into_task(id);
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.begin(ApiCall::Update(id.clone()))?;
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        self.begin(ApiCall::Delete(id.clone()))?;
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id != *id);
        if tasks.len() == before {
            return Err(ApiError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::InMemory
    }
}
