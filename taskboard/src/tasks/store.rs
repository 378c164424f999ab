//! The authoritative in-memory task collection.
//!
//! `TaskStore` is a state machine. [`TaskStore::handle`] consumes an
//! [`Intent`], applies whatever can change locally, and returns the
//! [`ApiRequest`] that must be sent for the rest. [`TaskStore::apply`]
//! folds the matching [`ApiOutcome`] back in. The collection only changes
//! from successful outcomes; failures leave it exactly as it was.

use taskboard_proto::codec;
use taskboard_proto::task::{NewTask, Task, TaskDraft, TaskId, TaskPatch};

use super::{DraftError, Intent, StoreError, filter_tasks};
use crate::api::{ApiError, TaskApi};
use crate::cache::{PersistedCache, load_snapshot, store_snapshot};
use crate::config::{FailurePolicy, StoreConfig};
use crate::sync::{ApiOutcome, ApiRequest, Ticket, UpdateReason, execute};

/// Which editor, if any, is open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// No editor open.
    #[default]
    Browsing,
    /// Creating a new task.
    Creating,
    /// Editing the task with this id.
    Editing(TaskId),
}

/// Where the current collection came from.
///
/// A cached snapshot is only a placeholder: once the remote fetch lands the
/// source becomes [`Source::Remote`] and cache loads are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    /// Nothing loaded yet.
    #[default]
    Empty,
    /// Shown from the local cache, remote fetch still pending or failed.
    Cache,
    /// Confirmed by the task API.
    Remote,
}

/// Owns the task collection, the filter, and the editor mode.
pub struct TaskStore<C> {
    tasks: Vec<Task>,
    filter: String,
    mode: Mode,
    source: Source,
    last_error: Option<StoreError>,
    config: StoreConfig,
    cache: C,
    next_ticket: Ticket,
    /// Latest save sent from the open create editor.
    awaiting_create: Option<Ticket>,
}

impl<C: PersistedCache> TaskStore<C> {
    /// Creates an empty store persisting into `cache`.
    pub fn new(cache: C, config: StoreConfig) -> Self {
        Self {
            tasks: Vec::new(),
            filter: String::new(),
            mode: Mode::Browsing,
            source: Source::Empty,
            last_error: None,
            config,
            cache,
            next_ticket: 0,
            awaiting_create: None,
        }
    }

    /// The full collection in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The collection narrowed by the current filter.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, &self.filter)
    }

    /// The filter text, verbatim.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub const fn source(&self) -> Source {
        self.source
    }

    /// The most recent surfaced failure, until dismissed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// The task being edited, if the editor is open on one.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        match &self.mode {
            Mode::Editing(id) => self.task(id),
            _ => None,
        }
    }

    /// Shows the cached snapshot as a placeholder.
    ///
    /// Returns `true` if the collection was replaced. Does nothing once the
    /// remote collection has arrived. An unreadable or malformed cache is
    /// logged and treated as absent.
    pub fn load_cached(&mut self) -> bool {
        if self.source == Source::Remote {
            tracing::debug!("remote collection already loaded, ignoring cache");
            return false;
        }
        match load_snapshot(&self.cache) {
            Ok(Some(tasks)) if !tasks.is_empty() => {
                tracing::info!(count = tasks.len(), "showing cached tasks");
                self.tasks = tasks;
                self.source = Source::Cache;
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable task cache");
                false
            }
        }
    }

    /// Shows the cache, then fetches the remote collection and lets it win.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] if the fetch fails. The cached placeholder
    /// (if any) stays in place.
    pub async fn initialize<A: TaskApi + ?Sized>(&mut self, api: &A) -> Result<(), StoreError> {
        self.load_cached();
        let outcome = execute(api, ApiRequest::FetchAll).await;
        self.apply(outcome)
    }

    /// Applies the local part of `intent` and returns the request to send,
    /// if the intent needs the API.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for ids not in the collection,
    /// [`StoreError::Draft`] for rejected editor input, and
    /// [`StoreError::NotEditing`] for an update with no task selected. No
    /// request is produced in any of these cases.
    pub fn handle(&mut self, intent: Intent) -> Result<Option<ApiRequest>, StoreError> {
        match intent {
            Intent::SetFilter(text) => {
                self.filter = text;
                Ok(None)
            }
            Intent::OpenCreate => {
                self.open_create();
                Ok(None)
            }
            Intent::CloseCreate => {
                self.close_create();
                Ok(None)
            }
            Intent::OpenEdit(id) => {
                self.require(&id)?;
                self.mode = Mode::Editing(id);
                Ok(None)
            }
            Intent::CloseEdit => {
                if matches!(self.mode, Mode::Editing(_)) {
                    self.mode = Mode::Browsing;
                }
                Ok(None)
            }
            Intent::DismissError => {
                self.last_error = None;
                Ok(None)
            }
            Intent::AddTask(draft) => {
                self.check_draft(&draft)?;
                let ticket = self.next_ticket;
                self.next_ticket = self.next_ticket.wrapping_add(1);
                if self.mode == Mode::Creating {
                    self.awaiting_create = Some(ticket);
                }
                Ok(Some(ApiRequest::Create {
                    ticket,
                    task: NewTask::from(draft),
                }))
            }
            Intent::UpdateTask(draft) => {
                let Mode::Editing(id) = &self.mode else {
                    return Err(self.fail(StoreError::NotEditing));
                };
                let id = id.clone();
                self.require(&id)?;
                self.check_draft(&draft)?;
                Ok(Some(ApiRequest::Update {
                    id,
                    patch: TaskPatch::from_draft(draft),
                    reason: UpdateReason::Edit,
                }))
            }
            Intent::Delete(id) => {
                self.require(&id)?;
                Ok(Some(ApiRequest::Delete(id)))
            }
            Intent::ToggleCompleted(id) => {
                let completed = self.require(&id)?.completed;
                Ok(Some(ApiRequest::Update {
                    id,
                    patch: TaskPatch::completed(!completed),
                    reason: UpdateReason::Toggle,
                }))
            }
        }
    }

    /// Folds a settled request into the collection.
    ///
    /// Successful outcomes update the collection and persist it. Failed
    /// outcomes change nothing but the error indicator.
    ///
    /// # Errors
    ///
    /// Returns the failure carried by `outcome`, or
    /// [`StoreError::IdMismatch`] / [`ApiError::Decode`] if a successful
    /// reply is inconsistent.
    pub fn apply(&mut self, outcome: ApiOutcome) -> Result<(), StoreError> {
        match outcome {
            ApiOutcome::Fetched(Ok(tasks)) => {
                if let Err(e) = codec::ensure_unique_ids(&tasks) {
                    return Err(self.fail(ApiError::Decode(e.to_string()).into()));
                }
                tracing::info!(count = tasks.len(), "loaded tasks from api");
                self.tasks = tasks;
                self.source = Source::Remote;
                if let Mode::Editing(id) = &self.mode
                    && self.task(id).is_none()
                {
                    self.mode = Mode::Browsing;
                }
                self.persist();
            }
            ApiOutcome::Created {
                ticket,
                result: Ok(task),
            } => {
                tracing::debug!(id = %task.id, ticket, "task created");
                match self.position(&task.id) {
                    Some(index) => self.tasks[index] = task,
                    None => self.tasks.push(task),
                }
                // A reply from an earlier editor session leaves the current one open.
                if self.mode == Mode::Creating && self.awaiting_create == Some(ticket) {
                    self.mode = Mode::Browsing;
                    self.awaiting_create = None;
                }
                self.persist();
            }
            ApiOutcome::Created {
                ticket,
                result: Err(e),
            } => {
                if self.awaiting_create == Some(ticket) {
                    self.awaiting_create = None;
                }
                return Err(self.fail(e.into()));
            }
            ApiOutcome::Updated {
                id,
                reason,
                result: Ok(task),
            } => {
                if task.id != id {
                    return Err(self.fail(StoreError::IdMismatch {
                        requested: id,
                        returned: task.id,
                    }));
                }
                if let Some(index) = self.position(&id) {
                    self.tasks[index] = task;
                    self.persist();
                } else {
                    tracing::debug!(%id, "updated task no longer in collection");
                }
                if reason == UpdateReason::Edit && self.mode == Mode::Editing(id) {
                    self.mode = Mode::Browsing;
                }
            }
            ApiOutcome::Deleted { id, result: Ok(()) } => {
                if let Some(index) = self.position(&id) {
                    self.tasks.remove(index);
                    self.persist();
                }
                if self.mode == Mode::Editing(id) {
                    self.mode = Mode::Browsing;
                }
            }
            ApiOutcome::Fetched(Err(e))
            | ApiOutcome::Updated { result: Err(e), .. }
            | ApiOutcome::Deleted { result: Err(e), .. } => {
                return Err(self.fail(e.into()));
            }
        }
        self.last_error = None;
        Ok(())
    }

    /// Handles `intent`, runs its request (if any) against `api`, and
    /// applies the outcome.
    ///
    /// # Errors
    ///
    /// Returns whatever [`handle`](Self::handle) or [`apply`](Self::apply)
    /// rejects.
    pub async fn dispatch<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        intent: Intent,
    ) -> Result<(), StoreError> {
        let Some(request) = self.handle(intent)? else {
            return Ok(());
        };
        let outcome = execute(api, request).await;
        self.apply(outcome)
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    pub fn open_create(&mut self) {
        self.mode = Mode::Creating;
        self.awaiting_create = None;
    }

    pub fn close_create(&mut self) {
        if self.mode == Mode::Creating {
            self.mode = Mode::Browsing;
        }
        self.awaiting_create = None;
    }

    /// Opens the editor on `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` is not in the collection.
    pub fn open_edit(&mut self, id: &TaskId) -> Result<(), StoreError> {
        self.handle(Intent::OpenEdit(id.clone())).map(drop)
    }

    pub fn close_edit(&mut self) {
        if matches!(self.mode, Mode::Editing(_)) {
            self.mode = Mode::Browsing;
        }
    }

    /// Creates a task from `draft` and appends the server's copy.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn add_task<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        draft: TaskDraft,
    ) -> Result<(), StoreError> {
        self.dispatch(api, Intent::AddTask(draft)).await
    }

    /// Saves `draft` over the task being edited.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn update_task<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        draft: TaskDraft,
    ) -> Result<(), StoreError> {
        self.dispatch(api, Intent::UpdateTask(draft)).await
    }

    /// Deletes `id` once the API confirms.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn delete_task<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        id: &TaskId,
    ) -> Result<(), StoreError> {
        self.dispatch(api, Intent::Delete(id.clone())).await
    }

    /// Flips the completion flag of `id`.
    ///
    /// # Errors
    ///
    /// See [`dispatch`](Self::dispatch).
    pub async fn toggle_completed<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        id: &TaskId,
    ) -> Result<(), StoreError> {
        self.dispatch(api, Intent::ToggleCompleted(id.clone())).await
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    fn require(&mut self, id: &TaskId) -> Result<&Task, StoreError> {
        match self.position(id) {
            Some(index) => Ok(&self.tasks[index]),
            None => Err(self.fail(StoreError::NotFound(id.clone()))),
        }
    }

    fn check_draft(&mut self, draft: &TaskDraft) -> Result<(), StoreError> {
        let error = if draft.text.trim().is_empty() {
            DraftError::TextEmpty
        } else if draft.text.chars().count() > self.config.max_text_len {
            DraftError::TextTooLong {
                max: self.config.max_text_len,
            }
        } else {
            return Ok(());
        };
        Err(self.fail(error.into()))
    }

    /// Records `error` according to the failure policy and hands it back.
    fn fail(&mut self, error: StoreError) -> StoreError {
        tracing::warn!(%error, "task operation failed");
        if self.config.failure_policy == FailurePolicy::Surface {
            self.last_error = Some(error.clone());
        }
        error
    }

    /// Writes the collection to the cache. Failures are logged only.
    fn persist(&self) {
        if let Err(e) = store_snapshot(&self.cache, &self.tasks) {
            tracing::warn!(error = %e, "failed to persist task snapshot");
        }
    }
}
