//! Application state and event handling.
//!
//! [`App`] wraps the [`TaskStore`] with the view state the TUI needs:
//! list selection, input focus, and the editor buffer. Key events become
//! [`Intent`]s; intents that need the API come back out of
//! [`App::handle_key_event`] as [`ApiRequest`]s for the sync worker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskboard_proto::task::{Priority, Task, TaskDraft, TaskId};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::api::BackendKind;
use crate::cache::PersistedCache;
use crate::sync::{ApiOutcome, ApiRequest, SyncCommand};
use crate::tasks::{Intent, Mode, TaskStore};

/// Which input receives typed characters while no editor is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Task list navigation (default).
    List,
    /// Typing into the filter bar.
    Filter,
}

/// Text buffer and priority of the open editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    /// Current text.
    pub text: String,
    /// Cursor position (character index).
    pub cursor: usize,
    /// Selected priority.
    pub priority: Priority,
}

impl EditorState {
    /// An editor pre-filled from an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            text: task.text.clone(),
            cursor: task.text.chars().count(),
            priority: task.priority,
        }
    }

    /// The draft this editor would save.
    #[must_use]
    pub fn draft(&self) -> TaskDraft {
        TaskDraft::new(self.text.clone(), self.priority)
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.text.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.text.remove(at);
    }

    const fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }
}

/// A short status message with the time it was posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Formatted local time.
    pub timestamp: String,
    /// Message text.
    pub text: String,
}

/// Main application state.
pub struct App<C> {
    /// The task collection and its sync state.
    pub store: TaskStore<C>,
    /// Selected index into the visible (filtered) tasks.
    pub selected: usize,
    /// Which input is focused.
    pub focus: Focus,
    /// Editor buffer, present while creating or editing.
    pub editor: Option<EditorState>,
    /// Backend the sync worker talks to.
    pub backend: BackendKind,
    /// Latest status message.
    pub notice: Option<Notice>,
    /// Requests sent to the sync worker and not yet answered.
    pub in_flight: usize,
    /// Whether the app should quit.
    pub should_quit: bool,
    timestamp_format: String,
}

impl<C: PersistedCache> App<C> {
    /// Create the app around a store.
    pub fn new(store: TaskStore<C>, backend: BackendKind) -> Self {
        Self {
            store,
            selected: 0,
            focus: Focus::List,
            editor: None,
            backend,
            notice: None,
            in_flight: 0,
            should_quit: false,
            timestamp_format: "%H:%M".to_string(),
        }
    }

    /// Set the chrono format used for notice timestamps.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Ask for the full collection from the API.
    pub const fn refresh(&mut self) -> ApiRequest {
        self.in_flight += 1;
        ApiRequest::FetchAll
    }

    /// The task under the selection cursor.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.store.visible_tasks().get(self.selected).copied()
    }

    /// Whether requests are waiting on the API.
    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        self.in_flight > 0
    }

    /// Handle a key event.
    ///
    /// Returns `Some(ApiRequest)` when the action must be sent to the sync
    /// worker.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<ApiRequest> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return None;
        }

        if self.editor.is_some() {
            return self.handle_editor_key(key);
        }
        match self.focus {
            Focus::List => self.handle_list_key(key),
            Focus::Filter => {
                self.handle_filter_key(key);
                None
            }
        }
    }

    /// Fold a finished request into the store and resync view state.
    pub fn apply_outcome(&mut self, outcome: ApiOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let message = match &outcome {
            ApiOutcome::Fetched(Ok(tasks)) => Some(format!("Loaded {} tasks", tasks.len())),
            ApiOutcome::Created { result: Ok(task), .. } => {
                Some(format!("Added \"{}\"", task.text))
            }
            ApiOutcome::Updated { result: Ok(_), .. } => Some("Saved".to_string()),
            ApiOutcome::Deleted { result: Ok(()), .. } => Some("Deleted".to_string()),
            _ => None,
        };

        match self.store.apply(outcome) {
            Ok(()) => {
                if let Some(text) = message {
                    self.notify(text);
                }
            }
            Err(e) => tracing::debug!(error = %e, "outcome rejected by store"),
        }

        if *self.store.mode() == Mode::Browsing {
            self.editor = None;
        }
        self.clamp_selection();
    }

    /// Queue `request` on the sync worker without blocking the UI.
    ///
    /// A full or closed channel drops the request and posts a notice; the
    /// store is left as it was.
    pub fn send(&mut self, tx: &mpsc::Sender<SyncCommand>, request: ApiRequest) {
        match tx.try_send(SyncCommand::Execute(request)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.request_dropped("Sync busy, request not sent"),
            Err(TrySendError::Closed(_)) => self.request_dropped("Sync worker stopped"),
        }
    }

    /// Undo the in-flight count for a request the worker never accepted.
    pub fn request_dropped(&mut self, reason: &str) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.notify(reason.to_string());
    }

    /// Post a status message stamped with the current time.
    pub fn notify(&mut self, text: String) {
        self.notice = Some(Notice {
            timestamp: chrono::Local::now()
                .format(&self.timestamp_format)
                .to_string(),
            text,
        });
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<ApiRequest> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.store.visible_tasks().len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('/') => {
                self.focus = Focus::Filter;
                None
            }
            KeyCode::Char('a') => {
                self.submit(Intent::OpenCreate);
                self.editor = Some(EditorState::default());
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                let task = self.selected_task()?.clone();
                self.submit(Intent::OpenEdit(task.id.clone()));
                if matches!(self.store.mode(), Mode::Editing(_)) {
                    self.editor = Some(EditorState::from_task(&task));
                }
                None
            }
            KeyCode::Char(' ') => {
                let id = self.selected_id()?;
                self.submit(Intent::ToggleCompleted(id))
            }
            KeyCode::Char('d') => {
                let id = self.selected_id()?;
                self.submit(Intent::Delete(id))
            }
            KeyCode::Char('r') => Some(self.refresh()),
            KeyCode::Char('x') => {
                self.submit(Intent::DismissError);
                None
            }
            _ => None,
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Char(c) => {
                let mut filter = self.store.filter().to_string();
                filter.push(c);
                self.submit(Intent::SetFilter(filter));
            }
            KeyCode::Backspace => {
                let mut filter = self.store.filter().to_string();
                filter.pop();
                self.submit(Intent::SetFilter(filter));
            }
            _ => {}
        }
        self.clamp_selection();
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<ApiRequest> {
        let editor = self.editor.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                let intent = if *self.store.mode() == Mode::Creating {
                    Intent::CloseCreate
                } else {
                    Intent::CloseEdit
                };
                self.submit(intent);
                self.editor = None;
                None
            }
            KeyCode::Enter => {
                let draft = editor.draft();
                let intent = match self.store.mode() {
                    Mode::Creating => Intent::AddTask(draft),
                    _ => Intent::UpdateTask(draft),
                };
                self.submit(intent)
            }
            KeyCode::Tab => {
                editor.priority = editor.priority.next();
                None
            }
            KeyCode::BackTab => {
                editor.priority = editor.priority.prev();
                None
            }
            KeyCode::Char(c) => {
                editor.insert(c);
                None
            }
            KeyCode::Backspace => {
                editor.backspace();
                None
            }
            KeyCode::Left => {
                editor.left();
                None
            }
            KeyCode::Right => {
                editor.right();
                None
            }
            KeyCode::Home => {
                editor.cursor = 0;
                None
            }
            KeyCode::End => {
                editor.cursor = editor.text.chars().count();
                None
            }
            _ => None,
        }
    }

    /// Hand an intent to the store, counting any request it produces.
    fn submit(&mut self, intent: Intent) -> Option<ApiRequest> {
        match self.store.handle(intent) {
            Ok(Some(request)) => {
                self.in_flight += 1;
                Some(request)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "intent rejected");
                None
            }
        }
    }

    fn selected_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.store.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}
