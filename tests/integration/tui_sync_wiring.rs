//! Integration tests for the TUI ↔ sync worker wiring.
//!
//! Drives `App` with key events the way the main loop does: requests go to
//! `spawn_sync`, outcomes come back over the channel and are applied.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use taskboard::api::memory::InMemoryTaskApi;
use taskboard::api::{ApiError, BackendKind};
use taskboard::app::App;
use taskboard::cache::memory::MemoryCache;
use taskboard::config::StoreConfig;
use taskboard::sync::{self, ApiOutcome, SyncCommand};
use taskboard::tasks::{Mode, Source, TaskStore};
use taskboard_proto::task::{Priority, Task, TaskId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    app: App<MemoryCache>,
    api: Arc<InMemoryTaskApi>,
    cmd_tx: mpsc::Sender<SyncCommand>,
    evt_rx: mpsc::Receiver<ApiOutcome>,
}

impl Harness {
    /// Build the app, spawn the worker, and complete the initial fetch.
    async fn start(tasks: Vec<Task>) -> Self {
        let api = Arc::new(InMemoryTaskApi::with_tasks(tasks));
        let (cmd_tx, evt_rx) = sync::spawn_sync(Arc::clone(&api), 16);
        let store = TaskStore::new(MemoryCache::new(), StoreConfig::default());
        let mut harness = Self {
            app: App::new(store, BackendKind::InMemory),
            api,
            cmd_tx,
            evt_rx,
        };
        let initial = harness.app.refresh();
        harness.app.send(&harness.cmd_tx, initial);
        harness.settle().await;
        harness
    }

    /// Press a key and forward any resulting request to the worker.
    fn press(&mut self, code: KeyCode) {
        if let Some(request) = self
            .app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
        {
            self.app.send(&self.cmd_tx, request);
        }
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    /// Apply outcomes until nothing is in flight.
    async fn settle(&mut self) {
        while self.app.is_syncing() {
            let outcome = tokio::time::timeout(Duration::from_secs(5), self.evt_rx.recv())
                .await
                .expect("timeout waiting for outcome")
                .expect("sync worker stopped");
            self.app.apply_outcome(outcome);
        }
    }
}

fn task(id: &str, text: &str) -> Task {
    Task {
        id: TaskId::new(id),
        text: text.to_string(),
        priority: Priority::Normal,
        completed: false,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn startup_fetch_populates_list() {
    let h = Harness::start(vec![task("1", "Buy milk")]).await;
    assert_eq!(h.app.store.source(), Source::Remote);
    assert_eq!(h.app.store.tasks().len(), 1);
    assert_eq!(h.app.selected_task().map(|t| t.id.as_str()), Some("1"));
}

#[tokio::test]
async fn add_via_keys_reaches_server() {
    let mut h = Harness::start(Vec::new()).await;

    h.press(KeyCode::Char('a'));
    h.type_text("Call mom");
    h.press(KeyCode::Tab); // Normal -> High
    h.press(KeyCode::Enter);
    h.settle().await;

    assert!(h.app.editor.is_none());
    assert_eq!(h.app.store.mode(), &Mode::Browsing);
    let server = h.api.tasks();
    assert_eq!(server.len(), 1);
    assert_eq!(server[0].text, "Call mom");
    assert_eq!(server[0].priority, Priority::High);
    assert_eq!(h.app.store.tasks(), server.as_slice());
}

#[tokio::test]
async fn reply_to_cancelled_add_keeps_next_draft() {
    let mut h = Harness::start(Vec::new()).await;

    h.press(KeyCode::Char('a'));
    h.type_text("first");
    h.press(KeyCode::Enter);
    h.press(KeyCode::Esc);
    h.press(KeyCode::Char('a'));
    h.type_text("second");
    h.settle().await;

    assert_eq!(h.app.store.mode(), &Mode::Creating);
    assert_eq!(h.app.editor.as_ref().map(|e| e.text.as_str()), Some("second"));
    assert_eq!(h.api.tasks().len(), 1);

    h.press(KeyCode::Enter);
    h.settle().await;
    assert!(h.app.editor.is_none());
    assert_eq!(h.app.store.tasks().len(), 2);
}

#[tokio::test]
async fn esc_after_filter_keeps_app_running() {
    let mut h = Harness::start(vec![task("1", "Buy milk")]).await;
    h.press(KeyCode::Char('/'));
    h.type_text("milk");
    h.press(KeyCode::Esc);
    h.press(KeyCode::Esc);
    assert!(!h.app.should_quit);
}

#[tokio::test]
async fn failed_add_keeps_modal_open() {
    let mut h = Harness::start(Vec::new()).await;
    h.api.fail_next(ApiError::Network("refused".into()));

    h.press(KeyCode::Char('a'));
    h.type_text("x");
    h.press(KeyCode::Enter);
    h.settle().await;

    assert_eq!(h.app.store.mode(), &Mode::Creating);
    assert_eq!(h.app.editor.as_ref().map(|e| e.text.as_str()), Some("x"));
    assert!(h.app.store.last_error().is_some());

    // Retry from the still-open editor succeeds and clears the error.
    h.press(KeyCode::Enter);
    h.settle().await;
    assert!(h.app.editor.is_none());
    assert!(h.app.store.last_error().is_none());
}

#[tokio::test]
async fn toggle_edit_delete_via_keys() {
    let mut h = Harness::start(vec![task("1", "Buy milk"), task("2", "Walk dog")]).await;

    h.press(KeyCode::Char(' '));
    h.settle().await;
    assert!(h.app.store.tasks()[0].completed);

    h.press(KeyCode::Char('e'));
    h.press(KeyCode::End);
    h.type_text("!");
    h.press(KeyCode::Enter);
    h.settle().await;
    assert_eq!(h.app.store.tasks()[0].text, "Buy milk!");
    assert!(h.app.editor.is_none());

    h.press(KeyCode::Char('j'));
    h.press(KeyCode::Char('d'));
    h.settle().await;
    let ids: Vec<&str> = h.app.store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["1"]);
    assert_eq!(h.app.selected, 0);
    assert_eq!(h.api.tasks(), h.app.store.tasks());
}

#[tokio::test]
async fn failed_delete_keeps_row_and_dismiss_clears_error() {
    let mut h = Harness::start(vec![task("1", "Buy milk")]).await;
    h.api.fail_next(ApiError::Timeout);

    h.press(KeyCode::Char('d'));
    h.settle().await;
    assert_eq!(h.app.store.tasks().len(), 1);
    assert!(h.app.store.last_error().is_some());

    h.press(KeyCode::Char('x'));
    assert!(h.app.store.last_error().is_none());
}

#[tokio::test]
async fn filter_narrows_what_keys_act_on() {
    let mut h = Harness::start(vec![task("1", "Buy milk"), task("2", "Walk dog")]).await;

    h.press(KeyCode::Char('/'));
    h.type_text("dog");
    h.press(KeyCode::Enter);
    h.press(KeyCode::Char(' '));
    h.settle().await;

    let server = h.api.tasks();
    assert!(!server[0].completed);
    assert!(server[1].completed);
}

#[tokio::test]
async fn reload_picks_up_server_changes() {
    let mut h = Harness::start(vec![task("1", "Buy milk")]).await;
    h.api.fail_next(ApiError::Timeout); // absorbed by the next call below
    h.press(KeyCode::Char('r'));
    h.settle().await;
    assert!(h.app.store.last_error().is_some());

    h.press(KeyCode::Char('r'));
    h.settle().await;
    assert!(h.app.store.last_error().is_none());
    assert_eq!(h.app.store.tasks().len(), 1);
}

#[tokio::test]
async fn quit_shuts_worker_down() {
    let mut h = Harness::start(Vec::new()).await;
    h.press(KeyCode::Char('q'));
    assert!(h.app.should_quit);

    h.cmd_tx.send(SyncCommand::Shutdown).await.unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), h.evt_rx.recv())
        .await
        .expect("timeout waiting for close");
    assert!(next.is_none());
}
