//! Integration tests for the task store against the in-memory API.
//!
//! Covers the store's contract end to end:
//! - add / toggle / edit / delete round-trip through the API first
//! - failures leave the collection and editor mode untouched
//! - the cached snapshot always matches the collection after a mutation
//! - the remote collection wins over the cached placeholder

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::redundant_clone)]

use taskboard::api::ApiError;
use taskboard::api::memory::{ApiCall, InMemoryTaskApi};
use taskboard::cache::memory::MemoryCache;
use taskboard::cache::{PersistedCache, TASKS_KEY, load_snapshot};
use taskboard::config::{FailurePolicy, StoreConfig};
use taskboard::sync::{ApiOutcome, ApiRequest, execute};
use taskboard::tasks::{Intent, Mode, Source, StoreError, TaskStore};
use taskboard_proto::codec::encode_snapshot;
use taskboard_proto::task::{Priority, Task, TaskDraft, TaskId};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn task(id: &str, text: &str, priority: Priority, completed: bool) -> Task {
    Task {
        id: TaskId::new(id),
        text: text.to_string(),
        priority,
        completed,
    }
}

fn buy_milk() -> Task {
    task("1", "Buy milk", Priority::Low, false)
}

/// A store initialized from `api`, with an empty cache.
async fn initialized(api: &InMemoryTaskApi) -> TaskStore<MemoryCache> {
    let mut store = TaskStore::new(MemoryCache::new(), StoreConfig::default());
    store.initialize(api).await.unwrap();
    store
}

fn assert_cache_matches(store: &TaskStore<MemoryCache>) {
    let cached = load_snapshot(store.cache())
        .unwrap()
        .expect("snapshot should be written");
    assert_eq!(cached, store.tasks());
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn toggle_buy_milk_only_flips_completed() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;

    store
        .toggle_completed(&api, &TaskId::new("1"))
        .await
        .unwrap();

    assert_eq!(
        store.tasks(),
        [task("1", "Buy milk", Priority::Low, true)]
    );
}

#[tokio::test]
async fn filter_milk_shows_only_buy_milk() {
    let api = InMemoryTaskApi::with_tasks(vec![
        buy_milk(),
        task("2", "Walk dog", Priority::Normal, false),
    ]);
    let mut store = initialized(&api).await;

    store.set_filter("milk");

    let visible: Vec<&str> = store.visible_tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(visible, ["Buy milk"]);
    assert_eq!(store.tasks().len(), 2);
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn add_then_fetch_has_exactly_one_new_entry() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    store.open_create();

    store
        .add_task(&api, TaskDraft::new("Call mom", Priority::High))
        .await
        .unwrap();

    assert_eq!(store.mode(), &Mode::Browsing);
    store.initialize(&api).await.unwrap();

    let new: Vec<&Task> = store.tasks().iter().filter(|t| t.id.as_str() != "1").collect();
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].text, "Call mom");
    assert_eq!(new[0].priority, Priority::High);
    assert!(!new[0].completed);
}

#[tokio::test]
async fn added_task_uses_server_id() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;

    store
        .add_task(&api, TaskDraft::new("x", Priority::Normal))
        .await
        .unwrap();

    let server_ids: Vec<TaskId> = api.tasks().into_iter().map(|t| t.id).collect();
    let local_ids: Vec<TaskId> = store.tasks().iter().map(|t| t.id.clone()).collect();
    assert_eq!(local_ids, server_ids);
}

#[tokio::test]
async fn failed_add_keeps_creation_mode_and_surfaces_error() {
    let api = InMemoryTaskApi::new();
    let mut store = initialized(&api).await;
    store.open_create();
    api.fail_next(ApiError::Network("connection refused".into()));

    let err = store
        .add_task(&api, TaskDraft::new("x", Priority::Normal))
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert_eq!(store.mode(), &Mode::Creating);
    assert!(store.tasks().is_empty());
    assert_eq!(store.last_error(), Some(&err));
}

#[tokio::test]
async fn invalid_draft_never_reaches_api() {
    let api = InMemoryTaskApi::new();
    let mut store = initialized(&api).await;
    let calls_before = api.calls().len();

    let err = store
        .add_task(&api, TaskDraft::new("  ", Priority::Normal))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Draft(_)));
    assert_eq!(api.calls().len(), calls_before);
}

// =============================================================================
// Toggle / update
// =============================================================================

#[tokio::test]
async fn toggle_twice_restores_original() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    let id = TaskId::new("1");

    store.toggle_completed(&api, &id).await.unwrap();
    store.toggle_completed(&api, &id).await.unwrap();

    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn toggle_missing_id_is_not_found() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;

    let err = store
        .toggle_completed(&api, &TaskId::new("9"))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::NotFound(TaskId::new("9")));
    assert!(!api.calls().contains(&ApiCall::Update(TaskId::new("9"))));
}

#[tokio::test]
async fn edit_saves_and_exits_edit_mode() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    store.open_edit(&TaskId::new("1")).unwrap();

    store
        .update_task(&api, TaskDraft::new("Buy oat milk", Priority::High))
        .await
        .unwrap();

    assert_eq!(store.mode(), &Mode::Browsing);
    assert_eq!(
        store.tasks(),
        [task("1", "Buy oat milk", Priority::High, false)]
    );
}

#[tokio::test]
async fn failed_edit_keeps_editor_open() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    store.open_edit(&TaskId::new("1")).unwrap();
    api.fail_next(ApiError::Server {
        status: 500,
        message: "boom".into(),
    });

    let result = store
        .update_task(&api, TaskDraft::new("changed", Priority::High))
        .await;

    assert!(result.is_err());
    assert_eq!(store.mode(), &Mode::Editing(TaskId::new("1")));
    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn update_without_edit_mode_is_rejected() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;

    let err = store
        .update_task(&api, TaskDraft::new("x", Priority::Low))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::NotEditing);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn delete_removes_exactly_one_entry() {
    let api = InMemoryTaskApi::with_tasks(vec![
        buy_milk(),
        task("2", "Walk dog", Priority::Normal, false),
    ]);
    let mut store = initialized(&api).await;

    store.delete_task(&api, &TaskId::new("1")).await.unwrap();

    let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["2"]);
}

#[tokio::test]
async fn delete_nonexistent_id_leaves_collection() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;

    let err = store
        .delete_task(&api, &TaskId::new("404"))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::NotFound(TaskId::new("404")));
    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn failed_delete_keeps_item() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    api.fail_next(ApiError::Timeout);

    let result = store.delete_task(&api, &TaskId::new("1")).await;

    assert_eq!(result, Err(StoreError::Api(ApiError::Timeout)));
    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn double_delete_second_fails_server_side() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    let id = TaskId::new("1");

    // Both requests leave before either reply is applied.
    let first = store.handle(Intent::Delete(id.clone())).unwrap().unwrap();
    let second = store.handle(Intent::Delete(id.clone())).unwrap().unwrap();
    let first = execute(&api, first).await;
    let second = execute(&api, second).await;

    store.apply(first).unwrap();
    let err = store.apply(second).unwrap_err();

    assert_eq!(err, StoreError::Api(ApiError::NotFound(id)));
    assert!(store.tasks().is_empty());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn cache_matches_collection_after_every_mutation() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    assert_cache_matches(&store);

    store
        .add_task(&api, TaskDraft::new("Walk dog", Priority::Normal))
        .await
        .unwrap();
    assert_cache_matches(&store);

    store.toggle_completed(&api, &TaskId::new("1")).await.unwrap();
    assert_cache_matches(&store);

    store.open_edit(&TaskId::new("1")).unwrap();
    store
        .update_task(&api, TaskDraft::new("Buy bread", Priority::High))
        .await
        .unwrap();
    assert_cache_matches(&store);

    store.delete_task(&api, &TaskId::new("1")).await.unwrap();
    assert_cache_matches(&store);
}

#[tokio::test]
async fn failed_mutation_does_not_rewrite_cache() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    let before = store.cache().get(TASKS_KEY).unwrap();

    api.fail_next(ApiError::Timeout);
    let _ = store.toggle_completed(&api, &TaskId::new("1")).await;

    assert_eq!(store.cache().get(TASKS_KEY).unwrap(), before);
}

#[tokio::test]
async fn unwritable_cache_does_not_block_mutations() {
    let api = InMemoryTaskApi::new();
    let cache = MemoryCache::new();
    cache.set_read_only(true);
    let mut store = TaskStore::new(cache, StoreConfig::default());
    store.initialize(&api).await.unwrap();

    store
        .add_task(&api, TaskDraft::new("x", Priority::Normal))
        .await
        .unwrap();
    assert_eq!(store.tasks().len(), 1);
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn remote_wins_over_cache() {
    let cached = encode_snapshot(&[task("c", "stale", Priority::Low, false)]).unwrap();
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = TaskStore::new(
        MemoryCache::with_entry(TASKS_KEY, cached),
        StoreConfig::default(),
    );

    store.initialize(&api).await.unwrap();

    assert_eq!(store.source(), Source::Remote);
    assert_eq!(store.tasks(), [buy_milk()]);
    assert_cache_matches(&store);
}

#[tokio::test]
async fn remote_wins_when_cache_arrives_late() {
    let cached = encode_snapshot(&[task("c", "stale", Priority::Low, false)]).unwrap();
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = TaskStore::new(
        MemoryCache::with_entry(TASKS_KEY, cached),
        StoreConfig::default(),
    );

    let outcome = execute(&api, ApiRequest::FetchAll).await;
    store.apply(outcome).unwrap();
    assert!(!store.load_cached());

    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn cache_placeholder_survives_failed_fetch() {
    let cached = encode_snapshot(&[buy_milk()]).unwrap();
    let api = InMemoryTaskApi::new();
    api.fail_next(ApiError::Network("offline".into()));
    let mut store = TaskStore::new(
        MemoryCache::with_entry(TASKS_KEY, cached),
        StoreConfig::default(),
    );

    let err = store.initialize(&api).await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(store.source(), Source::Cache);
    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn empty_cache_snapshot_is_not_a_placeholder() {
    let mut store = TaskStore::new(
        MemoryCache::with_entry(TASKS_KEY, "[]"),
        StoreConfig::default(),
    );
    assert!(!store.load_cached());
    assert_eq!(store.source(), Source::Empty);
}

#[tokio::test]
async fn malformed_cache_yields_empty_startup() {
    let api = InMemoryTaskApi::new();
    api.fail_next(ApiError::Timeout);
    let mut store = TaskStore::new(
        MemoryCache::with_entry(TASKS_KEY, "[{\"id\": 1"),
        StoreConfig::default(),
    );

    let _ = store.initialize(&api).await;

    assert!(store.tasks().is_empty());
    assert_eq!(store.source(), Source::Empty);
}

// =============================================================================
// Failure policy
// =============================================================================

#[tokio::test]
async fn silent_policy_still_returns_error() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = TaskStore::new(
        MemoryCache::new(),
        StoreConfig {
            failure_policy: FailurePolicy::Silent,
            ..StoreConfig::default()
        },
    );
    store.initialize(&api).await.unwrap();
    api.fail_next(ApiError::Timeout);

    let result = store.toggle_completed(&api, &TaskId::new("1")).await;

    assert!(result.is_err());
    assert!(store.last_error().is_none());
    assert_eq!(store.tasks(), [buy_milk()]);
}

#[tokio::test]
async fn success_clears_surfaced_error() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;
    api.fail_next(ApiError::Timeout);
    let _ = store.toggle_completed(&api, &TaskId::new("1")).await;
    assert!(store.last_error().is_some());

    store.toggle_completed(&api, &TaskId::new("1")).await.unwrap();
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn outcome_from_worker_applies_like_dispatch() {
    let api = InMemoryTaskApi::with_tasks(vec![buy_milk()]);
    let mut store = initialized(&api).await;

    let outcome = ApiOutcome::Updated {
        id: TaskId::new("1"),
        reason: taskboard::sync::UpdateReason::Toggle,
        result: Ok(task("1", "Buy milk", Priority::Low, true)),
    };
    store.apply(outcome).unwrap();

    assert!(store.tasks()[0].completed);
}
