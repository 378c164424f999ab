//! REST paths shared by the API server and the HTTP client.
//!
//! The layout is the json-server convention: a `tasks` collection with
//! per-item paths `tasks/{id}` underneath it.

/// Collection path, relative to the API base URL.
pub const TASKS: &str = "tasks";
