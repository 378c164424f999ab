//! `taskboard` — terminal task board synced with a remote task API.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod sync;
pub mod tasks;
pub mod ui;
