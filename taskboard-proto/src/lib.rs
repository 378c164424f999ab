//! Shared task model and JSON wire format for `taskboard`.

pub mod codec;
pub mod routes;
pub mod task;
