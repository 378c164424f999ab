//! `taskboard` development API server library.
//!
//! Exposes the REST task API for use in tests and embedding. Tasks live in
//! memory; ids are assigned here and never by clients.

pub mod api;
pub mod config;
pub mod repository;
