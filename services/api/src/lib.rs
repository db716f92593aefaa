//! Vocabot API Library Crate
//!
//! HTTP surface of the vocabulary drill bot: configuration, the PostgreSQL
//! store, request handlers and routing. The binaries are thin wrappers
//! around this library.

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
