//! jsondb - A persistent key/value store backed by a single JSON document
//!
//! Records are grouped by category, each category with its own
//! auto-increment counter and optional unique fields.

pub mod auth;
pub mod cli;
pub mod config;
pub mod observability;
pub mod store;
