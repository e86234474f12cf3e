//! Document store subsystem
//!
//! A single JSON document on disk holds every record, grouped by category,
//! together with per-category auto-increment counters and declared
//! constraints.
//!
//! # Design Principles
//!
//! - Reads are served from memory
//! - Every mutation rewrites the whole document (temp file + rename)
//! - Memory is committed only after the write succeeds
//! - Uniqueness is checked by a linear scan of the category
//! - One exclusive owner per backing file; no locking
//!
//! # Usage
//!
//! ```no_run
//! use jsondb::store::{record_from_value, ConstraintKind, DocumentStore};
//! use serde_json::json;
//!
//! let mut store = DocumentStore::open("database/database.json")?;
//! store.declare_constraint("user", ConstraintKind::Unique, "username")?;
//!
//! let record = record_from_value(json!({ "username": "Alice" }))?;
//! let id = store.insert("user", record)?;
//! assert_eq!(store.get(&format!("user/{}", id))?["username"], "Alice");
//! # Ok::<(), jsondb::store::StoreError>(())
//! ```

mod constraint;
mod document;
mod document_store;
mod errors;
mod key;
mod persist;
mod record;

pub use constraint::ConstraintKind;
pub use document::{Document, AUTO_INCREMENT_FIELD, CONSTRAINTS_FIELD, RESERVED_FIELDS};
pub use document_store::DocumentStore;
pub use errors::{Severity, StoreError, StoreResult};
pub use key::{RecordKey, KEY_SEPARATOR};
pub use persist::{read_document, write_document};
pub use record::{
    display_value, field_i64, field_str, record_from_value, values_equal, Record,
};
