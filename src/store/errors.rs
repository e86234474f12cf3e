//! Document store error types
//!
//! Error codes:
//! - JSONDB_STORE_CREATE_FAILED (FATAL)
//! - JSONDB_STORE_READ_FAILED (FATAL)
//! - JSONDB_STORE_WRITE_FAILED (FATAL)
//! - JSONDB_STORE_CORRUPTED (FATAL)
//! - JSONDB_CATEGORY_NOT_FOUND (ERROR)
//! - JSONDB_ID_NOT_FOUND (ERROR)
//! - JSONDB_DUPLICATE_FIELD_VALUE (ERROR)
//! - JSONDB_INVALID_KEY (ERROR)
//! - JSONDB_RESERVED_CATEGORY (ERROR)
//! - JSONDB_INVALID_RECORD (ERROR)
//! - JSONDB_TYPE_MISMATCH (ERROR)
//! - JSONDB_MISSING_FIELD (ERROR)
//! - JSONDB_UNKNOWN_CONSTRAINT (ERROR)
//! - JSONDB_ID_EXHAUSTED (ERROR)
//!
//! FATAL errors mean the backing file and the in-memory document can no
//! longer be kept consistent; the embedding application should stop using
//! the store. ERROR severity failures leave the document untouched.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Severity of a store error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation rejected, store remains usable
    Error,
    /// Backing store unusable
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Errors raised by the document store
#[derive(Debug, Error)]
pub enum StoreError {
    // ==================
    // Fatal: backing file
    // ==================
    /// Directory or file could not be created
    #[error("unable to create {}: {source}", .path.display())]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file could not be read
    #[error("unable to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file could not be written
    #[error("unable to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file content is not a valid document
    #[error("{} is not a valid document: {reason}", .path.display())]
    Corrupted { path: PathBuf, reason: String },

    // ==================
    // Reportable: lookups
    // ==================
    /// Category does not exist
    #[error("category '{category}' does not exist")]
    CategoryNotFound { category: String },

    /// Id does not exist within an existing category
    #[error("id '{id}' does not exist in category '{category}'")]
    IdNotFound { category: String, id: String },

    // ==================
    // Reportable: writes
    // ==================
    /// Unique constraint violated
    #[error("{field} {value} already exists")]
    DuplicateFieldValue { field: String, value: String },

    /// Key is not of the form `category/id`
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Category name collides with a reserved top-level field
    #[error("'{category}' is reserved and cannot be used as a category")]
    ReservedCategory { category: String },

    /// Record is not a field mapping
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Field exists but holds a different type
    #[error("field '{field}' is not {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// Field absent from the record
    #[error("field '{field}' is missing")]
    MissingField { field: String },

    /// Constraint type name not recognised
    #[error("unknown constraint type '{name}'")]
    UnknownConstraint { name: String },

    /// Auto-increment counter cannot advance
    #[error("auto-increment counter for '{category}' is exhausted")]
    IdExhausted { category: String },
}

impl StoreError {
    /// Returns the error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::CreateFailed { .. } => "JSONDB_STORE_CREATE_FAILED",
            StoreError::ReadFailed { .. } => "JSONDB_STORE_READ_FAILED",
            StoreError::WriteFailed { .. } => "JSONDB_STORE_WRITE_FAILED",
            StoreError::Corrupted { .. } => "JSONDB_STORE_CORRUPTED",
            StoreError::CategoryNotFound { .. } => "JSONDB_CATEGORY_NOT_FOUND",
            StoreError::IdNotFound { .. } => "JSONDB_ID_NOT_FOUND",
            StoreError::DuplicateFieldValue { .. } => "JSONDB_DUPLICATE_FIELD_VALUE",
            StoreError::InvalidKey { .. } => "JSONDB_INVALID_KEY",
            StoreError::ReservedCategory { .. } => "JSONDB_RESERVED_CATEGORY",
            StoreError::InvalidRecord(_) => "JSONDB_INVALID_RECORD",
            StoreError::TypeMismatch { .. } => "JSONDB_TYPE_MISMATCH",
            StoreError::MissingField { .. } => "JSONDB_MISSING_FIELD",
            StoreError::UnknownConstraint { .. } => "JSONDB_UNKNOWN_CONSTRAINT",
            StoreError::IdExhausted { .. } => "JSONDB_ID_EXHAUSTED",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            StoreError::CreateFailed { .. }
            | StoreError::ReadFailed { .. }
            | StoreError::WriteFailed { .. }
            | StoreError::Corrupted { .. } => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns whether the store can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Returns whether this is a missing category or id
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CategoryNotFound { .. } | StoreError::IdNotFound { .. }
        )
    }
}
