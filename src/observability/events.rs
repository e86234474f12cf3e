//! Observable document store events
//!
//! Events are explicit and typed; each carries its default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,

    // Store lifecycle
    /// Existing backing file loaded
    StoreOpened,
    /// Backing file created with an empty document
    StoreCreated,
    /// Backing file could not be loaded (FATAL)
    StoreLoadFailed,

    // Persistence
    /// Document rewritten to disk
    DocumentPersisted,
    /// Document could not be written (FATAL)
    StorePersistFailed,

    // Writes
    /// Auto-increment id issued
    IdAllocated,
    /// Constraint registered
    ConstraintDeclared,
    /// Record inserted with an auto-increment id
    RecordInserted,
    /// Insert rejected by a unique constraint
    UniqueViolation,
    /// Value stored at an explicit key
    RecordPut,
    /// Value removed
    RecordDeleted,

    // Reads
    /// Lookup or delete addressed a missing category or id
    KeyNotFound,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreCreated => "STORE_CREATED",
            Event::StoreLoadFailed => "STORE_LOAD_FAILED",
            Event::DocumentPersisted => "DOCUMENT_PERSISTED",
            Event::StorePersistFailed => "STORE_PERSIST_FAILED",
            Event::IdAllocated => "ID_ALLOCATED",
            Event::ConstraintDeclared => "CONSTRAINT_DECLARED",
            Event::RecordInserted => "RECORD_INSERTED",
            Event::UniqueViolation => "UNIQUE_VIOLATION",
            Event::RecordPut => "RECORD_PUT",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::KeyNotFound => "KEY_NOT_FOUND",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::StoreLoadFailed | Event::StorePersistFailed => Severity::Fatal,
            Event::UniqueViolation | Event::KeyNotFound => Severity::Warn,
            Event::DocumentPersisted | Event::IdAllocated => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::StoreOpened,
            Event::StoreCreated,
            Event::StoreLoadFailed,
            Event::DocumentPersisted,
            Event::StorePersistFailed,
            Event::IdAllocated,
            Event::ConstraintDeclared,
            Event::RecordInserted,
            Event::UniqueViolation,
            Event::RecordPut,
            Event::RecordDeleted,
            Event::KeyNotFound,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::StoreLoadFailed.is_fatal());
        assert!(Event::StorePersistFailed.is_fatal());
        assert!(!Event::KeyNotFound.is_fatal());
        assert_eq!(Event::KeyNotFound.severity(), Severity::Warn);
    }
}
