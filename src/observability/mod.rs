//! Observability for jsondb
//!
//! - Structured JSON line logging
//! - Typed events with a default severity each
//!
//! Logging is read-only with respect to the store: it never fails an
//! operation and has no side effects on the document.
//!
//! ```ignore
//! use jsondb::observability::{log_event, Event};
//!
//! log_event(Event::KeyNotFound, &[("key", "user/9")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, DEFAULT_MIN_SEVERITY};

/// Log an event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Only verifies no panic
        log_event(Event::StoreCreated, &[("path", "/tmp/db.json")]);
        log_event(Event::KeyNotFound, &[]);
    }
}
