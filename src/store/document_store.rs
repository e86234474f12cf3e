//! The document store
//!
//! Owns the in-memory document and the path of its backing file. Reads are
//! served from memory. Every mutation is applied to a copy of the document,
//! the copy is written to disk in full, and only then does it replace the
//! in-memory state. A failed write therefore leaves memory matching disk.
//!
//! # Concurrency
//!
//! There is no locking around the document or the backing file. Mutating
//! methods take `&mut self`, which serializes callers inside one process,
//! but two processes (or two stores opened on the same path) will race:
//! counters can be issued twice, uniqueness checks can miss a concurrent
//! insert, and the last writer wins. The store assumes a single exclusive
//! owner of its file.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::observability::{log_event, Event};

use super::constraint::ConstraintKind;
use super::document::Document;
use super::errors::{StoreError, StoreResult};
use super::key::{validate_category, RecordKey};
use super::persist;
use super::record::{display_value, Record};

/// Persistent JSON document store
#[derive(Debug)]
pub struct DocumentStore {
    /// Path to the backing file
    path: PathBuf,
    /// Committed in-memory document
    document: Document,
    /// Whether writes are fsynced
    fsync: bool,
}

impl DocumentStore {
    /// Opens the store at `path` with fsync enabled.
    ///
    /// Creates the containing directory and an empty document if the file
    /// does not exist; otherwise loads the file.
    ///
    /// # Errors
    ///
    /// Returns a fatal `StoreError` if the directory or file cannot be
    /// created or read, or if the content is not a valid document.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path.as_ref(), true)
    }

    /// Opens the store described by a configuration.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open_with(&config.file_path(), config.fsync)
    }

    fn open_with(path: &Path, fsync: bool) -> StoreResult<Self> {
        let path_str = path.display().to_string();

        match Self::load_or_create(path, fsync) {
            Ok((document, created)) => {
                let event = if created {
                    Event::StoreCreated
                } else {
                    Event::StoreOpened
                };
                let records = document.record_count().to_string();
                log_event(
                    event,
                    &[("path", path_str.as_str()), ("records", records.as_str())],
                );

                Ok(Self {
                    path: path.to_path_buf(),
                    document,
                    fsync,
                })
            }
            Err(e) => {
                log_event(
                    Event::StoreLoadFailed,
                    &[
                        ("path", path_str.as_str()),
                        ("error", e.to_string().as_str()),
                    ],
                );
                Err(e)
            }
        }
    }

    /// Returns the document and whether it was freshly created.
    fn load_or_create(path: &Path, fsync: bool) -> StoreResult<(Document, bool)> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StoreError::CreateFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        if path.exists() {
            return Ok((persist::read_document(path)?, false));
        }

        let document = Document::new();
        persist::write_document(path, &document, fsync)?;
        Ok((document, true))
    }

    /// Applies `mutation` to a copy of the document, persists the copy, then
    /// commits it. Nothing is committed if the mutation or the write fails.
    fn commit<T>(
        &mut self,
        mutation: impl FnOnce(&mut Document) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut next = self.document.clone();
        let output = mutation(&mut next)?;

        if let Err(e) = persist::write_document(&self.path, &next, self.fsync) {
            log_event(
                Event::StorePersistFailed,
                &[
                    ("path", self.path.display().to_string().as_str()),
                    ("error", e.to_string().as_str()),
                ],
            );
            return Err(e);
        }

        self.document = next;
        log_event(
            Event::DocumentPersisted,
            &[("path", self.path.display().to_string().as_str())],
        );
        Ok(output)
    }

    // ==================
    // Accessors
    // ==================

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the committed document
    pub fn document(&self) -> &Document {
        &self.document
    }

    // ==================
    // Identifier allocation
    // ==================

    /// Issues the next id for `category` and persists the counter.
    ///
    /// Returns 1 the first time a category is seen, then 2, 3, ...
    pub fn next_id(&mut self, category: &str) -> StoreResult<u64> {
        validate_category(category)?;
        let id = self.commit(|doc| doc.allocate_id(category))?;
        log_event(
            Event::IdAllocated,
            &[("category", category), ("id", id.to_string().as_str())],
        );
        Ok(id)
    }

    /// Last id issued for `category`, if any
    pub fn last_id(&self, category: &str) -> Option<u64> {
        self.document.last_id(category)
    }

    // ==================
    // Constraints
    // ==================

    /// Declares `field` as subject to `kind` for `category`.
    ///
    /// Idempotent. Persists only when the constraint is new; returns whether
    /// it was.
    pub fn declare_constraint(
        &mut self,
        category: &str,
        kind: ConstraintKind,
        field: &str,
    ) -> StoreResult<bool> {
        validate_category(category)?;
        if self.document.is_constrained(category, kind, field) {
            return Ok(false);
        }

        self.commit(|doc| Ok(doc.add_constraint(category, kind, field)))?;
        log_event(
            Event::ConstraintDeclared,
            &[
                ("category", category),
                ("constraint", kind.as_str()),
                ("field", field),
            ],
        );
        Ok(true)
    }

    /// Whether `field` is subject to `kind` for `category`
    pub fn is_constrained(&self, category: &str, kind: ConstraintKind, field: &str) -> bool {
        self.document.is_constrained(category, kind, field)
    }

    /// Fields declared under `kind` for `category`
    pub fn constrained_fields(&self, category: &str, kind: ConstraintKind) -> Vec<&str> {
        self.document
            .constrained_fields(category, kind)
            .map(|fields| fields.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether `value` may be used for `field` in `category`.
    ///
    /// Always true when the field is not declared unique. Otherwise scans
    /// every record of the category.
    pub fn is_unique(&self, category: &str, field: &str, value: &Value) -> bool {
        if !self.is_constrained(category, ConstraintKind::Unique, field) {
            return true;
        }
        !self.document.contains_field_value(category, field, value)
    }

    // ==================
    // Record access
    // ==================

    /// Inserts `record` under the next id of `category` and returns the id.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateFieldValue` for the first field whose value breaks
    /// a unique constraint. No id is issued and nothing is written in that
    /// case.
    ///
    /// Ids already occupied by a record written with [`put`](Self::put) are
    /// skipped, so an insert never replaces an existing record.
    pub fn insert(&mut self, category: &str, record: Record) -> StoreResult<u64> {
        validate_category(category)?;

        for (field, value) in &record {
            if !self.is_unique(category, field, value) {
                let shown = display_value(value);
                log_event(
                    Event::UniqueViolation,
                    &[
                        ("category", category),
                        ("field", field.as_str()),
                        ("value", shown.as_str()),
                    ],
                );
                return Err(StoreError::DuplicateFieldValue {
                    field: field.clone(),
                    value: shown,
                });
            }
        }

        let id = self.commit(|doc| loop {
            let id = doc.allocate_id(category)?;
            let key = RecordKey::new(category, id.to_string())?;
            if !doc.contains_key(&key) {
                doc.insert(&key, Value::Object(record));
                break Ok(id);
            }
        })?;

        log_event(
            Event::RecordInserted,
            &[("category", category), ("id", id.to_string().as_str())],
        );
        Ok(id)
    }

    /// Stores `value` at `category/id`, replacing any previous value.
    ///
    /// Constraints are not checked. Returns the replaced value.
    pub fn put(&mut self, key: &str, value: Value) -> StoreResult<Option<Value>> {
        let key = RecordKey::parse(key)?;
        let previous = self.commit(|doc| Ok(doc.insert(&key, value)))?;
        log_event(Event::RecordPut, &[("key", key.to_string().as_str())]);
        Ok(previous)
    }

    /// Looks up `category/id`.
    ///
    /// A missing category or id is reported as `CategoryNotFound` or
    /// `IdNotFound`; neither is fatal.
    pub fn get(&self, key: &str) -> StoreResult<&Value> {
        let key = RecordKey::parse(key)?;
        self.document.get(&key).map_err(|e| {
            log_not_found(&key, &e);
            e
        })
    }

    /// Removes `category/id` and returns the removed value.
    ///
    /// If the key is absent the document and file are left untouched.
    pub fn delete(&mut self, key: &str) -> StoreResult<Value> {
        let key = RecordKey::parse(key)?;
        if let Err(e) = self.document.get(&key) {
            log_not_found(&key, &e);
            return Err(e);
        }

        let removed = self.commit(|doc| doc.remove(&key))?;
        log_event(Event::RecordDeleted, &[("key", key.to_string().as_str())]);
        Ok(removed)
    }

    /// Iterates the records of `category` as `(id, value)`.
    pub fn records<'a>(&'a self, category: &str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.document.records(category)
    }

    /// Returns the whole partition of `category`.
    pub fn category(&self, category: &str) -> StoreResult<&Map<String, Value>> {
        self.document
            .category(category)
            .ok_or_else(|| StoreError::CategoryNotFound {
                category: category.to_string(),
            })
    }

    /// Iterates category names.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.document.categories()
    }
}

fn log_not_found(key: &RecordKey, error: &StoreError) {
    let reason = match error {
        StoreError::CategoryNotFound { .. } => "category",
        _ => "id",
    };
    log_event(
        Event::KeyNotFound,
        &[("key", key.to_string().as_str()), ("missing", reason)],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::record::record_from_value;
    use serde_json::json;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, DocumentStore) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db").join("database.json");
        let store = DocumentStore::open(path).unwrap();
        (temp_dir, store)
    }

    fn user(name: &str) -> Record {
        record_from_value(json!({ "username": name, "password": "x" })).unwrap()
    }

    #[test]
    fn test_open_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("database.json");

        let store = DocumentStore::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), path);
        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({ "auto_increment": {} }));
    }

    #[test]
    fn test_open_rejects_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("database.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = DocumentStore::open(&path).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "JSONDB_STORE_CORRUPTED");
    }

    #[test]
    fn test_next_id_sequence() {
        let (_tmp, mut store) = open_temp();
        assert_eq!(store.next_id("user").unwrap(), 1);
        assert_eq!(store.next_id("user").unwrap(), 2);
        assert_eq!(store.next_id("post").unwrap(), 1);
        assert_eq!(store.next_id("user").unwrap(), 3);
        assert_eq!(store.last_id("user"), Some(3));
    }

    #[test]
    fn test_next_id_rejects_reserved_category() {
        let (_tmp, mut store) = open_temp();
        let err = store.next_id("constraints").unwrap_err();
        assert!(matches!(err, StoreError::ReservedCategory { .. }));
        assert_eq!(store.last_id("constraints"), None);
    }

    #[test]
    fn test_declare_constraint_persists_only_on_change() {
        let (_tmp, mut store) = open_temp();
        assert!(store
            .declare_constraint("user", ConstraintKind::Unique, "username")
            .unwrap());

        let before = fs::read_to_string(store.path()).unwrap();
        assert!(!store
            .declare_constraint("user", ConstraintKind::Unique, "username")
            .unwrap());
        let after = fs::read_to_string(store.path()).unwrap();

        assert_eq!(before, after);
        assert_eq!(
            store.constrained_fields("user", ConstraintKind::Unique),
            vec!["username"]
        );
    }

    #[test]
    fn test_is_unique_without_constraint() {
        let (_tmp, mut store) = open_temp();
        store.insert("user", user("Alice")).unwrap();
        assert!(store.is_unique("user", "username", &json!("Alice")));
    }

    #[test]
    fn test_is_unique_with_constraint() {
        let (_tmp, mut store) = open_temp();
        store
            .declare_constraint("user", ConstraintKind::Unique, "username")
            .unwrap();
        store.insert("user", user("Alice")).unwrap();

        assert!(!store.is_unique("user", "username", &json!("Alice")));
        assert!(store.is_unique("user", "username", &json!("Bob")));
        assert!(store.is_unique("admin", "username", &json!("Alice")));
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let (_tmp, mut store) = open_temp();
        store
            .declare_constraint("user", ConstraintKind::Unique, "username")
            .unwrap();

        assert_eq!(store.insert("user", user("Alice")).unwrap(), 1);
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.insert("user", user("Alice")).unwrap_err();
        match err {
            StoreError::DuplicateFieldValue { field, value } => {
                assert_eq!(field, "username");
                assert_eq!(value, "Alice");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(store.last_id("user"), Some(1));
        assert_eq!(store.records("user").count(), 1);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_unique_check_covers_non_string_values() {
        let (_tmp, mut store) = open_temp();
        store
            .declare_constraint("device", ConstraintKind::Unique, "serial")
            .unwrap();

        store
            .insert("device", record_from_value(json!({ "serial": 42 })).unwrap())
            .unwrap();
        let err = store
            .insert("device", record_from_value(json!({ "serial": 42 })).unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "serial 42 already exists");

        // Same digits as a string are a different value
        assert!(store
            .insert("device", record_from_value(json!({ "serial": "42" })).unwrap())
            .is_ok());
    }

    #[test]
    fn test_unique_check_compares_numbers_by_value() {
        let (_tmp, mut store) = open_temp();
        store
            .declare_constraint("device", ConstraintKind::Unique, "serial")
            .unwrap();

        store
            .insert("device", record_from_value(json!({ "serial": 42 })).unwrap())
            .unwrap();
        let err = store
            .insert("device", record_from_value(json!({ "serial": 42.0 })).unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateFieldValue { .. }));
        assert_eq!(store.last_id("device"), Some(1));
    }

    #[test]
    fn test_insert_skips_id_taken_by_put() {
        let (_tmp, mut store) = open_temp();
        store.put("user/1", json!({ "username": "Manual" })).unwrap();
        store.put("user/2", json!({ "username": "Manual2" })).unwrap();

        let id = store
            .insert("user", record_from_value(json!({ "username": "Alice" })).unwrap())
            .unwrap();
        assert_eq!(id, 3);
        assert_eq!(store.last_id("user"), Some(3));
        assert_eq!(store.get("user/1").unwrap()["username"], "Manual");
        assert_eq!(store.get("user/2").unwrap()["username"], "Manual2");
        assert_eq!(store.get("user/3").unwrap()["username"], "Alice");
        assert_eq!(&persist::read_document(store.path()).unwrap(), store.document());
    }

    #[test]
    fn test_put_get_delete() {
        let (_tmp, mut store) = open_temp();

        assert!(store.put("config/theme", json!("dark")).unwrap().is_none());
        assert_eq!(store.get("config/theme").unwrap(), &json!("dark"));

        let previous = store.put("config/theme", json!("light")).unwrap();
        assert_eq!(previous, Some(json!("dark")));

        let removed = store.delete("config/theme").unwrap();
        assert_eq!(removed, json!("light"));
        assert!(matches!(
            store.get("config/theme"),
            Err(StoreError::IdNotFound { .. })
        ));
    }

    #[test]
    fn test_get_missing_is_not_fatal() {
        let (_tmp, store) = open_temp();
        let err = store.get("ghost/1").unwrap_err();
        assert!(matches!(err, StoreError::CategoryNotFound { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_delete_missing_leaves_file_untouched() {
        let (_tmp, mut store) = open_temp();
        store.put("user/1", json!({ "username": "Alice" })).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        assert!(matches!(
            store.delete("user/2"),
            Err(StoreError::IdNotFound { .. })
        ));
        assert!(matches!(
            store.delete("post/1"),
            Err(StoreError::CategoryNotFound { .. })
        ));

        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_invalid_keys() {
        let (_tmp, mut store) = open_temp();
        assert!(matches!(
            store.put("user_1", json!({})),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(
            store.get("auto_increment/user"),
            Err(StoreError::ReservedCategory { .. })
        ));
    }

    #[test]
    fn test_failed_write_keeps_memory_consistent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("db");
        let mut store = DocumentStore::open(dir.join("database.json")).unwrap();
        store.next_id("user").unwrap();

        // Removing the directory makes the temp file impossible to create
        fs::remove_dir_all(&dir).unwrap();

        let err = store.next_id("user").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(store.last_id("user"), Some(1));
    }

    #[test]
    fn test_category_view() {
        let (_tmp, mut store) = open_temp();
        store.insert("user", user("Alice")).unwrap();
        store.insert("user", user("Bob")).unwrap();

        let users = store.category("user").unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users["2"]["username"], "Bob");
        assert_eq!(store.categories().collect::<Vec<_>>(), vec!["user"]);
        assert!(store.category("post").is_err());
    }
}
