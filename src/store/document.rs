//! In-memory document model
//!
//! The document is a single JSON object. Two top-level fields are reserved:
//!
//! ```json
//! {
//!   "auto_increment": { "user": 2 },
//!   "constraints": { "user": { "unique": ["username"] } },
//!   "user": {
//!     "1": { "username": "Alice", "password": "..." },
//!     "2": { "username": "Bob", "password": "..." }
//!   }
//! }
//! ```
//!
//! Every other top-level field is a category: an object mapping record ids
//! to records. All maps are ordered so the serialized file is deterministic.
//!
//! `Document` is purely in-memory. Persistence is handled by the store,
//! which mutates a copy and only commits it after a successful write.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::constraint::ConstraintKind;
use super::errors::{StoreError, StoreResult};
use super::key::RecordKey;
use super::record::values_equal;

/// Reserved top-level field holding per-category counters
pub const AUTO_INCREMENT_FIELD: &str = "auto_increment";

/// Reserved top-level field holding declared constraints
pub const CONSTRAINTS_FIELD: &str = "constraints";

/// Top-level fields that cannot be used as categories
pub const RESERVED_FIELDS: [&str; 2] = [AUTO_INCREMENT_FIELD, CONSTRAINTS_FIELD];

/// category -> constraint type -> field names
pub type ConstraintMap = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// The whole persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Last issued id per category
    #[serde(default)]
    auto_increment: BTreeMap<String, u64>,

    /// Declared constraints per category
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    constraints: ConstraintMap,

    /// Category partitions: category -> id -> record
    #[serde(flatten)]
    categories: BTreeMap<String, Map<String, Value>>,
}

impl Document {
    /// Creates an empty document with an empty `auto_increment` section.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================
    // Identifier allocation
    // ==================

    /// Returns the last id issued for a category.
    pub fn last_id(&self, category: &str) -> Option<u64> {
        self.auto_increment.get(category).copied()
    }

    /// Issues the next id for a category: 1 on first use, last + 1 after.
    pub fn allocate_id(&mut self, category: &str) -> StoreResult<u64> {
        let next = match self.auto_increment.get(category) {
            None => 1,
            Some(last) => last.checked_add(1).ok_or_else(|| StoreError::IdExhausted {
                category: category.to_string(),
            })?,
        };
        self.auto_increment.insert(category.to_string(), next);
        Ok(next)
    }

    // ==================
    // Constraints
    // ==================

    /// Returns the fields declared under a constraint for a category.
    pub fn constrained_fields(
        &self,
        category: &str,
        kind: ConstraintKind,
    ) -> Option<&BTreeSet<String>> {
        self.constraints.get(category)?.get(kind.as_str())
    }

    pub fn is_constrained(&self, category: &str, kind: ConstraintKind, field: &str) -> bool {
        self.constrained_fields(category, kind)
            .map_or(false, |fields| fields.contains(field))
    }

    /// Registers a constraint. Returns false if it was already present.
    pub fn add_constraint(&mut self, category: &str, kind: ConstraintKind, field: &str) -> bool {
        self.constraints
            .entry(category.to_string())
            .or_default()
            .entry(kind.as_str().to_string())
            .or_default()
            .insert(field.to_string())
    }

    /// Returns true if any record of the category has `field == value`.
    ///
    /// Linear scan over the category; there is no index. Numbers compare by
    /// value (see [`values_equal`]).
    pub fn contains_field_value(&self, category: &str, field: &str, value: &Value) -> bool {
        self.records(category).any(|(_, record)| {
            record
                .get(field)
                .map_or(false, |existing| values_equal(existing, value))
        })
    }

    /// Returns true if a record is stored under `key`.
    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.categories
            .get(key.category())
            .map_or(false, |records| records.contains_key(key.id()))
    }

    // ==================
    // Record access
    // ==================

    /// Iterates category names in order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Returns a category partition.
    pub fn category(&self, category: &str) -> Option<&Map<String, Value>> {
        self.categories.get(category)
    }

    /// Iterates the records of a category. Empty if the category is unknown.
    pub fn records<'a>(&'a self, category: &str) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|records| records.iter().map(|(id, value)| (id.as_str(), value)))
    }

    /// Looks up a record, distinguishing a missing category from a missing id.
    pub fn get(&self, key: &RecordKey) -> StoreResult<&Value> {
        let records = self
            .categories
            .get(key.category())
            .ok_or_else(|| StoreError::CategoryNotFound {
                category: key.category().to_string(),
            })?;

        records.get(key.id()).ok_or_else(|| StoreError::IdNotFound {
            category: key.category().to_string(),
            id: key.id().to_string(),
        })
    }

    /// Stores a value, creating the category if needed. Returns the previous value.
    pub fn insert(&mut self, key: &RecordKey, value: Value) -> Option<Value> {
        self.categories
            .entry(key.category().to_string())
            .or_default()
            .insert(key.id().to_string(), value)
    }

    /// Removes a value. The category is kept even when it becomes empty.
    pub fn remove(&mut self, key: &RecordKey) -> StoreResult<Value> {
        // Existence check first so the error distinguishes category from id.
        self.get(key)?;
        self.categories
            .get_mut(key.category())
            .and_then(|records| records.remove(key.id()))
            .ok_or_else(|| StoreError::IdNotFound {
                category: key.category().to_string(),
                id: key.id().to_string(),
            })
    }

    /// Returns the number of records across all categories.
    pub fn record_count(&self) -> usize {
        self.categories.values().map(Map::len).sum()
    }
}
