//! Record addressing
//!
//! Records live under `document[category][id]`. On the wire a record is
//! addressed as `category/id`; the split happens on the first `/`, so ids
//! may themselves contain slashes.

use std::fmt;

use super::document::RESERVED_FIELDS;
use super::errors::{StoreError, StoreResult};

/// Separator between category and id in a record key
pub const KEY_SEPARATOR: char = '/';

/// A parsed `category/id` record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    category: String,
    id: String,
}

impl RecordKey {
    /// Builds a key from its parts, validating the category.
    pub fn new(category: impl Into<String>, id: impl Into<String>) -> StoreResult<Self> {
        let category = category.into();
        let id = id.into();
        validate_category(&category)?;
        if id.is_empty() {
            return Err(StoreError::InvalidKey {
                key: format!("{}{}", category, KEY_SEPARATOR),
                reason: "id is empty",
            });
        }
        Ok(Self { category, id })
    }

    /// Parses `category/id`.
    pub fn parse(key: &str) -> StoreResult<Self> {
        let (category, id) = key.split_once(KEY_SEPARATOR).ok_or_else(|| StoreError::InvalidKey {
            key: key.to_string(),
            reason: "expected 'category/id'",
        })?;

        if category.is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: "category is empty",
            });
        }
        if id.is_empty() {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
                reason: "id is empty",
            });
        }

        Self::new(category, id)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.category, KEY_SEPARATOR, self.id)
    }
}

/// Rejects empty and reserved category names.
pub fn validate_category(category: &str) -> StoreResult<()> {
    if category.is_empty() {
        return Err(StoreError::InvalidKey {
            key: category.to_string(),
            reason: "category is empty",
        });
    }
    if RESERVED_FIELDS.contains(&category) {
        return Err(StoreError::ReservedCategory {
            category: category.to_string(),
        });
    }
    Ok(())
}
