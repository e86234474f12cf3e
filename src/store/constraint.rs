//! Constraint kinds
//!
//! The document stores constraint types by name so that the file stays
//! readable by hand. Only `unique` is enforced on insert.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::StoreError;

/// A constraint that can be declared on a category field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Field value must not repeat across records of the category
    Unique,
}

impl ConstraintKind {
    /// Name used in the `constraints` section of the document
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Unique => "unique",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConstraintKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unique" => Ok(ConstraintKind::Unique),
            other => Err(StoreError::UnknownConstraint {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_name() {
        assert_eq!(ConstraintKind::Unique.as_str(), "unique");
        assert_eq!("unique".parse::<ConstraintKind>().unwrap(), ConstraintKind::Unique);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("primary".parse::<ConstraintKind>().is_err());
    }
}
