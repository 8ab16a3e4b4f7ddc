//! Error taxonomy for the costing engine
//!
//! Business conditions are returned as values, never panics. Each type maps
//! to a stable code so callers can render an actionable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-correctable input problem (missing field, non-positive quantity)
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Offending field, when one can be named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    /// Create an error not tied to a single field
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// Create an error for a named field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

/// Requested stock exceeds the capacity derivable from parent stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("insufficient stock: {required_additional} more unit(s) needed, {available} available")]
pub struct InsufficientStock {
    /// `requested - capacity`
    pub required_additional: u64,

    /// Capacity at the time of the check
    pub available: u64,
}

/// Kind of entity that depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentKind {
    Part,
    Prototype,
    Order,
}

impl std::fmt::Display for DependentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependentKind::Part => write!(f, "part"),
            DependentKind::Prototype => write!(f, "prototype"),
            DependentKind::Order => write!(f, "order"),
        }
    }
}

/// One entity that references the one being deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    pub id: String,
    pub kind: DependentKind,
    pub title: String,
    /// How it references the target (e.g. "parent (3 units)", "bom nail x50")
    pub relationship: String,
}

/// Deletion blocked because other entities still reference the target
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("'{id}' is still referenced by {} entit{}", dependents.len(), if dependents.len() == 1 { "y" } else { "ies" })]
pub struct ReferentialIntegrityError {
    pub id: String,
    pub dependents: Vec<Dependent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = InsufficientStock {
            required_additional: 1,
            available: 80,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock: 1 more unit(s) needed, 80 available"
        );
    }

    #[test]
    fn test_integrity_message_pluralizes() {
        let dep = Dependent {
            id: "PART-1".to_string(),
            kind: DependentKind::Part,
            title: "Skid".to_string(),
            relationship: "parent".to_string(),
        };
        let one = ReferentialIntegrityError {
            id: "RAW-1".to_string(),
            dependents: vec![dep.clone()],
        };
        assert!(one.to_string().ends_with("1 entity"));

        let two = ReferentialIntegrityError {
            id: "RAW-1".to_string(),
            dependents: vec![dep.clone(), dep],
        };
        assert!(two.to_string().ends_with("2 entities"));
    }

    #[test]
    fn test_validation_error_serializes_without_empty_field() {
        let json = serde_json::to_string(&ValidationError::new("title is required")).unwrap();
        assert_eq!(json, r#"{"message":"title is required"}"#);
    }
}
