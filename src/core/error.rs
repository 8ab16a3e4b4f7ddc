//! Service-layer errors and their wire payload
//!
//! Wraps the engine taxonomy together with lookup, storage and locking
//! failures. Every variant has a stable code and an HTTP-class status so a
//! web layer can forward [`ErrorPayload`] unchanged.

use miette::Diagnostic;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::project::ProjectError;
use crate::engine::error::{
    Dependent, InsufficientStock, ReferentialIntegrityError, ValidationError,
};
use crate::yaml::YamlError;

/// Anything a workshop read or write can fail with
#[derive(Debug, Error, Diagnostic)]
pub enum WorkshopError {
    #[error("validation failed: {0}")]
    #[diagnostic(code(pws::validation))]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(
        code(pws::stock::insufficient),
        help("lower the requested stock or receive more parent material")
    )]
    InsufficientStock(#[from] InsufficientStock),

    #[error(transparent)]
    #[diagnostic(
        code(pws::integrity),
        help("run 'pws where-used <ID>' and remove the dependents first")
    )]
    ReferentialIntegrity(#[from] ReferentialIntegrityError),

    #[error("no {kind} found matching '{reference}'")]
    #[diagnostic(code(pws::not_found))]
    NotFound {
        kind: &'static str,
        reference: String,
    },

    #[error("'{reference}' matches {} {kind} entries", matches.len())]
    #[diagnostic(code(pws::ambiguous_id), help("use more characters of the ID"))]
    AmbiguousId {
        kind: &'static str,
        reference: String,
        matches: Vec<String>,
    },

    #[error("project is locked by another writer ({})", path.display())]
    #[diagnostic(
        code(pws::locked),
        help("retry once the other command finishes, or remove the lock file if it is stale")
    )]
    Locked { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(code(pws::project))]
    Project(#[from] ProjectError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("IO error: {0}")]
    #[diagnostic(code(pws::io))]
    Io(#[from] std::io::Error),
}

impl WorkshopError {
    /// Shorthand for a lookup miss
    pub fn not_found(kind: &'static str, reference: impl Into<String>) -> Self {
        WorkshopError::NotFound {
            kind,
            reference: reference.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            WorkshopError::Validation(_) => "VALIDATION_ERROR",
            WorkshopError::InsufficientStock(_) => "STOCK_INSUFFICIENT",
            WorkshopError::ReferentialIntegrity(_) => "REFERENTIAL_INTEGRITY",
            WorkshopError::NotFound { .. } => "NOT_FOUND",
            WorkshopError::AmbiguousId { .. } => "AMBIGUOUS_ID",
            WorkshopError::Locked { .. } => "LOCKED",
            WorkshopError::Project(_) => "PROJECT_ERROR",
            WorkshopError::Yaml(_) => "ENTITY_FILE_ERROR",
            WorkshopError::Io(_) => "IO_ERROR",
        }
    }

    /// HTTP-class status for the error
    pub fn status(&self) -> u16 {
        match self {
            WorkshopError::Validation(_) | WorkshopError::AmbiguousId { .. } => 400,
            WorkshopError::NotFound { .. } => 404,
            WorkshopError::InsufficientStock(_)
            | WorkshopError::ReferentialIntegrity(_)
            | WorkshopError::Locked { .. } => 409,
            WorkshopError::Project(_) | WorkshopError::Yaml(_) | WorkshopError::Io(_) => 500,
        }
    }

    /// Serializable form of this error
    pub fn payload(&self) -> ErrorPayload {
        let mut payload = ErrorPayload {
            code: self.code(),
            status: self.status(),
            message: self.to_string(),
            field: None,
            required_additional: None,
            available: None,
            dependents: None,
            matches: None,
        };

        match self {
            WorkshopError::Validation(e) => {
                payload.message = e.message.clone();
                payload.field = e.field.clone();
            }
            WorkshopError::InsufficientStock(e) => {
                payload.required_additional = Some(e.required_additional);
                payload.available = Some(e.available);
            }
            WorkshopError::ReferentialIntegrity(e) => {
                payload.dependents = Some(e.dependents.clone());
            }
            WorkshopError::AmbiguousId { matches, .. } => {
                payload.matches = Some(matches.clone());
            }
            _ => {}
        }

        payload
    }
}

/// Error body as handed to callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: &'static str,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_additional: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Vec<Dependent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::DependentKind;

    #[test]
    fn test_stock_payload_carries_shortfall() {
        let err: WorkshopError = InsufficientStock {
            required_additional: 1,
            available: 80,
        }
        .into();

        assert_eq!(err.code(), "STOCK_INSUFFICIENT");
        assert_eq!(err.status(), 409);

        let json = serde_json::to_value(err.payload()).unwrap();
        assert_eq!(json["code"], "STOCK_INSUFFICIENT");
        assert_eq!(json["requiredAdditional"], 1);
        assert_eq!(json["available"], 80);
        assert!(json.get("dependents").is_none());
    }

    #[test]
    fn test_validation_payload_uses_bare_message() {
        let err: WorkshopError = ValidationError::field("title", "title is required").into();
        let payload = err.payload();

        assert_eq!(payload.status, 400);
        assert_eq!(payload.message, "title is required");
        assert_eq!(payload.field.as_deref(), Some("title"));
    }

    #[test]
    fn test_integrity_payload_lists_dependents() {
        let err: WorkshopError = ReferentialIntegrityError {
            id: "RAW-1".to_string(),
            dependents: vec![Dependent {
                id: "PART-1".to_string(),
                kind: DependentKind::Part,
                title: "Deck board".to_string(),
                relationship: "cut from (1 unit)".to_string(),
            }],
        }
        .into();

        assert_eq!(err.code(), "REFERENTIAL_INTEGRITY");
        let json = serde_json::to_value(err.payload()).unwrap();
        assert_eq!(json["dependents"][0]["id"], "PART-1");
        assert_eq!(json["dependents"][0]["kind"], "part");
    }

    #[test]
    fn test_not_found_status() {
        let err = WorkshopError::not_found("raw material", "RAW-X");
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "no raw material found matching 'RAW-X'");
    }
}
