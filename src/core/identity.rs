//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Raw material (board, post, nail, fiber)
    Raw,
    /// Composite part (board type, block type, skid type)
    Part,
    /// Pallet prototype (bill of materials)
    Prot,
    /// Customer order
    Ord,
    /// Purchase receipt
    Rcv,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Raw => "RAW",
            EntityPrefix::Part => "PART",
            EntityPrefix::Prot => "PROT",
            EntityPrefix::Ord => "ORD",
            EntityPrefix::Rcv => "RCV",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Raw,
            EntityPrefix::Part,
            EntityPrefix::Prot,
            EntityPrefix::Ord,
            EntityPrefix::Rcv,
        ]
    }

    /// Human-readable entity type name
    pub fn entity_name(&self) -> &'static str {
        match self {
            EntityPrefix::Raw => "raw material",
            EntityPrefix::Part => "part",
            EntityPrefix::Prot => "prototype",
            EntityPrefix::Ord => "order",
            EntityPrefix::Rcv => "receipt",
        }
    }

    /// Try to determine entity prefix from an ID or filename like "RAW-xxx.pws.yaml"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        Self::all()
            .iter()
            .find(|p| upper.starts_with(&format!("{}-", p.as_str())))
            .copied()
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RAW" => Ok(EntityPrefix::Raw),
            "PART" => Ok(EntityPrefix::Part),
            "PROT" => Ok(EntityPrefix::Prot),
            "ORD" => Ok(EntityPrefix::Ord),
            "RCV" => Ok(EntityPrefix::Rcv),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Get the entity prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: RAW, PART, PROT, ORD, RCV)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Raw);
        assert!(id.to_string().starts_with("RAW-"));
        assert_eq!(id.to_string().len(), 30); // RAW- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let original = EntityId::new(EntityPrefix::Part);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
        assert_eq!(parsed.prefix(), EntityPrefix::Part);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("RAW01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("RAW-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_prefix_from_filename() {
        assert_eq!(
            EntityPrefix::from_filename("prot-01abc.pws.yaml"),
            Some(EntityPrefix::Prot)
        );
        assert_eq!(EntityPrefix::from_filename("notes.yaml"), None);
    }
}
