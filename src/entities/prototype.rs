//! Prototype entity - one pallet design and its bill of materials

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::engine::bom::{BomLine, Nominal, SkidRef};
use crate::engine::units::ItemKind;

/// A pallet design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prototype {
    /// Unique identifier (PROT-...)
    pub id: EntityId,

    /// Design name (e.g., "Euro 1200x800 heavy")
    pub title: String,

    /// Nominal length in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Nominal width in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Nominal height in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    /// Skids used instead of separate board and block lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skid: Option<SkidRef>,

    /// Bill of materials
    #[serde(default)]
    pub lines: Vec<BomLine>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author name
    pub author: String,

    /// Revision counter for entity updates
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Entity for Prototype {
    const PREFIX: EntityPrefix = EntityPrefix::Prot;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Prototype {
    /// Create a new prototype with an empty BOM
    pub fn new(title: impl Into<String>, length: f64, width: f64, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Prot),
            title: title.into(),
            length: Some(length),
            width: Some(width),
            height: None,
            skid: None,
            lines: Vec::new(),
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    /// Add a BOM line
    pub fn add_line(&mut self, kind: ItemKind, item: impl Into<String>, quantity: u32) {
        self.lines.push(BomLine::new(kind, item, quantity));
    }

    /// Use a skid
    pub fn set_skid(&mut self, part: impl Into<String>, quantity: u32) {
        self.skid = Some(SkidRef {
            part: part.into(),
            quantity,
        });
    }

    /// Title and footprint as the composition rules see them
    pub fn nominal(&self) -> Nominal<'_> {
        Nominal {
            title: &self.title,
            length: self.length,
            width: self.width,
        }
    }

    /// Whether the BOM (skid included) references `id`
    pub fn references(&self, id: &str) -> bool {
        self.lines.iter().any(|l| l.item == id)
            || self.skid.as_ref().map_or(false, |s| s.part == id)
    }

    /// Bump the revision after an edit
    pub fn touch(&mut self) {
        self.entity_revision += 1;
    }
}
