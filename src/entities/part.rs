//! Composite part entity - board types and block types cut from raw
//! material, and skid types assembled from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::engine::units::{PartCategory, DEFAULT_KERF_MARGIN};

/// A reference to a parent item and how many of its units one child consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Parent ID (RAW-... for cut parts, PART-... for skids)
    pub id: String,

    /// Parent units consumed per child unit
    #[serde(default = "default_units")]
    pub units: u32,
}

fn default_units() -> u32 {
    1
}

fn default_kerf() -> f64 {
    DEFAULT_KERF_MARGIN
}

/// An intermediate part produced in the workshop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositePart {
    /// Unique identifier (PART-...)
    pub id: EntityId,

    /// Short description (e.g., "Deck board 120cm")
    pub title: String,

    /// Part category
    pub category: PartCategory,

    /// Parents this part is cut or assembled from
    #[serde(default)]
    pub parents: Vec<ParentRef>,

    /// Cut length in cm (required for cut parts)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Width in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Thickness in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,

    /// Material lost per saw cut, in cm
    #[serde(default = "default_kerf")]
    pub kerf_margin: f64,

    /// Explicit price; when absent the price is derived from the parents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// Units on hand
    #[serde(default)]
    pub stock: u32,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this part)
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Entity for CompositePart {
    const PREFIX: EntityPrefix = EntityPrefix::Part;

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

impl CompositePart {
    /// Create a cut part (board or block type) from a single raw parent
    pub fn cut(
        title: impl Into<String>,
        category: PartCategory,
        raw_parent: impl Into<String>,
        length: f64,
        kerf_margin: f64,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Part),
            title: title.into(),
            category,
            parents: vec![ParentRef {
                id: raw_parent.into(),
                units: 1,
            }],
            length: Some(length),
            width: None,
            thickness: None,
            kerf_margin,
            unit_price: None,
            stock: 0,
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    /// Create a skid from a board type and a block type, with the given units each
    pub fn skid(
        title: impl Into<String>,
        board_type: (impl Into<String>, u32),
        block_type: (impl Into<String>, u32),
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Part),
            title: title.into(),
            category: PartCategory::SkidType,
            parents: vec![
                ParentRef {
                    id: board_type.0.into(),
                    units: board_type.1,
                },
                ParentRef {
                    id: block_type.0.into(),
                    units: block_type.1,
                },
            ],
            length: None,
            width: None,
            thickness: None,
            kerf_margin: DEFAULT_KERF_MARGIN,
            unit_price: None,
            stock: 0,
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    /// Set the stock (builder style)
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Whether the part references `id` as a parent
    pub fn has_parent(&self, id: &str) -> bool {
        self.parents.iter().any(|p| p.id == id)
    }

    /// Bump the revision after an edit
    pub fn touch(&mut self) {
        self.entity_revision += 1;
    }
}
