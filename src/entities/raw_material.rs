//! Raw material entity - boards, posts, nails and fiber as purchased

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::engine::units::RawCategory;

/// A purchased material kept in stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterial {
    /// Unique identifier (RAW-...)
    pub id: EntityId,

    /// Short description (e.g., "Pine board 244 x 10 x 2")
    pub title: String,

    /// Material category
    pub category: RawCategory,

    /// Length in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Width in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Thickness in cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,

    /// Price per unit
    #[serde(default)]
    pub unit_price: f64,

    /// Units on hand
    #[serde(default)]
    pub stock: u32,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this record)
    pub author: String,

    /// Entity revision number
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Entity for RawMaterial {
    const PREFIX: EntityPrefix = EntityPrefix::Raw;

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

impl RawMaterial {
    /// Create a new raw material with no stock
    pub fn new(title: impl Into<String>, category: RawCategory, unit_price: f64, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Raw),
            title: title.into(),
            category,
            length: None,
            width: None,
            thickness: None,
            unit_price,
            stock: 0,
            tags: Vec::new(),
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    /// Set the length (builder style)
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the stock (builder style)
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Bump the revision after an edit
    pub fn touch(&mut self) {
        self.entity_revision += 1;
    }
}
