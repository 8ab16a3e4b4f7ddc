//! Order entity - a customer's request for pallets by prototype

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{default_revision, Entity};
use crate::core::identity::{EntityId, EntityPrefix};

/// One ordered prototype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Prototype ID (PROT-...)
    pub prototype: String,

    /// Pallets ordered
    pub quantity: u32,

    /// Production lot number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,

    /// Phytosanitary treatment certificate number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_number: Option<String>,
}

/// A customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier (ORD-...)
    pub id: EntityId,

    /// Customer name
    pub customer: String,

    /// Promised delivery date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Ordered prototypes
    #[serde(default)]
    pub lines: Vec<OrderLine>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author name
    pub author: String,

    /// Revision counter for entity updates
    #[serde(default = "default_revision")]
    pub entity_revision: u32,
}

impl Entity for Order {
    const PREFIX: EntityPrefix = EntityPrefix::Ord;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.customer
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Order {
    /// Create an order with no lines
    pub fn new(customer: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ord),
            customer: customer.into(),
            due_date: None,
            lines: Vec::new(),
            created: Utc::now(),
            author: author.into(),
            entity_revision: 1,
        }
    }

    /// Add a line without lot or treatment numbers
    pub fn add_line(&mut self, prototype: impl Into<String>, quantity: u32) {
        self.lines.push(OrderLine {
            prototype: prototype.into(),
            quantity,
            lot_number: None,
            treatment_number: None,
        });
    }

    /// Total pallets across lines
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Quantities in line order
    pub fn quantities(&self) -> Vec<u32> {
        self.lines.iter().map(|l| l.quantity).collect()
    }
}
