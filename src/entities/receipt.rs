//! Receipt entity - raw material received against a purchase ("encargo")

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A delivery of raw material into stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier (RCV-...)
    pub id: EntityId,

    /// Raw material received (RAW-...)
    pub material: String,

    /// Units received
    pub quantity: u32,

    /// Price per unit on this delivery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// Supplier name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Delivery date
    pub received: NaiveDate,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Who booked the receipt
    pub author: String,
}

impl Entity for Receipt {
    const PREFIX: EntityPrefix = EntityPrefix::Rcv;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        self.supplier.as_deref().unwrap_or("receipt")
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Receipt {
    /// Record `quantity` units of `material` received today
    pub fn new(material: impl Into<String>, quantity: u32, author: impl Into<String>) -> Self {
        let created = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Rcv),
            material: material.into(),
            quantity,
            unit_price: None,
            supplier: None,
            received: created.date_naive(),
            created,
            author: author.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_creation() {
        let rcv = Receipt::new("RAW-1", 200, "test");
        assert!(rcv.id.to_string().starts_with("RCV-"));
        assert_eq!(rcv.received, rcv.created.date_naive());
        assert_eq!(rcv.title(), "receipt");
    }
}
