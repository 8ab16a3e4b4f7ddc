//! Composition validator - structural rules for prototype BOMs and orders

use serde::{Deserialize, Serialize};

use crate::engine::error::ValidationError;
use crate::engine::units::ItemKind;

/// BOM line - an item reference with a quantity per pallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    /// What the line references
    pub kind: ItemKind,

    /// Item ID (RAW-... for nail/fiber, PART-... for board/block types).
    /// An empty reference is a blank form row and is ignored.
    #[serde(default)]
    pub item: String,

    /// Units per pallet
    pub quantity: u32,

    /// Line-specific notes (e.g., "clinch on underside")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BomLine {
    /// Create a line without notes
    pub fn new(kind: ItemKind, item: impl Into<String>, quantity: u32) -> Self {
        Self {
            kind,
            item: item.into(),
            quantity,
            notes: None,
        }
    }

    /// Whether the line references an item at all
    pub fn is_filled(&self) -> bool {
        !self.item.trim().is_empty()
    }
}

/// Skid reference - replaces separate board and block lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkidRef {
    /// Skid-type part ID (PART-...)
    pub part: String,

    /// Skids per pallet
    pub quantity: u32,
}

/// Title and nominal footprint of a pallet design
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Nominal<'a> {
    pub title: &'a str,
    pub length: Option<f64>,
    pub width: Option<f64>,
}

/// Parse a quantity typed by a user
///
/// Accepts integral values written as integers or decimals ("50", "50.0");
/// anything else, zero included, is a validation error.
pub fn parse_quantity(field: &str, raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || {
        ValidationError::field(
            field,
            format!("'{}' is not a positive whole number", trimmed),
        )
    };

    if let Ok(n) = trimmed.parse::<u32>() {
        return if n > 0 { Ok(n) } else { Err(invalid()) };
    }

    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    if value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(invalid())
    }
}

fn is_positive_dimension(value: Option<f64>) -> bool {
    value.map_or(false, |v| v.is_finite() && v > 0.0)
}

/// Title and nominal dimensions of a prototype
pub fn check_nominal(nominal: Nominal<'_>) -> Result<(), ValidationError> {
    if nominal.title.trim().is_empty() {
        return Err(ValidationError::field("title", "title is required"));
    }
    if !is_positive_dimension(nominal.length) || !is_positive_dimension(nominal.width) {
        return Err(ValidationError::field(
            "dimensions",
            "nominal length and width are required and must be positive",
        ));
    }
    Ok(())
}

/// Every rule a prototype breaks, in priority order
///
/// 1. title and nominal dimensions present
/// 2. filled lines have positive quantities
/// 3. at least one nail line
/// 4. a skid with positive quantity, or at least one board-type and one block-type line
pub fn prototype_issues(
    nominal: Nominal<'_>,
    lines: &[BomLine],
    skid: Option<&SkidRef>,
) -> Vec<ValidationError> {
    let mut issues = Vec::new();

    if nominal.title.trim().is_empty() {
        issues.push(ValidationError::field("title", "title is required"));
    }
    if !is_positive_dimension(nominal.length) || !is_positive_dimension(nominal.width) {
        issues.push(ValidationError::field(
            "dimensions",
            "nominal length and width are required and must be positive",
        ));
    }

    for (i, line) in lines.iter().enumerate() {
        if line.is_filled() && line.quantity == 0 {
            issues.push(ValidationError::field(
                format!("lines[{}].quantity", i),
                format!("quantity for {} '{}' must be a positive integer", line.kind, line.item),
            ));
        }
    }

    let has_positive = |kind: ItemKind| {
        lines
            .iter()
            .any(|l| l.kind == kind && l.is_filled() && l.quantity > 0)
    };

    if !lines
        .iter()
        .any(|l| l.kind.is_fastener() && l.is_filled() && l.quantity > 0)
    {
        issues.push(ValidationError::field(
            "lines",
            "must include at least one nail line with a positive quantity",
        ));
    }

    match skid {
        Some(skid) => {
            if skid.part.trim().is_empty() {
                issues.push(ValidationError::field("skid.part", "skid reference is empty"));
            } else if skid.quantity == 0 {
                issues.push(ValidationError::field(
                    "skid.quantity",
                    "skid quantity must be a positive integer",
                ));
            }
        }
        None => {
            if !(has_positive(ItemKind::BoardType) && has_positive(ItemKind::BlockType)) {
                issues.push(ValidationError::field(
                    "lines",
                    "must include at least one board type and one block type, or a skid",
                ));
            }
        }
    }

    issues
}

/// Validate a prototype; the first failing rule wins
pub fn validate_prototype(
    nominal: Nominal<'_>,
    lines: &[BomLine],
    skid: Option<&SkidRef>,
) -> Result<(), ValidationError> {
    match prototype_issues(nominal, lines, skid).into_iter().next() {
        Some(first) => Err(first),
        None => Ok(()),
    }
}

/// Validate the shape of an order: a customer and at least one positive line
pub fn validate_order(customer: &str, quantities: &[u32]) -> Result<(), ValidationError> {
    if customer.trim().is_empty() {
        return Err(ValidationError::field("customer", "customer is required"));
    }
    if quantities.is_empty() {
        return Err(ValidationError::field(
            "lines",
            "an order needs at least one prototype line",
        ));
    }
    if let Some(i) = quantities.iter().position(|&q| q == 0) {
        return Err(ValidationError::field(
            format!("lines[{}].quantity", i),
            "quantity of units must be a positive integer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal() -> Nominal<'static> {
        Nominal {
            title: "Euro 1200x800",
            length: Some(120.0),
            width: Some(80.0),
        }
    }

    fn skid(qty: u32) -> SkidRef {
        SkidRef {
            part: "PART-SKID".to_string(),
            quantity: qty,
        }
    }

    #[test]
    fn test_board_and_block_bom_accepted() {
        let lines = vec![
            BomLine::new(ItemKind::Nail, "RAW-N", 50),
            BomLine::new(ItemKind::BoardType, "PART-B", 4),
            BomLine::new(ItemKind::BlockType, "PART-K", 9),
        ];
        assert!(validate_prototype(nominal(), &lines, None).is_ok());
    }

    #[test]
    fn test_skid_bom_needs_no_board_or_block() {
        let lines = vec![BomLine::new(ItemKind::Nail, "RAW-N", 50)];
        assert!(validate_prototype(nominal(), &lines, Some(&skid(3))).is_ok());
    }

    #[test]
    fn test_no_nail_always_rejected() {
        let lines = vec![
            BomLine::new(ItemKind::BoardType, "PART-B", 4),
            BomLine::new(ItemKind::BlockType, "PART-K", 9),
            BomLine::new(ItemKind::Fiber, "RAW-F", 1),
        ];
        let err = validate_prototype(nominal(), &lines, Some(&skid(3))).unwrap_err();
        assert!(err.message.contains("nail"));
    }

    #[test]
    fn test_board_without_block_rejected() {
        let lines = vec![
            BomLine::new(ItemKind::Nail, "RAW-N", 50),
            BomLine::new(ItemKind::BoardType, "PART-B", 4),
        ];
        let err = validate_prototype(nominal(), &lines, None).unwrap_err();
        assert_eq!(
            err.message,
            "must include at least one board type and one block type, or a skid"
        );
    }

    #[test]
    fn test_zero_skid_quantity_rejected() {
        let lines = vec![BomLine::new(ItemKind::Nail, "RAW-N", 50)];
        let err = validate_prototype(nominal(), &lines, Some(&skid(0))).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("skid.quantity"));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let lines = vec![BomLine::new(ItemKind::BoardType, "PART-B", 0)];
        let untitled = Nominal {
            title: " ",
            ..nominal()
        };

        let all = prototype_issues(untitled, &lines, None);
        assert_eq!(all.len(), 4);

        let first = validate_prototype(untitled, &lines, None).unwrap_err();
        assert_eq!(first.field.as_deref(), Some("title"));

        let second = validate_prototype(nominal(), &lines, None).unwrap_err();
        assert_eq!(second.field.as_deref(), Some("lines[0].quantity"));
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let lines = vec![
            BomLine::new(ItemKind::Nail, "RAW-N", 50),
            BomLine::new(ItemKind::Fiber, "", 0),
        ];
        assert!(validate_prototype(nominal(), &lines, Some(&skid(2))).is_ok());
    }

    #[test]
    fn test_missing_dimensions_rejected() {
        let lines = vec![BomLine::new(ItemKind::Nail, "RAW-N", 50)];
        let flat = Nominal {
            width: None,
            ..nominal()
        };
        let err = validate_prototype(flat, &lines, Some(&skid(2))).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("dimensions"));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("qty", "50").unwrap(), 50);
        assert_eq!(parse_quantity("qty", " 12.0 ").unwrap(), 12);
        assert!(parse_quantity("qty", "0").is_err());
        assert!(parse_quantity("qty", "-3").is_err());
        assert!(parse_quantity("qty", "2.5").is_err());
        assert!(parse_quantity("qty", "abc").is_err());
        assert!(parse_quantity("qty", "NaN").is_err());
        assert!(parse_quantity("qty", "inf").is_err());

        let err = parse_quantity("lines[0].quantity", "x").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("lines[0].quantity"));
    }

    #[test]
    fn test_validate_order() {
        assert!(validate_order("Acme", &[120]).is_ok());
        assert!(validate_order("", &[120]).is_err());
        assert!(validate_order("Acme", &[]).is_err());
        let err = validate_order("Acme", &[10, 0]).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("lines[1].quantity"));
    }
}
