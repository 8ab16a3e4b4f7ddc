//! Price rollup - unit prices of composites, prototype cost and order totals
//!
//! All functions are pure. Negative or non-finite inputs are treated as 0 so
//! a bad price never turns into NaN in an invoice.

/// One constituent of a composite part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentCost {
    pub unit_price: f64,
    pub units: u32,
}

/// One priced BOM line of a prototype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCost {
    pub unit_price: f64,
    pub quantity: u32,
}

/// One line of an order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderLineCost {
    pub prototype_cost: f64,
    pub quantity: u32,
}

/// Clamp a price to a finite, non-negative amount
pub fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

/// `Σ parent_price × units` over the parents of a composite part
pub fn composite_unit_price(parents: &[ParentCost]) -> f64 {
    parents
        .iter()
        .map(|p| sanitize_price(p.unit_price) * f64::from(p.units))
        .sum()
}

/// Advisory price of one cut piece: the parent's price spread over its yield
pub fn cut_piece_price(parent_unit_price: f64, pieces_per_parent: u64) -> f64 {
    if pieces_per_parent == 0 {
        return 0.0;
    }
    sanitize_price(parent_unit_price) / pieces_per_parent as f64
}

/// `Σ item_price × quantity` across every BOM line (skid included)
pub fn prototype_cost(lines: &[LineCost]) -> f64 {
    lines
        .iter()
        .map(|l| sanitize_price(l.unit_price) * f64::from(l.quantity))
        .sum()
}

/// `Σ prototype_cost × quantity` across order lines
pub fn order_total(lines: &[OrderLineCost]) -> f64 {
    lines
        .iter()
        .map(|l| sanitize_price(l.prototype_cost) * f64::from(l.quantity))
        .sum()
}

/// Round to cents for display and invoicing
pub fn round_cents(amount: f64) -> f64 {
    (sanitize_price(amount) * 100.0).round() / 100.0
}
