//! Composite inventory derivation and costing engine
//!
//! Pure functions only: every result depends on its arguments alone, so the
//! same check can be re-run inside a write lock right before persisting.
//!
//! - [`units`] - categories and conversion constants
//! - [`yield_calc`] - pieces per parent and maximum child stock
//! - [`pricing`] - unit price, prototype cost and order total rollups
//! - [`stock`] - the stock availability gate
//! - [`bom`] - prototype and order composition rules

pub mod bom;
pub mod error;
pub mod pricing;
pub mod stock;
pub mod units;
pub mod yield_calc;

pub use bom::{parse_quantity, validate_order, validate_prototype, BomLine, Nominal, SkidRef};
pub use error::{
    Dependent, DependentKind, InsufficientStock, ReferentialIntegrityError, ValidationError,
};
pub use pricing::{composite_unit_price, order_total, prototype_cost};
pub use stock::validate_stock_request;
pub use units::{ItemKind, ParentKind, PartCategory, RawCategory};
pub use yield_calc::{compute_max_stock, compute_yield};
