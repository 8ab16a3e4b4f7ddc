//! Workshop snapshot - every entity of a project loaded at once
//!
//! This is the read side the calculators are fed from: it resolves IDs,
//! derives capacity and prices from current parent data, and re-checks every
//! invariant. Nothing here writes; see [`crate::core::store`] for that.

use serde::Serialize;
use std::path::PathBuf;

use crate::core::error::WorkshopError;
use crate::core::identity::EntityPrefix;
use crate::core::loader::load_all;
use crate::core::project::Project;
use crate::engine::bom::validate_prototype;
use crate::engine::error::{Dependent, DependentKind, ValidationError};
use crate::engine::pricing::{self, LineCost, OrderLineCost, ParentCost};
use crate::engine::stock::validate_stock_request;
use crate::engine::units::{check_parent_structure, ItemKind, ParentKind, PartCategory};
use crate::engine::yield_calc::{assembly_capacity, compute_max_stock, compute_yield};
use crate::engine::validate_order;
use crate::entities::{CompositePart, Order, Prototype, RawMaterial, Receipt};
use crate::yaml::YamlError;

/// Parts nest at most raw -> cut part -> skid; anything deeper is a cycle
const MAX_PRICE_DEPTH: usize = 8;

/// All entities of a project plus the files that failed to load
#[derive(Debug, Default)]
pub struct Workshop {
    pub raws: Vec<RawMaterial>,
    pub parts: Vec<CompositePart>,
    pub prototypes: Vec<Prototype>,
    pub orders: Vec<Order>,
    pub receipts: Vec<Receipt>,
    pub failures: Vec<(PathBuf, YamlError)>,
}

/// One priced line of a prototype
#[derive(Debug, Clone, Serialize)]
pub struct CostLine {
    pub kind: String,
    pub item: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// One priced line of an order
#[derive(Debug, Clone, Serialize)]
pub struct OrderTotalLine {
    pub prototype: String,
    pub title: String,
    pub quantity: u32,
    pub prototype_cost: f64,
    pub subtotal: f64,
}

/// Capacity figures for one composite part
#[derive(Debug, Clone, Serialize)]
pub struct StockLine {
    pub id: String,
    pub title: String,
    pub category: PartCategory,
    pub stock: u32,
    pub capacity: u64,
    pub headroom: u64,
}

/// An invariant broken by a stored entity
#[derive(Debug)]
pub struct Issue {
    pub id: String,
    pub error: WorkshopError,
}

impl Workshop {
    /// Load every entity in the project
    pub fn load(project: &Project) -> Self {
        let mut workshop = Workshop::default();

        let raws = load_all::<RawMaterial>(project);
        workshop.raws = raws.entities;
        workshop.failures.extend(raws.failures);

        let parts = load_all::<CompositePart>(project);
        workshop.parts = parts.entities;
        workshop.failures.extend(parts.failures);

        let prototypes = load_all::<Prototype>(project);
        workshop.prototypes = prototypes.entities;
        workshop.failures.extend(prototypes.failures);

        let orders = load_all::<Order>(project);
        workshop.orders = orders.entities;
        workshop.failures.extend(orders.failures);

        let receipts = load_all::<Receipt>(project);
        workshop.receipts = receipts.entities;
        workshop.failures.extend(receipts.failures);

        tracing::debug!(
            raws = workshop.raws.len(),
            parts = workshop.parts.len(),
            prototypes = workshop.prototypes.len(),
            orders = workshop.orders.len(),
            receipts = workshop.receipts.len(),
            "loaded workshop snapshot"
        );
        workshop
    }

    pub fn raw(&self, id: &str) -> Option<&RawMaterial> {
        self.raws.iter().find(|r| r.id.to_string() == id)
    }

    pub fn part(&self, id: &str) -> Option<&CompositePart> {
        self.parts.iter().find(|p| p.id.to_string() == id)
    }

    pub fn prototype(&self, id: &str) -> Option<&Prototype> {
        self.prototypes.iter().find(|p| p.id.to_string() == id)
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id.to_string() == id)
    }

    /// IDs of every loaded entity of one type
    pub fn ids(&self, prefix: EntityPrefix) -> Vec<String> {
        match prefix {
            EntityPrefix::Raw => self.raws.iter().map(|e| e.id.to_string()).collect(),
            EntityPrefix::Part => self.parts.iter().map(|e| e.id.to_string()).collect(),
            EntityPrefix::Prot => self.prototypes.iter().map(|e| e.id.to_string()).collect(),
            EntityPrefix::Ord => self.orders.iter().map(|e| e.id.to_string()).collect(),
            EntityPrefix::Rcv => self.receipts.iter().map(|e| e.id.to_string()).collect(),
        }
    }

    /// Resolve a full or partial ID to exactly one entity of the given type
    pub fn resolve(&self, prefix: EntityPrefix, reference: &str) -> Result<String, WorkshopError> {
        let needle = reference.trim().to_uppercase();
        let ids = self.ids(prefix);

        if needle.is_empty() {
            return Err(WorkshopError::not_found(prefix.entity_name(), reference));
        }
        if let Some(exact) = ids.iter().find(|id| **id == needle) {
            return Ok(exact.clone());
        }

        let matches: Vec<String> = ids.into_iter().filter(|id| id.contains(&needle)).collect();
        match matches.len() {
            0 => Err(WorkshopError::not_found(prefix.entity_name(), reference)),
            1 => Ok(matches[0].clone()),
            _ => Err(WorkshopError::AmbiguousId {
                kind: prefix.entity_name(),
                reference: reference.to_string(),
                matches,
            }),
        }
    }

    /// Kind of whatever `id` refers to, if it exists
    pub fn parent_kind(&self, id: &str) -> Option<ParentKind> {
        if let Some(raw) = self.raw(id) {
            return Some(ParentKind::Raw(raw.category));
        }
        self.part(id).map(|p| ParentKind::Part(p.category))
    }

    /// Pieces one raw parent yields for a cut part; `None` for assembled parts
    pub fn pieces_per_parent(&self, part: &CompositePart) -> Option<u64> {
        if !part.category.is_cut() {
            return None;
        }
        let pieces = part
            .parents
            .first()
            .and_then(|p| self.raw(&p.id))
            .map_or(0, |raw| {
                compute_yield(
                    raw.length.unwrap_or(0.0),
                    part.length.unwrap_or(0.0),
                    part.kerf_margin,
                )
            });
        Some(pieces)
    }

    /// Maximum stock the part's parents can currently support
    ///
    /// Works for unsaved parts too, which is what `part preview` relies on.
    pub fn capacity(&self, part: &CompositePart) -> u64 {
        if part.category.is_cut() {
            let parent_stock = part
                .parents
                .first()
                .and_then(|p| self.raw(&p.id))
                .map_or(0, |raw| u64::from(raw.stock));
            let pieces = self.pieces_per_parent(part).unwrap_or(0);
            return compute_max_stock(pieces, parent_stock);
        }

        let parents: Vec<(u64, u32)> = part
            .parents
            .iter()
            .map(|p| {
                let stock = self.part(&p.id).map_or(0, |parent| u64::from(parent.stock));
                (stock, p.units)
            })
            .collect();
        assembly_capacity(&parents)
    }

    /// Resolved unit price: the override if set, otherwise derived from the parents
    pub fn part_price(&self, part: &CompositePart) -> f64 {
        self.part_price_at(part, 0)
    }

    fn part_price_at(&self, part: &CompositePart, depth: usize) -> f64 {
        if let Some(price) = part.unit_price {
            return pricing::sanitize_price(price);
        }
        if depth > MAX_PRICE_DEPTH {
            tracing::warn!(id = %part.id, "part parents form a cycle; pricing at 0");
            return 0.0;
        }

        if part.category.is_cut() {
            let parent_price = part
                .parents
                .first()
                .and_then(|p| self.raw(&p.id))
                .map_or(0.0, |raw| raw.unit_price);
            return pricing::cut_piece_price(parent_price, self.pieces_per_parent(part).unwrap_or(0));
        }

        let costs: Vec<ParentCost> = part
            .parents
            .iter()
            .map(|p| ParentCost {
                unit_price: self.parent_price(&p.id, depth + 1),
                units: p.units,
            })
            .collect();
        pricing::composite_unit_price(&costs)
    }

    fn parent_price(&self, id: &str, depth: usize) -> f64 {
        if let Some(raw) = self.raw(id) {
            return raw.unit_price;
        }
        self.part(id)
            .map_or(0.0, |part| self.part_price_at(part, depth))
    }

    /// Unit price of whatever a BOM line references
    pub fn item_price(&self, kind: ItemKind, id: &str) -> f64 {
        if kind.raw_category().is_some() {
            self.raw(id).map_or(0.0, |r| r.unit_price)
        } else {
            self.part(id).map_or(0.0, |p| self.part_price(p))
        }
    }

    fn item_title(&self, id: &str) -> String {
        self.raw(id)
            .map(|r| r.title.clone())
            .or_else(|| self.part(id).map(|p| p.title.clone()))
            .unwrap_or_else(|| "(missing)".to_string())
    }

    /// Per-line rollup of a prototype, skid first
    pub fn prototype_cost_lines(&self, proto: &Prototype) -> Vec<CostLine> {
        let mut lines = Vec::new();

        if let Some(skid) = &proto.skid {
            let unit_price = self.part(&skid.part).map_or(0.0, |p| self.part_price(p));
            lines.push(CostLine {
                kind: "skid".to_string(),
                item: skid.part.clone(),
                title: self.item_title(&skid.part),
                quantity: skid.quantity,
                unit_price,
                subtotal: pricing::prototype_cost(&[LineCost {
                    unit_price,
                    quantity: skid.quantity,
                }]),
            });
        }

        for line in proto.lines.iter().filter(|l| l.is_filled()) {
            let unit_price = self.item_price(line.kind, &line.item);
            lines.push(CostLine {
                kind: line.kind.to_string(),
                item: line.item.clone(),
                title: self.item_title(&line.item),
                quantity: line.quantity,
                unit_price,
                subtotal: pricing::prototype_cost(&[LineCost {
                    unit_price,
                    quantity: line.quantity,
                }]),
            });
        }

        lines
    }

    /// Cost of one pallet built to this prototype
    pub fn prototype_cost(&self, proto: &Prototype) -> f64 {
        let lines: Vec<LineCost> = self
            .prototype_cost_lines(proto)
            .iter()
            .map(|l| LineCost {
                unit_price: l.unit_price,
                quantity: l.quantity,
            })
            .collect();
        pricing::prototype_cost(&lines)
    }

    /// Per-line invoice rollup of an order
    pub fn order_lines(&self, order: &Order) -> Vec<OrderTotalLine> {
        order
            .lines
            .iter()
            .map(|line| {
                let proto = self.prototype(&line.prototype);
                let prototype_cost = proto.map_or(0.0, |p| self.prototype_cost(p));
                OrderTotalLine {
                    prototype: line.prototype.clone(),
                    title: proto.map_or_else(|| "(missing)".to_string(), |p| p.title.clone()),
                    quantity: line.quantity,
                    prototype_cost,
                    subtotal: pricing::order_total(&[OrderLineCost {
                        prototype_cost,
                        quantity: line.quantity,
                    }]),
                }
            })
            .collect()
    }

    /// Invoice total of an order
    pub fn order_total(&self, order: &Order) -> f64 {
        let lines: Vec<OrderLineCost> = self
            .order_lines(order)
            .iter()
            .map(|l| OrderLineCost {
                prototype_cost: l.prototype_cost,
                quantity: l.quantity,
            })
            .collect();
        pricing::order_total(&lines)
    }

    /// Check a part's title, dimensions and parent shape
    pub fn check_structure(&self, part: &CompositePart) -> Result<(), ValidationError> {
        if part.title.trim().is_empty() {
            return Err(ValidationError::field("title", "title is required"));
        }
        if let Some(price) = part.unit_price {
            if !(price.is_finite() && price >= 0.0) {
                return Err(ValidationError::field("unit_price", "unit price must be non-negative"));
            }
        }
        if part.category.is_cut() && !part.length.map_or(false, |l| l.is_finite() && l > 0.0) {
            return Err(ValidationError::field(
                "length",
                format!("a {} needs a positive cut length", part.category),
            ));
        }

        let own_id = part.id.to_string();
        let mut parents = Vec::with_capacity(part.parents.len());
        for parent in &part.parents {
            let kind = if parent.id == own_id {
                None
            } else {
                self.parent_kind(&parent.id)
            };
            match kind {
                Some(kind) => parents.push((kind, parent.units)),
                None => {
                    return Err(ValidationError::field(
                        "parents",
                        format!("parent '{}' does not exist", parent.id),
                    ))
                }
            }
        }

        check_parent_structure(part.category, &parents)
    }

    /// Structure plus the stock gate; returns the capacity on success
    pub fn check_part(&self, part: &CompositePart) -> Result<u64, WorkshopError> {
        self.check_structure(part)?;
        let capacity = self.capacity(part);
        validate_stock_request(u64::from(part.stock), capacity)?;
        Ok(capacity)
    }

    /// Check that every assembled part built from `changed` still fits its stock
    /// once `changed` carries its new stock
    pub fn check_consumers(&self, changed: &CompositePart) -> Result<(), WorkshopError> {
        let changed_id = changed.id.to_string();

        for consumer in self
            .parts
            .iter()
            .filter(|p| p.id != changed.id && p.parents.iter().any(|r| r.id == changed_id))
        {
            let parents: Vec<(u64, u32)> = consumer
                .parents
                .iter()
                .map(|r| {
                    let stock = if r.id == changed_id {
                        u64::from(changed.stock)
                    } else {
                        self.part(&r.id).map_or(0, |p| u64::from(p.stock))
                    };
                    (stock, r.units)
                })
                .collect();
            let capacity = assembly_capacity(&parents);

            if u64::from(consumer.stock) > capacity {
                return Err(ValidationError::field(
                    "stock",
                    format!(
                        "{} '{}' ({}) holds {} in stock but {} of {} would only support {}",
                        consumer.category,
                        consumer.id,
                        consumer.title,
                        consumer.stock,
                        changed.stock,
                        changed.id,
                        capacity
                    ),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Composition rules, then that every reference exists with the right category
    pub fn check_prototype(&self, proto: &Prototype) -> Result<(), WorkshopError> {
        validate_prototype(proto.nominal(), &proto.lines, proto.skid.as_ref())?;

        for (i, line) in proto.lines.iter().enumerate() {
            if !line.is_filled() {
                continue;
            }
            let field = format!("lines[{}].item", i);
            let matches = match (line.kind.raw_category(), line.kind.part_category()) {
                (Some(cat), _) => self.raw(&line.item).map(|r| r.category == cat),
                (_, Some(cat)) => self.part(&line.item).map(|p| p.category == cat),
                _ => None,
            };
            match matches {
                Some(true) => {}
                Some(false) => {
                    return Err(ValidationError::field(
                        field,
                        format!("'{}' is not a {}", line.item, line.kind),
                    )
                    .into())
                }
                None => {
                    return Err(ValidationError::field(
                        field,
                        format!("{} '{}' does not exist", line.kind, line.item),
                    )
                    .into())
                }
            }
        }

        if let Some(skid) = &proto.skid {
            match self.part(&skid.part) {
                Some(p) if p.category == PartCategory::SkidType => {}
                Some(_) => {
                    return Err(ValidationError::field(
                        "skid.part",
                        format!("'{}' is not a skid_type", skid.part),
                    )
                    .into())
                }
                None => {
                    return Err(ValidationError::field(
                        "skid.part",
                        format!("skid '{}' does not exist", skid.part),
                    )
                    .into())
                }
            }
        }

        Ok(())
    }

    /// Order shape plus prototype references
    pub fn check_order(&self, order: &Order) -> Result<(), WorkshopError> {
        validate_order(&order.customer, &order.quantities())?;

        for (i, line) in order.lines.iter().enumerate() {
            if self.prototype(&line.prototype).is_none() {
                return Err(ValidationError::field(
                    format!("lines[{}].prototype", i),
                    format!("prototype '{}' does not exist", line.prototype),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Every entity that references `id`
    pub fn dependents_of(&self, id: &str) -> Vec<Dependent> {
        let mut dependents = Vec::new();

        for part in &self.parts {
            if let Some(parent) = part.parents.iter().find(|p| p.id == id) {
                let verb = if part.category.is_cut() {
                    "cut from"
                } else {
                    "assembled from"
                };
                dependents.push(Dependent {
                    id: part.id.to_string(),
                    kind: DependentKind::Part,
                    title: part.title.clone(),
                    relationship: format!("{} ({} units)", verb, parent.units),
                });
            }
        }

        for proto in &self.prototypes {
            let mut uses: Vec<String> = proto
                .lines
                .iter()
                .filter(|l| l.item == id)
                .map(|l| format!("{} x{}", l.kind, l.quantity))
                .collect();
            if let Some(skid) = proto.skid.as_ref().filter(|s| s.part == id) {
                uses.insert(0, format!("skid x{}", skid.quantity));
            }
            if !uses.is_empty() {
                dependents.push(Dependent {
                    id: proto.id.to_string(),
                    kind: DependentKind::Prototype,
                    title: proto.title.clone(),
                    relationship: format!("bom {}", uses.join(", ")),
                });
            }
        }

        for order in &self.orders {
            let units: u64 = order
                .lines
                .iter()
                .filter(|l| l.prototype == id)
                .map(|l| u64::from(l.quantity))
                .sum();
            if order.lines.iter().any(|l| l.prototype == id) {
                dependents.push(Dependent {
                    id: order.id.to_string(),
                    kind: DependentKind::Order,
                    title: order.customer.clone(),
                    relationship: format!("ordered x{}", units),
                });
            }
        }

        dependents
    }

    /// Stock, capacity and headroom of every composite part
    pub fn stock_report(&self) -> Vec<StockLine> {
        self.parts
            .iter()
            .map(|part| {
                let capacity = self.capacity(part);
                StockLine {
                    id: part.id.to_string(),
                    title: part.title.clone(),
                    category: part.category,
                    stock: part.stock,
                    capacity,
                    headroom: crate::engine::stock::headroom(u64::from(part.stock), capacity),
                }
            })
            .collect()
    }

    /// Re-check every stored entity
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for raw in &self.raws {
            if !(raw.unit_price.is_finite() && raw.unit_price >= 0.0) {
                issues.push(Issue {
                    id: raw.id.to_string(),
                    error: ValidationError::field("unit_price", "unit price must be non-negative")
                        .into(),
                });
            }
        }
        for part in &self.parts {
            if let Err(error) = self.check_part(part) {
                issues.push(Issue {
                    id: part.id.to_string(),
                    error,
                });
            }
        }
        for proto in &self.prototypes {
            if let Err(error) = self.check_prototype(proto) {
                issues.push(Issue {
                    id: proto.id.to_string(),
                    error,
                });
            }
        }
        for order in &self.orders {
            if let Err(error) = self.check_order(order) {
                issues.push(Issue {
                    id: order.id.to_string(),
                    error,
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::units::RawCategory;

    /// Scenario fixture: a 240cm board with 40 in stock
    fn board_workshop() -> (Workshop, String) {
        let raw = RawMaterial::new("Pine 240", RawCategory::Board, 6.0, "test")
            .with_length(240.0)
            .with_stock(40);
        let id = raw.id.to_string();
        let workshop = Workshop {
            raws: vec![raw],
            ..Default::default()
        };
        (workshop, id)
    }

    #[test]
    fn test_cut_capacity_and_gate() {
        let (workshop, raw_id) = board_workshop();
        let part = CompositePart::cut("Deck 100", PartCategory::BoardType, &raw_id, 100.0, 0.5, "test");

        assert_eq!(workshop.pieces_per_parent(&part), Some(2));
        assert_eq!(workshop.capacity(&part), 80);

        let ok = part.clone().with_stock(80);
        assert_eq!(workshop.check_part(&ok).unwrap(), 80);

        let over = part.with_stock(81);
        match workshop.check_part(&over) {
            Err(WorkshopError::InsufficientStock(e)) => {
                assert_eq!(e.required_additional, 1);
                assert_eq!(e.available, 80);
            }
            other => panic!("expected insufficient stock, got {:?}", other),
        }
    }

    #[test]
    fn test_cut_price_spreads_parent_price() {
        let (workshop, raw_id) = board_workshop();
        let part = CompositePart::cut("Deck 100", PartCategory::BoardType, &raw_id, 100.0, 0.5, "test");
        assert!((workshop.part_price(&part) - 3.0).abs() < 1e-9);

        let mut priced = part.clone();
        priced.unit_price = Some(4.25);
        assert_eq!(workshop.part_price(&priced), 4.25);
    }

    fn skid_workshop() -> (Workshop, CompositePart) {
        let mut board = CompositePart::cut("Board", PartCategory::BoardType, "RAW-X", 100.0, 0.5, "t");
        board.unit_price = Some(10.0);
        board.stock = 10;
        let mut block = CompositePart::cut("Block", PartCategory::BlockType, "RAW-Y", 10.0, 0.5, "t");
        block.unit_price = Some(2.0);
        block.stock = 20;
        let skid = CompositePart::skid(
            "Skid",
            (board.id.to_string(), 1),
            (block.id.to_string(), 3),
            "t",
        );
        let workshop = Workshop {
            parts: vec![board, block],
            ..Default::default()
        };
        (workshop, skid)
    }

    #[test]
    fn test_skid_price_and_capacity() {
        let (workshop, skid) = skid_workshop();
        assert_eq!(workshop.part_price(&skid), 16.0);
        // min(10 / 1, 20 / 3)
        assert_eq!(workshop.capacity(&skid), 6);
    }

    #[test]
    fn test_missing_parent_is_structural_error() {
        let (workshop, _) = board_workshop();
        let part = CompositePart::cut("Orphan", PartCategory::BoardType, "RAW-NOPE", 50.0, 0.5, "t");
        let err = workshop.check_structure(&part).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("parents"));
        assert!(err.message.contains("RAW-NOPE"));
    }

    #[test]
    fn test_cut_part_needs_length() {
        let (workshop, raw_id) = board_workshop();
        let mut part = CompositePart::cut("No length", PartCategory::BoardType, &raw_id, 100.0, 0.5, "t");
        part.length = None;
        let err = workshop.check_structure(&part).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("length"));
    }

    #[test]
    fn test_resolve_partial_and_ambiguous() {
        let (mut workshop, raw_id) = board_workshop();
        assert_eq!(workshop.resolve(EntityPrefix::Raw, &raw_id).unwrap(), raw_id);
        assert_eq!(
            workshop.resolve(EntityPrefix::Raw, &raw_id[4..20].to_lowercase()).unwrap(),
            raw_id
        );

        workshop
            .raws
            .push(RawMaterial::new("Other", RawCategory::Nail, 0.05, "t"));
        assert!(matches!(
            workshop.resolve(EntityPrefix::Raw, "RAW-"),
            Err(WorkshopError::AmbiguousId { .. })
        ));
        assert!(matches!(
            workshop.resolve(EntityPrefix::Raw, "NOPE"),
            Err(WorkshopError::NotFound { .. })
        ));
    }

    #[test]
    fn test_prototype_references_checked() {
        let (mut workshop, raw_id) = board_workshop();
        let nail = RawMaterial::new("Nail", RawCategory::Nail, 0.05, "t");
        let nail_id = nail.id.to_string();
        workshop.raws.push(nail);
        let (skid_ws, skid) = skid_workshop();
        workshop.parts.extend(skid_ws.parts);
        let skid_id = skid.id.to_string();
        workshop.parts.push(skid);

        let mut proto = Prototype::new("Euro", 120.0, 80.0, "t");
        proto.add_line(ItemKind::Nail, &nail_id, 50);
        proto.set_skid(&skid_id, 3);
        assert!(workshop.check_prototype(&proto).is_ok());

        // board raw material used where a nail is expected
        proto.add_line(ItemKind::Nail, &raw_id, 5);
        match workshop.check_prototype(&proto) {
            Err(WorkshopError::Validation(e)) => {
                assert_eq!(e.field.as_deref(), Some("lines[1].item"));
                assert!(e.message.contains("is not a nail"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_prototype_cost_and_order_total() {
        let (mut workshop, skid) = skid_workshop();
        let nail = RawMaterial::new("Nail", RawCategory::Nail, 0.05, "t");
        let nail_id = nail.id.to_string();
        workshop.raws.push(nail);
        let skid_id = skid.id.to_string();
        workshop.parts.push(skid);

        let mut proto = Prototype::new("Euro", 120.0, 80.0, "t");
        proto.set_skid(&skid_id, 3);
        proto.add_line(ItemKind::Nail, &nail_id, 40);
        let cost = workshop.prototype_cost(&proto);
        // 3 x 16 + 40 x 0.05
        assert!((cost - 50.0).abs() < 1e-9);

        let lines = workshop.prototype_cost_lines(&proto);
        assert_eq!(lines[0].kind, "skid");
        assert_eq!(lines[0].subtotal, 48.0);

        let proto_id = proto.id.to_string();
        workshop.prototypes.push(proto);
        let mut order = Order::new("Acme", "t");
        order.add_line(&proto_id, 120);
        assert!((workshop.order_total(&order) - 6000.0).abs() < 1e-6);
    }

    #[test]
    fn test_dependents_cover_parts_prototypes_orders() {
        let (mut workshop, raw_id) = board_workshop();
        let part = CompositePart::cut("Deck", PartCategory::BoardType, &raw_id, 100.0, 0.5, "t");
        let part_id = part.id.to_string();
        workshop.parts.push(part);

        let mut proto = Prototype::new("Euro", 120.0, 80.0, "t");
        proto.add_line(ItemKind::BoardType, &part_id, 5);
        let proto_id = proto.id.to_string();
        workshop.prototypes.push(proto);

        let mut order = Order::new("Acme", "t");
        order.add_line(&proto_id, 10);
        order.add_line(&proto_id, 5);
        workshop.orders.push(order);

        let deps = workshop.dependents_of(&raw_id);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].relationship, "cut from (1 units)");

        let deps = workshop.dependents_of(&part_id);
        assert_eq!(deps[0].kind, DependentKind::Prototype);
        assert_eq!(deps[0].relationship, "bom board_type x5");

        let deps = workshop.dependents_of(&proto_id);
        assert_eq!(deps[0].kind, DependentKind::Order);
        assert_eq!(deps[0].relationship, "ordered x15");
    }

    #[test]
    fn test_issues_flag_overdrawn_part() {
        let (mut workshop, raw_id) = board_workshop();
        let part = CompositePart::cut("Deck", PartCategory::BoardType, &raw_id, 100.0, 0.5, "t")
            .with_stock(50);
        workshop.parts.push(part);
        assert!(workshop.issues().is_empty());

        workshop.raws[0].stock = 10;
        let issues = workshop.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].error.code(), "STOCK_INSUFFICIENT");
    }

    #[test]
    fn test_consumers_rechecked_when_parent_stock_drops() {
        let (mut workshop, mut skid) = skid_workshop();
        skid.stock = 6;
        workshop.parts.push(skid);

        let mut board = workshop.parts[0].clone();
        board.stock = 6;
        assert!(workshop.check_consumers(&board).is_ok());

        board.stock = 5;
        let err = workshop.check_consumers(&board).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("skid_type"));

        // raising stock never hurts a consumer
        board.stock = 50;
        assert!(workshop.check_consumers(&board).is_ok());
    }

    #[test]
    fn test_negative_part_price_is_an_issue() {
        let (mut workshop, raw_id) = board_workshop();
        let mut part = CompositePart::cut("Deck", PartCategory::BoardType, &raw_id, 100.0, 0.5, "t");
        part.unit_price = Some(-5.0);
        workshop.parts.push(part);

        let issues = workshop.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].error.code(), "VALIDATION_ERROR");
        assert!(issues[0].error.to_string().contains("unit price"));
    }
}
