//! Write side of the project store
//!
//! Every mutation takes the project write lock, reloads the workshop, re-runs
//! the relevant checks against that fresh snapshot and only then writes. Two
//! concurrent `part new` commands can therefore never both pass the stock
//! gate against the same parent stock.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::entity::Entity;
use crate::core::error::WorkshopError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader::find_entity_files;
use crate::core::project::Project;
use crate::core::workshop::Workshop;
use crate::engine::error::{ReferentialIntegrityError, ValidationError};
use crate::entities::{CompositePart, Order, Prototype, RawMaterial, Receipt};
use crate::yaml::write_yaml_file;

const LOCK_FILE: &str = "write.lock";
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_POLL: Duration = Duration::from_millis(50);

/// Exclusive project write lock, released on drop
#[derive(Debug)]
pub struct WriteLock {
    path: PathBuf,
}

impl WriteLock {
    /// Create the lock file, waiting up to `timeout` for another holder to finish
    pub fn acquire(project: &Project, timeout: Duration) -> Result<Self, WorkshopError> {
        let path = project.pws_dir().join(LOCK_FILE);
        let started = Instant::now();

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    tracing::debug!(path = %path.display(), "acquired write lock");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        tracing::warn!(path = %path.display(), "timed out waiting for write lock");
                        return Err(WorkshopError::Locked { path });
                    }
                    std::thread::sleep(LOCK_POLL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not release write lock");
        }
    }
}

/// Validated, serialized writes to a project
pub struct Store {
    project: Project,
    lock_timeout: Duration,
}

impl Store {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Override how long to wait for the write lock
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Run `f` against a freshly loaded snapshot while holding the write lock
    fn transaction<R>(
        &self,
        f: impl FnOnce(&Workshop) -> Result<R, WorkshopError>,
    ) -> Result<R, WorkshopError> {
        let _lock = WriteLock::acquire(&self.project, self.lock_timeout)?;
        let workshop = Workshop::load(&self.project);
        f(&workshop)
    }

    /// Where an existing entity lives, or where a new one goes
    fn locate(&self, id: &EntityId) -> PathBuf {
        let dir = self
            .project
            .root()
            .join(Project::entity_directory(id.prefix()));
        let wanted = id.to_string();
        find_entity_files(&dir, &wanted)
            .into_iter()
            .find(|path| file_id(path).map_or(false, |stem| stem == wanted))
            .unwrap_or_else(|| self.project.entity_path(id))
    }

    fn save<T: Entity>(&self, entity: &T) -> Result<PathBuf, WorkshopError> {
        let path = self.locate(entity.id());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_yaml_file(&path, entity)?;
        Ok(path)
    }

    /// Add a raw material
    pub fn create_raw(&self, raw: RawMaterial) -> Result<(RawMaterial, PathBuf), WorkshopError> {
        check_raw(&raw)?;
        self.transaction(|_| {
            let path = self.save(&raw)?;
            tracing::info!(id = %raw.id, category = %raw.category, "created raw material");
            Ok((raw, path))
        })
    }

    /// Change a raw material's unit price; derived part prices follow on read
    pub fn set_raw_price(&self, id: &str, unit_price: f64) -> Result<RawMaterial, WorkshopError> {
        self.transaction(|ws| {
            let mut raw = ws
                .raw(id)
                .cloned()
                .ok_or_else(|| WorkshopError::not_found("raw material", id))?;
            raw.unit_price = unit_price;
            check_raw(&raw)?;
            raw.touch();
            self.save(&raw)?;
            tracing::info!(id = %raw.id, unit_price, "updated raw material price");
            Ok(raw)
        })
    }

    /// Book a delivery: record the receipt and add its quantity to stock
    pub fn receive(&self, receipt: Receipt) -> Result<(Receipt, RawMaterial), WorkshopError> {
        if receipt.quantity == 0 {
            return Err(ValidationError::field(
                "quantity",
                "received quantity must be a positive integer",
            )
            .into());
        }

        self.transaction(|ws| {
            let mut raw = ws
                .raw(&receipt.material)
                .cloned()
                .ok_or_else(|| WorkshopError::not_found("raw material", receipt.material.as_str()))?;

            raw.stock = raw.stock.checked_add(receipt.quantity).ok_or_else(|| {
                ValidationError::field("quantity", "received quantity overflows the stock counter")
            })?;
            if let Some(price) = receipt.unit_price {
                raw.unit_price = price;
            }
            check_raw(&raw)?;
            raw.touch();

            let receipt_path = self.save(&receipt)?;
            if let Err(e) = self.save(&raw) {
                tracing::warn!(receipt = %receipt.id, error = %e, "stock not updated; dropping receipt");
                if let Err(cleanup) = std::fs::remove_file(&receipt_path) {
                    tracing::warn!(path = %receipt_path.display(), error = %cleanup, "could not remove receipt");
                }
                return Err(e);
            }
            tracing::info!(
                receipt = %receipt.id,
                material = %raw.id,
                quantity = receipt.quantity,
                stock = raw.stock,
                "received raw material"
            );
            Ok((receipt, raw))
        })
    }

    /// Add a composite part once its structure and stock pass against current parents
    pub fn create_part(&self, part: CompositePart) -> Result<(CompositePart, u64), WorkshopError> {
        self.transaction(|ws| {
            let capacity = match ws.check_part(&part) {
                Ok(capacity) => capacity,
                Err(e) => {
                    tracing::info!(id = %part.id, stock = part.stock, code = e.code(), "rejected part");
                    return Err(e);
                }
            };
            self.save(&part)?;
            tracing::info!(id = %part.id, stock = part.stock, capacity, "created part");
            Ok((part, capacity))
        })
    }

    /// Change a part's stock, re-validated against parent stock as it is now
    pub fn set_part_stock(&self, id: &str, stock: u32) -> Result<(CompositePart, u64), WorkshopError> {
        self.transaction(|ws| {
            let mut part = ws
                .part(id)
                .cloned()
                .ok_or_else(|| WorkshopError::not_found("part", id))?;
            let previous = part.stock;
            part.stock = stock;

            let capacity = ws
                .check_part(&part)
                .and_then(|capacity| ws.check_consumers(&part).map(|()| capacity))
                .map_err(|e| {
                    tracing::info!(id, previous, requested = stock, code = e.code(), "rejected stock change");
                    e
                })?;
            part.touch();
            self.save(&part)?;
            tracing::info!(id, previous, stock, capacity, "updated part stock");
            Ok((part, capacity))
        })
    }

    /// Set or clear a part's explicit price
    pub fn set_part_price(&self, id: &str, unit_price: Option<f64>) -> Result<CompositePart, WorkshopError> {
        if let Some(price) = unit_price {
            if !(price.is_finite() && price >= 0.0) {
                return Err(ValidationError::field("unit_price", "unit price must be non-negative").into());
            }
        }

        self.transaction(|ws| {
            let mut part = ws
                .part(id)
                .cloned()
                .ok_or_else(|| WorkshopError::not_found("part", id))?;
            part.unit_price = unit_price;
            part.touch();
            self.save(&part)?;
            tracing::info!(id, ?unit_price, "updated part price");
            Ok(part)
        })
    }

    /// Add a prototype whose BOM passes the composition rules
    pub fn create_prototype(&self, proto: Prototype) -> Result<(Prototype, PathBuf), WorkshopError> {
        self.transaction(|ws| {
            ws.check_prototype(&proto)?;
            let path = self.save(&proto)?;
            tracing::info!(id = %proto.id, lines = proto.lines.len(), "created prototype");
            Ok((proto, path))
        })
    }

    /// Add an order for existing prototypes
    pub fn create_order(&self, order: Order) -> Result<(Order, PathBuf), WorkshopError> {
        self.transaction(|ws| {
            ws.check_order(&order)?;
            let path = self.save(&order)?;
            tracing::info!(id = %order.id, units = order.total_units(), "created order");
            Ok((order, path))
        })
    }

    /// Delete an entity nothing references
    pub fn delete(&self, id: &str) -> Result<PathBuf, WorkshopError> {
        let entity_id: EntityId = id
            .parse()
            .map_err(|_| WorkshopError::not_found("entity", id))?;

        self.transaction(|ws| {
            let exists = match entity_id.prefix() {
                EntityPrefix::Raw => ws.raw(id).is_some(),
                EntityPrefix::Part => ws.part(id).is_some(),
                EntityPrefix::Prot => ws.prototype(id).is_some(),
                EntityPrefix::Ord => ws.order(id).is_some(),
                EntityPrefix::Rcv => ws.receipts.iter().any(|r| r.id == entity_id),
            };
            if !exists {
                return Err(WorkshopError::not_found(entity_id.prefix().entity_name(), id));
            }

            let dependents = ws.dependents_of(id);
            if !dependents.is_empty() {
                tracing::info!(id, dependents = dependents.len(), "refused delete");
                return Err(ReferentialIntegrityError {
                    id: id.to_string(),
                    dependents,
                }
                .into());
            }

            let path = self.locate(&entity_id);
            std::fs::remove_file(&path)?;
            tracing::info!(id, path = %path.display(), "deleted entity");
            Ok(path)
        })
    }
}

fn check_raw(raw: &RawMaterial) -> Result<(), ValidationError> {
    if raw.title.trim().is_empty() {
        return Err(ValidationError::field("title", "title is required"));
    }
    if !(raw.unit_price.is_finite() && raw.unit_price >= 0.0) {
        return Err(ValidationError::field("unit_price", "unit price must be non-negative"));
    }
    if let Some(length) = raw.length {
        if !(length.is_finite() && length > 0.0) {
            return Err(ValidationError::field("length", "length must be positive"));
        }
    }
    Ok(())
}

/// Entity ID part of an entity file name
fn file_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(crate::core::project::ENTITY_EXT)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::units::{PartCategory, RawCategory};
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, Store) {
        crate::logging::init_test();
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        (tmp, Store::new(project))
    }

    fn board(store: &Store) -> RawMaterial {
        let raw = RawMaterial::new("Pine 240", RawCategory::Board, 6.0, "test")
            .with_length(240.0)
            .with_stock(40);
        store.create_raw(raw).unwrap().0
    }

    #[test]
    fn test_create_part_within_capacity() {
        let (_tmp, store) = store();
        let raw = board(&store);

        let part = CompositePart::cut("Deck", PartCategory::BoardType, raw.id.to_string(), 100.0, 0.5, "t")
            .with_stock(80);
        let (part, capacity) = store.create_part(part).unwrap();

        assert_eq!(capacity, 80);
        assert!(store.project().entity_path(&part.id).exists());
    }

    #[test]
    fn test_rejected_part_is_not_written() {
        let (_tmp, store) = store();
        let raw = board(&store);

        let part = CompositePart::cut("Deck", PartCategory::BoardType, raw.id.to_string(), 100.0, 0.5, "t")
            .with_stock(81);
        let path = store.project().entity_path(&part.id);

        let err = store.create_part(part).unwrap_err();
        assert_eq!(err.code(), "STOCK_INSUFFICIENT");
        assert!(!path.exists());
    }

    #[test]
    fn test_stock_update_uses_current_parent_stock() {
        let (_tmp, store) = store();
        let raw = board(&store);
        let part = CompositePart::cut("Deck", PartCategory::BoardType, raw.id.to_string(), 100.0, 0.5, "t");
        let (part, _) = store.create_part(part).unwrap();
        let id = part.id.to_string();

        assert!(store.set_part_stock(&id, 81).is_err());

        let receipt = Receipt::new(raw.id.to_string(), 10, "t");
        let (_, raw) = store.receive(receipt).unwrap();
        assert_eq!(raw.stock, 50);

        let (part, capacity) = store.set_part_stock(&id, 81).unwrap();
        assert_eq!(capacity, 100);
        assert_eq!(part.stock, 81);
        assert_eq!(part.entity_revision, 2);
    }

    #[test]
    fn test_receipt_updates_price() {
        let (_tmp, store) = store();
        let raw = board(&store);
        let mut receipt = Receipt::new(raw.id.to_string(), 5, "t");
        receipt.unit_price = Some(6.5);

        let (_, raw) = store.receive(receipt).unwrap();
        assert_eq!(raw.unit_price, 6.5);
        assert_eq!(raw.stock, 45);
    }

    #[test]
    fn test_zero_receipt_rejected() {
        let (_tmp, store) = store();
        let raw = board(&store);
        let err = store.receive(Receipt::new(raw.id.to_string(), 0, "t")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_delete_refused_while_referenced() {
        let (_tmp, store) = store();
        let raw = board(&store);
        let raw_id = raw.id.to_string();
        let part = CompositePart::cut("Deck", PartCategory::BoardType, &raw_id, 100.0, 0.5, "t");
        let (part, _) = store.create_part(part).unwrap();

        match store.delete(&raw_id) {
            Err(WorkshopError::ReferentialIntegrity(e)) => {
                assert_eq!(e.dependents.len(), 1);
                assert_eq!(e.dependents[0].id, part.id.to_string());
            }
            other => panic!("expected integrity error, got {:?}", other),
        }

        store.delete(&part.id.to_string()).unwrap();
        let path = store.delete(&raw_id).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let (_tmp, store) = store();
        let missing = EntityId::new(EntityPrefix::Raw).to_string();
        assert_eq!(store.delete(&missing).unwrap_err().code(), "NOT_FOUND");
    }

    #[test]
    fn test_lock_is_exclusive_and_released() {
        let (_tmp, store) = store();
        let held = WriteLock::acquire(store.project(), Duration::from_millis(10)).unwrap();

        let err = WriteLock::acquire(store.project(), Duration::from_millis(10)).unwrap_err();
        assert_eq!(err.code(), "LOCKED");

        let impatient = Store::new(store.project().clone()).with_lock_timeout(Duration::from_millis(10));
        let raw = RawMaterial::new("Nails", RawCategory::Nail, 0.05, "t");
        assert_eq!(impatient.create_raw(raw).unwrap_err().code(), "LOCKED");

        drop(held);
        assert!(WriteLock::acquire(store.project(), Duration::from_millis(10)).is_ok());
    }

    fn skid_parts(store: &Store) -> (CompositePart, CompositePart) {
        let raw = board(store);
        let raw_id = raw.id.to_string();
        let deck = CompositePart::cut("Deck", PartCategory::BoardType, &raw_id, 100.0, 0.5, "t").with_stock(10);
        let (deck, _) = store.create_part(deck).unwrap();
        let block = CompositePart::cut("Block", PartCategory::BlockType, &raw_id, 10.0, 0.5, "t").with_stock(30);
        let (block, _) = store.create_part(block).unwrap();
        let skid = CompositePart::skid("Skid", (deck.id.to_string(), 1), (block.id.to_string(), 3), "t")
            .with_stock(10);
        let (skid, capacity) = store.create_part(skid).unwrap();
        assert_eq!(capacity, 10);
        (deck, skid)
    }

    #[test]
    fn test_lowering_stock_under_a_skid_is_refused() {
        let (_tmp, store) = store();
        let (deck, skid) = skid_parts(&store);
        let deck_id = deck.id.to_string();

        let err = store.set_part_stock(&deck_id, 0).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains(&skid.id.to_string()));

        let ws = Workshop::load(store.project());
        assert_eq!(ws.part(&deck_id).unwrap().stock, 10);
        assert!(ws.issues().is_empty());

        let (deck, _) = store.set_part_stock(&deck_id, 12).unwrap();
        assert_eq!(deck.stock, 12);
        assert!(store.set_part_stock(&deck_id, 10).is_ok());
    }

    #[test]
    fn test_negative_part_price_rejected_on_create() {
        let (_tmp, store) = store();
        let raw = board(&store);
        let mut part = CompositePart::cut("Deck", PartCategory::BoardType, raw.id.to_string(), 100.0, 0.5, "t");
        part.unit_price = Some(-5.0);
        let path = store.project().entity_path(&part.id);

        let err = store.create_part(part).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_stock_write_leaves_no_receipt() {
        let (_tmp, store) = store();
        let raw = board(&store);
        // a directory where the temp file goes makes the stock write fail
        let blocker = store.project().entity_path(&raw.id).with_extension("yaml.tmp");
        std::fs::create_dir(&blocker).unwrap();

        assert!(store.receive(Receipt::new(raw.id.to_string(), 10, "t")).is_err());

        std::fs::remove_dir(&blocker).unwrap();
        let ws = Workshop::load(store.project());
        assert!(ws.receipts.is_empty());
        assert_eq!(ws.raws[0].stock, 40);
    }

    #[test]
    fn test_negative_price_rejected() {
        let (_tmp, store) = store();
        let raw = board(&store);
        let err = store.set_raw_price(&raw.id.to_string(), -1.0).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
