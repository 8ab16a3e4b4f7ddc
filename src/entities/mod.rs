//! Entity type definitions
//!
//! **Inventory:**
//! - [`RawMaterial`] - purchased boards, posts, nails and fiber
//! - [`CompositePart`] - board types and block types cut from raw material,
//!   skid types assembled from them
//!
//! **Catalog and sales:**
//! - [`Prototype`] - a pallet design with its bill of materials
//! - [`Order`] - customer orders by prototype
//!
//! **Purchasing:**
//! - [`Receipt`] - raw material received into stock

pub mod order;
pub mod part;
pub mod prototype;
pub mod raw_material;
pub mod receipt;

pub use order::{Order, OrderLine};
pub use part::{CompositePart, ParentRef};
pub use prototype::Prototype;
pub use raw_material::RawMaterial;
pub use receipt::Receipt;
