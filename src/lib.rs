//! pallet-workshop: inventory derivation and costing for a pallet workshop
//!
//! Raw materials (boards, posts, nails, fiber) are cut into board and block
//! types, assembled into skids and combined into pallet prototypes that
//! customers order by the hundred. The [`engine`] holds the pure yield,
//! pricing, stock-gate and composition rules; [`core`] loads and stores
//! plain-text YAML entities around it; [`cli`] is the `pws` command.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
pub mod logging;
pub mod yaml;
