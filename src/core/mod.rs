//! Core module - identity, project layout, configuration and the
//! read/write collaborators around the costing engine

pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod loader;
pub mod project;
pub mod role;
pub mod shortid;
pub mod store;
pub mod workshop;

pub use config::Config;
pub use entity::Entity;
pub use error::{ErrorPayload, WorkshopError};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use role::Role;
pub use shortid::ShortIdIndex;
pub use store::{Store, WriteLock};
pub use workshop::{Issue, Workshop};
