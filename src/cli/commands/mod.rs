//! CLI command implementations

pub mod init;
pub mod order;
pub mod part;
pub mod proto;
pub mod raw;
pub mod report;
pub mod validate;
pub mod where_used;
