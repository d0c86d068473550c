//! Mapping persistence
//!
//! - `store`: the embedded redb file and its transaction discipline
//! - `models`: the `Mapping` record

pub mod models;
pub mod store;

pub use models::Mapping;
pub use store::{MappingStore, URLS_TABLE, UrlStore};
