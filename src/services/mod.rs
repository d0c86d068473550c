//! Service layer
//!
//! Startup-time work that sits between the store and the runtime.

pub mod loader;

pub use loader::{BulkLoader, parse_seed, read_seed_file};
