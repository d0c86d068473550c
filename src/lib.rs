//! urlshort - short path to URL redirect service
//!
//! Mappings live in a single redb file. Every request first goes through
//! the redirect resolver; unknown paths fall through to the registration
//! endpoint and the greeting handler.
//!
//! # Architecture
//! - `storage`: the embedded store and its transaction discipline
//! - `services`: seed parsing and the startup bulk loader
//! - `api`: resolver middleware and HTTP handlers
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: startup, server mode and shutdown
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
