//! # Planboard Shared Library
//!
//! Persistence and business logic shared by the Planboard API server.
//!
//! ## Module Organization
//!
//! - `ids`: path identifier validation
//! - `error`: store error taxonomy
//! - `db`: connection pool and migrations
//! - `models`: database models and their queries
//! - `services`: project and user services consumed by the HTTP layer

pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod services;

/// Current version of the Planboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
