//! Infrastructure adapters (storage, configuration).
//!
//! This crate is where IO happens: the Postgres category repository, its row
//! mapping and schema bootstrap, and database configuration read from the
//! environment. Domain rules stay in `catalog-core` / `catalog-category`.

pub mod category;
pub mod config;

pub use category::{PostgresCategoryRepository, CATEGORY_SCHEMA};
pub use config::{ConfigError, DatabaseConfig};
