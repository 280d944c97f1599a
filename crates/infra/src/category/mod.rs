//! Postgres persistence for categories.

pub mod mapper;
pub mod postgres;

pub use mapper::CategoryRow;
pub use postgres::{PostgresCategoryRepository, CATEGORY_SCHEMA};
