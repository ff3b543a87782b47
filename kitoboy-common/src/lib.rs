//! # Kitoboy Common Library
//!
//! Shared code for the Kitoboy case-management service:
//! - Domain view models (avatars, persons, posts, attributes, statuses)
//! - Attribute dynamics chart aggregation
//! - Avatar post export (CSV) parsing
//! - Pagination and pluralization helpers
//! - Password and session token primitives
//! - Configuration file loading
//! - Database schema initialization

pub mod api;
pub mod config;
pub mod csv_import;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod dynamics;
pub mod error;
pub mod models;
pub mod pagination;
pub mod plural;

pub use error::{Error, Result};
