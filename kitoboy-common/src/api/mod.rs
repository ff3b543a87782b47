//! Shared authentication primitives
//!
//! Pure functions plus settings-table access; the HTTP middleware that
//! wraps them lives in kitoboy-api.

pub mod auth;

pub use auth::{
    hash_password, issue_token, verify_password, verify_token, TokenError, DEFAULT_TOKEN_TTL,
    PASSWORD_HASH_COST,
};
#[cfg(feature = "sqlx")]
pub use auth::load_or_initialize_secret;
