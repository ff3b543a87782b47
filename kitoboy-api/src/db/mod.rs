//! Repository layer
//!
//! Thin async functions over the SQLite pool. Reads take `&SqlitePool`;
//! writes that must share a transaction take `&mut SqliteConnection`.

pub mod attributes;
pub mod avatars;
pub mod persons;
pub mod posts;
pub mod statuses;

use sqlx::{QueryBuilder, Sqlite};

/// Append `(?, ?, ...)` binding every id
pub(crate) fn push_id_list<'args>(query: &mut QueryBuilder<'args, Sqlite>, ids: &'args [String]) {
    query.push("(");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");
}
