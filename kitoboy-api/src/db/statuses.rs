//! Status catalogue

use anyhow::Result;
use kitoboy_common::models::Status;
use sqlx::SqlitePool;
use std::collections::HashMap;

pub async fn list_statuses(pool: &SqlitePool, limit: i64) -> Result<Vec<Status>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, name, color FROM statuses ORDER BY rowid LIMIT ?")
            .bind(limit)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name, color)| Status { id, name, color })
        .collect())
}

/// Every status keyed by id
pub async fn statuses_by_id(pool: &SqlitePool) -> Result<HashMap<String, Status>> {
    let statuses = list_statuses(pool, i64::MAX).await?;
    Ok(statuses.into_iter().map(|s| (s.id.clone(), s)).collect())
}

pub async fn status_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM statuses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}
