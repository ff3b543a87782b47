//! Attribute catalogue and post links

use anyhow::Result;
use kitoboy_common::models::Attribute;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use super::push_id_list;

/// Attributes ordered by name
pub async fn list_attributes(pool: &SqlitePool, limit: i64) -> Result<Vec<Attribute>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, name, color FROM attributes ORDER BY name LIMIT ?")
            .bind(limit)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(into_attribute).collect())
}

/// Look up attributes by id; unknown ids are absent from the map
pub async fn attributes_by_ids(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<HashMap<String, Attribute>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name, color FROM attributes WHERE id IN ");
    push_id_list(&mut query, ids);

    let rows: Vec<(String, String, String)> = query.build_query_as().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.0.clone(), into_attribute(row)))
        .collect())
}

pub async fn attribute_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM attributes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}

/// Id of the attribute called `name`, creating it with `color` if missing
pub async fn find_or_create_attribute(
    conn: &mut SqliteConnection,
    name: &str,
    color: &str,
) -> Result<String> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM attributes WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO attributes (id, name, color) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(color)
        .execute(&mut *conn)
        .await?;

    tracing::info!(attribute = %name, "Created attribute");
    Ok(id)
}

/// Link an attribute to a post; returns `false` if the link already existed
pub async fn link_attribute(
    conn: &mut SqliteConnection,
    post_id: &str,
    attribute_id: &str,
) -> Result<bool> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO post_attributes (post_id, attribute_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(attribute_id)
            .execute(conn)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a link; returns `false` if there was none
pub async fn unlink_attribute(pool: &SqlitePool, post_id: &str, attribute_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM post_attributes WHERE post_id = ? AND attribute_id = ?")
        .bind(post_id)
        .bind(attribute_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn into_attribute((id, name, color): (String, String, String)) -> Attribute {
    Attribute { id, name, color }
}
