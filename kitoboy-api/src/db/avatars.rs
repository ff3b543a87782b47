//! Avatar storage and view assembly

use anyhow::Result;
use kitoboy_common::models::{AvatarRecord, AvatarSummary, AvatarView, PersonSummary, StatusId};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use super::{posts, push_id_list, statuses};

const AVATAR_COLUMNS: &str = "id, username, url, person_id, status_id";

#[derive(Debug, sqlx::FromRow)]
struct AvatarRow {
    id: String,
    username: String,
    url: String,
    person_id: Option<String>,
    status_id: Option<String>,
}

impl From<AvatarRow> for AvatarRecord {
    fn from(row: AvatarRow) -> Self {
        AvatarRecord {
            id: row.id,
            username: row.username,
            url: row.url,
            person_id: row.person_id,
            status_id: row.status_id,
        }
    }
}

/// Insert an avatar with status `not_set`
pub async fn create_avatar(
    conn: &mut SqliteConnection,
    username: &str,
    url: &str,
    person_id: &str,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO avatars (id, username, url, person_id, status_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(url)
    .bind(person_id)
    .bind(StatusId::NotSet.as_str())
    .execute(conn)
    .await?;

    Ok(id)
}

pub async fn count_avatars(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM avatars")
        .fetch_one(pool)
        .await?)
}

pub async fn fetch_avatar_view(pool: &SqlitePool, id: &str) -> Result<Option<AvatarView>> {
    let row: Option<AvatarRow> =
        sqlx::query_as(&format!("SELECT {} FROM avatars WHERE id = ?", AVATAR_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(assemble_views(pool, vec![row]).await?.pop())
}

/// One page of avatars, newest first
pub async fn list_avatar_views(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<AvatarView>> {
    let rows: Vec<AvatarRow> = sqlx::query_as(&format!(
        "SELECT {} FROM avatars ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        AVATAR_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    assemble_views(pool, rows).await
}

/// Avatars linked to a person, newest first
pub async fn avatar_summaries_for_person(
    pool: &SqlitePool,
    person_id: &str,
) -> Result<Vec<AvatarSummary>> {
    let rows: Vec<AvatarRow> = sqlx::query_as(&format!(
        "SELECT {} FROM avatars WHERE person_id = ? ORDER BY created_at DESC, rowid DESC",
        AVATAR_COLUMNS
    ))
    .bind(person_id)
    .fetch_all(pool)
    .await?;

    Ok(assemble_views(pool, rows)
        .await?
        .into_iter()
        .map(AvatarView::without_person)
        .collect())
}

/// Set the triage status; `None` when the avatar does not exist
pub async fn update_avatar_status(
    pool: &SqlitePool,
    id: &str,
    status_id: &str,
) -> Result<Option<AvatarRecord>> {
    let result = sqlx::query("UPDATE avatars SET status_id = ? WHERE id = ?")
        .bind(status_id)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    let row: Option<AvatarRow> =
        sqlx::query_as(&format!("SELECT {} FROM avatars WHERE id = ?", AVATAR_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(AvatarRecord::from))
}

/// Attach person, status and posts to avatar rows, keeping row order
async fn assemble_views(pool: &SqlitePool, rows: Vec<AvatarRow>) -> Result<Vec<AvatarView>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let avatar_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut person_ids: Vec<String> = rows.iter().filter_map(|row| row.person_id.clone()).collect();
    person_ids.sort();
    person_ids.dedup();

    let statuses = statuses::statuses_by_id(pool).await?;
    let persons = person_summaries(pool, &person_ids).await?;
    let mut post_views = posts::post_views_for_avatars(pool, &avatar_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| AvatarView {
            person: row.person_id.as_ref().and_then(|id| persons.get(id).cloned()),
            status: row.status_id.as_ref().and_then(|id| statuses.get(id).cloned()),
            posts: post_views.remove(&row.id).unwrap_or_default(),
            id: row.id,
            username: row.username,
            url: row.url,
        })
        .collect())
}

async fn person_summaries(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<HashMap<String, PersonSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, surname, name, second_name, age FROM persons WHERE id IN ",
    );
    push_id_list(&mut query, ids);

    let rows: Vec<(String, String, String, String, String)> =
        query.build_query_as().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(id, surname, name, second_name, age)| {
            (
                id.clone(),
                PersonSummary {
                    id,
                    surname,
                    name,
                    second_name,
                    age,
                },
            )
        })
        .collect())
}
