//! Post storage

use anyhow::Result;
use kitoboy_common::csv_import::ParsedPost;
use kitoboy_common::models::{Attribute, Post, PostView};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use super::push_id_list;

/// Rows per multi-row INSERT
const INSERT_CHUNK: usize = 200;

/// Insert imported posts for one avatar
pub async fn insert_posts(
    conn: &mut SqliteConnection,
    avatar_id: &str,
    parsed: &[ParsedPost],
) -> Result<Vec<Post>> {
    let mut inserted = Vec::with_capacity(parsed.len());

    for chunk in parsed.chunks(INSERT_CHUNK) {
        let posts: Vec<Post> = chunk
            .iter()
            .map(|p| Post {
                id: Uuid::new_v4().to_string(),
                text: p.text.clone(),
                posted_at: p.posted_at.clone(),
                avatar_id: avatar_id.to_string(),
            })
            .collect();

        let mut query =
            QueryBuilder::<Sqlite>::new("INSERT INTO posts (id, text, posted_at, avatar_id) ");
        query.push_values(&posts, |mut row, post| {
            row.push_bind(post.id.clone())
                .push_bind(post.text.clone())
                .push_bind(post.posted_at.clone())
                .push_bind(post.avatar_id.clone());
        });
        query.build().execute(&mut *conn).await?;

        inserted.extend(posts);
    }

    Ok(inserted)
}

pub async fn find_post(conn: &mut SqliteConnection, id: &str) -> Result<Option<Post>> {
    let row: Option<(String, String, String, String)> =
        sqlx::query_as("SELECT id, text, posted_at, avatar_id FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?;

    Ok(row.map(|(id, text, posted_at, avatar_id)| Post {
        id,
        text,
        posted_at,
        avatar_id,
    }))
}

/// Posts with attributes for each avatar, newest first
pub async fn post_views_for_avatars(
    pool: &SqlitePool,
    avatar_ids: &[String],
) -> Result<HashMap<String, Vec<PostView>>> {
    let mut by_avatar: HashMap<String, Vec<PostView>> = HashMap::new();
    if avatar_ids.is_empty() {
        return Ok(by_avatar);
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT pa.post_id, a.id, a.name, a.color FROM post_attributes pa \
         JOIN attributes a ON a.id = pa.attribute_id \
         JOIN posts p ON p.id = pa.post_id \
         WHERE p.avatar_id IN ",
    );
    push_id_list(&mut query, avatar_ids);
    query.push(" ORDER BY a.name");

    let links: Vec<(String, String, String, String)> =
        query.build_query_as().fetch_all(pool).await?;

    let mut attributes: HashMap<String, Vec<Attribute>> = HashMap::new();
    for (post_id, id, name, color) in links {
        attributes
            .entry(post_id)
            .or_default()
            .push(Attribute { id, name, color });
    }

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, text, posted_at, avatar_id FROM posts WHERE avatar_id IN ",
    );
    push_id_list(&mut query, avatar_ids);
    query.push(" ORDER BY posted_at DESC, rowid DESC");

    let rows: Vec<(String, String, String, String)> =
        query.build_query_as().fetch_all(pool).await?;

    for (id, text, posted_at, avatar_id) in rows {
        let post_attributes = attributes.remove(&id).unwrap_or_default();
        by_avatar.entry(avatar_id).or_default().push(PostView {
            id,
            text,
            posted_at,
            attributes: post_attributes,
        });
    }

    Ok(by_avatar)
}
