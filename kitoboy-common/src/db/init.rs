//! Database initialization
//!
//! Creates the database file on first run, then creates every table with
//! `CREATE TABLE IF NOT EXISTS` so startup is idempotent.

use crate::models::DEFAULT_STATUSES;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Timestamp default with millisecond precision, sortable as text
const NOW_MS: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Open (or create) the database and bring the schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys and busy timeout are per connection, so they go on the
    // connect options rather than through one-off PRAGMA queries
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    seed_statuses(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_statuses_table(pool).await?;
    create_persons_table(pool).await?;
    create_avatars_table(pool).await?;
    create_posts_table(pool).await?;
    create_attributes_table(pool).await?;
    create_post_attributes_table(pool).await?;

    Ok(())
}

/// Create the settings table
///
/// Stores key-value pairs such as the generated `auth_secret`.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_statuses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statuses (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_persons_table(pool: &SqlitePool) -> Result<()> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id TEXT PRIMARY KEY,
            surname TEXT NOT NULL DEFAULT '',
            name TEXT NOT NULL DEFAULT '',
            second_name TEXT NOT NULL DEFAULT '',
            age TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            organization TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            status_id TEXT REFERENCES statuses(id),
            created_at TEXT NOT NULL DEFAULT ({now})
        )
        "#,
        now = NOW_MS
    );
    sqlx::query(&sql).execute(pool).await?;

    Ok(())
}

async fn create_avatars_table(pool: &SqlitePool) -> Result<()> {
    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS avatars (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            url TEXT NOT NULL DEFAULT '',
            person_id TEXT REFERENCES persons(id) ON DELETE SET NULL,
            status_id TEXT REFERENCES statuses(id),
            created_at TEXT NOT NULL DEFAULT ({now})
        )
        "#,
        now = NOW_MS
    );
    sqlx::query(&sql).execute(pool).await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_avatars_person ON avatars(person_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_posts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            posted_at TEXT NOT NULL,
            avatar_id TEXT NOT NULL REFERENCES avatars(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_avatar ON posts(avatar_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_attributes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attributes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            color TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_post_attributes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post_attributes (
            post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            attribute_id TEXT NOT NULL REFERENCES attributes(id) ON DELETE CASCADE,
            PRIMARY KEY (post_id, attribute_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert the default statuses, leaving edited rows alone
async fn seed_statuses(pool: &SqlitePool) -> Result<()> {
    for (id, name, color) in DEFAULT_STATUSES {
        sqlx::query("INSERT OR IGNORE INTO statuses (id, name, color) VALUES (?, ?, ?)")
            .bind(id.as_str())
            .bind(name)
            .bind(color)
            .execute(pool)
            .await?;
    }

    Ok(())
}
