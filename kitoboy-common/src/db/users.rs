//! Operator accounts

use crate::api::auth::hash_password;
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Stored credentials for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub username: String,
    /// bcrypt hash
    pub password_hash: String,
}

/// Create an account
///
/// Fails with [`Error::InvalidInput`] when the username is taken.
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<()> {
    let hash = hash_password(password)?;

    let result = sqlx::query(
        "INSERT OR IGNORE INTO users (guid, username, password_hash) VALUES (?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(username)
    .bind(&hash)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::InvalidInput("Username already exists".to_string()));
    }

    Ok(())
}

/// Look up an account by username
pub async fn find_user(pool: &SqlitePool, username: &str) -> Result<Option<UserCredentials>> {
    let row: Option<(String, String)> =
        sqlx::query_as("SELECT username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(username, password_hash)| UserCredentials {
        username,
        password_hash,
    }))
}

/// Create the configured operator account unless it already exists
///
/// Returns `true` when the account was created. An existing account keeps
/// its password.
pub async fn ensure_user(pool: &SqlitePool, username: &str, password: &str) -> Result<bool> {
    if find_user(pool, username).await?.is_some() {
        return Ok(false);
    }

    match create_user(pool, username, password).await {
        Ok(()) => {
            info!("Created operator account '{}'", username);
            Ok(true)
        }
        // Lost a race with a concurrent insert
        Err(Error::InvalidInput(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
