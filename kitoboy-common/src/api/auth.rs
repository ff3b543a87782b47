//! Password hashing and session tokens
//!
//! # Architecture
//!
//! - Passwords are stored as bcrypt hashes (`users.password_hash`); the
//!   salt and cost are embedded in the hash string
//! - Session tokens are `{base64url(username)}.{expires_ms}.{base64url(mac)}`
//!   where `mac` is HMAC-SHA256 over the first two segments
//! - The signing secret is configured, or generated once and stored in the
//!   `settings` table under `auth_secret`
//!
//! # Pure Functions
//!
//! Apart from secret storage this module holds no I/O and no HTTP framework
//! types; the axum middleware lives in kitoboy-api.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

type HmacSha256 = Hmac<Sha256>;

/// Session lifetime handed out by `/login`
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Settings key holding the generated signing secret
pub const AUTH_SECRET_KEY: &str = "auth_secret";

/// bcrypt work factor for new password hashes
pub const PASSWORD_HASH_COST: u32 = 10;

// ========================================
// Error Types
// ========================================

/// Token validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Unusable signing secret")]
    InvalidKey,
}

// ========================================
// Passwords
// ========================================

/// bcrypt hash of `password` with a fresh random salt
pub fn hash_password(password: &str) -> crate::Result<String> {
    Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
}

/// Check a password against a stored bcrypt hash
///
/// A stored value that is not a bcrypt hash never matches.
///
/// # Examples
///
/// ```
/// use kitoboy_common::api::auth::{hash_password, verify_password};
///
/// let stored = hash_password("s3cret").unwrap();
///
/// assert!(verify_password("s3cret", &stored));
/// assert!(!verify_password("S3cret", &stored));
/// ```
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

// ========================================
// Session Tokens
// ========================================

/// Issue a token for `username` valid for `ttl` from now
pub fn issue_token(username: &str, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    let expires_ms = now_ms().saturating_add(ttl.as_millis() as i64);
    issue_token_until(username, secret, expires_ms)
}

/// Issue a token expiring at `expires_ms` (Unix epoch milliseconds)
pub fn issue_token_until(
    username: &str,
    secret: &str,
    expires_ms: i64,
) -> Result<String, TokenError> {
    let payload = format!("{}.{}", URL_SAFE_NO_PAD.encode(username.as_bytes()), expires_ms);
    let tag = keyed_mac(secret, &payload)?.finalize().into_bytes();

    Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(tag)))
}

/// Validate a token and return the username it was issued for
///
/// # Examples
///
/// ```
/// use kitoboy_common::api::auth::{issue_token, verify_token, TokenError, DEFAULT_TOKEN_TTL};
///
/// let token = issue_token("operator", "secret", DEFAULT_TOKEN_TTL).unwrap();
/// assert_eq!(verify_token(&token, "secret").unwrap(), "operator");
/// assert_eq!(verify_token(&token, "other"), Err(TokenError::InvalidSignature));
/// ```
pub fn verify_token(token: &str, secret: &str) -> Result<String, TokenError> {
    let mut parts = token.trim().split('.');
    let (Some(encoded), Some(expires), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let username = URL_SAFE_NO_PAD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(TokenError::Malformed)?;
    let expires_ms: i64 = expires.parse().map_err(|_| TokenError::Malformed)?;
    let tag = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::Malformed)?;

    // verify_slice compares in constant time
    keyed_mac(secret, &format!("{}.{}", encoded, expires))?
        .verify_slice(&tag)
        .map_err(|_| TokenError::InvalidSignature)?;

    if expires_ms <= now_ms() {
        return Err(TokenError::Expired);
    }

    Ok(username)
}

fn keyed_mac(secret: &str, payload: &str) -> Result<HmacSha256, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidKey)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

// ========================================
// Signing Secret
// ========================================

/// Random 32-byte secret, hex encoded
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Load the signing secret from settings, generating and storing one if absent
#[cfg(feature = "sqlx")]
pub async fn load_or_initialize_secret(db: &SqlitePool) -> crate::Result<String> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(AUTH_SECRET_KEY)
        .fetch_optional(db)
        .await?;

    if let Some((secret,)) = existing.filter(|(value,)| !value.is_empty()) {
        return Ok(secret);
    }

    let secret = generate_secret();
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(AUTH_SECRET_KEY)
        .bind(&secret)
        .execute(db)
        .await?;

    tracing::info!("Generated new auth signing secret");
    Ok(secret)
}

// ========================================
// Helpers
// ========================================

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ========================================
// Tests
// ========================================
