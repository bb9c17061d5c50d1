//! Password hashing and session tokens for the household's user accounts.
//!
//! Hashes use Argon2id in PHC string form, so the salt and parameters travel
//! with the hash.

use crate::db::{self, Pool};
use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::time::Duration;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("invalid stored hash: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("password verification failed: {e}")),
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        ));
    }
    Ok(())
}

/// Create the account or reset its password.
pub async fn set_password(pool: &Pool, username: &str, password: &str) -> Result<i64> {
    let username = username.trim();
    if username.is_empty() {
        return Err(anyhow!("username must be non-empty"));
    }
    validate_password(password).map_err(|e| anyhow!(e))?;
    let hash = hash_password(password)?;
    db::upsert_user(pool, username, &hash).await
}

/// Check credentials and open a session. `None` when they do not match.
pub async fn login(pool: &Pool, username: &str, password: &str) -> Result<Option<String>> {
    let Some(user) = db::find_user(pool, username.trim()).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    let token = Uuid::new_v4().to_string();
    db::insert_session(pool, &token, user.id).await?;
    Ok(Some(token))
}

/// User behind `token`; sessions older than `ttl` no longer count.
pub async fn authenticate(pool: &Pool, token: &str, ttl: Duration) -> Result<Option<i64>> {
    db::session_user(pool, token, ttl).await
}

pub async fn logout(pool: &Pool, token: &str) -> Result<bool> {
    db::delete_session(pool, token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
    }

    #[tokio::test]
    async fn login_roundtrip() {
        let pool = db::init_pool("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        let uid = set_password(&pool, " bob ", "hunter2hunter2").await.unwrap();
        assert!(login(&pool, "bob", "nope-nope").await.unwrap().is_none());
        assert!(login(&pool, "carol", "hunter2hunter2").await.unwrap().is_none());

        let token = login(&pool, "bob", "hunter2hunter2").await.unwrap().unwrap();
        let ttl = Duration::from_secs(3600);
        assert_eq!(authenticate(&pool, &token, ttl).await.unwrap(), Some(uid));
        assert!(logout(&pool, &token).await.unwrap());
        assert_eq!(authenticate(&pool, &token, ttl).await.unwrap(), None);
    }
}
