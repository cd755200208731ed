//! Salted password hashing for contractor accounts.
//!
//! bcrypt is CPU-bound, so both hashing and verification run on the blocking
//! thread pool instead of stalling the async runtime.

use bcrypt::{hash, verify};
use thiserror::Error;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Smallest cost bcrypt accepts; only sensible for tests.
pub const MIN_BCRYPT_COST: u32 = 4;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("password hashing task failed: {0}")]
    Join(String),
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Join(e.to_string()))?
}

/// `Ok(false)` for a wrong password; `Err` when the stored hash is unusable.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    tokio::task::spawn_blocking(move || {
        verify(password, &password_hash).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Join(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_is_salted_and_verifies() {
        let first = hash_password("hunter22", MIN_BCRYPT_COST).await.unwrap();
        let second = hash_password("hunter22", MIN_BCRYPT_COST).await.unwrap();

        assert!(first.starts_with("$2"));
        assert_ne!(first, second);
        assert!(verify_password("hunter22", &first).await.unwrap());
        assert!(!verify_password("hunter23", &first).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("x", "not-a-bcrypt-hash").await.is_err());
    }
}
