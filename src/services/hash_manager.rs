//! Password hashing.
//!
//! Argon2id with a random salt per hash; digests are stored in PHC string
//! format so the parameters travel with the hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Credential service: hashes and verifies passwords.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait HashManager: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, plain_text: &str) -> AppResult<String>;

    /// Check a plain text password against a stored digest.
    /// Malformed digests never match.
    fn compare(&self, plain_text: &str, hash: &str) -> bool;
}

/// Argon2 implementation of [`HashManager`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2HashManager;

impl Argon2HashManager {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl HashManager for Argon2HashManager {
    fn hash(&self, plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn compare(&self, plain_text: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Self::argon2()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {}", e);
                false
            }
        }
    }
}
