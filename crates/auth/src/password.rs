//! Salted, memory-hard password hashing (Argon2id, PHC string format).

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use thiserror::Error;

use crate::HashingCost;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Configured Argon2id hasher.
#[derive(Clone)]
pub struct PasswordHashing {
    argon: Argon2<'static>,
}

impl PasswordHashing {
    pub fn new(cost: HashingCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash with a fresh random salt; equal inputs yield different digests.
    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Verify against a stored digest. A malformed digest is a mismatch.
    ///
    /// Cost parameters are read from the digest itself, so hashes produced
    /// under a different `HashingCost` still verify.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self.argon.verify_password(plain.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}
