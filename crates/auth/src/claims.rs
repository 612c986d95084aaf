use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sweetshop_core::UserId;

use crate::Role;

/// Bearer-token claims.
///
/// `iat`/`exp` are unix seconds so the token stays interoperable with any
/// standard JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user id.
    pub sub: UserId,

    /// Role at issuance. Informational only; the store decides at use time.
    pub role: Role,

    /// Display name at issuance.
    pub name: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(
        sub: UserId,
        role: Role,
        name: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub,
            role,
            name: name.into(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Why a presented token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token signature is invalid")]
    BadSignature,

    #[error("token algorithm is not accepted")]
    AlgorithmMismatch,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,
}

/// Deterministically validate the time window of already-verified claims.
///
/// A token is valid up to and including its `exp` second.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::Malformed(
            "expiry is not after issued-at".to_string(),
        ));
    }
    if now.timestamp() > claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
